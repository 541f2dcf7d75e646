use crate::render::Datum;

/// Resolves `{field}` placeholders against a datum.
///
/// Point fields are looked up before derived context; unknown fields expand to
/// an empty string. `{{` and `}}` produce literal braces.
#[must_use]
pub fn format_tooltip(template: &str, datum: &Datum) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(position) = rest.find(['{', '}']) {
        out.push_str(&rest[..position]);
        let tail = &rest[position..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }
        match tail[1..].find('}') {
            Some(end) => {
                let name = &tail[1..=end];
                if let Some(value) = datum.field(name.trim()) {
                    out.push_str(&value.to_string());
                }
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::format_tooltip;
    use crate::core::{DataPoint, FieldValue};
    use crate::render::Datum;

    fn datum() -> Datum {
        Datum::new(
            0,
            DataPoint::new()
                .with_category("x", "Mon")
                .with_category("y", "Morning")
                .with_number("v", 22.0),
        )
        .with_context("percent", FieldValue::Number(35.0))
    }

    #[test]
    fn resolves_fields_and_context() {
        assert_eq!(
            format_tooltip("{x}, {y} — Value: {v} ({percent}%)", &datum()),
            "Mon, Morning — Value: 22 (35%)"
        );
    }

    #[test]
    fn unknown_fields_expand_empty_and_braces_escape() {
        assert_eq!(format_tooltip("[{missing}] {{v}}", &datum()), "[] {v}");
        assert_eq!(format_tooltip("open {v", &datum()), "open {v");
    }
}
