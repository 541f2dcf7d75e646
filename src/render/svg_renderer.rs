use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::Viewport;
use crate::core::geometry::fmt_coord;
use crate::error::ChartResult;
use crate::render::{
    Color, Fill, LayerKind, Primitive, RenderFrame, Renderer, Shape, TextHAlign, VisualState,
};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Vector backend that repaints a standalone SVG document on every render.
///
/// Element ids in the document carry a per-renderer prefix so several chart
/// documents can be inlined into one page.
#[derive(Debug)]
pub struct SvgRenderer {
    viewport: Option<Viewport>,
    id_prefix: String,
    document: String,
    paint_count: u64,
    released: bool,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            viewport: None,
            id_prefix: format!("surface-{}", NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed)),
            document: String::new(),
            paint_count: 0,
            released: false,
        }
    }
}

impl SvgRenderer {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    /// Replaces the generated id prefix, e.g. with a page-level chart name.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    /// Factory for `SurfaceManager` and `ChartController`.
    pub fn factory() -> impl FnMut(Viewport) -> ChartResult<Self> {
        |viewport| Ok(Self::new(viewport))
    }

    /// Last painted document; empty until the first paint.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.document = render_document_with_id_prefix(frame, &self.id_prefix);
        self.paint_count += 1;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.viewport = Some(viewport);
        Ok(())
    }

    fn release(&mut self) {
        self.document.clear();
        self.viewport = None;
        self.released = true;
    }
}

/// Serializes a frame into a standalone SVG document with unprefixed ids.
#[must_use]
pub fn render_document(frame: &RenderFrame) -> String {
    render_document_with_id_prefix(frame, "")
}

/// Serializes a frame, naming gradients `{prefix}-gradient-{n}`.
#[must_use]
pub fn render_document_with_id_prefix(frame: &RenderFrame, prefix: &str) -> String {
    let width = frame.viewport.width;
    let height = frame.viewport.height;
    let mut out = String::with_capacity(256 + frame.primitive_count() * 96);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    let mut gradient_count = 0usize;
    let mut defs = String::new();
    let mut body = String::new();

    body.push_str(r#"<rect x="0" y="0" width="100%" height="100%""#);
    push_paint(&mut body, "fill", frame.clear_color);
    body.push_str("/>");

    for layer in &frame.layers {
        if layer.primitives.is_empty() {
            continue;
        }
        let _ = write!(body, r#"<g data-layer="{}">"#, layer_name(layer.kind));
        for primitive in &layer.primitives {
            let fill_ref = match &primitive.fill {
                Fill::HorizontalGradient(_) => {
                    let id = if prefix.is_empty() {
                        format!("gradient-{gradient_count}")
                    } else {
                        format!("{prefix}-gradient-{gradient_count}")
                    };
                    gradient_count += 1;
                    push_gradient(&mut defs, &id, &primitive.fill);
                    Some(id)
                }
                Fill::None | Fill::Solid(_) => None,
            };
            push_primitive(&mut body, primitive, fill_ref.as_deref());
        }
        body.push_str("</g>");
    }

    if !defs.is_empty() {
        out.push_str("<defs>");
        out.push_str(&defs);
        out.push_str("</defs>");
    }
    out.push_str(&body);
    out.push_str("</svg>");
    out
}

fn layer_name(kind: LayerKind) -> &'static str {
    match kind {
        LayerKind::Background => "background",
        LayerKind::Grid => "grid",
        LayerKind::Series => "series",
        LayerKind::Legend => "legend",
        LayerKind::Axis => "axis",
    }
}

fn push_gradient(out: &mut String, id: &str, fill: &Fill) {
    let Fill::HorizontalGradient(stops) = fill else {
        return;
    };
    let _ = write!(
        out,
        r#"<linearGradient id="{id}" x1="0%" y1="0%" x2="100%" y2="0%">"#
    );
    for stop in stops {
        let _ = write!(
            out,
            r#"<stop offset="{}%" stop-color="{}""#,
            fmt_coord(stop.offset * 100.0),
            stop.color.with_alpha(1.0).to_hex()
        );
        if stop.color.alpha < 1.0 {
            let _ = write!(out, r#" stop-opacity="{}""#, fmt_coord(stop.color.alpha));
        }
        out.push_str("/>");
    }
    out.push_str("</linearGradient>");
}

fn push_primitive(out: &mut String, primitive: &Primitive, gradient_id: Option<&str>) {
    let shape = primitive.effective_shape();
    match shape.as_ref() {
        Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
        } => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                fmt_coord(*x),
                fmt_coord(*y),
                fmt_coord(*width),
                fmt_coord(*height)
            );
            if *corner_radius > 0.0 {
                let _ = write!(out, r#" rx="{}""#, fmt_coord(*corner_radius));
            }
        }
        Shape::Path(path) => {
            let _ = write!(
                out,
                r#"<path d="{}" fill-rule="evenodd""#,
                path.to_svg_path_data()
            );
        }
        Shape::Circle { cx, cy, radius } => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}""#,
                fmt_coord(*cx),
                fmt_coord(*cy),
                fmt_coord(*radius)
            );
        }
        Shape::Line { x1, y1, x2, y2 } => {
            let _ = write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}""#,
                fmt_coord(*x1),
                fmt_coord(*y1),
                fmt_coord(*x2),
                fmt_coord(*y2)
            );
        }
        Shape::Text {
            text,
            x,
            y,
            font_size_px,
            h_align,
        } => {
            let anchor = match h_align {
                TextHAlign::Left => "start",
                TextHAlign::Center => "middle",
                TextHAlign::Right => "end",
            };
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" text-anchor="{anchor}""#,
                fmt_coord(*x),
                fmt_coord(*y),
                fmt_coord(*font_size_px)
            );
            push_fill(out, &primitive.fill, gradient_id);
            out.push('>');
            escape_xml_into(out, text);
            out.push_str("</text>");
            return;
        }
    }

    push_fill(out, &primitive.fill, gradient_id);
    if let Some(stroke) = primitive.effective_stroke() {
        push_paint(
            out,
            "stroke",
            stroke.color.with_alpha(stroke.color.alpha * stroke.opacity),
        );
        let _ = write!(out, r#" stroke-width="{}""#, fmt_coord(stroke.width));
    }
    if let Some(datum) = &primitive.datum {
        let _ = write!(out, r#" data-series-index="{}""#, datum.series_index);
    }
    if primitive.state == VisualState::Hovered {
        out.push_str(r#" data-state="hovered""#);
    }
    out.push_str("/>");
}

fn push_fill(out: &mut String, fill: &Fill, gradient_id: Option<&str>) {
    match (fill, gradient_id) {
        (Fill::Solid(color), _) => push_paint(out, "fill", *color),
        (Fill::HorizontalGradient(_), Some(id)) => {
            let _ = write!(out, r#" fill="url(#{id})""#);
        }
        _ => out.push_str(r#" fill="none""#),
    }
}

fn push_paint(out: &mut String, attribute: &str, color: Color) {
    let _ = write!(
        out,
        r#" {attribute}="{}""#,
        color.with_alpha(1.0).to_hex()
    );
    if color.alpha < 1.0 {
        let _ = write!(out, r#" {attribute}-opacity="{}""#, fmt_coord(color.alpha));
    }
}

fn escape_xml_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (index, byte) in text.bytes().enumerate() {
        let escaped = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[start..index]);
        out.push_str(escaped);
        start = index + 1;
    }
    out.push_str(&text[start..]);
}
