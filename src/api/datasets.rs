use crate::core::{Color, FieldKind, Margins, Series};
use crate::error::{ChartError, ChartResult};
use crate::render::{LayerKind, Primitive, RenderFrame, Stroke, TextHAlign};

const LEGEND_FONT_PX: f64 = 12.0;
const LEGEND_MARKER_RADIUS: f64 = 3.0;
const LEGEND_ITEM_GAP: f64 = 16.0;
const LEGEND_BASELINE: f64 = 16.0;
// Glyph advance estimate; layout must not depend on a text backend.
const LEGEND_GLYPH_WIDTH: f64 = LEGEND_FONT_PX * 0.6;
const AXIS_FONT_PX: f64 = 12.0;

/// One numeric field of a multi-dataset chart and its legend label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub field: String,
    pub label: String,
}

impl Dataset {
    #[must_use]
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
        }
    }
}

pub(crate) fn require_datasets(series: &Series, datasets: &[Dataset]) -> ChartResult<()> {
    if datasets.is_empty() {
        return Err(ChartError::InvalidData(
            "chart needs at least one dataset".to_owned(),
        ));
    }
    for dataset in datasets {
        series.require_field(&dataset.field, FieldKind::Number)?;
    }
    Ok(())
}

/// Largest finite value across every dataset field.
pub(crate) fn datasets_max(series: &Series, datasets: &[Dataset]) -> Option<f64> {
    datasets
        .iter()
        .filter_map(|dataset| series.max_number(&dataset.field))
        .reduce(f64::max)
}

/// Rounds `max` up so `tick_count` even steps land on 1, 1.5, 2, 2.5, 3, 4,
/// 5, 6 or 8 times a power of ten. Non-positive or non-finite input passes
/// through.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn nice_max(max: f64, tick_count: usize) -> f64 {
    if !max.is_finite() || max <= 0.0 || tick_count == 0 {
        return max;
    }
    let raw_step = max / tick_count as f64;
    let magnitude = 10f64.powi(raw_step.log10().floor() as i32);
    let step = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 8.0]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw_step)
        .unwrap_or(10.0 * magnitude);
    step * tick_count as f64
}

/// Integer with `,` thousands separators.
#[must_use]
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Horizontal gridline and right-aligned label at every tick.
pub(crate) fn push_value_axis(
    frame: &mut RenderFrame,
    margins: Margins,
    ticks: &[(f64, f64)],
    prefix: &str,
    grid: Color,
    text: Color,
) {
    let left = margins.left;
    let right = left + margins.inner_width(frame.viewport);
    let grid_stroke = Stroke::new(grid, 1.0);
    for &(value, y) in ticks {
        frame.push(LayerKind::Grid, Primitive::line(left, y, right, y, grid_stroke));
        frame.push(
            LayerKind::Axis,
            Primitive::text(
                format!("{prefix}{}", group_thousands(value)),
                left - 6.0,
                y + AXIS_FONT_PX * 0.32,
                AXIS_FONT_PX,
                text,
                TextHAlign::Right,
            ),
        );
    }
}

/// Single centered row of point-style markers above the plot.
pub(crate) fn push_top_legend(
    frame: &mut RenderFrame,
    datasets: &[Dataset],
    palette: &[Color],
    text: Color,
) {
    let item_width = |dataset: &Dataset| {
        4.0 * LEGEND_MARKER_RADIUS + dataset.label.chars().count() as f64 * LEGEND_GLYPH_WIDTH
    };
    let total: f64 = datasets.iter().map(item_width).sum::<f64>()
        + LEGEND_ITEM_GAP * datasets.len().saturating_sub(1) as f64;
    let mut x = (frame.viewport.width_f64() - total) / 2.0;
    let y = LEGEND_BASELINE;
    for (slot, dataset) in datasets.iter().enumerate() {
        frame.push(
            LayerKind::Legend,
            Primitive::circle(x + LEGEND_MARKER_RADIUS, y - LEGEND_FONT_PX * 0.32, LEGEND_MARKER_RADIUS)
                .with_solid_fill(palette[slot % palette.len()].with_alpha(1.0)),
        );
        frame.push(
            LayerKind::Legend,
            Primitive::text(
                dataset.label.as_str(),
                x + 4.0 * LEGEND_MARKER_RADIUS,
                y,
                LEGEND_FONT_PX,
                text,
                TextHAlign::Left,
            ),
        );
        x += item_width(dataset) + LEGEND_ITEM_GAP;
    }
}
