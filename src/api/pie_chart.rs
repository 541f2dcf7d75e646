use std::f64::consts::TAU;

use tracing::debug;

use crate::core::{Color, FieldKind, FieldValue, Point, Series, wedge_path};
use crate::error::ChartResult;
use crate::render::{Datum, LayerKind, Primitive, RenderFrame, Stroke, TextHAlign};

use super::config::{ChartConfig, ChartKind};
use super::scene::{DropReason, FrameBuilder, Scene, SceneDiagnostics, require_text_field};

pub const PIE_CHART_TOOLTIP: &str = "{label}: {value} ({percent}%)";

const LEGEND_ROW_HEIGHT: f64 = 20.0;
const LEGEND_FONT_PX: f64 = 12.0;
const LEGEND_MARKER_RADIUS: f64 = 3.0;

/// Share-of-total wedges with a legend on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChartBuilder {
    pub label_field: String,
    pub value_field: String,
    pub show_legend: bool,
    pub legend_width: f64,
    pub padding: f64,
    pub segments_per_turn: usize,
}

impl Default for PieChartBuilder {
    fn default() -> Self {
        Self {
            label_field: "label".to_owned(),
            value_field: "value".to_owned(),
            show_legend: true,
            legend_width: 160.0,
            padding: 8.0,
            segments_per_turn: 128,
        }
    }
}

struct Slice<'a> {
    index: usize,
    label: &'a str,
    value: f64,
}

impl PieChartBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_fields(mut self, label_field: impl Into<String>, value_field: impl Into<String>) -> Self {
        self.label_field = label_field.into();
        self.value_field = value_field.into();
        self
    }

    #[must_use]
    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    fn push_legend(
        &self,
        frame: &mut RenderFrame,
        plot_width: f64,
        slices: &[Slice<'_>],
        palette: &[Color],
        text: Color,
    ) {
        let x = plot_width + 16.0;
        let height = frame.viewport.height_f64();
        let first_row = (height - slices.len() as f64 * LEGEND_ROW_HEIGHT) / 2.0
            + LEGEND_ROW_HEIGHT / 2.0;
        for (slot, slice) in slices.iter().enumerate() {
            let y = first_row + slot as f64 * LEGEND_ROW_HEIGHT;
            frame.push(
                LayerKind::Legend,
                Primitive::circle(x, y, LEGEND_MARKER_RADIUS)
                    .with_solid_fill(palette[slot % palette.len()]),
            );
            frame.push(
                LayerKind::Legend,
                Primitive::text(
                    slice.label,
                    x + 4.0 * LEGEND_MARKER_RADIUS,
                    y + LEGEND_FONT_PX * 0.32,
                    LEGEND_FONT_PX,
                    text,
                    TextHAlign::Left,
                ),
            );
        }
    }
}

impl FrameBuilder for PieChartBuilder {
    fn kind(&self) -> ChartKind {
        ChartKind::PieChart
    }

    fn default_tooltip_template(&self) -> &'static str {
        PIE_CHART_TOOLTIP
    }

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        config.validate()?;
        let viewport = config.viewport();
        viewport.ensure_mountable()?;
        require_text_field(series, &self.label_field)?;
        series.require_field(&self.value_field, FieldKind::Number)?;

        let theme = config.theme();
        let mut diagnostics = SceneDiagnostics::default();
        let mut frame = RenderFrame::new(viewport, Color::TRANSPARENT);

        let mut slices = Vec::with_capacity(series.len());
        for (index, point) in series.points().iter().enumerate() {
            let Some(label) = point.text(&self.label_field) else {
                diagnostics.drop_datum(
                    index,
                    DropReason::MissingField {
                        field: self.label_field.clone(),
                    },
                );
                continue;
            };
            match point.number(&self.value_field) {
                Some(value) if value.is_finite() && value > 0.0 => {
                    slices.push(Slice {
                        index,
                        label,
                        value,
                    });
                }
                _ => diagnostics.drop_datum(index, DropReason::NonPositiveValue),
            }
        }
        let total: f64 = slices.iter().map(|slice| slice.value).sum();

        let width = viewport.width_f64();
        let height = viewport.height_f64();
        let plot_width = if self.show_legend {
            (width - self.legend_width).max(0.0)
        } else {
            width
        };
        let radius = (plot_width.min(height) / 2.0 - self.padding).max(0.0);
        let center = Point::new(plot_width / 2.0, height / 2.0);
        let border = Stroke::new(theme.slice_border, 2.0);
        let hover_stroke = Stroke::new(theme.hover_stroke, 2.0);

        let mut angle = 0.0;
        for (slot, slice) in slices.iter().enumerate() {
            let share = slice.value / total;
            let sweep = share * TAU;
            let path = wedge_path(center, radius, angle, angle + sweep, self.segments_per_turn);
            angle += sweep;
            let Some(point) = series.get(slice.index) else {
                continue;
            };
            let datum = Datum::new(slice.index, point.clone())
                .with_context("percent", FieldValue::Number((share * 100.0).round()));
            frame.push(
                LayerKind::Series,
                Primitive::path(path)
                    .with_solid_fill(config.palette[slot % config.palette.len()])
                    .with_stroke(border)
                    .with_hover_stroke(hover_stroke)
                    .with_datum(datum),
            );
        }

        if self.show_legend {
            self.push_legend(&mut frame, plot_width, &slices, &config.palette, theme.text);
        }

        debug!(
            slice_count = slices.len(),
            total,
            dropped = diagnostics.dropped_count(),
            "built pie chart"
        );
        Ok(Scene { frame, diagnostics })
    }
}
