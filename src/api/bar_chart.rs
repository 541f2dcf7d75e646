use tracing::debug;

use crate::core::{Color, FieldKind, FieldValue, Margins, Series};
use crate::error::ChartResult;
use crate::render::{
    Datum, Fill, GradientStop, LayerKind, Primitive, RenderFrame, Stroke, TextHAlign,
};

use super::config::{ChartConfig, ChartKind};
use super::datasets::{
    Dataset, datasets_max, nice_max, push_top_legend, push_value_axis, require_datasets,
};
use super::scene::{
    DropReason, FrameBuilder, Scene, SceneDiagnostics, require_text_field, value_linear_scale,
};

pub const BAR_CHART_TOOLTIP: &str = "{label} — Value: {value}";
pub const GROUPED_BAR_CHART_TOOLTIP: &str = "{dataset} — {label}: {value}";

const GRID_LINES: usize = 4;
const LABEL_FONT_PX: f64 = 12.0;
const GROUPED_TICKS: usize = 4;
const LEGEND_CLEARANCE: f64 = 36.0;

/// Vertical bars spread edge to edge with a fixed width share.
///
/// With datasets set, each label gets a centered group of one bar per
/// dataset instead, with a top legend and a rounded value axis.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartBuilder {
    pub label_field: String,
    pub value_field: String,
    /// Grouped mode when non-empty; `value_field` is then unused.
    pub datasets: Vec<Dataset>,
    pub margins: Margins,
    /// Bar width as a share of the plot width.
    pub bar_width_ratio: f64,
    /// Group width as a share of each label's slot in grouped mode.
    pub group_width_ratio: f64,
    pub corner_radius: f64,
}

impl Default for BarChartBuilder {
    fn default() -> Self {
        Self {
            label_field: "label".to_owned(),
            value_field: "value".to_owned(),
            datasets: Vec::new(),
            margins: Margins::new(8.0, 0.0, 24.0, 40.0),
            bar_width_ratio: 0.08,
            group_width_ratio: 0.8,
            corner_radius: 6.0,
        }
    }
}

impl BarChartBuilder {
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
    pub fn with_datasets(mut self, datasets: Vec<Dataset>) -> Self {
        self.datasets = datasets;
        self
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_corner_radius(mut self, corner_radius: f64) -> Self {
        self.corner_radius = corner_radius;
        self
    }

    fn is_grouped(&self) -> bool {
        !self.datasets.is_empty()
    }

    fn bar_fill(palette: &[Color]) -> Fill {
        match palette {
            [] => Fill::None,
            [color] => Fill::Solid(*color),
            colors => {
                let last = (colors.len() - 1) as f64;
                Fill::HorizontalGradient(
                    colors
                        .iter()
                        .enumerate()
                        .map(|(index, color)| GradientStop {
                            offset: index as f64 / last,
                            color: *color,
                        })
                        .collect(),
                )
            }
        }
    }

    fn push_grid(
        &self,
        frame: &mut RenderFrame,
        domain_max: f64,
        grid: Color,
        text: Color,
    ) {
        let viewport = frame.viewport;
        let left = self.margins.left;
        let right = left + self.margins.inner_width(viewport);
        let height = self.margins.inner_height(viewport);
        let bottom = self.margins.top + height;
        let grid_stroke = Stroke::new(grid, 1.0);

        for line in 0..GRID_LINES {
            let y = bottom - height * line as f64 / GRID_LINES as f64;
            frame.push(LayerKind::Grid, Primitive::line(left, y, right, y, grid_stroke));
        }
        for label in 0..=GRID_LINES {
            let value = (domain_max / GRID_LINES as f64 * label as f64).round();
            let y = bottom - height * label as f64 / GRID_LINES as f64;
            frame.push(
                LayerKind::Axis,
                Primitive::text(
                    value.to_string(),
                    left - 6.0,
                    y + LABEL_FONT_PX * 0.32,
                    LABEL_FONT_PX,
                    text,
                    TextHAlign::Right,
                ),
            );
        }
    }

    fn build_grouped(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        config.validate()?;
        let viewport = config.viewport();
        viewport.ensure_mountable()?;
        require_text_field(series, &self.label_field)?;
        require_datasets(series, &self.datasets)?;

        let theme = config.theme();
        let mut diagnostics = SceneDiagnostics::default();
        let mut frame = RenderFrame::new(viewport, Color::TRANSPARENT);

        let margins = Margins {
            top: self.margins.top.max(LEGEND_CLEARANCE),
            ..self.margins
        };
        let width = margins.inner_width(viewport);
        let height = margins.inner_height(viewport);
        let top = margins.top;
        let bottom = top + height;
        let values = value_linear_scale(
            datasets_max(series, &self.datasets).map(|max| nice_max(max, GROUPED_TICKS)),
            bottom,
            top,
            config,
            &mut diagnostics,
        )?;
        let ticks: Vec<(f64, f64)> = values
            .even_ticks(GROUPED_TICKS)
            .into_iter()
            .map(|value| (value, values.map(value)))
            .collect();
        push_value_axis(&mut frame, margins, &ticks, "", theme.grid, theme.muted_text);

        let mut rows = Vec::with_capacity(series.len());
        for (index, point) in series.points().iter().enumerate() {
            match point.text(&self.label_field) {
                Some(label) => rows.push((index, point, label)),
                None => diagnostics.drop_datum(
                    index,
                    DropReason::MissingField {
                        field: self.label_field.clone(),
                    },
                ),
            }
        }

        let slot_width = if rows.is_empty() {
            0.0
        } else {
            width / rows.len() as f64
        };
        let group_width = slot_width * self.group_width_ratio;
        let bar_width = group_width / self.datasets.len() as f64;
        let hover_stroke = Stroke::new(theme.hover_stroke, 2.0);

        for (slot, (index, point, label)) in rows.iter().enumerate() {
            let slot_left = margins.left + slot as f64 * slot_width;
            let group_left = slot_left + (slot_width - group_width) / 2.0;
            for (offset, dataset) in self.datasets.iter().enumerate() {
                let Some(value) = point.number(&dataset.field).filter(|value| value.is_finite())
                else {
                    diagnostics.drop_datum(
                        *index,
                        DropReason::MissingField {
                            field: dataset.field.clone(),
                        },
                    );
                    continue;
                };
                let x = group_left + offset as f64 * bar_width;
                let y = values.map(value.max(0.0)).clamp(top, bottom);
                let datum = Datum::new(*index, (*point).clone())
                    .with_context("dataset", FieldValue::Category(dataset.label.clone()))
                    .with_context("value", FieldValue::Number(value));
                frame.push(
                    LayerKind::Series,
                    Primitive::rounded_rect(x, y, bar_width, bottom - y, self.corner_radius)
                        .with_solid_fill(config.palette[offset % config.palette.len()])
                        .with_hover_stroke(hover_stroke)
                        .with_datum(datum),
                );
            }
            frame.push(
                LayerKind::Axis,
                Primitive::text(
                    *label,
                    slot_left + slot_width / 2.0,
                    bottom + LABEL_FONT_PX + 6.0,
                    LABEL_FONT_PX,
                    theme.muted_text,
                    TextHAlign::Center,
                ),
            );
        }
        push_top_legend(&mut frame, &self.datasets, &config.palette, theme.text);

        debug!(
            group_count = rows.len(),
            dataset_count = self.datasets.len(),
            bar_count = frame.series().len(),
            "built grouped bar chart"
        );
        Ok(Scene { frame, diagnostics })
    }
}

impl FrameBuilder for BarChartBuilder {
    fn kind(&self) -> ChartKind {
        ChartKind::BarChart
    }

    fn default_tooltip_template(&self) -> &'static str {
        if self.is_grouped() {
            GROUPED_BAR_CHART_TOOLTIP
        } else {
            BAR_CHART_TOOLTIP
        }
    }

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        if self.is_grouped() {
            return self.build_grouped(series, config);
        }
        config.validate()?;
        let viewport = config.viewport();
        viewport.ensure_mountable()?;
        require_text_field(series, &self.label_field)?;
        series.require_field(&self.value_field, FieldKind::Number)?;

        let theme = config.theme();
        let mut diagnostics = SceneDiagnostics::default();
        let mut frame = RenderFrame::new(viewport, Color::TRANSPARENT);

        let width = self.margins.inner_width(viewport);
        let height = self.margins.inner_height(viewport);
        let top = self.margins.top;
        let bottom = top + height;
        let values = value_linear_scale(
            series.max_number(&self.value_field),
            bottom,
            top,
            config,
            &mut diagnostics,
        )?;
        let domain_max = values.domain().map_or(0.0, |(_, max)| max);
        self.push_grid(&mut frame, domain_max, theme.grid, theme.muted_text);

        let bars: Vec<_> = series
            .points()
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                let label = point.text(&self.label_field);
                let value = point.number(&self.value_field);
                match (label, value) {
                    (Some(label), Some(value)) => Some((index, point, label, value)),
                    (None, _) => {
                        diagnostics.drop_datum(
                            index,
                            DropReason::MissingField {
                                field: self.label_field.clone(),
                            },
                        );
                        None
                    }
                    (_, None) => {
                        diagnostics.drop_datum(
                            index,
                            DropReason::MissingField {
                                field: self.value_field.clone(),
                            },
                        );
                        None
                    }
                }
            })
            .collect();

        let bar_width = width * self.bar_width_ratio;
        let gap = if bars.len() > 1 {
            (width - bar_width * bars.len() as f64) / (bars.len() - 1) as f64
        } else {
            0.0
        };
        let fill = Self::bar_fill(&config.palette);
        let hover_stroke = Stroke::new(theme.hover_stroke, 2.0);

        for (slot, (index, point, label, value)) in bars.into_iter().enumerate() {
            let x = self.margins.left + slot as f64 * (bar_width + gap);
            let y = values.map(value.max(0.0)).clamp(top, bottom);
            frame.push(
                LayerKind::Series,
                Primitive::rounded_rect(x, y, bar_width, bottom - y, self.corner_radius)
                    .with_fill(fill.clone())
                    .with_hover_stroke(hover_stroke)
                    .with_datum(Datum::new(index, point.clone())),
            );
            frame.push(
                LayerKind::Axis,
                Primitive::text(
                    label,
                    x + bar_width / 2.0,
                    bottom + LABEL_FONT_PX + 6.0,
                    LABEL_FONT_PX,
                    theme.muted_text,
                    TextHAlign::Center,
                ),
            );
        }

        debug!(
            bar_count = frame.series().len(),
            domain_max,
            "built bar chart"
        );
        Ok(Scene { frame, diagnostics })
    }
}
