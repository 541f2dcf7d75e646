use tracing::debug;

use crate::core::{Color, DataPoint, FieldValue, Margins, Point, ScreenPath, Series};
use crate::error::ChartResult;
use crate::interaction::HitTestMode;
use crate::render::{Datum, LayerKind, Primitive, RenderFrame, Stroke, TextHAlign};

use super::config::{ChartConfig, ChartKind};
use super::datasets::{
    Dataset, datasets_max, nice_max, push_top_legend, push_value_axis, require_datasets,
};
use super::scene::{
    DropReason, FrameBuilder, Scene, SceneDiagnostics, require_text_field, value_linear_scale,
};

pub const LINE_CHART_TOOLTIP: &str = "{dataset} — {label}: {value}";

const LABEL_FONT_PX: f64 = 12.0;

/// One polyline per dataset over shared category labels, y axis from zero.
///
/// Pointer hover selects the point nearest along x, so the pointer need not
/// touch a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChartBuilder {
    pub label_field: String,
    pub datasets: Vec<Dataset>,
    pub margins: Margins,
    pub line_width: f64,
    pub point_radius: f64,
    pub hover_radius: f64,
    /// Shade under each line with the dataset color at `area_alpha`.
    pub fill_area: bool,
    pub area_alpha: f64,
    pub tick_count: usize,
    /// Prepended to every y tick label, e.g. `$`.
    pub tick_prefix: String,
    pub show_legend: bool,
}

impl Default for LineChartBuilder {
    fn default() -> Self {
        Self {
            label_field: "label".to_owned(),
            datasets: vec![Dataset::new("value", "Value")],
            margins: Margins::new(36.0, 12.0, 28.0, 64.0),
            line_width: 3.0,
            point_radius: 3.0,
            hover_radius: 5.0,
            fill_area: true,
            area_alpha: 0.1,
            tick_count: 5,
            tick_prefix: String::new(),
            show_legend: true,
        }
    }
}

struct Vertex<'a> {
    index: usize,
    x: f64,
    y: f64,
    value: f64,
    point: &'a DataPoint,
}

impl LineChartBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_label_field(mut self, label_field: impl Into<String>) -> Self {
        self.label_field = label_field.into();
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
    pub fn with_tick_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tick_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_area_fill(mut self, fill_area: bool) -> Self {
        self.fill_area = fill_area;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    /// Category slot x: first label on the left edge, last on the right.
    fn slot_x(&self, slot: usize, slots: usize, width: f64) -> f64 {
        if slots < 2 {
            return self.margins.left + width / 2.0;
        }
        self.margins.left + width * slot as f64 / (slots - 1) as f64
    }

    fn push_series(
        &self,
        frame: &mut RenderFrame,
        dataset: &Dataset,
        vertices: &[Vertex<'_>],
        color: Color,
        bottom: f64,
        hover_stroke: Stroke,
    ) {
        if let (true, [first, .., last]) = (self.fill_area, vertices) {
            let mut ring: Vec<Point> = vertices
                .iter()
                .map(|vertex| Point::new(vertex.x, vertex.y))
                .collect();
            ring.push(Point::new(last.x, bottom));
            ring.push(Point::new(first.x, bottom));
            frame.push(
                LayerKind::Series,
                Primitive::path(ScreenPath::from_ring(ring))
                    .with_solid_fill(color.with_alpha(self.area_alpha)),
            );
        }

        let line = Stroke::new(color, self.line_width);
        for pair in vertices.windows(2) {
            frame.push(
                LayerKind::Series,
                Primitive::line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, line),
            );
        }

        for vertex in vertices {
            let datum = Datum::new(vertex.index, vertex.point.clone())
                .with_context("dataset", FieldValue::Category(dataset.label.clone()))
                .with_context("value", FieldValue::Number(vertex.value));
            frame.push(
                LayerKind::Series,
                Primitive::circle(vertex.x, vertex.y, self.point_radius)
                    .with_solid_fill(color)
                    .with_stroke(Stroke::new(color, 1.0))
                    .with_hover_stroke(hover_stroke)
                    .with_hover_radius(self.hover_radius)
                    .with_datum(datum),
            );
        }
    }
}

impl FrameBuilder for LineChartBuilder {
    fn kind(&self) -> ChartKind {
        ChartKind::LineChart
    }

    fn default_tooltip_template(&self) -> &'static str {
        LINE_CHART_TOOLTIP
    }

    fn hit_test_mode(&self) -> HitTestMode {
        HitTestMode::NearestX
    }

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        config.validate()?;
        let viewport = config.viewport();
        viewport.ensure_mountable()?;
        require_text_field(series, &self.label_field)?;
        require_datasets(series, &self.datasets)?;

        let theme = config.theme();
        let mut diagnostics = SceneDiagnostics::default();
        let mut frame = RenderFrame::new(viewport, Color::TRANSPARENT);

        let width = self.margins.inner_width(viewport);
        let height = self.margins.inner_height(viewport);
        let top = self.margins.top;
        let bottom = top + height;
        let values = value_linear_scale(
            datasets_max(series, &self.datasets).map(|max| nice_max(max, self.tick_count)),
            bottom,
            top,
            config,
            &mut diagnostics,
        )?;
        let ticks: Vec<(f64, f64)> = values
            .even_ticks(self.tick_count)
            .into_iter()
            .map(|value| (value, values.map(value)))
            .collect();
        push_value_axis(
            &mut frame,
            self.margins,
            &ticks,
            &self.tick_prefix,
            theme.grid,
            theme.muted_text,
        );

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
        for (slot, (_, _, label)) in rows.iter().enumerate() {
            frame.push(
                LayerKind::Axis,
                Primitive::text(
                    *label,
                    self.slot_x(slot, rows.len(), width),
                    bottom + LABEL_FONT_PX + 6.0,
                    LABEL_FONT_PX,
                    theme.muted_text,
                    TextHAlign::Center,
                ),
            );
        }

        let hover_stroke = Stroke::new(theme.hover_stroke, 2.0);
        let mut point_count = 0;
        for (slot, dataset) in self.datasets.iter().enumerate() {
            let color = config.palette[slot % config.palette.len()];
            let mut vertices = Vec::with_capacity(rows.len());
            for (row, (index, point, _)) in rows.iter().enumerate() {
                // Non-finite values count as missing.
                match point.number(&dataset.field).filter(|value| value.is_finite()) {
                    Some(value) => vertices.push(Vertex {
                        index: *index,
                        x: self.slot_x(row, rows.len(), width),
                        y: values.map(value.max(0.0)).clamp(top, bottom),
                        value,
                        point: *point,
                    }),
                    None => diagnostics.drop_datum(
                        *index,
                        DropReason::MissingField {
                            field: dataset.field.clone(),
                        },
                    ),
                }
            }
            point_count += vertices.len();
            self.push_series(&mut frame, dataset, &vertices, color, bottom, hover_stroke);
        }

        if self.show_legend {
            push_top_legend(&mut frame, &self.datasets, &config.palette, theme.text);
        }

        debug!(
            dataset_count = self.datasets.len(),
            point_count,
            dropped = diagnostics.dropped_count(),
            "built line chart"
        );
        Ok(Scene { frame, diagnostics })
    }
}
