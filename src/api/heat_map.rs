use tracing::debug;

use crate::core::{BandScale, Color, FieldKind, Margins, Point, Series, cell_rect};
use crate::error::{ChartError, ChartResult};
use crate::render::{Datum, LayerKind, Primitive, RenderFrame, Stroke, TextHAlign};

use super::config::{ChartConfig, ChartKind};
use super::scene::{
    DropReason, FrameBuilder, Scene, SceneDiagnostics, require_text_field, value_color_scale,
};

pub const HEAT_MAP_TOOLTIP: &str = "{x}, {y} — Value: {v}";

const AXIS_FONT_PX: f64 = 10.0;
const TICK_SIZE: f64 = 6.0;

/// Grid of category cells colored by value.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMapBuilder {
    pub x_field: String,
    pub y_field: String,
    pub value_field: String,
    /// Column order; derived from first appearance when `None`.
    pub x_categories: Option<Vec<String>>,
    /// Row order, bottom to top; derived from first appearance when `None`.
    pub y_categories: Option<Vec<String>>,
    pub margins: Margins,
    pub padding: f64,
}

impl Default for HeatMapBuilder {
    fn default() -> Self {
        Self {
            x_field: "x".to_owned(),
            y_field: "y".to_owned(),
            value_field: "v".to_owned(),
            x_categories: None,
            y_categories: None,
            margins: Margins::new(20.0, 25.0, 30.0, 40.0),
            padding: 0.05,
        }
    }
}

impl HeatMapBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_categories<X, Y, S>(mut self, x_categories: X, y_categories: Y) -> Self
    where
        X: IntoIterator<Item = S>,
        Y: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.x_categories = Some(x_categories.into_iter().map(Into::into).collect());
        self.y_categories = Some(y_categories.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_fields(
        mut self,
        x_field: impl Into<String>,
        y_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        self.x_field = x_field.into();
        self.y_field = y_field.into();
        self.value_field = value_field.into();
        self
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Column and row scales in plot-area coordinates.
    pub fn band_scales(
        &self,
        series: &Series,
        config: &ChartConfig,
    ) -> ChartResult<(BandScale, BandScale)> {
        let viewport = config.viewport();
        let inner_width = self.margins.inner_width(viewport);
        let inner_height = self.margins.inner_height(viewport);
        let x_categories = self
            .x_categories
            .clone()
            .unwrap_or_else(|| series.distinct_text(&self.x_field));
        let y_categories = self
            .y_categories
            .clone()
            .unwrap_or_else(|| series.distinct_text(&self.y_field));
        let x_band = BandScale::new(x_categories, 0.0, inner_width, self.padding)?;
        // Reversed range puts the first row at the bottom edge of the plot.
        let y_band = BandScale::new(y_categories, inner_height, 0.0, self.padding)?;
        Ok((x_band, y_band))
    }

    fn push_axes(
        &self,
        frame: &mut RenderFrame,
        x_band: &BandScale,
        y_band: &BandScale,
        inner_height: f64,
        text_color: Color,
    ) -> ChartResult<()> {
        let left = self.margins.left;
        let top = self.margins.top;
        let bottom = top + inner_height;
        let axis_stroke = Stroke::new(text_color, 1.0);

        if !x_band.is_empty() {
            let right = left + self.margins.inner_width(frame.viewport);
            frame.push(
                LayerKind::Axis,
                Primitive::line(left, bottom, right, bottom, axis_stroke),
            );
        }
        for category in x_band.categories() {
            let center = left + x_band.band(category)?.center();
            frame.push(
                LayerKind::Axis,
                Primitive::line(center, bottom, center, bottom + TICK_SIZE, axis_stroke),
            );
            frame.push(
                LayerKind::Axis,
                Primitive::text(
                    category,
                    center,
                    bottom + TICK_SIZE + AXIS_FONT_PX + 2.0,
                    AXIS_FONT_PX,
                    text_color,
                    TextHAlign::Center,
                ),
            );
        }

        if !y_band.is_empty() {
            frame.push(
                LayerKind::Axis,
                Primitive::line(left, top, left, bottom, axis_stroke),
            );
        }
        for category in y_band.categories() {
            let center = top + y_band.band(category)?.center();
            frame.push(
                LayerKind::Axis,
                Primitive::line(left - TICK_SIZE, center, left, center, axis_stroke),
            );
            frame.push(
                LayerKind::Axis,
                Primitive::text(
                    category,
                    left - TICK_SIZE - 3.0,
                    center + AXIS_FONT_PX * 0.32,
                    AXIS_FONT_PX,
                    text_color,
                    TextHAlign::Right,
                ),
            );
        }
        Ok(())
    }
}

impl FrameBuilder for HeatMapBuilder {
    fn kind(&self) -> ChartKind {
        ChartKind::HeatMap
    }

    fn default_tooltip_template(&self) -> &'static str {
        HEAT_MAP_TOOLTIP
    }

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        config.validate()?;
        let viewport = config.viewport();
        viewport.ensure_mountable()?;
        require_text_field(series, &self.x_field)?;
        require_text_field(series, &self.y_field)?;
        series.require_field(&self.value_field, FieldKind::Number)?;

        let theme = config.theme();
        let mut diagnostics = SceneDiagnostics::default();
        let mut frame = RenderFrame::new(viewport, Color::TRANSPARENT);

        let (x_band, y_band) = self.band_scales(series, config)?;
        let colors = value_color_scale(
            series.max_number(&self.value_field),
            config,
            &mut diagnostics,
        )?;
        let cell_stroke = Stroke::new(theme.grid, 1.0).with_opacity(0.3);
        let hover_stroke = Stroke::new(theme.hover_stroke, 2.0);
        let origin = Point::new(self.margins.left, self.margins.top);

        for (index, point) in series.points().iter().enumerate() {
            let fields = (
                point.text(&self.x_field),
                point.text(&self.y_field),
                point.number(&self.value_field),
            );
            let (Some(x), Some(y), Some(value)) = fields else {
                let field = match fields {
                    (None, _, _) => &self.x_field,
                    (_, None, _) => &self.y_field,
                    _ => &self.value_field,
                };
                diagnostics.drop_datum(
                    index,
                    DropReason::MissingField {
                        field: field.clone(),
                    },
                );
                continue;
            };
            let cell = match cell_rect(x, y, &x_band, &y_band) {
                Ok(cell) => cell,
                Err(ChartError::UnknownCategory { category }) => {
                    debug!(series_index = index, %category, "dropped heat-map cell");
                    diagnostics.drop_datum(index, DropReason::UnknownCategory { category });
                    continue;
                }
                Err(err) => return Err(err),
            };
            frame.push(
                LayerKind::Series,
                Primitive::rect(origin.x + cell.x, origin.y + cell.y, cell.width, cell.height)
                    .with_solid_fill(colors.map(value))
                    .with_stroke(cell_stroke)
                    .with_hover_stroke(hover_stroke)
                    .with_datum(Datum::new(index, point.clone())),
            );
        }

        self.push_axes(
            &mut frame,
            &x_band,
            &y_band,
            self.margins.inner_height(viewport),
            theme.text,
        )?;

        debug!(
            point_count = series.len(),
            cell_count = frame.series().len(),
            dropped = diagnostics.dropped_count(),
            "built heat map"
        );
        Ok(Scene { frame, diagnostics })
    }
}
