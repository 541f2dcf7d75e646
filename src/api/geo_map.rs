use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{
    DataPoint, FieldKind, FieldValue, Projection, ProjectionKind, Series, ShapeCollection,
    SequentialColorScale, project,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, Datum, Fill, GradientStop, LayerKind, Primitive, RenderFrame, Stroke, TextHAlign,
};

use super::config::{ChartConfig, ChartKind, UnmatchedShapePolicy};
use super::scene::{
    DropReason, FrameBuilder, Scene, SceneDiagnostics, require_text_field, value_color_scale,
};

pub const GEO_MAP_TOOLTIP: &str = "{name} — Value: {value}";

const LEGEND_WIDTH: f64 = 200.0;
const LEGEND_HEIGHT: f64 = 10.0;
const LEGEND_STOPS: usize = 11;
const LEGEND_FONT_PX: f64 = 10.0;

/// Choropleth over a fixed shape collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMapBuilder {
    pub shapes: ShapeCollection,
    pub projection: ProjectionKind,
    pub id_field: String,
    pub value_field: String,
    pub show_legend: bool,
}

impl GeoMapBuilder {
    #[must_use]
    pub fn new(shapes: ShapeCollection) -> Self {
        Self {
            shapes,
            projection: ProjectionKind::default(),
            id_field: "id".to_owned(),
            value_field: "value".to_owned(),
            show_legend: true,
        }
    }

    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionKind) -> Self {
        self.projection = projection;
        self
    }

    #[must_use]
    pub fn with_fields(mut self, id_field: impl Into<String>, value_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self.value_field = value_field.into();
        self
    }

    #[must_use]
    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    fn push_legend(&self, frame: &mut RenderFrame, colors: &SequentialColorScale, text: Color) {
        let width = frame.viewport.width_f64();
        let height = frame.viewport.height_f64();
        let x = width - LEGEND_WIDTH - 20.0;
        let y = height - 30.0;
        let stops = colors
            .gradient_stops(LEGEND_STOPS)
            .into_iter()
            .map(|(offset, color)| GradientStop { offset, color })
            .collect();

        frame.push(
            LayerKind::Legend,
            Primitive::rect(x, y, LEGEND_WIDTH, LEGEND_HEIGHT)
                .with_fill(Fill::HorizontalGradient(stops)),
        );
        frame.push(
            LayerKind::Legend,
            Primitive::text("Low", x, y - 5.0, LEGEND_FONT_PX, text, TextHAlign::Left),
        );
        frame.push(
            LayerKind::Legend,
            Primitive::text(
                "High",
                x + LEGEND_WIDTH,
                y - 5.0,
                LEGEND_FONT_PX,
                text,
                TextHAlign::Right,
            ),
        );
    }
}

impl FrameBuilder for GeoMapBuilder {
    fn kind(&self) -> ChartKind {
        ChartKind::GeoMap
    }

    fn default_tooltip_template(&self) -> &'static str {
        GEO_MAP_TOOLTIP
    }

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        config.validate()?;
        let viewport = config.viewport();
        viewport.ensure_mountable()?;
        require_text_field(series, &self.id_field)?;
        series.require_field(&self.value_field, FieldKind::Number)?;

        let theme = config.theme();
        let mut diagnostics = SceneDiagnostics::default();
        let mut frame = RenderFrame::new(viewport, theme.background);
        frame.push(
            LayerKind::Background,
            Primitive::rect(0.0, 0.0, viewport.width_f64(), viewport.height_f64())
                .with_solid_fill(theme.background),
        );

        let projection = match Projection::fit_size(self.projection, viewport, &self.shapes) {
            Ok(projection) => Some(projection),
            Err(err @ ChartError::InvalidDomain { .. }) => {
                warn!(error = %err, "shape set has no extent; painting background only");
                diagnostics.unprojectable_shapes = true;
                None
            }
            Err(err) => return Err(err),
        };
        let colors = value_color_scale(
            series.max_number(&self.value_field),
            config,
            &mut diagnostics,
        )?;

        // First point wins when several share an id.
        let mut by_id: IndexMap<&str, (usize, &DataPoint)> = IndexMap::new();
        for (index, point) in series.points().iter().enumerate() {
            let Some(id) = point.text(&self.id_field) else {
                diagnostics.drop_datum(
                    index,
                    DropReason::MissingField {
                        field: self.id_field.clone(),
                    },
                );
                continue;
            };
            if self.shapes.get(id).is_none() {
                debug!(series_index = index, id, "dropped datum without shape");
                diagnostics.drop_datum(index, DropReason::UnknownShape { id: id.to_owned() });
                continue;
            }
            if projection.is_none() {
                diagnostics.drop_datum(index, DropReason::UnprojectedShape { id: id.to_owned() });
                continue;
            }
            by_id.entry(id).or_insert((index, point));
        }

        let region_stroke = Stroke::new(theme.region_stroke, 0.5);
        let hover_stroke = Stroke::new(theme.hover_stroke, 2.0);
        if let Some(projection) = projection {
            for shape in self.shapes.iter() {
                let path = project(shape, projection);
                if path.is_empty() {
                    continue;
                }
                match by_id.get(shape.id.as_str()) {
                    Some(&(index, point)) => {
                        let value = point.number(&self.value_field).unwrap_or(0.0);
                        let datum = Datum::new(index, point.clone())
                            .with_context("name", FieldValue::Category(shape.name.clone()));
                        frame.push(
                            LayerKind::Series,
                            Primitive::path(path)
                                .with_solid_fill(colors.map(value))
                                .with_stroke(region_stroke)
                                .with_hover_stroke(hover_stroke)
                                .with_datum(datum),
                        );
                    }
                    None => match config.unmatched_shape_policy {
                        UnmatchedShapePolicy::Background => frame.push(
                            LayerKind::Series,
                            Primitive::path(path)
                                .with_solid_fill(theme.background)
                                .with_stroke(region_stroke),
                        ),
                        UnmatchedShapePolicy::Hide => {}
                    },
                }
            }
        }

        if self.show_legend {
            self.push_legend(&mut frame, &colors, theme.text);
        }

        debug!(
            shape_count = self.shapes.len(),
            matched = by_id.len(),
            dropped = diagnostics.dropped_count(),
            scale = ?projection.map(|projection| projection.scale()),
            "built geo map"
        );
        Ok(Scene { frame, diagnostics })
    }
}
