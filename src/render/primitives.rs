use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use crate::core::Color;
use crate::core::{DataPoint, FieldValue, Point, ScreenPath};
use crate::error::{ChartError, ChartResult};

/// Horizontal text alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Hover state of an interactive primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisualState {
    #[default]
    Default,
    Hovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
}

impl Stroke {
    #[must_use]
    pub const fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub const fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ChartError::InvalidData(
                "stroke width must be finite and > 0".to_owned(),
            ));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChartError::InvalidData(
                "stroke opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.color.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    None,
    Solid(Color),
    /// Left-to-right gradient across the shape's bounds.
    HorizontalGradient(Vec<GradientStop>),
}

impl Fill {
    fn validate(&self) -> ChartResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Solid(color) => color.validate(),
            Self::HorizontalGradient(stops) => {
                if stops.len() < 2 {
                    return Err(ChartError::InvalidData(
                        "gradient needs at least two stops".to_owned(),
                    ));
                }
                for stop in stops {
                    if !(0.0..=1.0).contains(&stop.offset) {
                        return Err(ChartError::InvalidData(
                            "gradient stop offset must be in [0, 1]".to_owned(),
                        ));
                    }
                    stop.color.validate()?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    Path(ScreenPath),
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font_size_px: f64,
        h_align: TextHAlign,
    },
}

impl Shape {
    /// Point containment; lines and text never contain a point.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
                ..
            } => point.x >= *x && point.x < x + width && point.y >= *y && point.y < y + height,
            Self::Path(path) => path.contains(point),
            Self::Circle { cx, cy, radius } => {
                (point.x - cx).hypot(point.y - cy) <= *radius
            }
            Self::Line { .. } | Self::Text { .. } => false,
        }
    }

    fn validate(&self) -> ChartResult<()> {
        let finite = |values: &[f64]| values.iter().all(|value| value.is_finite());
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
                corner_radius,
            } => {
                if !finite(&[*x, *y, *width, *height, *corner_radius]) {
                    return Err(ChartError::InvalidData(
                        "rect geometry must be finite".to_owned(),
                    ));
                }
                if *width < 0.0 || *height < 0.0 || *corner_radius < 0.0 {
                    return Err(ChartError::InvalidData(
                        "rect size and corner radius must be >= 0".to_owned(),
                    ));
                }
                Ok(())
            }
            Self::Path(path) => path.validate(),
            Self::Circle { cx, cy, radius } => {
                if !finite(&[*cx, *cy, *radius]) || *radius < 0.0 {
                    return Err(ChartError::InvalidData(
                        "circle must be finite with radius >= 0".to_owned(),
                    ));
                }
                Ok(())
            }
            Self::Line { x1, y1, x2, y2 } => {
                if !finite(&[*x1, *y1, *x2, *y2]) {
                    return Err(ChartError::InvalidData(
                        "line coordinates must be finite".to_owned(),
                    ));
                }
                Ok(())
            }
            Self::Text {
                x, y, font_size_px, ..
            } => {
                if !finite(&[*x, *y]) {
                    return Err(ChartError::InvalidData(
                        "text coordinates must be finite".to_owned(),
                    ));
                }
                if !font_size_px.is_finite() || *font_size_px <= 0.0 {
                    return Err(ChartError::InvalidData(
                        "font size must be finite and > 0".to_owned(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Source datum bound to an interactive primitive.
///
/// `context` carries values derived at build time (region name, share of
/// total) that tooltip templates may reference alongside the point's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub series_index: usize,
    pub point: DataPoint,
    pub context: IndexMap<String, FieldValue>,
}

impl Datum {
    #[must_use]
    pub fn new(series_index: usize, point: DataPoint) -> Self {
        Self {
            series_index,
            point,
            context: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.context.insert(name.into(), value);
        self
    }

    /// Looks up a point field first, then derived context.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.point.get(name).or_else(|| self.context.get(name))
    }
}

/// One renderable shape with its paint style and optional data binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub shape: Shape,
    pub fill: Fill,
    pub stroke: Option<Stroke>,
    pub hover_stroke: Option<Stroke>,
    /// Circle radius while hovered.
    #[serde(default)]
    pub hover_radius: Option<f64>,
    pub state: VisualState,
    pub datum: Option<Datum>,
}

impl Primitive {
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            fill: Fill::None,
            stroke: None,
            hover_stroke: None,
            hover_radius: None,
            state: VisualState::Default,
            datum: None,
        }
    }

    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius: 0.0,
        })
    }

    #[must_use]
    pub fn rounded_rect(x: f64, y: f64, width: f64, height: f64, corner_radius: f64) -> Self {
        Self::new(Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
        })
    }

    #[must_use]
    pub fn path(path: ScreenPath) -> Self {
        Self::new(Shape::Path(path))
    }

    #[must_use]
    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        Self::new(Shape::Circle { cx, cy, radius })
    }

    #[must_use]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) -> Self {
        Self::new(Shape::Line { x1, y1, x2, y2 }).with_stroke(stroke)
    }

    #[must_use]
    pub fn text(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self::new(Shape::Text {
            text: text.into(),
            x,
            y,
            font_size_px,
            h_align,
        })
        .with_fill(Fill::Solid(color))
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    #[must_use]
    pub fn with_solid_fill(self, color: Color) -> Self {
        self.with_fill(Fill::Solid(color))
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    #[must_use]
    pub fn with_hover_stroke(mut self, stroke: Stroke) -> Self {
        self.hover_stroke = Some(stroke);
        self
    }

    #[must_use]
    pub fn with_hover_radius(mut self, radius: f64) -> Self {
        self.hover_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = Some(datum);
        self
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.datum.is_some()
    }

    /// Stroke to paint for the current visual state.
    #[must_use]
    pub fn effective_stroke(&self) -> Option<Stroke> {
        match self.state {
            VisualState::Hovered => self.hover_stroke.or(self.stroke),
            VisualState::Default => self.stroke,
        }
    }

    /// Shape to paint for the current visual state.
    #[must_use]
    pub fn effective_shape(&self) -> Cow<'_, Shape> {
        match (&self.shape, self.state, self.hover_radius) {
            (Shape::Circle { cx, cy, .. }, VisualState::Hovered, Some(radius)) => {
                Cow::Owned(Shape::Circle {
                    cx: *cx,
                    cy: *cy,
                    radius,
                })
            }
            _ => Cow::Borrowed(&self.shape),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.shape.validate()?;
        if let Some(radius) = self.hover_radius {
            if !radius.is_finite() || radius < 0.0 {
                return Err(ChartError::InvalidData(
                    "hover radius must be finite and >= 0".to_owned(),
                ));
            }
        }
        self.fill.validate()?;
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        if let Some(stroke) = self.hover_stroke {
            stroke.validate()?;
        }
        Ok(())
    }
}
