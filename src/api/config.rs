use serde::{Deserialize, Serialize};

use crate::core::color::{blues, channel_palette, line_palette};
use crate::core::{Color, DEFAULT_SEQUENTIAL_DOMAIN, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::DEFAULT_TOOLTIP_OFFSET;

use super::theme::{ColorMode, ThemeColors, primary_gradient};

/// Chart families the engine can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    HeatMap,
    GeoMap,
    BarChart,
    PieChart,
    LineChart,
}

impl ChartKind {
    #[must_use]
    pub fn default_height(self) -> u32 {
        match self {
            Self::HeatMap | Self::PieChart | Self::LineChart => 300,
            Self::GeoMap => 250,
            Self::BarChart => 240,
        }
    }

    #[must_use]
    pub fn default_palette(self) -> Vec<Color> {
        match self {
            Self::HeatMap | Self::GeoMap => blues(),
            Self::BarChart => primary_gradient(),
            Self::PieChart => channel_palette(),
            Self::LineChart => line_palette(),
        }
    }
}

/// Rendering of geographic shapes that have no matching data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnmatchedShapePolicy {
    /// Paint as a non-interactive region in the theme background color.
    #[default]
    Background,
    Hide,
}

/// Per-chart presentation input, supplied with every render.
///
/// Serializable so host applications can persist chart setup next to their
/// own state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
    /// Domain used when the series yields none (no max, or a max of zero).
    #[serde(default = "default_domain")]
    pub default_domain: (f64, f64),
    /// `{field}` template; `None` selects the chart kind's default.
    #[serde(default)]
    pub tooltip_template: Option<String>,
    #[serde(default = "default_tooltip_offset")]
    pub tooltip_offset: (f64, f64),
    #[serde(default)]
    pub unmatched_shape_policy: UnmatchedShapePolicy,
}

impl ChartConfig {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_mode: ColorMode::default(),
            palette: default_palette(),
            default_domain: default_domain(),
            tooltip_template: None,
            tooltip_offset: default_tooltip_offset(),
            unmatched_shape_policy: UnmatchedShapePolicy::default(),
        }
    }

    /// Default width with the kind's height and palette.
    #[must_use]
    pub fn for_kind(kind: ChartKind) -> Self {
        Self::new(default_width(), kind.default_height()).with_palette(kind.default_palette())
    }

    #[must_use]
    pub fn heat_map() -> Self {
        Self::for_kind(ChartKind::HeatMap)
    }

    #[must_use]
    pub fn geo_map() -> Self {
        Self::for_kind(ChartKind::GeoMap)
    }

    #[must_use]
    pub fn bar_chart() -> Self {
        Self::for_kind(ChartKind::BarChart)
    }

    #[must_use]
    pub fn pie_chart() -> Self {
        Self::for_kind(ChartKind::PieChart)
    }

    #[must_use]
    pub fn line_chart() -> Self {
        Self::for_kind(ChartKind::LineChart)
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_default_domain(mut self, min: f64, max: f64) -> Self {
        self.default_domain = (min, max);
        self
    }

    #[must_use]
    pub fn with_tooltip_template(mut self, template: impl Into<String>) -> Self {
        self.tooltip_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_tooltip_offset(mut self, dx: f64, dy: f64) -> Self {
        self.tooltip_offset = (dx, dy);
        self
    }

    #[must_use]
    pub fn with_unmatched_shape_policy(mut self, policy: UnmatchedShapePolicy) -> Self {
        self.unmatched_shape_policy = policy;
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    #[must_use]
    pub fn theme(&self) -> ThemeColors {
        ThemeColors::for_mode(self.color_mode)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.palette.is_empty() {
            return Err(ChartError::InvalidData(
                "palette must contain at least one color".to_owned(),
            ));
        }
        for color in &self.palette {
            color.validate()?;
        }
        let (min, max) = self.default_domain;
        if !min.is_finite() || !max.is_finite() || min == max {
            return Err(ChartError::InvalidDomain { min, max });
        }
        let (dx, dy) = self.tooltip_offset;
        if !dx.is_finite() || !dy.is_finite() {
            return Err(ChartError::InvalidData(
                "tooltip offset must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::new(default_width(), default_height())
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    ChartKind::HeatMap.default_height()
}

fn default_palette() -> Vec<Color> {
    blues()
}

fn default_domain() -> (f64, f64) {
    DEFAULT_SEQUENTIAL_DOMAIN
}

fn default_tooltip_offset() -> (f64, f64) {
    DEFAULT_TOOLTIP_OFFSET
}
