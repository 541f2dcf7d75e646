use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{FieldKind, LinearScale, SequentialColorScale, Series};
use crate::error::{ChartError, ChartResult};
use crate::interaction::HitTestMode;
use crate::render::RenderFrame;

use super::config::{ChartConfig, ChartKind};

/// Why a data point produced no primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    UnknownCategory { category: String },
    UnknownShape { id: String },
    MissingField { field: String },
    NonPositiveValue,
    /// The shape exists but the shape set has no extent to project.
    UnprojectedShape { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedDatum {
    pub series_index: usize,
    pub reason: DropReason,
}

/// Build-time notes about data that was not painted or recovered defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDiagnostics {
    pub dropped: Vec<DroppedDatum>,
    /// Set when the value domain fell back to `ChartConfig::default_domain`.
    pub used_default_domain: bool,
    /// Set when the shape set could not be fitted and no region was painted.
    #[serde(default)]
    pub unprojectable_shapes: bool,
}

impl SceneDiagnostics {
    pub fn drop_datum(&mut self, series_index: usize, reason: DropReason) {
        self.dropped.push(DroppedDatum {
            series_index,
            reason,
        });
    }

    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Frame plus diagnostics produced by one build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub frame: RenderFrame,
    pub diagnostics: SceneDiagnostics,
}

/// Chart-kind specific scene construction.
///
/// Builds are pure: the same series and config always produce the same scene.
pub trait FrameBuilder {
    fn kind(&self) -> ChartKind;

    fn default_tooltip_template(&self) -> &'static str;

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene>;

    fn hit_test_mode(&self) -> HitTestMode {
        HitTestMode::Contains
    }

    /// Template from config, falling back to the kind's default.
    fn tooltip_template<'a>(&self, config: &'a ChartConfig) -> &'a str {
        config
            .tooltip_template
            .as_deref()
            .unwrap_or_else(|| self.default_tooltip_template())
    }
}

/// Accepts category or identifier fields; empty series accept any field.
pub(crate) fn require_text_field(series: &Series, name: &str) -> ChartResult<()> {
    if series.is_empty() {
        return Ok(());
    }
    match series.field_kind(name) {
        Some(FieldKind::Category | FieldKind::Id) => Ok(()),
        Some(found) => Err(ChartError::InvalidData(format!(
            "field `{name}` is {found:?}, expected a category or id"
        ))),
        None => Err(ChartError::InvalidData(format!(
            "series has no field `{name}`"
        ))),
    }
}

/// `[0, max]` color scale, recovering degenerate domains with the configured
/// default domain.
pub(crate) fn value_color_scale(
    max: Option<f64>,
    config: &ChartConfig,
    diagnostics: &mut SceneDiagnostics,
) -> ChartResult<SequentialColorScale> {
    if let Some(max) = max {
        match SequentialColorScale::new(0.0, max, config.palette.clone()) {
            Ok(scale) => return Ok(scale),
            Err(err @ ChartError::InvalidDomain { .. }) => {
                warn!(error = %err, "value domain is degenerate; using default domain");
            }
            Err(err) => return Err(err),
        }
    }
    diagnostics.used_default_domain = true;
    let (min, max) = config.default_domain;
    SequentialColorScale::new(min, max, config.palette.clone())
}

/// Vertical `[0, max]` value scale onto `[bottom, top]` pixels with the same
/// default-domain recovery as `value_color_scale`.
pub(crate) fn value_linear_scale(
    max: Option<f64>,
    bottom: f64,
    top: f64,
    config: &ChartConfig,
    diagnostics: &mut SceneDiagnostics,
) -> ChartResult<LinearScale> {
    if let Some(max) = max {
        match LinearScale::new(0.0, max, bottom, top) {
            Ok(scale) => return Ok(scale),
            Err(err @ ChartError::InvalidDomain { .. }) => {
                warn!(error = %err, "value domain is degenerate; using default domain");
            }
            Err(err) => return Err(err),
        }
    }
    diagnostics.used_default_domain = true;
    let (min, max) = config.default_domain;
    LinearScale::new(min, max, bottom, top)
}

impl<T: FrameBuilder + ?Sized> FrameBuilder for Box<T> {
    fn kind(&self) -> ChartKind {
        (**self).kind()
    }

    fn default_tooltip_template(&self) -> &'static str {
        (**self).default_tooltip_template()
    }

    fn build(&self, series: &Series, config: &ChartConfig) -> ChartResult<Scene> {
        (**self).build(series, config)
    }

    fn hit_test_mode(&self) -> HitTestMode {
        (**self).hit_test_mode()
    }
}
