use serde::{Deserialize, Serialize};

use crate::core::ChartId;
use crate::error::{ChartError, ChartResult};
use crate::interaction::TooltipOverlay;
use crate::render::RenderFrame;

use super::config::ChartKind;
use super::controller::LifecycleState;
use super::scene::SceneDiagnostics;

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub chart: ChartId,
    pub kind: ChartKind,
    pub state: LifecycleState,
    pub hovered: Option<usize>,
    /// Page-wide overlay as seen by this chart's registry.
    pub tooltip: Option<TooltipOverlay>,
    pub diagnostics: SceneDiagnostics,
    pub frame: Option<RenderFrame>,
}

impl ChartSnapshot {
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.frame.as_ref().map_or(0, RenderFrame::primitive_count)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse snapshot: {e}")))
    }
}
