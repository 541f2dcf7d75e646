use serde::{Deserialize, Serialize};

use crate::core::{ChartId, DataPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartEventKind {
    Hover,
    Leave,
}

/// Interaction callback payload delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEvent {
    pub chart: ChartId,
    pub kind: ChartEventKind,
    pub series_index: usize,
    pub datum: DataPoint,
}

/// Observer for hover callbacks of one chart.
///
/// Listeners are detached when the chart unmounts.
pub trait ChartEventListener {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &ChartEvent);
}
