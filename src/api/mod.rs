mod bar_chart;
mod config;
mod controller;
mod datasets;
mod events;
mod geo_map;
mod heat_map;
mod line_chart;
mod pie_chart;
mod scene;
mod snapshot;
mod theme;
mod tooltip_format;

pub use bar_chart::{BAR_CHART_TOOLTIP, BarChartBuilder, GROUPED_BAR_CHART_TOOLTIP};
pub use config::{ChartConfig, ChartKind, UnmatchedShapePolicy};
pub use controller::{ChartController, LifecycleState};
pub use datasets::{Dataset, group_thousands, nice_max};
pub use events::{ChartEvent, ChartEventKind, ChartEventListener};
pub use geo_map::{GEO_MAP_TOOLTIP, GeoMapBuilder};
pub use heat_map::{HEAT_MAP_TOOLTIP, HeatMapBuilder};
pub use line_chart::{LINE_CHART_TOOLTIP, LineChartBuilder};
pub use pie_chart::{PIE_CHART_TOOLTIP, PieChartBuilder};
pub use scene::{DropReason, DroppedDatum, FrameBuilder, Scene, SceneDiagnostics};
pub use snapshot::ChartSnapshot;
pub use theme::{ColorMode, ThemeColors, hover_stroke, primary_gradient};
pub use tooltip_format::format_tooltip;
