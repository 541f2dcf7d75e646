//! chart-lens: headless chart engine for dashboard visualizations.
//!
//! Scales and map projections turn a data series into a deterministic
//! `RenderFrame`; a surface manager paints frames through pluggable backends
//! and an interaction layer drives hover state and one page-wide tooltip.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartController, ChartKind, FrameBuilder};
pub use error::{ChartError, ChartResult};
