mod hover;
mod tooltip;

pub use hit_test::{HitTestMode, hit_test, nearest_x};
pub use hover::{HoverTracker, HoverTransition};
pub use tooltip::{DEFAULT_TOOLTIP_OFFSET, TooltipLease, TooltipOverlay, TooltipRegistry};

pub use crate::render::VisualState;
