use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{ChartId, Point};
use crate::error::{ChartError, ChartResult};

/// Tooltip placement relative to the pointer, in pixels.
pub const DEFAULT_TOOLTIP_OFFSET: (f64, f64) = (10.0, -28.0);

/// State of the page-wide tooltip node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipOverlay {
    pub content: String,
    pub left: f64,
    pub top: f64,
    pub opacity: f64,
    /// Chart that last wrote visible content; `None` while hidden.
    pub owner: Option<ChartId>,
}

impl TooltipOverlay {
    fn hidden() -> Self {
        Self {
            content: String::new(),
            left: 0.0,
            top: 0.0,
            opacity: 0.0,
            owner: None,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Callback run when another chart takes the overlay from its owner.
#[derive(Clone)]
struct PreemptionHook(Rc<dyn Fn()>);

impl fmt::Debug for PreemptionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreemptionHook")
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    registered: IndexMap<ChartId, Option<PreemptionHook>>,
    overlay: Option<TooltipOverlay>,
    overlays_created: u64,
}

/// Shared handle to the single tooltip overlay of one page.
///
/// Charts register on mount and receive a `TooltipLease`; the overlay is
/// created lazily on first show and destroyed when the last lease is
/// released. Cloning the registry shares the same page.
#[derive(Debug, Clone, Default)]
pub struct TooltipRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl TooltipRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chart: ChartId) -> ChartResult<TooltipLease> {
        let mut state = self.state.borrow_mut();
        if state.registered.contains_key(&chart) {
            return Err(ChartError::InvalidData(format!(
                "{chart} is already registered with the tooltip registry"
            )));
        }
        state.registered.insert(chart, None);
        debug!(
            %chart,
            registration_count = state.registered.len(),
            "registered tooltip lease"
        );
        Ok(TooltipLease {
            chart,
            state: Rc::clone(&self.state),
            released: false,
        })
    }

    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.state.borrow().registered.len()
    }

    #[must_use]
    pub fn is_registered(&self, chart: ChartId) -> bool {
        self.state.borrow().registered.contains_key(&chart)
    }

    #[must_use]
    pub fn overlay_exists(&self) -> bool {
        self.state.borrow().overlay.is_some()
    }

    /// Copy of the current overlay state, if the node exists.
    #[must_use]
    pub fn overlay(&self) -> Option<TooltipOverlay> {
        self.state.borrow().overlay.clone()
    }

    #[must_use]
    pub fn owner(&self) -> Option<ChartId> {
        self.state
            .borrow()
            .overlay
            .as_ref()
            .and_then(|overlay| overlay.owner)
    }

    /// Number of overlay nodes created over the registry's lifetime.
    #[must_use]
    pub fn overlays_created(&self) -> u64 {
        self.state.borrow().overlays_created
    }
}

/// One chart's registration with a `TooltipRegistry`.
///
/// Dropping the lease deregisters the chart.
#[derive(Debug)]
pub struct TooltipLease {
    chart: ChartId,
    state: Rc<RefCell<RegistryState>>,
    released: bool,
}

impl TooltipLease {
    #[must_use]
    pub fn chart(&self) -> ChartId {
        self.chart
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Installs the callback run when another chart preempts this one.
    pub fn on_preempted(&self, hook: impl Fn() + 'static) {
        if self.released {
            return;
        }
        if let Some(slot) = self.state.borrow_mut().registered.get_mut(&self.chart) {
            *slot = Some(PreemptionHook(Rc::new(hook)));
        }
    }

    /// Shows `content` at `anchor + offset` and takes ownership of the overlay.
    ///
    /// A previous owner's preemption hook runs before this returns.
    pub fn show(&self, content: impl Into<String>, anchor: Point, offset: (f64, f64)) {
        if self.released {
            return;
        }
        let preempted = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            if state.overlay.is_none() {
                state.overlays_created += 1;
                debug!(chart = %self.chart, "created tooltip overlay");
            }
            let overlay = state.overlay.get_or_insert_with(TooltipOverlay::hidden);
            let previous = overlay
                .owner
                .replace(self.chart)
                .filter(|owner| *owner != self.chart);
            overlay.content = content.into();
            overlay.left = anchor.x + offset.0;
            overlay.top = anchor.y + offset.1;
            overlay.opacity = 1.0;
            trace!(
                chart = %self.chart,
                preempted = ?previous,
                left = overlay.left,
                top = overlay.top,
                "show tooltip"
            );
            previous.and_then(|owner| state.registered.get(&owner).cloned().flatten())
        };
        // The registry borrow is released so the hook may query it.
        if let Some(PreemptionHook(hook)) = preempted {
            hook();
        }
    }

    /// Hides the overlay when this chart owns it. The node is kept.
    pub fn hide(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(overlay) = state.overlay.as_mut() else {
            return false;
        };
        if overlay.owner != Some(self.chart) {
            return false;
        }
        overlay.owner = None;
        overlay.opacity = 0.0;
        trace!(chart = %self.chart, "hide tooltip");
        true
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        !self.released
            && self
                .state
                .borrow()
                .overlay
                .as_ref()
                .is_some_and(|overlay| overlay.owner == Some(self.chart))
    }

    /// Hides owned content and deregisters; the last release destroys the
    /// overlay. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.hide();
        self.released = true;

        let mut state = self.state.borrow_mut();
        state.registered.shift_remove(&self.chart);
        let remaining = state.registered.len();
        if remaining == 0 && state.overlay.take().is_some() {
            debug!(chart = %self.chart, "destroyed tooltip overlay");
        }
        debug!(chart = %self.chart, registration_count = remaining, "released tooltip lease");
    }
}

impl Drop for TooltipLease {
    fn drop(&mut self) {
        self.release();
    }
}
