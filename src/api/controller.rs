use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{ChartId, Point, Series, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{HoverTracker, HoverTransition, TooltipLease, TooltipRegistry};
use crate::render::{RenderFrame, RendererFactory, SurfaceHandle, SurfaceManager};

use super::config::ChartConfig;
use super::events::{ChartEvent, ChartEventKind, ChartEventListener};
use super::scene::{FrameBuilder, SceneDiagnostics};
use super::snapshot::ChartSnapshot;
use super::tooltip_format::format_tooltip;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Unmounted,
    Mounting,
    Ready,
    Updating,
    Unmounting,
}

/// Surface, frame and hover state of one chart.
///
/// Shared with the chart's tooltip preemption hook so another chart taking
/// the overlay reverts and repaints this one immediately.
struct PaintedChart<F: RendererFactory> {
    chart: ChartId,
    surfaces: SurfaceManager<F>,
    handle: Option<SurfaceHandle>,
    frame: Option<RenderFrame>,
    hover: HoverTracker,
    listeners: Vec<Box<dyn ChartEventListener>>,
}

impl<F: RendererFactory> PaintedChart<F> {
    fn repaint(&mut self) -> ChartResult<()> {
        let Some(frame) = self.frame.as_ref() else {
            return Ok(());
        };
        self.handle = Some(self.surfaces.create_or_update(self.handle, frame)?);
        Ok(())
    }

    /// Drops the hovered primitive back to default. Returns its index.
    fn leave_hover(&mut self) -> Option<usize> {
        let index = match self.frame.as_mut() {
            Some(frame) => self.hover.leave(frame.series_mut()).left_index(),
            None => None,
        };
        self.hover.reset();
        if let Some(index) = index {
            self.emit(ChartEventKind::Leave, index);
        }
        index
    }

    fn revert_preempted_hover(&mut self) -> ChartResult<()> {
        if self.leave_hover().is_none() {
            return Ok(());
        }
        trace!(chart = %self.chart, "tooltip preempted; reverted hover");
        self.repaint()
    }

    fn emit(&mut self, kind: ChartEventKind, index: usize) {
        if self.listeners.is_empty() {
            return;
        }
        let Some(datum) = self
            .frame
            .as_ref()
            .and_then(|frame| frame.series().get(index))
            .and_then(|primitive| primitive.datum.as_ref())
        else {
            return;
        };
        let event = ChartEvent {
            chart: self.chart,
            kind,
            series_index: datum.series_index,
            datum: datum.point.clone(),
        };
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

/// Owns one logical chart: its builder, surface, tooltip lease and hover state.
///
/// Every render rebuilds scales and primitives from the supplied series; the
/// controller never patches a previous frame except to toggle hover state.
pub struct ChartController<B: FrameBuilder, F: RendererFactory + 'static> {
    id: ChartId,
    builder: B,
    painted: Rc<RefCell<PaintedChart<F>>>,
    registry: TooltipRegistry,
    lease: Option<TooltipLease>,
    state: LifecycleState,
    series: Option<Series>,
    config: Option<ChartConfig>,
    diagnostics: SceneDiagnostics,
}

impl<B: FrameBuilder, F: RendererFactory + 'static> ChartController<B, F> {
    pub fn new(builder: B, factory: F, registry: TooltipRegistry) -> Self {
        let id = ChartId::next();
        Self {
            id,
            builder,
            painted: Rc::new(RefCell::new(PaintedChart {
                chart: id,
                surfaces: SurfaceManager::new(factory),
                handle: None,
                frame: None,
                hover: HoverTracker::default(),
                listeners: Vec::new(),
            })),
            registry,
            lease: None,
            state: LifecycleState::Unmounted,
            series: None,
            config: None,
            diagnostics: SceneDiagnostics::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ChartId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state != LifecycleState::Unmounted
    }

    #[must_use]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    #[must_use]
    pub fn surface_handle(&self) -> Option<SurfaceHandle> {
        self.painted.borrow().handle
    }

    #[must_use]
    pub fn surfaces(&self) -> Ref<'_, SurfaceManager<F>> {
        Ref::map(self.painted.borrow(), |painted| &painted.surfaces)
    }

    /// Backend of the mounted surface.
    #[must_use]
    pub fn renderer(&self) -> Option<Ref<'_, F::Output>> {
        Ref::filter_map(self.painted.borrow(), |painted| {
            painted
                .handle
                .and_then(|handle| painted.surfaces.renderer(handle))
        })
        .ok()
    }

    /// Last painted frame; `None` until a non-empty series was rendered.
    #[must_use]
    pub fn frame(&self) -> Option<Ref<'_, RenderFrame>> {
        Ref::filter_map(self.painted.borrow(), |painted| painted.frame.as_ref()).ok()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &SceneDiagnostics {
        &self.diagnostics
    }

    /// Hovered series-layer primitive.
    #[must_use]
    pub fn hovered(&self) -> Option<usize> {
        self.painted.borrow().hover.hovered()
    }

    /// Mounts when unmounted, otherwise updates in place.
    pub fn render(&mut self, series: Series, config: ChartConfig) -> ChartResult<()> {
        match self.state {
            LifecycleState::Unmounted => self.mount(series, config),
            _ => self.update(series, config),
        }
    }

    pub fn mount(&mut self, series: Series, config: ChartConfig) -> ChartResult<()> {
        if self.state != LifecycleState::Unmounted {
            return self.update(series, config);
        }
        self.transition(LifecycleState::Mounting);

        let viewport = config.viewport();
        match self.try_mount(viewport, &series, &config) {
            Ok(()) => {
                self.series = Some(series);
                self.config = Some(config);
                self.transition(LifecycleState::Ready);
                Ok(())
            }
            Err(err) => {
                self.rollback_mount();
                warn!(chart = %self.id, error = %err, "mount failed");
                Err(err)
            }
        }
    }

    fn try_mount(
        &mut self,
        viewport: Viewport,
        series: &Series,
        config: &ChartConfig,
    ) -> ChartResult<()> {
        viewport.ensure_mountable()?;
        config.validate()?;
        {
            let mut painted = self.painted.borrow_mut();
            painted.handle = Some(painted.surfaces.allocate(viewport)?);
        }
        let lease = self.registry.register(self.id)?;
        let painted = Rc::downgrade(&self.painted);
        lease.on_preempted(move || revert_preempted(&painted));
        self.lease = Some(lease);
        if series.is_empty() {
            debug!(chart = %self.id, "mounted with empty series; surface left blank");
            return Ok(());
        }
        self.rebuild_and_paint(series, config)
    }

    fn rollback_mount(&mut self) {
        if let Some(mut lease) = self.lease.take() {
            lease.release();
        }
        self.release_surface();
        self.diagnostics = SceneDiagnostics::default();
        self.transition(LifecycleState::Unmounted);
    }

    fn release_surface(&mut self) {
        let mut painted = self.painted.borrow_mut();
        if let Some(handle) = painted.handle.take() {
            painted.surfaces.destroy(handle);
        }
        painted.frame = None;
        painted.hover.reset();
    }

    /// Rebuilds from scratch and repaints. Unchanged input is a no-op; an
    /// empty series keeps the last painted state.
    pub fn update(&mut self, series: Series, config: ChartConfig) -> ChartResult<()> {
        if self.state == LifecycleState::Unmounted {
            return self.mount(series, config);
        }
        if self.series.as_ref() == Some(&series) && self.config.as_ref() == Some(&config) {
            trace!(chart = %self.id, "update skipped; input unchanged");
            return Ok(());
        }

        self.transition(LifecycleState::Updating);
        let result = self.apply_update(&series, &config);
        if result.is_ok() {
            self.series = Some(series);
            self.config = Some(config);
        }
        self.transition(LifecycleState::Ready);
        result
    }

    fn apply_update(&mut self, series: &Series, config: &ChartConfig) -> ChartResult<()> {
        config.viewport().ensure_mountable()?;
        config.validate()?;
        if series.is_empty() {
            debug!(chart = %self.id, "empty series; keeping last painted state");
            return Ok(());
        }
        self.clear_hover();
        self.rebuild_and_paint(series, config)
    }

    fn rebuild_and_paint(&mut self, series: &Series, config: &ChartConfig) -> ChartResult<()> {
        let scene = self.builder.build(series, config)?;
        {
            let mut painted = self.painted.borrow_mut();
            let current = painted.handle;
            let handle = painted.surfaces.create_or_update(current, &scene.frame)?;
            painted.handle = Some(handle);
            painted.hover.reset();
            painted.frame = Some(scene.frame);
        }
        self.diagnostics = scene.diagnostics;
        debug!(
            chart = %self.id,
            kind = ?self.builder.kind(),
            point_count = series.len(),
            dropped = self.diagnostics.dropped_count(),
            "rendered chart"
        );
        Ok(())
    }

    /// Tears the chart down. Idempotent.
    pub fn unmount(&mut self) {
        if self.state == LifecycleState::Unmounted {
            return;
        }
        self.transition(LifecycleState::Unmounting);
        if let Some(mut lease) = self.lease.take() {
            lease.release();
        }
        self.painted.borrow_mut().listeners.clear();
        self.release_surface();
        self.series = None;
        self.config = None;
        self.diagnostics = SceneDiagnostics::default();
        self.transition(LifecycleState::Unmounted);
    }

    /// Routes a pointer position: hit-tests, then enters or leaves.
    pub fn pointer_move(&mut self, position: Point) -> ChartResult<HoverTransition> {
        if self.state != LifecycleState::Ready {
            return Ok(HoverTransition::Unchanged);
        }
        let mode = self.builder.hit_test_mode();
        let target = self
            .frame()
            .and_then(|frame| mode.hit(frame.series(), position));
        self.route_hover(target, position)
    }

    /// Enters the series-layer primitive at `index` directly.
    pub fn pointer_enter(&mut self, index: usize, position: Point) -> ChartResult<HoverTransition> {
        if self.state != LifecycleState::Ready {
            return Ok(HoverTransition::Unchanged);
        }
        let interactive = self
            .frame()
            .and_then(|frame| frame.series().get(index).map(|primitive| primitive.is_interactive()))
            .unwrap_or(false);
        if !interactive {
            return Ok(HoverTransition::Unchanged);
        }
        self.route_hover(Some(index), position)
    }

    /// Pointer left the chart surface.
    pub fn pointer_leave(&mut self) -> ChartResult<HoverTransition> {
        if self.state != LifecycleState::Ready {
            return Ok(HoverTransition::Unchanged);
        }
        self.route_hover(None, Point::default())
    }

    fn route_hover(&mut self, target: Option<usize>, position: Point) -> ChartResult<HoverTransition> {
        let transition = {
            let mut guard = self.painted.borrow_mut();
            let painted = &mut *guard;
            let Some(frame) = painted.frame.as_mut() else {
                return Ok(HoverTransition::Unchanged);
            };
            painted.hover.update(frame.series_mut(), target)
        };
        if transition == HoverTransition::Unchanged {
            return Ok(transition);
        }

        if let Some(index) = transition.left_index() {
            if transition.entered_index().is_none() {
                if let Some(lease) = &self.lease {
                    lease.hide();
                }
            }
            self.painted.borrow_mut().emit(ChartEventKind::Leave, index);
        }
        if let Some(index) = transition.entered_index() {
            // May run another chart's preemption hook; no borrow is held here.
            self.show_tooltip(index, position);
            self.painted.borrow_mut().emit(ChartEventKind::Hover, index);
        }
        self.painted.borrow_mut().repaint()?;
        Ok(transition)
    }

    fn show_tooltip(&self, index: usize, position: Point) {
        let (Some(lease), Some(config)) = (&self.lease, &self.config) else {
            return;
        };
        let content = {
            let painted = self.painted.borrow();
            let Some(datum) = painted
                .frame
                .as_ref()
                .and_then(|frame| frame.series().get(index))
                .and_then(|primitive| primitive.datum.as_ref())
            else {
                return;
            };
            format_tooltip(self.builder.tooltip_template(config), datum)
        };
        lease.show(content, position, config.tooltip_offset);
    }

    fn clear_hover(&mut self) {
        let left = self.painted.borrow_mut().leave_hover();
        if left.is_some() {
            if let Some(lease) = &self.lease {
                lease.hide();
            }
        }
    }

    /// Registers a listener with unique identifier.
    pub fn register_listener(&mut self, listener: Box<dyn ChartEventListener>) -> ChartResult<()> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(ChartError::InvalidData(
                "listener id must not be empty".to_owned(),
            ));
        }
        if self.has_listener(&listener_id) {
            return Err(ChartError::InvalidData(format!(
                "listener with id `{listener_id}` is already registered"
            )));
        }
        self.painted.borrow_mut().listeners.push(listener);
        Ok(())
    }

    /// Unregisters a listener by id. Returns `true` when removed.
    pub fn unregister_listener(&mut self, listener_id: &str) -> bool {
        let mut painted = self.painted.borrow_mut();
        if let Some(position) = painted
            .listeners
            .iter()
            .position(|entry| entry.id() == listener_id)
        {
            painted.listeners.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.painted.borrow().listeners.len()
    }

    #[must_use]
    pub fn has_listener(&self, listener_id: &str) -> bool {
        self.painted
            .borrow()
            .listeners
            .iter()
            .any(|listener| listener.id() == listener_id)
    }

    #[must_use]
    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            chart: self.id,
            kind: self.builder.kind(),
            state: self.state,
            hovered: self.hovered(),
            tooltip: self.registry.overlay(),
            diagnostics: self.diagnostics.clone(),
            frame: self.frame().map(|frame| frame.clone()),
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(chart = %self.id, from = ?self.state, to = ?next, "lifecycle transition");
        self.state = next;
    }
}

impl<B: FrameBuilder, F: RendererFactory + 'static> Drop for ChartController<B, F> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Preemption hook body: reverts the chart that lost the tooltip.
fn revert_preempted<F: RendererFactory>(painted: &Weak<RefCell<PaintedChart<F>>>) {
    let Some(shared) = painted.upgrade() else {
        return;
    };
    let Ok(mut painted) = shared.try_borrow_mut() else {
        return;
    };
    if let Err(err) = painted.revert_preempted_hover() {
        warn!(chart = %painted.chart, error = %err, "repaint after tooltip preemption failed");
    }
}
