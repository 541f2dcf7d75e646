use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer, RendererFactory};

/// Opaque identifier of one allocated drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

struct Surface<R> {
    renderer: R,
    viewport: Viewport,
    paint_count: u64,
}

/// Owns the drawing surfaces of mounted charts.
///
/// Surfaces are created once and repainted in place; every paint is a full
/// clear followed by the complete frame.
pub struct SurfaceManager<F: RendererFactory> {
    factory: F,
    surfaces: IndexMap<SurfaceHandle, Surface<F::Output>>,
    next_id: u64,
}

impl<F: RendererFactory> SurfaceManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            surfaces: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Allocates a blank surface without painting it.
    pub fn allocate(&mut self, viewport: Viewport) -> ChartResult<SurfaceHandle> {
        viewport.ensure_mountable()?;
        let renderer = self.factory.create(viewport)?;
        let handle = SurfaceHandle(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(
            handle,
            Surface {
                renderer,
                viewport,
                paint_count: 0,
            },
        );
        debug!(
            surface = handle.id(),
            width = viewport.width,
            height = viewport.height,
            "allocated surface"
        );
        Ok(handle)
    }

    /// Paints `frame` on the surface behind `handle`, allocating one first
    /// when the handle is absent or no longer live.
    pub fn create_or_update(
        &mut self,
        handle: Option<SurfaceHandle>,
        frame: &RenderFrame,
    ) -> ChartResult<SurfaceHandle> {
        frame.viewport.ensure_mountable()?;
        let (handle, fresh) = match handle {
            Some(handle) if self.surfaces.contains_key(&handle) => (handle, false),
            _ => (self.allocate(frame.viewport)?, true),
        };

        let result = self.paint(handle, frame);
        if result.is_err() && fresh {
            self.destroy(handle);
        }
        result.map(|()| handle)
    }

    fn paint(&mut self, handle: SurfaceHandle, frame: &RenderFrame) -> ChartResult<()> {
        let surface = self
            .surfaces
            .get_mut(&handle)
            .ok_or_else(|| ChartError::Backend(format!("surface {} is not live", handle.id())))?;
        if surface.viewport != frame.viewport {
            surface.renderer.resize(frame.viewport)?;
            surface.viewport = frame.viewport;
        }
        surface.renderer.render(frame)?;
        surface.paint_count += 1;
        debug!(
            surface = handle.id(),
            primitive_count = frame.primitive_count(),
            paint_count = surface.paint_count,
            "painted surface"
        );
        Ok(())
    }

    /// Releases the surface. Returns `false` when it was already destroyed.
    pub fn destroy(&mut self, handle: SurfaceHandle) -> bool {
        let Some(mut surface) = self.surfaces.shift_remove(&handle) else {
            return false;
        };
        surface.renderer.release();
        debug!(surface = handle.id(), "destroyed surface");
        true
    }

    #[must_use]
    pub fn contains(&self, handle: SurfaceHandle) -> bool {
        self.surfaces.contains_key(&handle)
    }

    #[must_use]
    pub fn renderer(&self, handle: SurfaceHandle) -> Option<&F::Output> {
        self.surfaces.get(&handle).map(|surface| &surface.renderer)
    }

    pub fn renderer_mut(&mut self, handle: SurfaceHandle) -> Option<&mut F::Output> {
        self.surfaces
            .get_mut(&handle)
            .map(|surface| &mut surface.renderer)
    }

    #[must_use]
    pub fn viewport(&self, handle: SurfaceHandle) -> Option<Viewport> {
        self.surfaces.get(&handle).map(|surface| surface.viewport)
    }

    #[must_use]
    pub fn paint_count(&self, handle: SurfaceHandle) -> Option<u64> {
        self.surfaces.get(&handle).map(|surface| surface.paint_count)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.surfaces.len()
    }
}
