mod frame;
mod layer_stack;
mod null_renderer;
mod primitives;
mod surface;
mod svg_renderer;

pub use frame::{FrameLayer, RenderFrame};
pub use layer_stack::LayerKind;
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, Datum, Fill, GradientStop, Primitive, Shape, Stroke, TextHAlign, VisualState,
};
pub use surface::{SurfaceHandle, SurfaceManager};
pub use svg_renderer::{SvgRenderer, render_document, render_document_with_id_prefix};

use crate::core::Viewport;
use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from chart domain and interaction logic.
/// Every `render` call clears the target and paints the whole frame.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let _ = viewport;
        Ok(())
    }

    /// Releases backend resources. Called once when the surface is destroyed.
    fn release(&mut self) {}
}

/// Creates one renderer per allocated surface.
pub trait RendererFactory {
    type Output: Renderer;

    fn create(&mut self, viewport: Viewport) -> ChartResult<Self::Output>;
}

impl<R, F> RendererFactory for F
where
    R: Renderer,
    F: FnMut(Viewport) -> ChartResult<R>,
{
    type Output = R;

    fn create(&mut self, viewport: Viewport) -> ChartResult<R> {
        self(viewport)
    }
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
