use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer, VisualState};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates frame content so tests can catch invalid geometry before
/// a real backend is involved.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub viewport: Option<Viewport>,
    pub paint_count: u64,
    pub last_primitive_count: usize,
    pub last_interactive_count: usize,
    pub last_hovered_count: usize,
    pub released: bool,
}

impl NullRenderer {
    #[must_use]
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    /// Factory for `SurfaceManager` and `ChartController`.
    pub fn factory() -> impl FnMut(Viewport) -> ChartResult<Self> {
        |viewport| Ok(Self::with_viewport(viewport))
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.paint_count += 1;
        self.last_primitive_count = frame.primitive_count();
        self.last_interactive_count = frame
            .paint_order()
            .filter(|primitive| primitive.is_interactive())
            .count();
        self.last_hovered_count = frame
            .paint_order()
            .filter(|primitive| primitive.state == VisualState::Hovered)
            .count();
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.viewport = Some(viewport);
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.viewport = None;
    }
}
