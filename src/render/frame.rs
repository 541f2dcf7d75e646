use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, LayerKind, Primitive};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLayer {
    pub kind: LayerKind,
    pub primitives: Vec<Primitive>,
}

/// Backend-agnostic scene for one chart draw pass.
///
/// Backends clear to `clear_color` and paint layers in `LayerKind::PAINT_ORDER`,
/// primitives within a layer in push order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub clear_color: Color,
    pub layers: Vec<FrameLayer>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport, clear_color: Color) -> Self {
        Self {
            viewport,
            clear_color,
            layers: LayerKind::PAINT_ORDER
                .into_iter()
                .map(|kind| FrameLayer {
                    kind,
                    primitives: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn push(&mut self, kind: LayerKind, primitive: Primitive) {
        if let Some(layer) = self.layers.iter_mut().find(|layer| layer.kind == kind) {
            layer.primitives.push(primitive);
        }
    }

    #[must_use]
    pub fn with(mut self, kind: LayerKind, primitive: Primitive) -> Self {
        self.push(kind, primitive);
        self
    }

    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> &[Primitive] {
        self.layers
            .iter()
            .find(|layer| layer.kind == kind)
            .map_or(&[], |layer| layer.primitives.as_slice())
    }

    /// Data-bound primitives, in paint order.
    #[must_use]
    pub fn series(&self) -> &[Primitive] {
        self.layer(LayerKind::Series)
    }

    pub fn series_mut(&mut self) -> &mut [Primitive] {
        self.layers
            .iter_mut()
            .find(|layer| layer.kind == LayerKind::Series)
            .map_or(&mut [], |layer| layer.primitives.as_mut_slice())
    }

    pub fn paint_order(&self) -> impl Iterator<Item = &Primitive> {
        self.layers.iter().flat_map(|layer| layer.primitives.iter())
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.primitives.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::Mount {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.clear_color.validate()?;
        for primitive in self.paint_order() {
            primitive.validate()?;
        }
        Ok(())
    }
}
