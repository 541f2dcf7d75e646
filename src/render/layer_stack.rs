use serde::{Deserialize, Serialize};

/// Paint layers of one chart surface, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Background,
    Grid,
    Series,
    Legend,
    Axis,
}

impl LayerKind {
    /// Canonical bottom-to-top paint order.
    pub const PAINT_ORDER: [Self; 5] = [
        Self::Background,
        Self::Grid,
        Self::Series,
        Self::Legend,
        Self::Axis,
    ];
}
