use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Fails with `ChartError::Mount` when either dimension is zero.
    pub fn ensure_mountable(self) -> ChartResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ChartError::Mount {
                width: self.width,
                height: self.height,
            })
        }
    }

    #[must_use]
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    #[must_use]
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }
}

/// Pixel position in surface space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Plot-area insets inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Inner plot width, never negative.
    #[must_use]
    pub fn inner_width(self, viewport: Viewport) -> f64 {
        (viewport.width_f64() - self.left - self.right).max(0.0)
    }

    /// Inner plot height, never negative.
    #[must_use]
    pub fn inner_height(self, viewport: Viewport) -> f64 {
        (viewport.height_f64() - self.top - self.bottom).max(0.0)
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::zero()
    }
}

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one logical chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartId(u64);

impl ChartId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}
