use serde::{Deserialize, Serialize};

use crate::core::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

/// Resolved chrome colors for one color mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub text: Color,
    pub muted_text: Color,
    pub grid: Color,
    pub background: Color,
    pub region_stroke: Color,
    pub slice_border: Color,
    pub hover_stroke: Color,
}

impl ThemeColors {
    #[must_use]
    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => Self {
                text: Color::rgba8(0x1a, 0x20, 0x2c, 1.0),
                muted_text: Color::rgba8(0x4a, 0x55, 0x68, 1.0),
                grid: Color::rgba8(0xe2, 0xe8, 0xf0, 1.0),
                background: Color::rgba8(0xf7, 0xfa, 0xfc, 1.0),
                region_stroke: Color::rgba8(0xe2, 0xe8, 0xf0, 1.0),
                slice_border: Color::WHITE,
                hover_stroke: hover_stroke(),
            },
            ColorMode::Dark => Self {
                text: Color::rgba8(0xe2, 0xe8, 0xf0, 1.0),
                muted_text: Color::rgba8(0xa0, 0xae, 0xc0, 1.0),
                grid: Color::rgba8(0x2d, 0x37, 0x48, 1.0),
                background: Color::rgba8(0x1a, 0x20, 0x2c, 1.0),
                region_stroke: Color::rgba8(0x2d, 0x37, 0x48, 1.0),
                slice_border: Color::rgba8(0x1a, 0x20, 0x2c, 1.0),
                hover_stroke: hover_stroke(),
            },
        }
    }
}

/// `#2563EB`, the hover highlight shared by every chart kind.
#[must_use]
pub fn hover_stroke() -> Color {
    Color::rgba8(0x25, 0x63, 0xeb, 1.0)
}

/// Two-stop bar fill, `#2563EB` to `#4F46E5`.
#[must_use]
pub fn primary_gradient() -> Vec<Color> {
    vec![
        Color::rgba8(0x25, 0x63, 0xeb, 1.0),
        Color::rgba8(0x4f, 0x46, 0xe5, 1.0),
    ]
}
