use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
///
/// Serialized as `#RRGGBB` (opaque) or `#RRGGBBAA` when every channel is an
/// exact 8-bit value; otherwise as an object of the four `f64` channels so the
/// JSON form parses back to the same color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "ColorRepr")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels and a 0..=1 alpha.
    #[must_use]
    pub fn rgba8(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self::rgba(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            alpha,
        )
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(input: &str) -> ChartResult<Self> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let invalid = || ChartError::InvalidData(format!("invalid hex color `{input}`"));
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(invalid)
        };

        match digits.len() {
            3 => {
                let short = |index: usize| {
                    digits
                        .get(index..=index)
                        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                        .map(|value| value * 17)
                        .ok_or_else(invalid)
                };
                Ok(Self::rgba8(short(0)?, short(1)?, short(2)?, 1.0))
            }
            6 => Ok(Self::rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0)),
            8 => Ok(Self::rgba8(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                f64::from(channel(6..8)?) / 255.0,
            )),
            _ => Err(invalid()),
        }
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Channel-wise linear blend; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.red + (other.red - self.red) * t,
            self.green + (other.green - self.green) * t,
            self.blue + (other.blue - self.blue) * t,
            self.alpha + (other.alpha - self.alpha) * t,
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// `#rrggbb`, with a trailing alpha byte when not fully opaque.
    #[must_use]
    pub fn to_hex(self) -> String {
        let [red, green, blue, alpha] = self.to_rgba8();
        if alpha == u8::MAX {
            format!("#{red:02x}{green:02x}{blue:02x}")
        } else {
            format!("#{red:02x}{green:02x}{blue:02x}{alpha:02x}")
        }
    }

    /// True when `to_hex` describes this color without loss.
    #[must_use]
    pub fn is_exact_rgba8(self) -> bool {
        let [red, green, blue, alpha] = self.to_rgba8();
        Self::rgba8(red, green, blue, f64::from(alpha) / 255.0) == self
    }

    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
            channel_to_u8(self.alpha),
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels {
        red: f64,
        green: f64,
        blue: f64,
        alpha: f64,
    },
}

impl TryFrom<ColorRepr> for Color {
    type Error = ChartError;

    fn try_from(value: ColorRepr) -> ChartResult<Self> {
        match value {
            ColorRepr::Hex(hex) => Self::from_hex(&hex),
            ColorRepr::Channels {
                red,
                green,
                blue,
                alpha,
            } => Ok(Self::rgba(red, green, blue, alpha)),
        }
    }
}

impl From<Color> for ColorRepr {
    fn from(color: Color) -> Self {
        if color.is_exact_rgba8() {
            Self::Hex(color.to_hex())
        } else {
            Self::Channels {
                red: color.red,
                green: color.green,
                blue: color.blue,
                alpha: color.alpha,
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Nine-step sequential blue ramp used for heat maps and choropleths.
#[must_use]
pub fn blues() -> Vec<Color> {
    [
        (0xf7, 0xfb, 0xff),
        (0xde, 0xeb, 0xf7),
        (0xc6, 0xdb, 0xef),
        (0x9e, 0xca, 0xe1),
        (0x6b, 0xae, 0xd6),
        (0x42, 0x92, 0xc6),
        (0x21, 0x71, 0xb5),
        (0x08, 0x51, 0x9c),
        (0x08, 0x30, 0x6b),
    ]
    .into_iter()
    .map(|(red, green, blue)| Color::rgba8(red, green, blue, 1.0))
    .collect()
}

/// Categorical channel colors used by the dashboard's pie and bar charts.
#[must_use]
pub fn channel_palette() -> Vec<Color> {
    [
        (37, 99, 235),
        (147, 51, 234),
        (236, 72, 153),
        (245, 158, 11),
        (16, 185, 129),
        (239, 68, 68),
    ]
    .into_iter()
    .map(|(red, green, blue)| Color::rgba8(red, green, blue, 0.7))
    .collect()
}

/// Opaque channel colors for line series strokes.
#[must_use]
pub fn line_palette() -> Vec<Color> {
    channel_palette()
        .into_iter()
        .map(|color| color.with_alpha(1.0))
        .collect()
}
