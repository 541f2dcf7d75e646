use crate::core::Color;
use crate::error::{ChartError, ChartResult};

/// Domain used when a series has no usable maximum.
pub const DEFAULT_SEQUENTIAL_DOMAIN: (f64, f64) = (0.0, 100.0);

/// Continuous mapping from a numeric domain onto an ordered color ramp.
///
/// Values outside the domain clamp to the color of the nearest bound.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialColorScale {
    domain: (f64, f64),
    palette: Vec<Color>,
}

impl SequentialColorScale {
    pub fn new(domain_min: f64, domain_max: f64, palette: Vec<Color>) -> ChartResult<Self> {
        if !domain_min.is_finite() || !domain_max.is_finite() || domain_min == domain_max {
            return Err(ChartError::InvalidDomain {
                min: domain_min,
                max: domain_max,
            });
        }
        if palette.is_empty() {
            return Err(ChartError::InvalidData(
                "sequential palette must contain at least one color".to_owned(),
            ));
        }
        for color in &palette {
            color.validate()?;
        }
        Ok(Self {
            domain: (domain_min, domain_max),
            palette,
        })
    }

    /// Builds `[0, max]`, or `DEFAULT_SEQUENTIAL_DOMAIN` when `max` is absent,
    /// zero or non-finite.
    pub fn from_max(max: Option<f64>, palette: Vec<Color>) -> ChartResult<Self> {
        let (min, max) = match max {
            Some(max) if max.is_finite() && max != 0.0 => (0.0, max),
            _ => DEFAULT_SEQUENTIAL_DOMAIN,
        };
        Self::new(min, max, palette)
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    #[must_use]
    pub fn map(&self, value: f64) -> Color {
        let (d0, d1) = self.domain;
        let t = if value.is_nan() {
            0.0
        } else {
            ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
        };
        self.sample(t)
    }

    /// Color at normalized position `t` along the ramp.
    #[must_use]
    pub fn sample(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let segments = self.palette.len() - 1;
        if segments == 0 {
            return self.palette[0];
        }
        let position = t * segments as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (position.floor() as usize).min(segments - 1);
        let local = position - index as f64;
        self.palette[index].lerp(self.palette[index + 1], local)
    }

    /// `count` evenly spaced `(offset, color)` stops for a legend gradient.
    #[must_use]
    pub fn gradient_stops(&self, count: usize) -> Vec<(f64, Color)> {
        if count < 2 {
            return vec![(0.0, self.sample(0.0))];
        }
        (0..count)
            .map(|i| {
                let offset = i as f64 / (count - 1) as f64;
                (offset, self.sample(offset))
            })
            .collect()
    }
}
