use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Recovery policy for a degenerate or non-finite linear domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DomainFallback {
    /// Every value maps to the midpoint of the range.
    RangeMidpoint,
    /// The domain is replaced with the given bounds.
    DefaultDomain(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LinearMapping {
    Continuous { domain: (f64, f64) },
    Midpoint,
}

/// Continuous mapping from a numeric domain to a pixel range.
///
/// Output is never rounded or clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    mapping: LinearMapping,
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(
        domain_min: f64,
        domain_max: f64,
        range_min: f64,
        range_max: f64,
    ) -> ChartResult<Self> {
        validate_range(range_min, range_max)?;
        validate_domain(domain_min, domain_max)?;
        Ok(Self {
            mapping: LinearMapping::Continuous {
                domain: (domain_min, domain_max),
            },
            range: (range_min, range_max),
        })
    }

    /// Like `new`, but a degenerate domain is recovered through `fallback`.
    ///
    /// A fallback domain that is itself degenerate still fails.
    pub fn with_fallback(
        domain_min: f64,
        domain_max: f64,
        range_min: f64,
        range_max: f64,
        fallback: DomainFallback,
    ) -> ChartResult<Self> {
        match Self::new(domain_min, domain_max, range_min, range_max) {
            Err(ChartError::InvalidDomain { .. }) => match fallback {
                DomainFallback::RangeMidpoint => Ok(Self {
                    mapping: LinearMapping::Midpoint,
                    range: (range_min, range_max),
                }),
                DomainFallback::DefaultDomain(min, max) => {
                    Self::new(min, max, range_min, range_max)
                }
            },
            other => other,
        }
    }

    /// Effective domain; `None` when mapping collapsed to the range midpoint.
    #[must_use]
    pub fn domain(self) -> Option<(f64, f64)> {
        match self.mapping {
            LinearMapping::Continuous { domain } => Some(domain),
            LinearMapping::Midpoint => None,
        }
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        match self.mapping {
            LinearMapping::Continuous { domain: (d0, d1) } => {
                let t = (value - d0) / (d1 - d0);
                r0 + t * (r1 - r0)
            }
            LinearMapping::Midpoint => (r0 + r1) / 2.0,
        }
    }

    /// Maps a range value back into the domain.
    pub fn invert(self, pixel: f64) -> ChartResult<f64> {
        let (r0, r1) = self.range;
        match self.mapping {
            LinearMapping::Continuous { domain: (d0, d1) } if r0 != r1 => {
                let t = (pixel - r0) / (r1 - r0);
                Ok(d0 + t * (d1 - d0))
            }
            _ => Err(ChartError::InvalidData(
                "scale is not invertible over a collapsed range".to_owned(),
            )),
        }
    }

    /// `count + 1` evenly spaced domain values from min to max inclusive.
    #[must_use]
    pub fn even_ticks(self, count: usize) -> Vec<f64> {
        let Some((d0, d1)) = self.domain() else {
            return Vec::new();
        };
        if count == 0 {
            return vec![d0];
        }
        let step = (d1 - d0) / count as f64;
        (0..=count).map(|i| d0 + step * i as f64).collect()
    }
}

fn validate_domain(min: f64, max: f64) -> ChartResult<()> {
    if !min.is_finite() || !max.is_finite() || min == max {
        return Err(ChartError::InvalidDomain { min, max });
    }
    Ok(())
}

fn validate_range(min: f64, max: f64) -> ChartResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::InvalidData(
            "scale range must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// Position and extent of one category band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub start: f64,
    pub size: f64,
}

impl Band {
    #[must_use]
    pub fn center(self) -> f64 {
        self.start + self.size / 2.0
    }

    #[must_use]
    pub fn end(self) -> f64 {
        self.start + self.size
    }
}

/// Discrete scale assigning each category an equal slot of the range.
///
/// Each slot is `|range| / n` wide; the band occupies `1 - padding` of it,
/// centered, so neighbouring bands are separated by `step * padding`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    categories: IndexSet<String>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    pub fn new<I, S>(categories: I, range_min: f64, range_max: f64, padding: f64) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_range(range_min, range_max)?;
        if !padding.is_finite() || !(0.0..1.0).contains(&padding) {
            return Err(ChartError::InvalidData(
                "band padding must be finite and in [0, 1)".to_owned(),
            ));
        }
        Ok(Self {
            categories: categories.into_iter().map(Into::into).collect(),
            range: (range_min, range_max),
            padding,
        })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Slot width including padding.
    #[must_use]
    pub fn step(&self) -> f64 {
        if self.categories.is_empty() {
            return 0.0;
        }
        (self.range.1 - self.range.0).abs() / self.categories.len() as f64
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    pub fn band(&self, category: &str) -> ChartResult<Band> {
        let index = self
            .categories
            .get_index_of(category)
            .ok_or_else(|| ChartError::unknown_category(category))?;
        let (r0, r1) = self.range;
        let slot = if r1 >= r0 {
            index
        } else {
            self.categories.len() - 1 - index
        };
        let step = self.step();
        Ok(Band {
            start: r0.min(r1) + slot as f64 * step + step * self.padding / 2.0,
            size: self.bandwidth(),
        })
    }
}
