use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid scale domain: min={min}, max={max}")]
    InvalidDomain { min: f64, max: f64 },

    #[error("unknown category `{category}`")]
    UnknownCategory { category: String },

    #[error("cannot mount render surface: width={width}, height={height}")]
    Mount { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("renderer backend failure: {0}")]
    Backend(String),
}

impl ChartError {
    #[must_use]
    pub fn unknown_category(category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
        }
    }

    /// Returns `true` for errors that builders recover from locally.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomain { .. } | Self::UnknownCategory { .. }
        )
    }
}
