//! Construction errors shared by the bloom filter and the cardinality estimator.
//!
//! Only invalid parameters are errors. Malformed items (absent or empty) are a
//! handled case reported through return values and [`crate::observer::Event`].

use thiserror::Error;

/// Invalid parameters passed when building a filter or an estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("bloom filter size must be positive, got {0}")]
    InvalidSize(usize),

    #[error("number of hash functions must be positive, got {0}")]
    InvalidNumHashes(u32),

    #[error("precision {precision} is outside the supported [{min}..{max}] range")]
    InvalidPrecision { precision: u8, min: u8, max: u8 },

    #[error("expected number of items must be positive, got {0}")]
    InvalidCapacity(usize),

    #[error("false positive rate must be within (0, 1), got {0}")]
    InvalidFalsePositiveRate(f64),

    #[error("cannot merge estimators with precision {left} and {right}")]
    PrecisionMismatch { left: u8, right: u8 },
}
