//! Cardinality estimator allows to estimate number of distinct elements
//! in the stream or dataset and is defined with runtime `precision` parameter
//! and a hasher type `H`:
//! - `precision`: value in [4..18] range, which defines number of bits
//!   to use for HyperLogLog register indices (`2^precision` registers).
//! - `H`: 64-bit hasher used to hash items, `WyHash` by default.
//!
//! # Accuracy
//! Expected relative error is `1.04 / sqrt(2^precision)`:
//! - precision = 10: 1.04 / sqrt(2^10) = 3.25%
//! - precision = 12: 1.04 / sqrt(2^12) = 1.62%
//! - precision = 14: 1.04 / sqrt(2^14) = 0.81%
//! - precision = 18: 1.04 / sqrt(2^18) = 0.20%
//!
//! # Estimation
//! The raw estimate is `alpha(m) * m^2 / Σ 2^(-register[i])`. It is replaced by
//! linear counting `m * ln(m / V)` while the raw estimate is at most `2.5 * m`
//! and `V` registers are still zero, and by `-2^64 * ln(1 - E / 2^64)` once it
//! exceeds `2^64 / 30`. The estimate is recomputed from registers on every call.
//!
//! ```
//! use approx_sets::estimator::CardinalityEstimator;
//!
//! let mut estimator = CardinalityEstimator::new(12).unwrap();
//! assert_eq!(estimator.estimate(), 0.0);
//! for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.1"] {
//!     estimator.update(ip);
//! }
//! assert_eq!(estimator.estimate().round(), 2.0);
//! ```

use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::mem::size_of;

use wyhash::WyHash;

use crate::error::ConfigurationError;
use crate::hyperloglog::HyperLogLog;

/// Minimum supported precision
pub const MIN_PRECISION: u8 = 4;
/// Maximum supported precision
pub const MAX_PRECISION: u8 = 18;
/// Precision used when none is given
pub const DEFAULT_PRECISION: u8 = 12;

pub struct CardinalityEstimator<H: Hasher + Default = WyHash> {
    /// Dense HyperLogLog registers
    hll: HyperLogLog,
    /// Zero-sized build hasher
    build_hasher: BuildHasherDefault<H>,
}

impl CardinalityEstimator {
    /// Creates new instance of `CardinalityEstimator` with `2^precision` registers
    /// hashing items with `WyHash`
    pub fn new(precision: u8) -> Result<Self, ConfigurationError> {
        Self::with_precision(precision)
    }
}

impl<H: Hasher + Default> CardinalityEstimator<H> {
    /// Creates new instance of `CardinalityEstimator` with `2^precision` registers
    /// hashing items with `H`
    pub fn with_precision(precision: u8) -> Result<Self, ConfigurationError> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(ConfigurationError::InvalidPrecision {
                precision,
                min: MIN_PRECISION,
                max: MAX_PRECISION,
            });
        }

        Ok(Self {
            hll: HyperLogLog::new(precision),
            build_hasher: BuildHasherDefault::default(),
        })
    }

    /// Insert a hashable item into `CardinalityEstimator`
    #[inline]
    pub fn update<T: Hash + ?Sized>(&mut self, item: &T) {
        let mut hasher = self.build_hasher.build_hasher();
        item.hash(&mut hasher);
        let hash = hasher.finish();
        self.update_hash(hash);
    }

    /// Insert hash into `CardinalityEstimator`
    #[inline]
    pub fn update_hash(&mut self, hash: u64) {
        self.hll.insert_hash(hash);
    }

    /// Return cardinality estimate
    #[inline]
    pub fn estimate(&self) -> f64 {
        self.hll.estimate()
    }

    /// Merge cardinality estimators of equal precision
    pub fn merge(&mut self, rhs: &Self) -> Result<(), ConfigurationError> {
        if self.precision() != rhs.precision() {
            return Err(ConfigurationError::PrecisionMismatch {
                left: self.precision(),
                right: rhs.precision(),
            });
        }
        self.hll.merge(&rhs.hll);
        Ok(())
    }

    /// Return precision of `CardinalityEstimator`
    #[inline]
    pub fn precision(&self) -> u8 {
        self.hll.m().trailing_zeros() as u8
    }

    /// Return number of HyperLogLog registers
    #[inline]
    pub fn register_count(&self) -> usize {
        self.hll.m()
    }

    /// Return register ranks
    #[inline]
    pub fn registers(&self) -> &[u8] {
        self.hll.registers()
    }

    /// Return theoretical standard error `1.04 / sqrt(m)`
    pub fn standard_error(&self) -> f64 {
        1.04 / (self.register_count() as f64).sqrt()
    }

    /// Return memory size of `CardinalityEstimator`
    pub fn size_of(&self) -> usize {
        self.hll.size_of() - size_of::<HyperLogLog>() + size_of::<Self>()
    }
}

impl Default for CardinalityEstimator {
    fn default() -> Self {
        Self {
            hll: HyperLogLog::new(DEFAULT_PRECISION),
            build_hasher: BuildHasherDefault::default(),
        }
    }
}

impl<H: Hasher + Default> Clone for CardinalityEstimator<H> {
    fn clone(&self) -> Self {
        Self {
            hll: self.hll.clone(),
            build_hasher: BuildHasherDefault::default(),
        }
    }
}

impl<H: Hasher + Default> PartialEq for CardinalityEstimator<H> {
    /// Compare cardinality estimators
    fn eq(&self, rhs: &Self) -> bool {
        self.hll == rhs.hll
    }
}

impl<H: Hasher + Default> Debug for CardinalityEstimator<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {:.0}, size: {} }}",
            self.precision(),
            self.estimate(),
            self.size_of()
        )
    }
}
