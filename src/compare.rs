//! Exact versus approximate distinct counting over the same item stream.
//!
//! The exact count materializes every distinct item in a hash set and serves as
//! ground truth. The approximate count runs a [`CardinalityEstimator`] over the
//! same items. Both are timed with wall-clock time so that accuracy, speed and
//! memory can be compared side by side.

use std::hash::Hash;
use std::time::Instant;

use hashbrown::HashSet;

use crate::error::ConfigurationError;
use crate::estimator::CardinalityEstimator;

/// Distinct count produced by one counting method and the time it took.
/// Exact counts are integers, estimates are real numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize))]
pub struct Measurement<C = f64> {
    pub unique_elements: C,
    pub time_seconds: f64,
}

/// Exact and approximate measurements over the same items
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize))]
pub struct Comparison {
    pub exact: Measurement<usize>,
    pub hyperloglog: Measurement,
}

impl Comparison {
    /// Relative error of the approximate count against the exact one
    pub fn relative_error(&self) -> f64 {
        let exact = self.exact.unique_elements as f64;
        if exact == 0.0 {
            return self.hyperloglog.unique_elements;
        }
        (self.hyperloglog.unique_elements - exact).abs() / exact
    }
}

/// Count distinct items exactly
pub fn exact_count<T: Hash + Eq>(items: &[T]) -> Measurement<usize> {
    let start = Instant::now();
    let unique: HashSet<&T> = items.iter().collect();
    let unique_elements = unique.len();
    Measurement {
        unique_elements,
        time_seconds: start.elapsed().as_secs_f64(),
    }
}

/// Estimate distinct items with `2^precision` HyperLogLog registers
pub fn approximate_count<T: Hash>(
    items: &[T],
    precision: u8,
) -> Result<Measurement, ConfigurationError> {
    let mut estimator = CardinalityEstimator::new(precision)?;
    let start = Instant::now();
    for item in items {
        estimator.update(item);
    }
    let unique_elements = estimator.estimate();
    Ok(Measurement {
        unique_elements,
        time_seconds: start.elapsed().as_secs_f64(),
    })
}

/// Run both counting methods over `items`
pub fn compare<T: Hash + Eq>(items: &[T], precision: u8) -> Result<Comparison, ConfigurationError> {
    let hyperloglog = approximate_count(items, precision)?;
    let exact = exact_count(items);
    Ok(Comparison { exact, hyperloglog })
}
