//! `approx-sets` is a Rust crate for answering two questions about large item streams
//! with bounded error and a small, fixed memory footprint:
//! - "have I seen this item before?" with a bloom filter ([`bloom::BloomFilter`]), and
//! - "how many distinct items are there?" with HyperLogLog ([`estimator::CardinalityEstimator`]).
//!
//! [`dedup`] classifies items as unique, already used or invalid using a bloom filter,
//! and [`compare`] measures the estimator against an exact count.
pub mod bloom;
pub mod compare;
pub mod dedup;
pub mod error;
pub mod estimator;
pub mod hash;
mod hyperloglog;
pub mod observer;
