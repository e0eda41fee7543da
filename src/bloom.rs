//! Bloom filter allows to test whether an item is a member of a set
//! using a fixed-size bit array and `k` hash-derived positions per item.
//!
//! # Properties
//! - No false negatives: once inserted, `contains` always returns `true`.
//! - False positives happen with probability `(1 - e^(-k * n / m))^k`,
//!   where `n` is the number of distinct inserted items and `m` the filter size.
//! - Bits are only ever set, never cleared: items cannot be removed.
//! - The bit array is allocated once. Growing a filter means building a new one
//!   and re-inserting all known items.
//!
//! # Data storage format
//! The `m` bits are packed into `ceil(m / 64)` little-endian `u64` words:
//! bit `i` lives in word `i / 64` at position `i % 64`. Trailing bits of the
//! last word are never set.
//!
//! # Invalid items
//! Absent (`None`) and empty items are rejected without failing: `insert`
//! becomes a no-op returning `false`, and `contains` returns `false`.
//! Every rejection is reported to the filter's [`Observer`].
//!
//! ```
//! use approx_sets::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::new(1000, 3).unwrap();
//! filter.insert("password123");
//! assert!(filter.contains("password123"));
//! assert!(!filter.contains(""));
//! assert!(!filter.contains(None));
//! ```

use std::f64::consts::LN_2;
use std::fmt::{Debug, Formatter};
use std::mem::{size_of, size_of_val};

use crate::error::ConfigurationError;
use crate::hash::{HashFamily, HashStrategy};
use crate::observer::{Event, NoopObserver, Observer, Operation};

/// Number of bits per storage word
const WORD_BITS: usize = 64;

pub struct BloomFilter<S: HashStrategy = HashFamily, O: Observer = NoopObserver> {
    /// Number of bits in the filter
    size: usize,
    /// Number of hash derivations per item
    num_hashes: u32,
    /// Number of bits set to 1
    bits_set: usize,
    /// Bit array packed into `u64` words
    words: Box<[u64]>,
    hasher: S,
    observer: O,
}

impl BloomFilter {
    /// Create new `BloomFilter` of `size` bits using `num_hashes` positions per item
    /// and the default hash family.
    pub fn new(size: usize, num_hashes: u32) -> Result<Self, ConfigurationError> {
        Self::with_hasher(size, num_hashes, HashFamily::default())
    }

    /// Create new `BloomFilter` sized for `expected_items` distinct items with
    /// false positive rate around `fpp`.
    ///
    /// Uses `m = -n * ln(p) / ln(2)^2` bits and `k = ceil(m / n * ln(2))` hashes.
    pub fn with_accuracy(expected_items: usize, fpp: f64) -> Result<Self, ConfigurationError> {
        if expected_items == 0 {
            return Err(ConfigurationError::InvalidCapacity(expected_items));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(ConfigurationError::InvalidFalsePositiveRate(fpp));
        }
        let size = suggest_size(expected_items, fpp);
        let num_hashes = suggest_num_hashes(expected_items, size);
        Self::new(size, num_hashes)
    }
}

impl<S: HashStrategy> BloomFilter<S> {
    /// Create new `BloomFilter` with an explicit hash strategy
    pub fn with_hasher(size: usize, num_hashes: u32, hasher: S) -> Result<Self, ConfigurationError> {
        if size == 0 {
            return Err(ConfigurationError::InvalidSize(size));
        }
        if num_hashes == 0 {
            return Err(ConfigurationError::InvalidNumHashes(num_hashes));
        }

        Ok(Self {
            size,
            num_hashes,
            bits_set: 0,
            words: vec![0u64; size.div_ceil(WORD_BITS)].into_boxed_slice(),
            hasher,
            observer: NoopObserver,
        })
    }
}

impl<S: HashStrategy, O: Observer> BloomFilter<S, O> {
    /// Replace the observer receiving this filter's events
    pub fn with_observer<O2: Observer>(self, observer: O2) -> BloomFilter<S, O2> {
        observer.observe(Event::Created {
            size: self.size,
            num_hashes: self.num_hashes,
        });
        BloomFilter {
            size: self.size,
            num_hashes: self.num_hashes,
            bits_set: self.bits_set,
            words: self.words,
            hasher: self.hasher,
            observer,
        }
    }

    /// Insert an item into `BloomFilter`.
    /// Returns true if the item was accepted, false if it was absent or empty.
    pub fn insert<'a>(&mut self, item: impl Into<Option<&'a str>>) -> bool {
        let Some(item) = valid_item(item.into()) else {
            self.observer.observe(Event::InvalidItem {
                operation: Operation::Insert,
            });
            return false;
        };

        for slot in 0..self.num_hashes {
            let idx = self.index(item, slot);
            self.set_bit(idx);
        }
        self.observer.observe(Event::Inserted { item });
        true
    }

    /// Return whether the item was possibly inserted before.
    /// Absent and empty items are never contained.
    pub fn contains<'a>(&self, item: impl Into<Option<&'a str>>) -> bool {
        let Some(item) = valid_item(item.into()) else {
            self.observer.observe(Event::InvalidItem {
                operation: Operation::Contains,
            });
            return false;
        };

        let present = (0..self.num_hashes).all(|slot| self.get_bit(self.index(item, slot)));
        self.observer.observe(Event::Queried { item, present });
        present
    }

    /// Return bit index of `item` for hash `slot`
    #[inline]
    pub fn index(&self, item: &str, slot: u32) -> usize {
        self.hasher.index(item.as_bytes(), slot, self.size)
    }

    /// Number of bits in the filter
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of hash derivations per item
    #[inline]
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Number of bits set to 1
    #[inline]
    pub fn bits_set(&self) -> usize {
        self.bits_set
    }

    /// Return whether no bit is set yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits_set == 0
    }

    /// Fraction of bits set to 1
    pub fn load_factor(&self) -> f64 {
        self.bits_set as f64 / self.size as f64
    }

    /// False positive probability estimated from the current load factor: `load^k`
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(f64::from(self.num_hashes))
    }

    /// Theoretical false positive probability after `n` distinct inserts:
    /// `(1 - e^(-k * n / m))^k`
    pub fn false_positive_rate(&self, n: usize) -> f64 {
        let k = f64::from(self.num_hashes);
        let exponent = -k * n as f64 / self.size as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    /// Bit array packed into `u64` words
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    #[inline]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Return memory size of `BloomFilter`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.words)
    }

    #[inline]
    fn get_bit(&self, idx: usize) -> bool {
        self.words[idx / WORD_BITS] & (1u64 << (idx % WORD_BITS)) != 0
    }

    /// Set bit `idx` and bump the set bits counter if it was clear
    #[inline]
    fn set_bit(&mut self, idx: usize) {
        let mask = 1u64 << (idx % WORD_BITS);
        let word = &mut self.words[idx / WORD_BITS];
        if *word & mask == 0 {
            *word |= mask;
            self.bits_set += 1;
        }
    }
}

impl<S: HashStrategy + Clone, O: Observer + Clone> Clone for BloomFilter<S, O> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            num_hashes: self.num_hashes,
            bits_set: self.bits_set,
            words: self.words.clone(),
            hasher: self.hasher.clone(),
            observer: self.observer.clone(),
        }
    }
}

impl<S: HashStrategy + PartialEq, O: Observer> PartialEq for BloomFilter<S, O> {
    /// Filters are equal when dimensions, hash strategy and bits match
    fn eq(&self, rhs: &Self) -> bool {
        self.size == rhs.size
            && self.num_hashes == rhs.num_hashes
            && self.hasher == rhs.hasher
            && self.words == rhs.words
    }
}

impl<S: HashStrategy, O: Observer> Debug for BloomFilter<S, O> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ size: {}, num_hashes: {}, bits_set: {} }}",
            self.size, self.num_hashes, self.bits_set
        )
    }
}

/// Keep only present, non-empty items
#[inline]
fn valid_item(item: Option<&str>) -> Option<&str> {
    item.filter(|s| !s.is_empty())
}

/// Suggest number of bits for `n` items at false positive rate `p`: `-n * ln(p) / ln(2)^2`
fn suggest_size(n: usize, p: f64) -> usize {
    let bits = (-(n as f64) * p.ln() / (LN_2 * LN_2)).ceil();
    (bits as usize).max(1)
}

/// Suggest number of hashes for `n` items in `m` bits: `ceil(m / n * ln(2))`
fn suggest_num_hashes(n: usize, m: usize) -> u32 {
    let k = (m as f64 / n as f64 * LN_2).ceil();
    (k as u32).max(1)
}
