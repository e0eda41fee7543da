//! Duplicate checking on top of a [`BloomFilter`].
//!
//! Items are classified in input order: the first occurrence of a value is
//! [`Verdict::Unique`] and is inserted right away, so any later occurrence in
//! the same run (or any value inserted before the run) is
//! [`Verdict::AlreadyUsed`]. Absent and empty items are [`Verdict::Invalid`]
//! and never touch the filter. Because of bloom filter false positives, a new
//! item can occasionally be reported as already used; a duplicate is never
//! reported as unique.
//!
//! ```
//! use approx_sets::bloom::BloomFilter;
//! use approx_sets::dedup::{check_uniqueness, Verdict};
//!
//! let mut filter = BloomFilter::new(1000, 3).unwrap();
//! let verdicts = check_uniqueness(&mut filter, ["a", "a", "b"]);
//! assert_eq!(
//!     verdicts,
//!     vec![
//!         (Some("a"), Verdict::Unique),
//!         (Some("a"), Verdict::AlreadyUsed),
//!         (Some("b"), Verdict::Unique),
//!     ]
//! );
//! ```

use std::fmt::{Display, Formatter};

use crate::bloom::BloomFilter;
use crate::hash::HashStrategy;
use crate::observer::{Event, Observer};

/// Outcome of checking a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize))]
#[cfg_attr(feature = "with_serde", serde(rename_all = "snake_case"))]
pub enum Verdict {
    /// First occurrence, now inserted into the filter
    Unique,
    /// Possibly seen before
    AlreadyUsed,
    /// Absent or empty item
    Invalid,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Verdict::Unique => "unique",
            Verdict::AlreadyUsed => "already used",
            Verdict::Invalid => "invalid",
        })
    }
}

/// Classify `items` in order against `filter`, inserting every unique item.
///
/// Returns one `(item, verdict)` pair per input occurrence, in input order.
pub fn check_uniqueness<'a, S, O, I>(
    filter: &mut BloomFilter<S, O>,
    items: I,
) -> Vec<(Option<&'a str>, Verdict)>
where
    S: HashStrategy,
    O: Observer,
    I: IntoIterator,
    I::Item: Into<Option<&'a str>>,
{
    items
        .into_iter()
        .map(|item| {
            let item = item.into();
            let verdict = classify(filter, item);
            filter.observer().observe(Event::Classified { item, verdict });
            (item, verdict)
        })
        .collect()
}

/// Classify a single item, inserting it when unique
#[inline]
fn classify<S: HashStrategy, O: Observer>(
    filter: &mut BloomFilter<S, O>,
    item: Option<&str>,
) -> Verdict {
    match item {
        None | Some("") => Verdict::Invalid,
        Some(item) if filter.contains(item) => Verdict::AlreadyUsed,
        Some(item) => {
            filter.insert(item);
            Verdict::Unique
        }
    }
}
