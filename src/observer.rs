//! Observer hooks for bloom filter activity.
//!
//! The filter itself never logs. Instead it reports every construction, insert,
//! query and rejected item to an [`Observer`] supplied by the caller, so that
//! process-wide logging stays the application's business. [`TracingObserver`]
//! forwards events to `tracing`, and any `Fn(Event<'_>)` closure is an observer too.

use std::fmt::{Display, Formatter};

use crate::dedup::Verdict;

/// Operation during which an invalid item was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Contains,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operation::Insert => "insert",
            Operation::Contains => "contains",
        })
    }
}

/// Event reported to an [`Observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// Filter allocated with given dimensions
    Created { size: usize, num_hashes: u32 },
    /// Item bits were set
    Inserted { item: &'a str },
    /// Membership was queried
    Queried { item: &'a str, present: bool },
    /// Absent or empty item was rejected
    InvalidItem { operation: Operation },
    /// Duplicate-check driver classified an item
    Classified {
        item: Option<&'a str>,
        verdict: Verdict,
    },
}

/// Receiver of bloom filter events.
pub trait Observer {
    fn observe(&self, event: Event<'_>);
}

/// Observer which ignores all events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline]
    fn observe(&self, _event: Event<'_>) {}
}

/// Observer which emits `tracing` events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: Event<'_>) {
        match event {
            Event::Created { size, num_hashes } => {
                tracing::info!(size, num_hashes, "bloom filter created")
            }
            Event::Inserted { item } => tracing::debug!(item, "item inserted"),
            Event::Queried { item, present } => tracing::debug!(item, present, "item queried"),
            Event::InvalidItem { operation } => {
                tracing::warn!(%operation, "rejected invalid item")
            }
            Event::Classified {
                item,
                verdict: Verdict::Invalid,
            } => tracing::warn!(?item, "invalid item"),
            Event::Classified { item, verdict } => {
                tracing::info!(item = item.unwrap_or_default(), %verdict, "item classified")
            }
        }
    }
}

impl<F> Observer for F
where
    F: Fn(Event<'_>),
{
    #[inline]
    fn observe(&self, event: Event<'_>) {
        self(event)
    }
}
