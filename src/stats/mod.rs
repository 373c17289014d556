//! Commit statistics data model
//!
//! The query window and the merge rule shared by all backends and the
//! aggregator.

use crate::{CommitBoardError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Commit counts keyed by author identity.
///
/// Author identities are opaque, source-defined strings. They are never
/// case-folded or reconciled across backends: "jdoe" on one backend and
/// "J. Doe" on another stay separate keys.
pub type AuthorCounts = HashMap<String, u64>;

/// A query window over commit time, inclusive at both bounds.
///
/// `from` is always present. `to` is optional; when absent the window is
/// open-ended through the present moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Create a window, validating that `to` (when present) is not earlier
    /// than `from`. Validation happens here so no backend is ever queried
    /// with an inverted window.
    pub fn new(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Result<Self> {
        if let Some(to) = to {
            if to < from {
                return Err(CommitBoardError::InvalidWindow { from, to });
            }
        }
        Ok(Self { from, to })
    }

    /// Create an open-ended window from `from` through now.
    pub fn since(from: DateTime<Utc>) -> Self {
        Self { from, to: None }
    }

    /// Window start.
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Window end, if bounded.
    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    /// Window end, resolving an open-ended window to the current instant.
    pub fn to_or_now(&self) -> DateTime<Utc> {
        self.to.unwrap_or_else(Utc::now)
    }

    /// Whether `timestamp` falls inside the window (inclusive bounds).
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        if timestamp < self.from {
            return false;
        }
        match self.to {
            Some(to) => timestamp <= to,
            None => true,
        }
    }
}

/// Fold `incoming` into `acc`, summing counts on author-key collision.
///
/// The same author may contribute commits recorded by more than one
/// backend; colliding counts are summed, never overwritten.
pub fn merge_author_counts(acc: &mut AuthorCounts, incoming: AuthorCounts) {
    for (author, count) in incoming {
        *acc.entry(author).or_insert(0) += count;
    }
}
