//! Composite client implementation

use crate::backends::VcsClient;
use crate::stats::{merge_author_counts, AuthorCounts, TimeWindow};
use crate::{CommitBoardError, Result};
use async_trait::async_trait;
use futures::future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Aggregation behavior settings
#[derive(Debug, Clone)]
pub struct CompositeConfig {
    /// Deadline for a single backend call. An overrun is treated as that
    /// backend being unavailable; the others are unaffected.
    pub backend_timeout: Duration,

    /// Abort the whole query on the first backend failure instead of
    /// skipping the failed backend and merging the rest.
    pub require_all: bool,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            backend_timeout: Duration::from_secs(30),
            require_all: false,
        }
    }
}

/// The aggregating client.
///
/// Holds an ordered, immutable set of backend adapters, fans each query out
/// to all of them, and merges the results as if a single backend had
/// answered. It implements [`VcsClient`] itself, so callers cannot tell it
/// apart from one backend.
///
/// Every query is stateless: no cache, no memoization, no state shared
/// between calls. Merge-by-sum and addition are commutative and
/// associative, so the result is identical regardless of dispatch order or
/// completion interleaving.
pub struct CompositeClient {
    backends: Vec<Box<dyn VcsClient>>,
    config: CompositeConfig,
}

impl CompositeClient {
    /// Create an aggregator over `backends` with default settings.
    pub fn new(backends: Vec<Box<dyn VcsClient>>) -> Self {
        Self::with_config(backends, CompositeConfig::default())
    }

    /// Create an aggregator with explicit settings.
    pub fn with_config(backends: Vec<Box<dyn VcsClient>>, config: CompositeConfig) -> Self {
        Self { backends, config }
    }

    /// Number of registered backends.
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Names of the registered backends, in registration order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Run one backend call under the per-backend deadline, normalizing an
    /// overrun into `BackendUnavailable` for that backend.
    async fn bounded<T>(
        &self,
        backend_name: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match timeout(self.config.backend_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CommitBoardError::unavailable(
                backend_name,
                format!(
                    "timed out after {:.0?}",
                    self.config.backend_timeout
                ),
            )),
        }
    }

    /// Apply the partial-failure policy to one backend's outcome.
    ///
    /// Best-effort (default): log the failure, drop the contribution.
    /// `require_all`: surface the failure, aborting the query.
    fn admit<T>(&self, backend_name: &str, outcome: Result<T>) -> Result<Option<T>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.config.require_all => Err(e),
            Err(e) => {
                warn!(
                    backend = %backend_name,
                    error = %e,
                    "Skipping unavailable backend"
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl VcsClient for CompositeClient {
    fn name(&self) -> &str {
        "composite"
    }

    async fn commits_per_author(&self, window: &TimeWindow) -> Result<AuthorCounts> {
        let outcomes = future::join_all(
            self.backends
                .iter()
                .map(|b| self.bounded(b.name(), b.commits_per_author(window))),
        )
        .await;

        // The accumulator has a single owner: the backend calls above share
        // nothing and are folded only after they complete.
        let mut merged = AuthorCounts::new();
        for (backend, outcome) in self.backends.iter().zip(outcomes) {
            if let Some(counts) = self.admit(backend.name(), outcome)? {
                debug!(
                    backend = %backend.name(),
                    authors = counts.len(),
                    "Merging backend result"
                );
                merge_author_counts(&mut merged, counts);
            }
        }

        Ok(merged)
    }

    async fn total_commits(&self, window: &TimeWindow) -> Result<u64> {
        let outcomes = future::join_all(
            self.backends
                .iter()
                .map(|b| self.bounded(b.name(), b.total_commits(window))),
        )
        .await;

        let mut total: u64 = 0;
        for (backend, outcome) in self.backends.iter().zip(outcomes) {
            if let Some(count) = self.admit(backend.name(), outcome)? {
                total += count;
            }
        }

        Ok(total)
    }
}
