//! Backend adapters
//!
//! One adapter per version-control source, each implementing the uniform
//! [`VcsClient`] query contract against its backend's native API.
//!
//! # Built-in backends
//!
//! - **GitHub**: REST commits API (cloud or Enterprise)
//! - **GitLab**: REST repository commits API
//! - **Local git**: libgit2 revision walk over a checkout
//!
//! Adapters are constructed once at startup from the declarative source
//! list ([`build_clients`]) and used read-only for the process lifetime.
//! The aggregator depends only on the [`VcsClient`] contract, never on the
//! concrete types, so backend types can be added without touching it.

pub mod github;
pub mod gitlab;
pub mod local_git;
pub mod retry;

use crate::config::{SourceConfig, SourceKind};
use crate::stats::{AuthorCounts, TimeWindow};
use crate::Result;
use async_trait::async_trait;

pub use github::GitHubBackend;
pub use gitlab::GitLabBackend;
pub use local_git::LocalGitBackend;

/// The uniform query contract every backend adapter implements.
///
/// Implementations must keep the two operations consistent for the same
/// window: `total_commits` equals the sum of the `commits_per_author`
/// values. Authors with zero in-window commits are omitted, never reported
/// with a count of 0. An adapter that cannot answer fails with
/// [`crate::CommitBoardError::BackendUnavailable`] carrying its name and
/// the underlying cause; it never silently returns partial data.
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// The adapter's configured name, used in logs and errors.
    fn name(&self) -> &str;

    /// Commit counts grouped by author for the window.
    async fn commits_per_author(&self, window: &TimeWindow) -> Result<AuthorCounts>;

    /// Scalar commit count for the window.
    async fn total_commits(&self, window: &TimeWindow) -> Result<u64>;
}

/// Build adapter instances from the declarative source list.
///
/// This is the one-time registration step: the returned list is handed to
/// the aggregator at construction and never mutated afterwards. A source
/// that cannot be constructed is a configuration error naming the source.
pub fn build_clients(sources: &[SourceConfig]) -> Result<Vec<Box<dyn VcsClient>>> {
    let mut clients: Vec<Box<dyn VcsClient>> = Vec::with_capacity(sources.len());

    for source in sources {
        let client: Box<dyn VcsClient> = match &source.kind {
            SourceKind::Github(cfg) => Box::new(
                GitHubBackend::new(source.name.clone(), cfg.clone()).map_err(|e| {
                    crate::CommitBoardError::Config(format!(
                        "Failed to construct backend '{}': {}",
                        source.name, e
                    ))
                })?,
            ),
            SourceKind::Gitlab(cfg) => Box::new(
                GitLabBackend::new(source.name.clone(), cfg.clone()).map_err(|e| {
                    crate::CommitBoardError::Config(format!(
                        "Failed to construct backend '{}': {}",
                        source.name, e
                    ))
                })?,
            ),
            SourceKind::Git(cfg) => {
                Box::new(LocalGitBackend::new(source.name.clone(), cfg.clone()))
            }
        };

        tracing::debug!(
            backend = client.name(),
            kind = source.kind.type_name(),
            "Constructed backend adapter"
        );
        clients.push(client);
    }

    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    #[test]
    fn test_build_clients_empty_list() {
        let clients = build_clients(&[]).unwrap();
        assert!(clients.is_empty());
    }

    #[test]
    fn test_build_clients_preserves_order_and_names() {
        let sources = vec![
            SourceConfig::github("work", "acme", "platform"),
            SourceConfig::gitlab("infra", "acme/infra"),
            SourceConfig::local_git("scratch", "/tmp/repo"),
        ];

        let clients = build_clients(&sources).unwrap();
        let names: Vec<&str> = clients.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["work", "infra", "scratch"]);
    }
}
