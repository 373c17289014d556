//! Local git backend adapter
//!
//! Answers commit queries by walking the history of a git checkout on the
//! local filesystem, no network involved.

use super::VcsClient;
use crate::config::LocalGitSource;
use crate::stats::{AuthorCounts, TimeWindow};
use crate::{CommitBoardError, Result};
use async_trait::async_trait;
use chrono::DateTime;
use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::info;

/// Adapter over a local git repository
pub struct LocalGitBackend {
    name: String,
    path: PathBuf,
}

impl LocalGitBackend {
    /// Create a new local git adapter.
    ///
    /// The repository is opened per query, so a path that appears later
    /// (e.g., a clone that finishes after startup) still works.
    pub fn new(name: String, config: LocalGitSource) -> Self {
        Self {
            name,
            path: config.path,
        }
    }

    /// Walk ancestry from HEAD and count in-window commits per author.
    ///
    /// The walk visits the full ancestry rather than stopping at the first
    /// out-of-window commit: commit times are not monotonic across merged
    /// branches.
    fn scan(path: &Path, window: &TimeWindow) -> Result<AuthorCounts> {
        let repo = Repository::open(path)?;

        let mut walk = repo.revwalk()?;
        walk.push_head()?;

        let mut counts = AuthorCounts::new();

        for oid in walk {
            let commit = repo.find_commit(oid?)?;

            let Some(timestamp) = DateTime::from_timestamp(commit.time().seconds(), 0) else {
                continue;
            };
            if !window.contains(timestamp) {
                continue;
            }

            let author = commit.author();
            let identity = match author.name() {
                Some(name) => name.to_string(),
                None => String::from_utf8_lossy(author.name_bytes()).into_owned(),
            };

            *counts.entry(identity).or_insert(0) += 1;
        }

        Ok(counts)
    }

    async fn scan_blocking(&self, window: &TimeWindow) -> Result<AuthorCounts> {
        let path = self.path.clone();
        let window = *window;

        // libgit2 work is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || Self::scan(&path, &window))
            .await
            .map_err(|e| CommitBoardError::Other(format!("Scan task failed: {}", e)))?
    }
}

#[async_trait]
impl VcsClient for LocalGitBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commits_per_author(&self, window: &TimeWindow) -> Result<AuthorCounts> {
        let counts = self
            .scan_blocking(window)
            .await
            .map_err(|e| CommitBoardError::unavailable(&self.name, e))?;

        info!(
            backend = %self.name,
            authors = counts.len(),
            "Local git scan complete"
        );

        Ok(counts)
    }

    async fn total_commits(&self, window: &TimeWindow) -> Result<u64> {
        let counts = self
            .scan_blocking(window)
            .await
            .map_err(|e| CommitBoardError::unavailable(&self.name, e))?;

        Ok(counts.values().sum())
    }
}
