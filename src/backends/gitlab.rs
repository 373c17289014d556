//! GitLab backend adapter
//!
//! Queries the GitLab REST repository commits API for commit activity in a
//! window.

use super::retry::{with_retry, RetryConfig};
use super::VcsClient;
use crate::config::GitLabSource;
use crate::stats::{AuthorCounts, TimeWindow};
use crate::{CommitBoardError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for commit listing pages
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// Page size for the commits endpoint (GitLab maximum)
const PER_PAGE: usize = 100;

/// GitLab REST API adapter
pub struct GitLabBackend {
    name: String,
    client: Client,
    commits_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

/// One entry from `GET /projects/{id}/repository/commits`
#[derive(Debug, Clone, Deserialize)]
struct CommitEntry {
    author_name: String,
}

impl GitLabBackend {
    /// Create a new GitLab adapter from source parameters.
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(name: String, config: GitLabSource) -> Result<Self> {
        let client = Client::builder()
            .timeout(LIST_TIMEOUT)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("commitboard/0.3"),
                );
                headers
            })
            .build()?;

        // Project paths appear in the URL with the separator encoded
        let project_id = config.project.replace('/', "%2F");
        let commits_url = format!(
            "{}/api/v4/projects/{}/repository/commits",
            config.url.trim_end_matches('/'),
            project_id
        );

        let auth_token = match &config.token_env {
            Some(var) => {
                let token = std::env::var(var).ok();
                if token.is_none() {
                    warn!(
                        backend = %name,
                        env_var = %var,
                        "Token env var not set; proceeding unauthenticated"
                    );
                }
                token
            }
            None => None,
        };

        Ok(Self {
            name,
            client,
            commits_url,
            auth_token,
            retry: RetryConfig::default(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Fetch one page of the commit listing.
    async fn fetch_page(&self, window: &TimeWindow, page: u32) -> Result<Vec<CommitEntry>> {
        let mut request = self
            .client
            .get(&self.commits_url)
            .query(&[("since", window.from().to_rfc3339())])
            .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);

        if let Some(until) = window.to() {
            request = request.query(&[("until", until.to_rfc3339())]);
        }
        if let Some(ref token) = self.auth_token {
            request = request.header("PRIVATE-TOKEN", token);
        }

        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(CommitBoardError::Other(
                "GitLab authentication failed".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(CommitBoardError::Other(format!(
                "Project not found: {}",
                self.commits_url
            ))),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(CommitBoardError::Other(format!(
                    "GitLab API error: HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }

    /// List all in-window commits, following pagination.
    ///
    /// Both query operations derive their answer from this listing, which
    /// keeps the per-author map and the total consistent for a given window.
    async fn list_commits(&self, window: &TimeWindow) -> Result<Vec<CommitEntry>> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let entries = with_retry(&self.retry, "gitlab list commits", || {
                self.fetch_page(window, page)
            })
            .await?;

            let page_len = entries.len();
            all.extend(entries);

            debug!(
                backend = %self.name,
                page = page,
                fetched = page_len,
                "Fetched GitLab commits page"
            );

            if page_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    fn fold_counts(entries: &[CommitEntry]) -> AuthorCounts {
        let mut counts = AuthorCounts::new();
        for entry in entries {
            *counts.entry(entry.author_name.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait]
impl VcsClient for GitLabBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commits_per_author(&self, window: &TimeWindow) -> Result<AuthorCounts> {
        let entries = self
            .list_commits(window)
            .await
            .map_err(|e| CommitBoardError::unavailable(&self.name, e))?;

        let counts = Self::fold_counts(&entries);

        info!(
            backend = %self.name,
            commits = entries.len(),
            authors = counts.len(),
            "GitLab commit listing complete"
        );

        Ok(counts)
    }

    async fn total_commits(&self, window: &TimeWindow) -> Result<u64> {
        let entries = self
            .list_commits(window)
            .await
            .map_err(|e| CommitBoardError::unavailable(&self.name, e))?;

        Ok(entries.len() as u64)
    }
}
