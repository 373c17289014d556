//! GitHub backend adapter
//!
//! Queries the GitHub REST commits API (cloud or Enterprise) for commit
//! activity in a window.

use super::retry::{with_retry, RetryConfig};
use super::VcsClient;
use crate::config::GitHubSource;
use crate::stats::{AuthorCounts, TimeWindow};
use crate::{CommitBoardError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for commit listing pages
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// Page size for the commits endpoint (GitHub maximum)
const PER_PAGE: usize = 100;

/// GitHub REST API adapter
pub struct GitHubBackend {
    name: String,
    client: Client,
    config: GitHubSource,
    api_base_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

/// One entry from `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Clone, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
    /// Linked GitHub account, when GitHub could resolve one
    #[serde(default)]
    author: Option<AccountRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommitDetail {
    author: GitAuthor,
}

#[derive(Debug, Clone, Deserialize)]
struct GitAuthor {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AccountRef {
    login: String,
}

impl GitHubBackend {
    /// Create a new GitHub adapter from source parameters.
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(name: String, config: GitHubSource) -> Result<Self> {
        let client = Client::builder()
            .timeout(LIST_TIMEOUT)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("commitboard/0.3"),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/vnd.github.v3+json"),
                );
                headers
            })
            .build()?;

        let base_url = config.url.trim_end_matches('/');
        let api_base_url = if base_url.contains("api.github.com") {
            base_url.to_string()
        } else if base_url.contains("github.com") {
            "https://api.github.com".to_string()
        } else {
            // GitHub Enterprise
            format!("{}/api/v3", base_url)
        };

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
            config,
            api_base_url,
            auth_token,
            retry: RetryConfig::default(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Fetch one page of the commit listing.
    async fn fetch_page(&self, window: &TimeWindow, page: u32) -> Result<Vec<CommitEntry>> {
        let url = format!(
            "{}/repos/{}/{}/commits",
            self.api_base_url, self.config.owner, self.config.repo
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("since", window.from().to_rfc3339())])
            .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);

        if let Some(until) = window.to() {
            request = request.query(&[("until", until.to_rfc3339())]);
        }
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(CommitBoardError::Other(
                "GitHub authentication failed".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(CommitBoardError::Other(format!(
                "Repository not found: {}/{}",
                self.config.owner, self.config.repo
            ))),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(CommitBoardError::Other(format!(
                    "GitHub API error: HTTP {}: {}",
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
            let entries = with_retry(&self.retry, "github list commits", || {
                self.fetch_page(window, page)
            })
            .await?;

            let page_len = entries.len();
            all.extend(entries);

            debug!(
                backend = %self.name,
                page = page,
                fetched = page_len,
                "Fetched GitHub commits page"
            );

            if page_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// Author identity for one commit: the GitHub login when the commit is
    /// linked to an account, otherwise the raw git author name.
    fn author_identity(entry: &CommitEntry) -> String {
        match &entry.author {
            Some(account) => account.login.clone(),
            None => entry.commit.author.name.clone(),
        }
    }

    fn fold_counts(entries: &[CommitEntry]) -> AuthorCounts {
        let mut counts = AuthorCounts::new();
        for entry in entries {
            *counts.entry(Self::author_identity(entry)).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait]
impl VcsClient for GitHubBackend {
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
            "GitHub commit listing complete"
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
