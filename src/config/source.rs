//! Backend source definitions
//!
//! A source is one independently-configured commit-data backend. The set of
//! sources is declarative: it is read once at startup and turned into
//! adapter instances, never mutated at runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// GitHub repository source parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSource {
    /// GitHub instance URL (e.g., "https://github.com" or an Enterprise host)
    #[serde(default = "default_github_url")]
    pub url: String,

    /// Organization or user
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Environment variable holding the API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

fn default_github_url() -> String {
    "https://github.com".to_string()
}

/// GitLab project source parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabSource {
    /// GitLab instance URL
    #[serde(default = "default_gitlab_url")]
    pub url: String,

    /// Project path (e.g., "group/project")
    pub project: String,

    /// Environment variable holding the API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

fn default_gitlab_url() -> String {
    "https://gitlab.com".to_string()
}

/// Local git checkout source parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalGitSource {
    /// Path to the working copy or bare repository
    pub path: PathBuf,
}

/// Backend-specific source parameters, tagged by `type` in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKind {
    Github(GitHubSource),
    Gitlab(GitLabSource),
    Git(LocalGitSource),
}

impl SourceKind {
    /// Human-readable backend type name, used in listings and errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            SourceKind::Github(_) => "github",
            SourceKind::Gitlab(_) => "gitlab",
            SourceKind::Git(_) => "git",
        }
    }

    /// The location this source reads from, for display.
    pub fn location(&self) -> String {
        match self {
            SourceKind::Github(s) => format!("{}/{}/{}", s.url.trim_end_matches('/'), s.owner, s.repo),
            SourceKind::Gitlab(s) => format!("{}/{}", s.url.trim_end_matches('/'), s.project),
            SourceKind::Git(s) => s.path.display().to_string(),
        }
    }
}

/// One named backend source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source name (e.g., "platform", "infra"). Appears in logs and in
    /// `BackendUnavailable` errors.
    pub name: String,

    /// Backend type and parameters
    #[serde(flatten)]
    pub kind: SourceKind,
}

impl SourceConfig {
    /// Create a GitHub source
    pub fn github(
        name: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Github(GitHubSource {
                url: default_github_url(),
                owner: owner.into(),
                repo: repo.into(),
                token_env: None,
            }),
        }
    }

    /// Create a GitLab source
    pub fn gitlab(name: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Gitlab(GitLabSource {
                url: default_gitlab_url(),
                project: project.into(),
                token_env: None,
            }),
        }
    }

    /// Create a local git source
    pub fn local_git(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Git(LocalGitSource { path: path.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_source_defaults() {
        let source = SourceConfig::github("work", "acme", "platform");
        assert_eq!(source.name, "work");
        assert_eq!(source.kind.type_name(), "github");
        match &source.kind {
            SourceKind::Github(s) => {
                assert_eq!(s.url, "https://github.com");
                assert_eq!(s.owner, "acme");
                assert!(s.token_env.is_none());
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_source_yaml_tagging() {
        let yaml = r#"
name: infra
type: gitlab
url: https://gitlab.example.com
project: acme/infra
token_env: GITLAB_TOKEN
"#;
        let source: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(source.name, "infra");
        match &source.kind {
            SourceKind::Gitlab(s) => {
                assert_eq!(s.project, "acme/infra");
                assert_eq!(s.token_env.as_deref(), Some("GITLAB_TOKEN"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_local_git_roundtrip() {
        let source = SourceConfig::local_git("scratch", "/tmp/repo");
        let yaml = serde_yaml::to_string(&source).unwrap();
        assert!(yaml.contains("type: git"));

        let parsed: SourceConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.kind.location(), "/tmp/repo");
    }

    #[test]
    fn test_location_display() {
        let source = SourceConfig::github("work", "acme", "platform");
        assert_eq!(source.kind.location(), "https://github.com/acme/platform");
    }
}
