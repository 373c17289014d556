//! CommitBoard configuration file handling
//!
//! Loads and manages the ~/.config/commitboard/config.yaml file.

use super::source::SourceConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Query behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Per-backend deadline for a single query, in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Abort the whole query if any single backend fails, instead of
    /// skipping the failed backend and returning the partial merge
    #[serde(default)]
    pub require_all: bool,
}

fn default_backend_timeout_secs() -> u64 {
    30
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            backend_timeout_secs: default_backend_timeout_secs(),
            require_all: false,
        }
    }
}

/// CommitBoard configuration
///
/// Represents the complete ~/.config/commitboard/config.yaml file: the
/// declarative backend source list plus query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Backend sources to aggregate over
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Query settings
    #[serde(default)]
    pub query: QueryConfig,
}

impl BoardConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            query: QueryConfig::default(),
        }
    }

    /// Load configuration from the default path (~/.config/commitboard/config.yaml)
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::CommitBoardError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading CommitBoard configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;

        tracing::debug!(sources = config.sources.len(), "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving CommitBoard configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/commitboard/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("commitboard");
        path.push("config.yaml");
        path
    }

    /// Check the source list for deployment mistakes.
    ///
    /// Duplicate or empty source names and empty backend parameters are
    /// configuration errors, surfaced at startup and never retried.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(crate::CommitBoardError::Config(
                    "Source with empty name".to_string(),
                ));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(crate::CommitBoardError::Config(format!(
                    "Duplicate source name: '{}'",
                    source.name
                )));
            }

            use super::source::SourceKind;
            match &source.kind {
                SourceKind::Github(s) => {
                    if s.owner.is_empty() || s.repo.is_empty() {
                        return Err(crate::CommitBoardError::Config(format!(
                            "Source '{}': owner and repo must be set",
                            source.name
                        )));
                    }
                }
                SourceKind::Gitlab(s) => {
                    if s.project.is_empty() {
                        return Err(crate::CommitBoardError::Config(format!(
                            "Source '{}': project must be set",
                            source.name
                        )));
                    }
                }
                SourceKind::Git(s) => {
                    if s.path.as_os_str().is_empty() {
                        return Err(crate::CommitBoardError::Config(format!(
                            "Source '{}': path must be set",
                            source.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Get a source by name
    pub fn get_source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Add a new source
    pub fn add_source(&mut self, source: SourceConfig) {
        self.sources.push(source);
    }

    /// Remove a source by name
    pub fn remove_source(&mut self, name: &str) -> Option<SourceConfig> {
        self.sources
            .iter()
            .position(|s| s.name == name)
            .map(|index| self.sources.remove(index))
    }

    /// All configured source names, in declaration order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}
