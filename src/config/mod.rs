//! Configuration system
//!
//! Declarative backend registration: the config file lists the backend
//! sources to aggregate over, consumed once at startup to build the adapter
//! list. Registration is a construction-time concern; there is no runtime
//! mutation API.

mod board_config;
mod source;

pub use board_config::{BoardConfig, QueryConfig};
pub use source::{GitHubSource, GitLabSource, LocalGitSource, SourceConfig, SourceKind};
