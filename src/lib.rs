//! CommitBoard - Multi-Backend Commit Statistics Aggregator
//!
//! CommitBoard queries any number of independently-configured
//! version-control backends (GitHub repositories, GitLab projects, local
//! git checkouts) for commit activity within a time window and merges the
//! results into one unified view, as if a single backend had answered.
//!
//! # Architecture
//!
//! - **stats**: Core data model (TimeWindow, author counts, merge rule)
//! - **backends**: The `VcsClient` capability contract and one adapter per
//!   backend type (GitHub, GitLab, local git)
//! - **aggregator**: `CompositeClient` — fans queries out to all configured
//!   backends and merges results, summing counts on author collision
//! - **config**: Declarative source list, consumed once at startup
//! - **error / logging**: Crate-wide error enum and tracing setup

// Core modules
pub mod config;
pub mod error;
pub mod stats;

// Components
pub mod aggregator;
pub mod backends;
pub mod logging;

// Re-exports
pub use error::{CommitBoardError, Result};
