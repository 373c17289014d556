//! Integration tests for CommitBoard
//!
//! These tests verify the full workflow from config loading through
//! aggregation, exercising the merge semantics against mock backends.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use commitboard::aggregator::{CompositeClient, CompositeConfig};
use commitboard::backends::{build_clients, VcsClient};
use commitboard::config::{BoardConfig, SourceConfig};
use commitboard::stats::{AuthorCounts, TimeWindow};
use commitboard::{CommitBoardError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Mock backend returning fixed per-author counts, tracking how often it
/// was queried.
struct StaticBackend {
    name: String,
    counts: AuthorCounts,
    calls: Arc<AtomicUsize>,
}

impl StaticBackend {
    fn new(name: &str, entries: &[(&str, u64)]) -> Self {
        Self {
            name: name.to_string(),
            counts: entries.iter().map(|(a, c)| (a.to_string(), *c)).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn boxed(name: &str, entries: &[(&str, u64)]) -> Box<dyn VcsClient> {
        Box::new(Self::new(name, entries))
    }

    fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl VcsClient for StaticBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commits_per_author(&self, _window: &TimeWindow) -> Result<AuthorCounts> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.counts.clone())
    }

    async fn total_commits(&self, _window: &TimeWindow) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.counts.values().sum())
    }
}

/// Mock backend that always reports itself unavailable.
struct FailingBackend {
    name: String,
}

impl FailingBackend {
    fn boxed(name: &str) -> Box<dyn VcsClient> {
        Box::new(Self {
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl VcsClient for FailingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commits_per_author(&self, _window: &TimeWindow) -> Result<AuthorCounts> {
        Err(CommitBoardError::unavailable(&self.name, "connection refused"))
    }

    async fn total_commits(&self, _window: &TimeWindow) -> Result<u64> {
        Err(CommitBoardError::unavailable(&self.name, "connection refused"))
    }
}

fn window() -> TimeWindow {
    TimeWindow::since(Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap())
}

mod config_tests {
    use super::*;

    #[test]
    fn test_config_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = BoardConfig::new();
        config.add_source(SourceConfig::github("platform", "acme", "platform"));
        config.add_source(SourceConfig::gitlab("infra", "acme/infra"));
        config.add_source(SourceConfig::local_git("scratch", "/tmp/scratch"));
        config.query.backend_timeout_secs = 10;

        config.save(&config_path).unwrap();

        let loaded = BoardConfig::load(&config_path).unwrap();
        assert_eq!(loaded.sources.len(), 3);
        assert_eq!(loaded.source_names(), vec!["platform", "infra", "scratch"]);
        assert_eq!(loaded.query.backend_timeout_secs, 10);
    }

    #[test]
    fn test_config_rejects_duplicate_names() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = BoardConfig::new();
        config.add_source(SourceConfig::github("x", "acme", "a"));
        config.add_source(SourceConfig::gitlab("x", "acme/b"));
        config.save(&config_path).unwrap();

        // validate() runs on load
        let err = BoardConfig::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("Duplicate source name"));
    }

    #[test]
    fn test_backends_built_from_config() {
        let mut config = BoardConfig::new();
        config.add_source(SourceConfig::github("platform", "acme", "platform"));
        config.add_source(SourceConfig::local_git("scratch", "/tmp/scratch"));

        let backends = build_clients(&config.sources).unwrap();
        assert_eq!(backends.len(), 2);
        assert_eq!(backends[0].name(), "platform");
        assert_eq!(backends[1].name(), "scratch");
    }
}

mod aggregation_tests {
    use super::*;

    #[tokio::test]
    async fn test_total_equals_sum_over_backends() {
        let client = CompositeClient::new(vec![
            StaticBackend::boxed("a", &[("alice", 3), ("bob", 1)]),
            StaticBackend::boxed("b", &[("carol", 4)]),
            StaticBackend::boxed("c", &[("dave", 2), ("erin", 2)]),
        ]);

        // 4 + 4 + 4
        assert_eq!(client.total_commits(&window()).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_cross_operation_consistency() {
        let client = CompositeClient::new(vec![
            StaticBackend::boxed("a", &[("alice", 3), ("bob", 1)]),
            StaticBackend::boxed("b", &[("alice", 2), ("carol", 4)]),
        ]);
        let w = window();

        let counts = client.commits_per_author(&w).await.unwrap();
        let total = client.total_commits(&w).await.unwrap();

        assert_eq!(counts.values().sum::<u64>(), total);
    }

    #[tokio::test]
    async fn test_collision_sums_not_overwrites() {
        let client = CompositeClient::new(vec![
            StaticBackend::boxed("a", &[("alice", 3)]),
            StaticBackend::boxed("b", &[("alice", 2)]),
        ]);

        let counts = client.commits_per_author(&window()).await.unwrap();
        assert_eq!(counts.get("alice"), Some(&5));
    }

    #[tokio::test]
    async fn test_merge_is_commutative() {
        let w = window();

        let forward = CompositeClient::new(vec![
            StaticBackend::boxed("a", &[("alice", 3), ("bob", 1)]),
            StaticBackend::boxed("b", &[("alice", 2), ("carol", 4)]),
        ]);
        let reversed = CompositeClient::new(vec![
            StaticBackend::boxed("b", &[("alice", 2), ("carol", 4)]),
            StaticBackend::boxed("a", &[("alice", 3), ("bob", 1)]),
        ]);

        assert_eq!(
            forward.commits_per_author(&w).await.unwrap(),
            reversed.commits_per_author(&w).await.unwrap()
        );
        assert_eq!(
            forward.total_commits(&w).await.unwrap(),
            reversed.total_commits(&w).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_merge_is_associative_under_grouping() {
        let w = window();
        let a = || StaticBackend::boxed("a", &[("alice", 3), ("bob", 1)]);
        let b = || StaticBackend::boxed("b", &[("alice", 2)]);
        let c = || StaticBackend::boxed("c", &[("bob", 5), ("carol", 1)]);

        // The composite satisfies the same contract as a single backend,
        // so composites nest: merge({a,b}) then c vs a then merge({b,c}).
        let left: Box<dyn VcsClient> =
            Box::new(CompositeClient::new(vec![a(), b()]));
        let grouped_left = CompositeClient::new(vec![left, c()]);

        let right: Box<dyn VcsClient> =
            Box::new(CompositeClient::new(vec![b(), c()]));
        let grouped_right = CompositeClient::new(vec![a(), right]);

        let flat = CompositeClient::new(vec![a(), b(), c()]);

        let expected = flat.commits_per_author(&w).await.unwrap();
        assert_eq!(grouped_left.commits_per_author(&w).await.unwrap(), expected);
        assert_eq!(grouped_right.commits_per_author(&w).await.unwrap(), expected);

        let expected_total = flat.total_commits(&w).await.unwrap();
        assert_eq!(grouped_left.total_commits(&w).await.unwrap(), expected_total);
        assert_eq!(grouped_right.total_commits(&w).await.unwrap(), expected_total);
    }

    #[tokio::test]
    async fn test_zero_backends() {
        let client = CompositeClient::new(Vec::new());
        let w = window();

        assert_eq!(client.total_commits(&w).await.unwrap(), 0);
        assert!(client.commits_per_author(&w).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spec_worked_example() {
        // A={bob:2, carol:1} total 3; B={carol:4} total 4
        // -> merged {bob:2, carol:5}, total 7
        let client = CompositeClient::new(vec![
            StaticBackend::boxed("a", &[("bob", 2), ("carol", 1)]),
            StaticBackend::boxed("b", &[("carol", 4)]),
        ]);
        let w = window();

        let counts = client.commits_per_author(&w).await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("bob"), Some(&2));
        assert_eq!(counts.get("carol"), Some(&5));
        assert_eq!(client.total_commits(&w).await.unwrap(), 7);
    }
}

mod failure_policy_tests {
    use super::*;

    #[tokio::test]
    async fn test_one_failing_backend_of_three() {
        let client = CompositeClient::new(vec![
            StaticBackend::boxed("a", &[("alice", 1), ("bob", 2)]),
            FailingBackend::boxed("broken"),
            StaticBackend::boxed("c", &[("alice", 3)]),
        ]);
        let w = window();

        let counts = client.commits_per_author(&w).await.unwrap();
        assert_eq!(counts.get("alice"), Some(&4));
        assert_eq!(counts.get("bob"), Some(&2));
        assert_eq!(client.total_commits(&w).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_require_all_propagates_backend_identity() {
        let client = CompositeClient::with_config(
            vec![
                StaticBackend::boxed("a", &[("alice", 1)]),
                FailingBackend::boxed("broken"),
            ],
            CompositeConfig {
                require_all: true,
                ..Default::default()
            },
        );

        let err = client.total_commits(&window()).await.unwrap_err();
        match err {
            CommitBoardError::BackendUnavailable { backend, reason } => {
                assert_eq!(backend, "broken");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_window_fails_before_any_dispatch() {
        let backend = StaticBackend::new("a", &[("alice", 1)]);
        let calls = backend.call_counter();
        let _client = CompositeClient::new(vec![Box::new(backend)]);

        // The inverted window cannot be constructed, so no query can carry
        // it to a backend.
        let from = Utc.with_ymd_and_hms(2026, 7, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let err = TimeWindow::new(from, Some(to)).unwrap_err();

        assert!(matches!(err, CommitBoardError::InvalidWindow { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_deadline_overrun_is_skipped_not_fatal() {
        struct SlowBackend;

        #[async_trait]
        impl VcsClient for SlowBackend {
            fn name(&self) -> &str {
                "slow"
            }

            async fn commits_per_author(&self, _window: &TimeWindow) -> Result<AuthorCounts> {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(AuthorCounts::new())
            }

            async fn total_commits(&self, _window: &TimeWindow) -> Result<u64> {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(0)
            }
        }

        let client = CompositeClient::with_config(
            vec![
                Box::new(SlowBackend),
                StaticBackend::boxed("fast", &[("alice", 2)]),
            ],
            CompositeConfig {
                backend_timeout: Duration::from_millis(20),
                require_all: false,
            },
        );
        let w = window();

        let counts = client.commits_per_author(&w).await.unwrap();
        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.len(), 1);
        assert_eq!(client.total_commits(&w).await.unwrap(), 2);
    }
}
