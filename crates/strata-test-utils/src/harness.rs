// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles the full ingestion stack (temp SQLite store,
//! failable in-memory cache, filesystem archive, mock collaborators) and
//! exposes every tier for assertions alongside the coordinator itself.

use std::sync::Arc;

use strata_archive::FsArchive;
use strata_config::model::{ArchiveConfig, CacheConfig, StorageConfig, StrataConfig};
use strata_core::types::{GroupId, Message, UserId};
use strata_core::{MessageStoreAdapter, StrataError};
use strata_ingest::IngestionCoordinator;
use strata_storage::SqliteStore;

use crate::flaky_cache::FlakyCache;
use crate::mock_directory::{MockBlockList, MockDirectory, MockGroups};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    window_size: usize,
    ttl_secs: u64,
    db_limit: u64,
    users: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            window_size: 10,
            ttl_secs: 3600,
            db_limit: 1000,
            users: vec!["alice".to_string(), "bob".to_string()],
        }
    }

    /// Set the maximum number of messages per cached window.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the cache TTL in seconds.
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Set the per-conversation live-message count that triggers archival.
    pub fn with_db_limit(mut self, db_limit: u64) -> Self {
        self.db_limit = db_limit;
        self
    }

    /// Pre-register users in the directory (default: alice, bob).
    pub fn with_users(mut self, users: &[&str]) -> Self {
        self.users = users.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Build the test harness, creating all required tiers.
    pub async fn build(self) -> Result<TestHarness, StrataError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| StrataError::Storage {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("strata.db");
        let archive_dir = temp_dir.path().join("archive");

        let config = StrataConfig {
            cache: CacheConfig {
                window_size: self.window_size,
                ttl_secs: self.ttl_secs,
            },
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().into_owned(),
                wal_mode: true,
            },
            archive: ArchiveConfig {
                db_limit: self.db_limit,
                dir: archive_dir.to_string_lossy().into_owned(),
                ..ArchiveConfig::default()
            },
            ..StrataConfig::default()
        };

        let store = SqliteStore::new(config.storage.clone());
        store.initialize().await?;
        let store: Arc<dyn MessageStoreAdapter> = Arc::new(store);

        let cache = Arc::new(FlakyCache::new());
        let archive = Arc::new(FsArchive::new(archive_dir));
        let directory = Arc::new(MockDirectory::new());
        let blocks = Arc::new(MockBlockList::new());
        let groups = Arc::new(MockGroups::new());

        for user in &self.users {
            directory.add_user(&UserId(user.clone())).await;
        }

        let coordinator = Arc::new(IngestionCoordinator::new(
            cache.clone(),
            store.clone(),
            archive.clone(),
            directory.clone(),
            blocks.clone(),
            groups.clone(),
            &config,
        ));

        Ok(TestHarness {
            coordinator,
            cache,
            store,
            archive,
            directory,
            blocks,
            groups,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over temp storage.
///
/// Every tier is reachable for assertions; `ingest()` and `ingest_group()`
/// drive the full pipeline.
pub struct TestHarness {
    /// The coordinator under test.
    pub coordinator: Arc<IngestionCoordinator>,
    /// Window cache with outage injection.
    pub cache: Arc<FlakyCache>,
    /// SQLite message store (temp DB, cleaned up on drop).
    pub store: Arc<dyn MessageStoreAdapter>,
    /// Filesystem cold tier (temp dir, cleaned up on drop).
    pub archive: Arc<FsArchive>,
    /// Mock user directory.
    pub directory: Arc<MockDirectory>,
    /// Mock block list.
    pub blocks: Arc<MockBlockList>,
    /// Mock group membership.
    pub groups: Arc<MockGroups>,
    /// The configuration the stack was built from.
    pub config: StrataConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Ingest one message through the full pipeline.
    pub async fn ingest(
        &self,
        sender: &str,
        receiver: &str,
        content: &str,
    ) -> Result<Message, StrataError> {
        self.coordinator
            .ingest(
                &UserId(sender.to_string()),
                &UserId(receiver.to_string()),
                content,
            )
            .await
    }

    /// Fan a message out to a group through the full pipeline.
    pub async fn ingest_group(
        &self,
        sender: &str,
        group: &str,
        content: &str,
    ) -> Result<Vec<(UserId, Result<Message, StrataError>)>, StrataError> {
        self.coordinator
            .ingest_group(
                &UserId(sender.to_string()),
                &GroupId(group.to_string()),
                content,
            )
            .await
    }
}
