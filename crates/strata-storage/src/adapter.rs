// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MessageStoreAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use strata_config::model::StorageConfig;
use strata_core::types::{ChatKey, ChatMetadata, Message, MessageId, UserId};
use strata_core::{
    AdapterType, HealthStatus, MessageStoreAdapter, PluginAdapter, StrataError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`MessageStoreAdapter::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, StrataError> {
        self.db.get().ok_or_else(|| StrataError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, StrataError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StrataError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStoreAdapter for SqliteStore {
    async fn initialize(&self) -> Result<(), StrataError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| StrataError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), StrataError> {
        self.db()?.close().await
    }

    // --- Message operations ---

    async fn put_message(&self, message: &Message) -> Result<(), StrataError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn list_by_sender(&self, sender: &UserId) -> Result<Vec<Message>, StrataError> {
        queries::messages::list_by_sender(self.db()?, sender).await
    }

    async fn list_by_conversation(&self, chat: &ChatKey) -> Result<Vec<Message>, StrataError> {
        queries::messages::list_by_conversation(self.db()?, chat).await
    }

    async fn delete_message(&self, id: &MessageId) -> Result<(), StrataError> {
        queries::messages::delete_message(self.db()?, id).await
    }

    async fn delete_messages_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StrataError> {
        queries::messages::delete_messages_before(self.db()?, cutoff).await
    }

    async fn list_conversations(&self) -> Result<Vec<ChatKey>, StrataError> {
        queries::messages::list_conversations(self.db()?).await
    }

    // --- Metadata operations ---

    async fn get_metadata(&self, chat: &ChatKey) -> Result<Option<ChatMetadata>, StrataError> {
        queries::metadata::get_metadata(self.db()?, chat).await
    }

    async fn insert_metadata(&self, metadata: &ChatMetadata) -> Result<bool, StrataError> {
        queries::metadata::insert_metadata(self.db()?, metadata).await
    }

    async fn update_metadata(
        &self,
        metadata: &ChatMetadata,
        expected_version: u64,
    ) -> Result<bool, StrataError> {
        queries::metadata::update_metadata(self.db()?, metadata, expected_version).await
    }

    async fn reset_metadata(
        &self,
        chat: &ChatKey,
        new_start_index: Option<MessageId>,
    ) -> Result<(), StrataError> {
        queries::metadata::reset_metadata(self.db()?, chat, new_start_index).await
    }
}
