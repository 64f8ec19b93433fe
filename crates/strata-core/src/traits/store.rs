// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store adapter trait for the durable primary tier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StrataError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatKey, ChatMetadata, Message, MessageId, UserId};

/// Adapter for the durable primary record of live messages and their
/// per-conversation metadata.
///
/// Within a conversation, listings are ordered by timestamp with message id
/// as the deterministic tie-break. No ordering is guaranteed across
/// conversations.
#[async_trait]
pub trait MessageStoreAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), StrataError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), StrataError>;

    // --- Message operations ---

    /// Persist a new message keyed by its id.
    ///
    /// Fails with [`StrataError::DuplicateKey`] if the id already exists;
    /// existing messages are never silently overwritten.
    async fn put_message(&self, message: &Message) -> Result<(), StrataError>;

    /// All live messages sent by a user, ordered.
    async fn list_by_sender(&self, sender: &UserId) -> Result<Vec<Message>, StrataError>;

    /// All live messages between the two participants of a conversation.
    async fn list_by_conversation(&self, chat: &ChatKey) -> Result<Vec<Message>, StrataError>;

    /// Remove a single message. Idempotent: deleting an absent id succeeds.
    async fn delete_message(&self, id: &MessageId) -> Result<(), StrataError>;

    /// Remove every live message older than `cutoff`, returning the number
    /// deleted. Used by the retention sweep.
    async fn delete_messages_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StrataError>;

    /// Distinct chat keys that currently have live messages.
    async fn list_conversations(&self) -> Result<Vec<ChatKey>, StrataError>;

    // --- Metadata operations ---

    /// Fetch the metadata record for a conversation, if any.
    async fn get_metadata(&self, chat: &ChatKey) -> Result<Option<ChatMetadata>, StrataError>;

    /// Create the metadata record for a conversation's first message.
    ///
    /// Returns `false` when a concurrent insert already created the row
    /// (the caller re-reads and retries as an update).
    async fn insert_metadata(&self, metadata: &ChatMetadata) -> Result<bool, StrataError>;

    /// Conditional write: applies only while the stored version still
    /// equals `expected_version`, bumping it on success.
    ///
    /// Returns `false` when the race was lost and nothing was written.
    async fn update_metadata(
        &self,
        metadata: &ChatMetadata,
        expected_version: u64,
    ) -> Result<bool, StrataError>;

    /// Post-archival counter reset: `message_count` to zero, the start
    /// pointer to `new_start_index`, `latest_timestamp` untouched.
    async fn reset_metadata(
        &self,
        chat: &ChatKey,
        new_start_index: Option<MessageId>,
    ) -> Result<(), StrataError>;
}
