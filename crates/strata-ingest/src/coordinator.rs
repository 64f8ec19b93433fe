// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message ingestion state machine.
//!
//! Each inbound message runs Validating -> CacheUpdating -> Persisting ->
//! MetadataUpdating -> ArchivalCheck -> Complete as an independent unit of
//! work; Rejected is terminal out of Validating and writes nothing. Many
//! units may run concurrently, including within one conversation: the only
//! serialization points are the version-conditioned metadata write and the
//! per-conversation archival guard.
//!
//! The coordinator integrates:
//! - **Window cache**: best-effort append-or-rebuild, never blocking
//! - **Primary store**: the durable write plus the metadata CAS loop
//! - **Archival pipeline**: triggered inline by the write that crosses the
//!   per-conversation threshold

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use strata_archive::Archiver;
use strata_config::StrataConfig;
use strata_core::types::{
    ChatKey, ChatMetadata, ConversationWindow, GroupId, Message, MessageId, UserId,
};
use strata_core::{
    ArchiveAdapter, BlockList, CacheAdapter, GroupMembership, MessageStoreAdapter,
    RejectionReason, StrataError, UserDirectory,
};

use crate::locks::ArchivalGuards;

/// Bounded attempts for the metadata read-modify-write loop.
///
/// A task loses at most one attempt per other writer that commits inside
/// its read-write interval, so the bound caps how many same-conversation
/// writers can race before an ingestion gives up with `Internal`.
const MAX_METADATA_ATTEMPTS: u32 = 8;

/// States an ingested message moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    /// Checking that both parties exist and the sender is not blocked.
    Validating,
    /// Appending to (or rebuilding) the conversation window cache.
    CacheUpdating,
    /// Writing the message to the primary store.
    Persisting,
    /// Bumping the per-conversation counters.
    MetadataUpdating,
    /// Deciding whether this write crossed the archival threshold.
    ArchivalCheck,
    /// Message durable, counters consistent, caller gets the record.
    Complete,
    /// Terminal failure out of Validating; nothing was written.
    Rejected,
}

impl std::fmt::Display for IngestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestState::Validating => write!(f, "validating"),
            IngestState::CacheUpdating => write!(f, "cache_updating"),
            IngestState::Persisting => write!(f, "persisting"),
            IngestState::MetadataUpdating => write!(f, "metadata_updating"),
            IngestState::ArchivalCheck => write!(f, "archival_check"),
            IngestState::Complete => write!(f, "complete"),
            IngestState::Rejected => write!(f, "rejected"),
        }
    }
}

/// Orchestrates the three tiers for every inbound message.
///
/// Constructed once at process startup with its collaborators and handed
/// out behind an `Arc`; it holds no per-message state.
pub struct IngestionCoordinator {
    cache: Arc<dyn CacheAdapter>,
    store: Arc<dyn MessageStoreAdapter>,
    archiver: Archiver,
    users: Arc<dyn UserDirectory>,
    blocks: Arc<dyn BlockList>,
    groups: Arc<dyn GroupMembership>,
    guards: ArchivalGuards,
    window_size: usize,
    cache_ttl: Duration,
    db_limit: u64,
}

impl IngestionCoordinator {
    pub fn new(
        cache: Arc<dyn CacheAdapter>,
        store: Arc<dyn MessageStoreAdapter>,
        archive: Arc<dyn ArchiveAdapter>,
        users: Arc<dyn UserDirectory>,
        blocks: Arc<dyn BlockList>,
        groups: Arc<dyn GroupMembership>,
        config: &StrataConfig,
    ) -> Self {
        Self {
            archiver: Archiver::new(store.clone(), archive),
            cache,
            store,
            users,
            blocks,
            groups,
            guards: ArchivalGuards::new(),
            window_size: config.cache.window_size,
            cache_ttl: Duration::from_secs(config.cache.ttl_secs),
            db_limit: config.archive.db_limit,
        }
    }

    /// Ingest one message from `sender` to `receiver`.
    ///
    /// Returns the persisted record, or a user-visible error: a rejection
    /// from validation, a duplicate-id collision, or an internal failure.
    /// Cache and archival degradations never surface here.
    pub async fn ingest(
        &self,
        sender: &UserId,
        receiver: &UserId,
        content: &str,
    ) -> Result<Message, StrataError> {
        let mut state = IngestState::Validating;
        debug!(%sender, %receiver, %state, "ingestion started");

        if let Err(e) = self.validate(sender, receiver).await {
            state = IngestState::Rejected;
            debug!(%sender, %receiver, %state, error = %e, "ingestion rejected");
            return Err(e);
        }

        let message = Message {
            id: MessageId(uuid::Uuid::new_v4().to_string()),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        let chat = message.chat_key();

        state = IngestState::CacheUpdating;
        debug!(chat = %chat, %state, "updating conversation window");
        self.update_cache(&chat, &message).await;

        state = IngestState::Persisting;
        debug!(chat = %chat, message_id = %message.id, %state, "persisting message");
        self.store.put_message(&message).await?;

        state = IngestState::MetadataUpdating;
        debug!(chat = %chat, %state, "bumping conversation counters");
        let meta = self.bump_metadata(&chat, &message).await?;

        state = IngestState::ArchivalCheck;
        debug!(
            chat = %chat,
            %state,
            count = meta.message_count,
            limit = self.db_limit,
            "checking archival threshold"
        );
        if meta.message_count >= self.db_limit {
            self.maybe_archive(&chat, sender).await;
        }

        state = IngestState::Complete;
        debug!(chat = %chat, message_id = %message.id, %state, "ingestion complete");
        Ok(message)
    }

    /// Fan a group message out to one independent ingestion per member.
    ///
    /// Every member (minus the sender) gets its own message record and its
    /// own pass/fail; one member's rejection never blocks the others.
    pub async fn ingest_group(
        &self,
        sender: &UserId,
        group: &GroupId,
        content: &str,
    ) -> Result<Vec<(UserId, Result<Message, StrataError>)>, StrataError> {
        let members = self.groups.members_of(group).await?;
        let deliveries = members
            .into_iter()
            .filter(|member| member != sender)
            .map(|member| async move {
                let outcome = self.ingest(sender, &member, content).await;
                (member, outcome)
            });
        Ok(futures::future::join_all(deliveries).await)
    }

    /// Read path: serve the conversation window cache-first, falling back
    /// to a store rebuild that repopulates the cache.
    pub async fn fetch_recent(
        &self,
        user: &UserId,
        peer: &UserId,
    ) -> Result<Vec<Message>, StrataError> {
        let chat = ChatKey::new(user, peer);
        match self.cache.get_window(&chat).await {
            Ok(Some(window)) => return Ok(window.messages),
            Ok(None) => {}
            Err(e) => warn!(chat = %chat, error = %e, "cache read failed, serving from store"),
        }

        let window = self.rebuild_window(&chat).await?;
        if let Err(e) = self.cache.put_window(&chat, &window, self.cache_ttl).await {
            warn!(chat = %chat, error = %e, "cache repopulation failed");
        }
        Ok(window.messages)
    }

    async fn validate(&self, sender: &UserId, receiver: &UserId) -> Result<(), StrataError> {
        if !self.users.exists(sender).await? || !self.users.exists(receiver).await? {
            return Err(StrataError::Rejected(RejectionReason::UnknownUser));
        }
        if self.blocks.is_blocked(sender, receiver).await? {
            return Err(StrataError::Rejected(RejectionReason::Blocked));
        }
        Ok(())
    }

    /// Best-effort window maintenance. Cache reads and writes race
    /// harmlessly (last write wins, bounded by TTL); any failure degrades
    /// to a warn and the pipeline proceeds uncached.
    async fn update_cache(&self, chat: &ChatKey, message: &Message) {
        let cached = match self.cache.get_window(chat).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(chat = %chat, error = %e, "cache read failed, rebuilding from store");
                None
            }
        };

        let mut window = match cached {
            Some(window) => window,
            None => match self.rebuild_window(chat).await {
                Ok(window) => window,
                Err(e) => {
                    warn!(chat = %chat, error = %e, "window rebuild failed, skipping cache update");
                    return;
                }
            },
        };

        window.append(message.clone(), self.window_size);
        if let Err(e) = self.cache.put_window(chat, &window, self.cache_ttl).await {
            warn!(chat = %chat, error = %e, "cache write failed, proceeding uncached");
        }
    }

    /// Last `window_size` live messages of the conversation, oldest first.
    async fn rebuild_window(&self, chat: &ChatKey) -> Result<ConversationWindow, StrataError> {
        let mut messages = self.store.list_by_conversation(chat).await?;
        if messages.len() > self.window_size {
            messages.drain(..messages.len() - self.window_size);
        }
        Ok(ConversationWindow::from_messages(messages))
    }

    /// createOrUpdate as a read-modify-write loop over the version column.
    ///
    /// Two concurrent ingestions into one conversation serialize here: the
    /// loser of a conditional write re-reads and retries, so no increment
    /// is ever dropped. Exhausting the retry budget is an internal error.
    async fn bump_metadata(
        &self,
        chat: &ChatKey,
        message: &Message,
    ) -> Result<ChatMetadata, StrataError> {
        for attempt in 0..MAX_METADATA_ATTEMPTS {
            match self.store.get_metadata(chat).await? {
                None => {
                    let meta = ChatMetadata::first(message);
                    if self.store.insert_metadata(&meta).await? {
                        return Ok(meta);
                    }
                }
                Some(current) => {
                    let mut next = current.apply(message);
                    if self.store.update_metadata(&next, current.version).await? {
                        next.version = current.version + 1;
                        return Ok(next);
                    }
                }
            }
            debug!(chat = %chat, attempt, "metadata update lost a race, retrying");
        }
        Err(StrataError::Internal(format!(
            "metadata update for {chat} lost {MAX_METADATA_ATTEMPTS} consecutive races"
        )))
    }

    /// Inline archival for the write that crossed the threshold.
    ///
    /// Failures are logged, never surfaced: the conversation stays over
    /// threshold and the next qualifying ingestion retries. The guard only
    /// serializes archival passes; it is not held by ordinary updates.
    async fn maybe_archive(&self, chat: &ChatKey, owner: &UserId) {
        let guard = self.guards.guard_for(chat);
        let _held = guard.lock().await;

        // Another writer may have archived while we waited for the guard.
        let still_over = match self.store.get_metadata(chat).await {
            Ok(Some(meta)) => meta.message_count >= self.db_limit,
            Ok(None) => false,
            Err(e) => {
                warn!(chat = %chat, error = %e, "metadata re-read before archival failed");
                false
            }
        };
        if !still_over {
            debug!(chat = %chat, "another writer archived first, skipping");
            return;
        }

        match self.archiver.archive_conversation(chat, owner).await {
            Ok(count) => debug!(chat = %chat, count, "inline archival finished"),
            Err(e) => warn!(
                chat = %chat,
                error = %e,
                "archival failed, will retry on next threshold crossing"
            ),
        }
    }
}
