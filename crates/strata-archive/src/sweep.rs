// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduler-driven retention sweep over the primary store.
//!
//! For every conversation with live messages: write a full backup batch to
//! cold storage, then expire messages older than the retention window and
//! bring the conversation counters back in line with what is still live.
//! The same put-before-delete ordering as the inline pipeline applies, so
//! an aborted sweep never loses a message.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use strata_core::types::ChatKey;
use strata_core::{ArchiveAdapter, MessageStoreAdapter, StrataError};

use crate::keys;

/// Bounded attempts to reconcile a conversation's counters after expiry.
const MAX_RECONCILE_ATTEMPTS: u32 = 3;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Conversations backed up to cold storage.
    pub conversations_archived: usize,
    /// Messages removed from the primary store.
    pub messages_expired: u64,
}

/// Periodic backup-and-expire pass, meant to be driven by an external
/// scheduler (cron, timer task).
pub struct RetentionSweep {
    store: Arc<dyn MessageStoreAdapter>,
    archive: Arc<dyn ArchiveAdapter>,
}

impl RetentionSweep {
    pub fn new(store: Arc<dyn MessageStoreAdapter>, archive: Arc<dyn ArchiveAdapter>) -> Self {
        Self { store, archive }
    }

    /// Run one sweep: back up every conversation, then expire messages
    /// older than `retention_hours`.
    pub async fn run(&self, retention_hours: u64) -> Result<SweepOutcome, StrataError> {
        let cutoff = Utc::now() - Duration::hours(retention_hours as i64);
        let chats = self.store.list_conversations().await?;

        let mut conversations_archived = 0;
        let mut messages_expired = 0u64;

        for chat in &chats {
            let snapshot = self.store.list_by_conversation(chat).await?;
            if snapshot.is_empty() {
                continue;
            }

            let body = serde_json::to_vec(&snapshot)
                .map_err(|e| StrataError::Internal(format!("serializing sweep batch: {e}")))?;
            let (owner, _) = chat.participants();
            let key = keys::conversation_batch(owner, chat.peer_of(owner), Utc::now());
            self.archive.put_object(&key, body).await?;
            conversations_archived += 1;

            let expired: Vec<_> = snapshot
                .iter()
                .filter(|m| m.timestamp < cutoff)
                .collect();
            if expired.is_empty() {
                continue;
            }
            for msg in &expired {
                self.store.delete_message(&msg.id).await?;
            }
            messages_expired += expired.len() as u64;

            self.reconcile_counters(chat).await?;
        }

        info!(
            conversations = conversations_archived,
            expired = messages_expired,
            retention_hours,
            "retention sweep complete"
        );
        Ok(SweepOutcome {
            conversations_archived,
            messages_expired,
        })
    }

    /// Re-point a conversation's counters at whatever is still live after
    /// expiry. Concurrent ingestions may win intervening updates; a lost
    /// race is retried with a fresh read a bounded number of times.
    async fn reconcile_counters(&self, chat: &ChatKey) -> Result<(), StrataError> {
        for _ in 0..MAX_RECONCILE_ATTEMPTS {
            let Some(meta) = self.store.get_metadata(chat).await? else {
                return Ok(());
            };
            let live = self.store.list_by_conversation(chat).await?;

            if live.is_empty() {
                self.store.reset_metadata(chat, None).await?;
                return Ok(());
            }

            let mut next = meta.clone();
            next.message_count = live.len() as u64;
            next.start_index = live.first().map(|m| m.id.clone());
            if self.store.update_metadata(&next, meta.version).await? {
                return Ok(());
            }
        }
        // Leave the drift to the next sweep rather than stalling the pass.
        warn!(chat = %chat, "counter reconciliation kept losing races, skipping");
        Ok(())
    }
}
