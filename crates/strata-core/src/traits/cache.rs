// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache adapter trait for the ephemeral conversation-window tier.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StrataError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatKey, ConversationWindow};

/// Adapter for the fast ephemeral window cache.
///
/// The cache is best-effort: a miss is not an error, entries expire after
/// their TTL, and unavailability must never block ingestion. The
/// coordinator falls back to rebuilding the window from the primary store.
#[async_trait]
pub trait CacheAdapter: PluginAdapter {
    /// Look up the cached window for a conversation.
    ///
    /// Returns `Ok(None)` on a miss or an expired entry.
    async fn get_window(
        &self,
        chat: &ChatKey,
    ) -> Result<Option<ConversationWindow>, StrataError>;

    /// Replace the cached window for a conversation, (re)arming expiry to
    /// `ttl`. Overwrites are idempotent.
    async fn put_window(
        &self,
        chat: &ChatKey,
        window: &ConversationWindow,
        ttl: Duration,
    ) -> Result<(), StrataError>;
}
