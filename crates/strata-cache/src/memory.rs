// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process conversation-window cache with per-entry TTL.
//!
//! Entries expire lazily: an expired window is dropped on the read that
//! finds it. Writes race harmlessly (last write wins, bounded by TTL).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use strata_core::types::{ChatKey, ConversationWindow};
use strata_core::{AdapterType, CacheAdapter, HealthStatus, PluginAdapter, StrataError};

struct CacheEntry {
    window: ConversationWindow,
    expires_at: Instant,
}

/// DashMap-backed window cache.
///
/// Stand-in for an external cache service in single-process deployments
/// and tests; anything implementing [`CacheAdapter`] can replace it.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of unexpired entries (expired ones may still be counted
    /// until a read evicts them).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, StrataError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StrataError> {
        self.entries.clear();
        Ok(())
    }
}

#[async_trait]
impl CacheAdapter for MemoryCache {
    async fn get_window(
        &self,
        chat: &ChatKey,
    ) -> Result<Option<ConversationWindow>, StrataError> {
        let key = chat.to_string();
        if let Some(entry) = self.entries.get(&key) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.window.clone()));
            }
        } else {
            return Ok(None);
        }
        // Entry exists but is past its deadline: evict it now.
        trace!(chat = %key, "evicting expired window");
        self.entries.remove(&key);
        Ok(None)
    }

    async fn put_window(
        &self,
        chat: &ChatKey,
        window: &ConversationWindow,
        ttl: Duration,
    ) -> Result<(), StrataError> {
        self.entries.insert(
            chat.to_string(),
            CacheEntry {
                window: window.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
