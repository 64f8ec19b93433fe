// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache adapter with injectable outages for degraded-mode testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use strata_cache::MemoryCache;
use strata_core::types::{ChatKey, ConversationWindow};
use strata_core::{AdapterType, CacheAdapter, HealthStatus, PluginAdapter, StrataError};

/// Wraps a [`MemoryCache`] and fails every operation while the outage
/// toggle is set, so tests can drive the coordinator's store-backed
/// fallback path.
#[derive(Default)]
pub struct FlakyCache {
    inner: MemoryCache,
    failing: AtomicBool,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the simulated outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `get_window` calls observed (including failed ones).
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `put_window` calls observed (including failed ones).
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn outage() -> StrataError {
        StrataError::CacheUnavailable {
            source: Box::new(std::io::Error::other("injected cache outage")),
        }
    }
}

#[async_trait]
impl PluginAdapter for FlakyCache {
    fn name(&self) -> &str {
        "flaky-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, StrataError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("injected outage".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), StrataError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl CacheAdapter for FlakyCache {
    async fn get_window(
        &self,
        chat: &ChatKey,
    ) -> Result<Option<ConversationWindow>, StrataError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.inner.get_window(chat).await
    }

    async fn put_window(
        &self,
        chat: &ChatKey,
        window: &ConversationWindow,
        ttl: Duration,
    ) -> Result<(), StrataError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.inner.put_window(chat, window, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::types::UserId;

    fn chat() -> ChatKey {
        ChatKey::new(&UserId("alice".into()), &UserId("bob".into()))
    }

    #[tokio::test]
    async fn passes_through_when_healthy() {
        let cache = FlakyCache::new();
        let window = ConversationWindow::default();
        cache
            .put_window(&chat(), &window, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get_window(&chat()).await.unwrap().is_some());
        assert_eq!(cache.get_count(), 1);
        assert_eq!(cache.put_count(), 1);
    }

    #[tokio::test]
    async fn fails_while_outage_is_set() {
        let cache = FlakyCache::new();
        cache.set_failing(true);

        let err = cache.get_window(&chat()).await.unwrap_err();
        assert!(matches!(err, StrataError::CacheUnavailable { .. }));

        let window = ConversationWindow::default();
        assert!(cache
            .put_window(&chat(), &window, Duration::from_secs(60))
            .await
            .is_err());

        // Recovery restores normal behavior.
        cache.set_failing(false);
        assert!(cache.get_window(&chat()).await.unwrap().is_none());
    }
}
