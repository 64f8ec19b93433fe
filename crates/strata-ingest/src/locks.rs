// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation guards serializing archival passes.
//!
//! Ordinary metadata updates go through version-conditioned writes and need
//! no lock. Only the archival pass must not interleave with another archival
//! pass for the same conversation; the guard is held across the
//! snapshot/put/delete/reset sequence and nothing else, so ingestion for
//! other conversations (and non-archiving ingestion for the same one) never
//! waits on cold-storage latency.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use strata_core::types::ChatKey;

/// Registry of per-conversation archival mutexes.
#[derive(Default)]
pub struct ArchivalGuards {
    guards: DashMap<String, Arc<Mutex<()>>>,
}

impl ArchivalGuards {
    pub fn new() -> Self {
        Self {
            guards: DashMap::new(),
        }
    }

    /// The guard for one conversation; every caller passing an equal key
    /// receives the same mutex.
    pub fn guard_for(&self, chat: &ChatKey) -> Arc<Mutex<()>> {
        self.guards
            .entry(chat.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
