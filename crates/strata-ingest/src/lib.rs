// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion coordinator for the Strata messaging pipeline.
//!
//! Orchestrates the window cache, the primary store, and the archival
//! pipeline for every inbound message, and serves the cache-then-store
//! read path.

pub mod coordinator;
pub mod locks;

pub use coordinator::{IngestState, IngestionCoordinator};
pub use locks::ArchivalGuards;
