// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strata messaging pipeline.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Strata workspace. Tier backends (cache,
//! store, archive) implement traits defined here, and the ingestion
//! coordinator consumes them through `Arc<dyn …>` handles.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{RejectionReason, StrataError};
pub use types::{
    AdapterType, ChatKey, ChatMetadata, ConversationWindow, GroupId, HealthStatus, Message,
    MessageId, UserId,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    ArchiveAdapter, BlockList, CacheAdapter, GroupMembership, MessageStoreAdapter,
    PluginAdapter, UserDirectory,
};
