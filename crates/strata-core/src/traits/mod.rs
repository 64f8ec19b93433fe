// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter and collaborator trait definitions for the Strata tiers.
//!
//! All tier adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. Collaborator
//! traits (directory, block list, groups) are plain query interfaces.

pub mod adapter;
pub mod archive;
pub mod cache;
pub mod directory;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use archive::ArchiveAdapter;
pub use cache::CacheAdapter;
pub use directory::{BlockList, GroupMembership, UserDirectory};
pub use store::MessageStoreAdapter;
