// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External collaborator interfaces consumed by the ingestion pipeline.
//!
//! User registration, block management, and group management live in other
//! services. The pipeline only queries them through these traits and never
//! writes to them.

use async_trait::async_trait;

use crate::error::StrataError;
use crate::types::{GroupId, UserId};

/// Lookup of known platform users.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Whether a user id is known to the platform.
    async fn exists(&self, user: &UserId) -> Result<bool, StrataError>;
}

/// Lookup of sender/receiver block relationships.
#[async_trait]
pub trait BlockList: Send + Sync + 'static {
    /// Whether `receiver` has blocked `sender`.
    async fn is_blocked(&self, sender: &UserId, receiver: &UserId)
        -> Result<bool, StrataError>;
}

/// Lookup of group membership for fan-out.
#[async_trait]
pub trait GroupMembership: Send + Sync + 'static {
    /// All member user ids of a group.
    async fn members_of(&self, group: &GroupId) -> Result<Vec<UserId>, StrataError>;
}
