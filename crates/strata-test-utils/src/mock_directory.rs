// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborator services for deterministic testing.
//!
//! In-memory stand-ins for the external user directory, block list, and
//! group membership services the pipeline queries during validation and
//! fan-out.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use strata_core::types::{GroupId, UserId};
use strata_core::{BlockList, GroupMembership, StrataError, UserDirectory};

/// In-memory user directory.
#[derive(Default)]
pub struct MockDirectory {
    users: Mutex<HashSet<UserId>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user so validation accepts it.
    pub async fn add_user(&self, user: &UserId) {
        self.users.lock().await.insert(user.clone());
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn exists(&self, user: &UserId) -> Result<bool, StrataError> {
        Ok(self.users.lock().await.contains(user))
    }
}

/// In-memory block list.
#[derive(Default)]
pub struct MockBlockList {
    blocks: Mutex<HashSet<(UserId, UserId)>>,
}

impl MockBlockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `blocker` has blocked `blocked`.
    pub async fn block(&self, blocker: &UserId, blocked: &UserId) {
        self.blocks
            .lock()
            .await
            .insert((blocker.clone(), blocked.clone()));
    }
}

#[async_trait]
impl BlockList for MockBlockList {
    async fn is_blocked(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> Result<bool, StrataError> {
        Ok(self
            .blocks
            .lock()
            .await
            .contains(&(receiver.clone(), sender.clone())))
    }
}

/// In-memory group membership.
#[derive(Default)]
pub struct MockGroups {
    members: Mutex<HashMap<GroupId, Vec<UserId>>>,
}

impl MockGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the member list of a group.
    pub async fn set_members(&self, group: &GroupId, members: Vec<UserId>) {
        self.members.lock().await.insert(group.clone(), members);
    }
}

#[async_trait]
impl GroupMembership for MockGroups {
    async fn members_of(&self, group: &GroupId) -> Result<Vec<UserId>, StrataError> {
        Ok(self
            .members
            .lock()
            .await
            .get(group)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_knows_registered_users() {
        let dir = MockDirectory::new();
        let alice = UserId("alice".to_string());
        assert!(!dir.exists(&alice).await.unwrap());
        dir.add_user(&alice).await;
        assert!(dir.exists(&alice).await.unwrap());
    }

    #[tokio::test]
    async fn block_list_is_directional() {
        let blocks = MockBlockList::new();
        let alice = UserId("alice".to_string());
        let bob = UserId("bob".to_string());

        // Bob blocks Alice: Alice cannot send to Bob, but Bob can send to Alice.
        blocks.block(&bob, &alice).await;
        assert!(blocks.is_blocked(&alice, &bob).await.unwrap());
        assert!(!blocks.is_blocked(&bob, &alice).await.unwrap());
    }

    #[tokio::test]
    async fn groups_return_members_or_empty() {
        let groups = MockGroups::new();
        let team = GroupId("team".to_string());
        assert!(groups.members_of(&team).await.unwrap().is_empty());

        groups
            .set_members(&team, vec![UserId("alice".into()), UserId("bob".into())])
            .await;
        assert_eq!(groups.members_of(&team).await.unwrap().len(), 2);
    }
}
