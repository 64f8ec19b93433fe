// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Strata pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message. Generated once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical unordered key for a 1:1 conversation.
///
/// The lexically smaller participant id is always stored first, so the key
/// built from (a, b) equals the key built from (b, a). Rendered and persisted
/// as `"{first}:{second}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatKey {
    first: UserId,
    second: UserId,
}

impl ChatKey {
    pub fn new(a: &UserId, b: &UserId) -> Self {
        if a.0 <= b.0 {
            Self {
                first: a.clone(),
                second: b.clone(),
            }
        } else {
            Self {
                first: b.clone(),
                second: a.clone(),
            }
        }
    }

    /// Both participants, lexical order.
    pub fn participants(&self) -> (&UserId, &UserId) {
        (&self.first, &self.second)
    }

    /// The other participant, given one side of the conversation.
    pub fn peer_of(&self, user: &UserId) -> &UserId {
        if &self.first == user {
            &self.second
        } else {
            &self.first
        }
    }

    /// Parse the canonical `"{a}:{b}"` rendering back into a key.
    pub fn from_canonical(s: &str) -> Option<Self> {
        let (a, b) = s.split_once(':')?;
        if a.is_empty() || b.is_empty() {
            return None;
        }
        Some(Self::new(&UserId(a.to_string()), &UserId(b.to_string())))
    }
}

impl std::fmt::Display for ChatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

/// An immutable chat message.
///
/// Created once at ingestion, deleted only by archival, never mutated. A
/// message lives in the primary store while hot and in cold storage once
/// archived, never in both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// The conversation this message belongs to.
    pub fn chat_key(&self) -> ChatKey {
        ChatKey::new(&self.sender_id, &self.receiver_id)
    }
}

/// Bounded recent-message cache entry for one conversation.
///
/// A cache-layer projection of the most recent messages in the primary
/// store. Never authoritative: it may be absent or stale at any time and is
/// always reconstructable from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationWindow {
    pub messages: Vec<Message>,
    pub start_index: Option<MessageId>,
    pub end_index: Option<MessageId>,
}

impl ConversationWindow {
    /// Build a window from messages already in chronological order.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let start_index = messages.first().map(|m| m.id.clone());
        let end_index = messages.last().map(|m| m.id.clone());
        Self {
            messages,
            start_index,
            end_index,
        }
    }

    /// Append a message to the tail, evicting from the head (oldest first)
    /// until the window holds at most `max_size` messages.
    ///
    /// Pure over the window value; the caller persists the result via the
    /// cache adapter.
    pub fn append(&mut self, message: Message, max_size: usize) {
        self.messages.push(message);
        while self.messages.len() > max_size {
            self.messages.remove(0);
        }
        self.start_index = self.messages.first().map(|m| m.id.clone());
        self.end_index = self.messages.last().map(|m| m.id.clone());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Per-conversation counters and pointers.
///
/// `message_count` tracks live (non-archived) messages only. `version` is
/// the optimistic-concurrency token; every successful store write bumps it,
/// and conditional updates compare against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMetadata {
    pub chat_id: ChatKey,
    pub message_count: u64,
    pub start_index: Option<MessageId>,
    pub end_index: Option<MessageId>,
    pub latest_timestamp: DateTime<Utc>,
    pub version: u64,
}

impl ChatMetadata {
    /// Metadata for a conversation's first message.
    pub fn first(message: &Message) -> Self {
        Self {
            chat_id: message.chat_key(),
            message_count: 1,
            start_index: Some(message.id.clone()),
            end_index: Some(message.id.clone()),
            latest_timestamp: message.timestamp,
            version: 0,
        }
    }

    /// The successor state after one more ingested message: count bumped,
    /// end pointer and latest timestamp moved, start pointer untouched.
    pub fn apply(&self, message: &Message) -> Self {
        Self {
            chat_id: self.chat_id.clone(),
            message_count: self.message_count + 1,
            start_index: self.start_index.clone(),
            end_index: Some(message.id.clone()),
            latest_timestamp: message.timestamp,
            version: self.version,
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the storage tier an adapter serves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Cache,
    Store,
    Archive,
}
