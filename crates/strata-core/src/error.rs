// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strata messaging pipeline.

use thiserror::Error;

/// Why an ingestion attempt was rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Sender or receiver is not a known user.
    UnknownUser,
    /// The sender is on the receiver's block list.
    Blocked,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::UnknownUser => write!(f, "unknown user"),
            RejectionReason::Blocked => write!(f, "sender is blocked by receiver"),
        }
    }
}

/// The primary error type used across all Strata adapter traits and the
/// ingestion pipeline.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Message rejected during validation; nothing was written.
    #[error("message rejected: {0}")]
    Rejected(RejectionReason),

    /// A message id collided with an existing live message. Fatal for this
    /// ingestion attempt; the caller retries with a fresh id.
    #[error("duplicate message id: {message_id}")]
    DuplicateKey { message_id: String },

    /// Storage backend errors (connection, query failure, I/O on reads).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cache tier unavailable. The coordinator swallows this and rebuilds
    /// the window from the primary store instead.
    #[error("cache unavailable: {source}")]
    CacheUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cold-storage write failed; the archival pass was aborted with every
    /// message left live.
    #[error("archive write failed: {source}")]
    ArchiveWrite {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors (exhausted metadata retries, corrupt rows).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrataError {
    /// Whether the failure is reported to the end caller. Cache and archival
    /// degradations stay internal; the caller only ever sees rejections,
    /// duplicate ids, and internal errors.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            StrataError::Rejected(_)
                | StrataError::DuplicateKey { .. }
                | StrataError::Internal(_)
        )
    }
}
