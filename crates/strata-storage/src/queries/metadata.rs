// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation metadata operations.
//!
//! All writes go through the version column: `insert_metadata` loses to a
//! concurrent insert, `update_metadata` is a conditional single-statement
//! UPDATE, and both report the race to the caller instead of clobbering.

use rusqlite::{params, OptionalExtension};

use strata_core::StrataError;

use crate::database::{map_tr_err, Database};
use crate::models::{encode_timestamp, ChatKey, ChatMetadata, MessageId};

/// Fetch the metadata record for a conversation.
pub async fn get_metadata(
    db: &Database,
    chat: &ChatKey,
) -> Result<Option<ChatMetadata>, StrataError> {
    let chat_id = chat.to_string();
    let row = db
        .connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT chat_id, message_count, start_index, end_index,
                            latest_timestamp, version
                     FROM chat_metadata WHERE chat_id = ?1",
                    params![chat_id],
                    |row| {
                        let chat_id: String = row.get(0)?;
                        let count: i64 = row.get(1)?;
                        let start: Option<String> = row.get(2)?;
                        let end: Option<String> = row.get(3)?;
                        let ts: String = row.get(4)?;
                        let version: i64 = row.get(5)?;
                        Ok((chat_id, count, start, end, ts, version))
                    },
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)?;

    let Some((chat_id, count, start, end, ts, version)) = row else {
        return Ok(None);
    };

    let chat_id = ChatKey::from_canonical(&chat_id)
        .ok_or_else(|| StrataError::Internal(format!("corrupt chat_id column: {chat_id}")))?;
    let latest_timestamp = chrono::DateTime::parse_from_rfc3339(&ts)
        .map(|d| d.with_timezone(&chrono::Utc))
        .map_err(|e| StrataError::Internal(format!("corrupt latest_timestamp column: {e}")))?;

    Ok(Some(ChatMetadata {
        chat_id,
        message_count: count as u64,
        start_index: start.map(MessageId),
        end_index: end.map(MessageId),
        latest_timestamp,
        version: version as u64,
    }))
}

/// Create the metadata record for a conversation's first message.
///
/// Returns `false` when a concurrent insert already created the row.
pub async fn insert_metadata(db: &Database, meta: &ChatMetadata) -> Result<bool, StrataError> {
    let meta = meta.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO chat_metadata
                     (chat_id, message_count, start_index, end_index, latest_timestamp, version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (chat_id) DO NOTHING",
                params![
                    meta.chat_id.to_string(),
                    meta.message_count as i64,
                    meta.start_index.as_ref().map(|id| id.0.clone()),
                    meta.end_index.as_ref().map(|id| id.0.clone()),
                    encode_timestamp(&meta.latest_timestamp),
                    meta.version as i64,
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Conditional update: applies only while the stored version still equals
/// `expected_version`, bumping the version on success.
///
/// Returns `false` when the race was lost and nothing was written.
pub async fn update_metadata(
    db: &Database,
    meta: &ChatMetadata,
    expected_version: u64,
) -> Result<bool, StrataError> {
    let meta = meta.clone();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE chat_metadata
                 SET message_count = ?1, start_index = ?2, end_index = ?3,
                     latest_timestamp = ?4, version = version + 1
                 WHERE chat_id = ?5 AND version = ?6",
                params![
                    meta.message_count as i64,
                    meta.start_index.as_ref().map(|id| id.0.clone()),
                    meta.end_index.as_ref().map(|id| id.0.clone()),
                    encode_timestamp(&meta.latest_timestamp),
                    meta.chat_id.to_string(),
                    expected_version as i64,
                ],
            )?;
            Ok(updated == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Post-archival counter reset.
///
/// Unconditional single statement: count to zero, start pointer to
/// `new_start_index`, `latest_timestamp` untouched, version bumped so
/// in-flight conditional updates lose and re-read.
pub async fn reset_metadata(
    db: &Database,
    chat: &ChatKey,
    new_start_index: Option<MessageId>,
) -> Result<(), StrataError> {
    let chat_id = chat.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE chat_metadata
                 SET message_count = 0, start_index = ?1, version = version + 1
                 WHERE chat_id = ?2",
                params![new_start_index.map(|id| id.0), chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
