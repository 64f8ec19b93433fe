// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::params;

use strata_core::StrataError;

use crate::database::{map_tr_err, Database};
use crate::models::{encode_timestamp, ChatKey, Message, MessageId, UserId};

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    let ts: String = row.get(4)?;
    Ok(Message {
        id: MessageId(row.get(0)?),
        sender_id: UserId(row.get(1)?),
        receiver_id: UserId(row.get(2)?),
        content: row.get(3)?,
        timestamp: crate::models::decode_timestamp(4, &ts)?,
    })
}

/// Persist a new message. Fails with `DuplicateKey` when the id exists.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), StrataError> {
    let msg = msg.clone();
    let message_id = msg.id.0.clone();
    let result = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, chat_id, sender_id, receiver_id, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.id.0,
                    msg.chat_key().to_string(),
                    msg.sender_id.0,
                    msg.receiver_id.0,
                    msg.content,
                    encode_timestamp(&msg.timestamp),
                ],
            )?;
            Ok(())
        })
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(err, _)))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(StrataError::DuplicateKey { message_id })
        }
        Err(e) => Err(map_tr_err(e)),
    }
}

/// All live messages sent by a user, in chronological order (message id
/// breaks timestamp ties).
pub async fn list_by_sender(db: &Database, sender: &UserId) -> Result<Vec<Message>, StrataError> {
    let sender = sender.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, receiver_id, content, timestamp
                 FROM messages WHERE sender_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![sender], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// All live messages of a conversation, in chronological order (message id
/// breaks timestamp ties).
pub async fn list_by_conversation(
    db: &Database,
    chat: &ChatKey,
) -> Result<Vec<Message>, StrataError> {
    let chat_id = chat.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, receiver_id, content, timestamp
                 FROM messages WHERE chat_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![chat_id], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a single message. Idempotent: deleting an absent id succeeds.
pub async fn delete_message(db: &Database, id: &MessageId) -> Result<(), StrataError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every message older than `cutoff`, returning the number deleted.
pub async fn delete_messages_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<u64, StrataError> {
    let cutoff = encode_timestamp(&cutoff);
    db.connection()
        .call(move |conn| {
            let deleted =
                conn.execute("DELETE FROM messages WHERE timestamp < ?1", params![cutoff])?;
            Ok(deleted as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Distinct chat keys with at least one live message.
pub async fn list_conversations(db: &Database) -> Result<Vec<ChatKey>, StrataError> {
    let raw = db
        .connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT chat_id FROM messages ORDER BY chat_id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)?;

    raw.iter()
        .map(|s| {
            ChatKey::from_canonical(s)
                .ok_or_else(|| StrataError::Internal(format!("corrupt chat_id column: {s}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_msg(id: &str, sender: &str, receiver: &str, millis: i64) -> Message {
        Message {
            id: MessageId(id.to_string()),
            sender_id: UserId(sender.to_string()),
            receiver_id: UserId(receiver.to_string()),
            content: format!("msg {id}"),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000 + millis).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_and_list_conversation_in_order() {
        let (db, _dir) = setup_db().await;

        // Inserted out of order on purpose; both directions share the chat.
        insert_message(&db, &make_msg("m2", "bob", "alice", 2)).await.unwrap();
        insert_message(&db, &make_msg("m1", "alice", "bob", 1)).await.unwrap();
        insert_message(&db, &make_msg("m3", "alice", "bob", 3)).await.unwrap();

        let chat = ChatKey::new(&UserId("alice".into()), &UserId("bob".into()));
        let messages = list_by_conversation(&db, &chat).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id.0, "m1");
        assert_eq!(messages[1].id.0, "m2");
        assert_eq!(messages[2].id.0, "m3");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn timestamp_ties_break_by_id() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("b-second", "alice", "bob", 5)).await.unwrap();
        insert_message(&db, &make_msg("a-first", "alice", "bob", 5)).await.unwrap();

        let chat = ChatKey::new(&UserId("alice".into()), &UserId("bob".into()));
        let messages = list_by_conversation(&db, &chat).await.unwrap();
        assert_eq!(messages[0].id.0, "a-first");
        assert_eq!(messages[1].id.0, "b-second");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let (db, _dir) = setup_db().await;

        let msg = make_msg("m1", "alice", "bob", 1);
        insert_message(&db, &msg).await.unwrap();

        let err = insert_message(&db, &msg).await.unwrap_err();
        match err {
            StrataError::DuplicateKey { message_id } => assert_eq!(message_id, "m1"),
            other => panic!("expected DuplicateKey, got {other}"),
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_by_sender_only_returns_their_messages() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("m1", "alice", "bob", 1)).await.unwrap();
        insert_message(&db, &make_msg("m2", "bob", "alice", 2)).await.unwrap();
        insert_message(&db, &make_msg("m3", "alice", "carol", 3)).await.unwrap();

        let messages = list_by_sender(&db, &UserId("alice".into())).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.0, "m1");
        assert_eq!(messages[1].id.0, "m3");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("m1", "alice", "bob", 1)).await.unwrap();
        delete_message(&db, &MessageId("m1".into())).await.unwrap();
        // Second delete of the same id, and a delete of a never-existing id.
        delete_message(&db, &MessageId("m1".into())).await.unwrap();
        delete_message(&db, &MessageId("ghost".into())).await.unwrap();

        let chat = ChatKey::new(&UserId("alice".into()), &UserId("bob".into()));
        assert!(list_by_conversation(&db, &chat).await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_messages_before_cutoff() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("old1", "alice", "bob", 0)).await.unwrap();
        insert_message(&db, &make_msg("old2", "alice", "bob", 100)).await.unwrap();
        insert_message(&db, &make_msg("new1", "alice", "bob", 5000)).await.unwrap();

        let cutoff = Utc.timestamp_millis_opt(1_700_000_000_000 + 1000).unwrap();
        let deleted = delete_messages_before(&db, cutoff).await.unwrap();
        assert_eq!(deleted, 2);

        let chat = ChatKey::new(&UserId("alice".into()), &UserId("bob".into()));
        let remaining = list_by_conversation(&db, &chat).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id.0, "new1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_conversations_returns_distinct_keys() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("m1", "alice", "bob", 1)).await.unwrap();
        insert_message(&db, &make_msg("m2", "bob", "alice", 2)).await.unwrap();
        insert_message(&db, &make_msg("m3", "alice", "carol", 3)).await.unwrap();

        let chats = list_conversations(&db).await.unwrap();
        assert_eq!(chats.len(), 2);
        assert!(chats.contains(&ChatKey::new(&UserId("alice".into()), &UserId("bob".into()))));
        assert!(chats.contains(&ChatKey::new(&UserId("alice".into()), &UserId("carol".into()))));

        db.close().await.unwrap();
    }
}
