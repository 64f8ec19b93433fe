// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline behavior over the full stack: window bounds,
//! counter convergence, inline archival, rejection, and degraded cache
//! operation.

use strata_core::types::{ChatKey, Message, UserId};
use strata_core::{
    ArchiveAdapter, CacheAdapter, MessageStoreAdapter, PluginAdapter, RejectionReason,
    StrataError,
};
use strata_test_utils::TestHarness;

fn chat(a: &str, b: &str) -> ChatKey {
    ChatKey::new(&UserId(a.to_string()), &UserId(b.to_string()))
}

#[tokio::test]
async fn sequential_ingestion_converges_counters() {
    let harness = TestHarness::builder().build().await.unwrap();

    let mut last: Option<Message> = None;
    for i in 0..5 {
        last = Some(harness.ingest("alice", "bob", &format!("msg {i}")).await.unwrap());
    }
    let last = last.unwrap();

    let meta = harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.message_count, 5);
    assert_eq!(meta.end_index, Some(last.id));
    assert_eq!(meta.latest_timestamp, last.timestamp);
    // First ingested message still anchors the start pointer.
    let stored = harness
        .store
        .list_by_conversation(&chat("alice", "bob"))
        .await
        .unwrap();
    assert_eq!(meta.start_index, Some(stored[0].id.clone()));
}

#[tokio::test]
async fn concurrent_ingestion_never_loses_an_increment() {
    const K: usize = 8;
    let harness = TestHarness::builder().build().await.unwrap();

    let tasks: Vec<_> = (0..K)
        .map(|i| {
            let coordinator = harness.coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .ingest(
                        &UserId("alice".to_string()),
                        &UserId("bob".to_string()),
                        &format!("concurrent {i}"),
                    )
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let meta = harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.message_count, K as u64, "no increment may be dropped");
    assert_eq!(
        harness
            .store
            .list_by_conversation(&chat("alice", "bob"))
            .await
            .unwrap()
            .len(),
        K
    );
}

#[tokio::test]
async fn window_is_fifo_bounded_at_x() {
    let harness = TestHarness::builder().with_window_size(2).build().await.unwrap();

    let m1 = harness.ingest("alice", "bob", "hi").await.unwrap();
    let m2 = harness.ingest("alice", "bob", "second").await.unwrap();

    let window = harness
        .cache
        .get_window(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(window.messages, vec![m1, m2.clone()]);

    let m3 = harness.ingest("alice", "bob", "third").await.unwrap();
    let window = harness
        .cache
        .get_window(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(window.len(), 2, "window never exceeds X");
    assert_eq!(window.messages, vec![m2, m3.clone()]);
    assert_eq!(window.end_index, Some(m3.id));
}

#[tokio::test]
async fn crossing_db_limit_archives_inline() {
    let harness = TestHarness::builder().with_db_limit(3).build().await.unwrap();

    harness.ingest("alice", "bob", "one").await.unwrap();
    harness.ingest("alice", "bob", "two").await.unwrap();

    // Below the threshold nothing is archived.
    assert!(harness.archive.list_objects("").await.unwrap().is_empty());

    // The third write crosses the threshold and pays for the archival.
    harness.ingest("alice", "bob", "three").await.unwrap();

    let live = harness
        .store
        .list_by_conversation(&chat("alice", "bob"))
        .await
        .unwrap();
    assert!(live.is_empty(), "primary store drained after archival");

    let keys = harness.archive.list_objects("alice/").await.unwrap();
    assert_eq!(keys.len(), 1, "one batch object for the conversation");
    let batch: Vec<Message> =
        serde_json::from_slice(&harness.archive.get_object(&keys[0]).await.unwrap()).unwrap();
    assert_eq!(batch.len(), 3);
    let contents: Vec<_> = batch.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    let meta = harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.message_count, 0);
    assert_eq!(meta.start_index, None);
}

#[tokio::test]
async fn counting_restarts_after_archival() {
    let harness = TestHarness::builder().with_db_limit(2).build().await.unwrap();

    harness.ingest("alice", "bob", "a").await.unwrap();
    harness.ingest("alice", "bob", "b").await.unwrap(); // archives
    harness.ingest("alice", "bob", "c").await.unwrap();

    let meta = harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.message_count, 1);

    harness.ingest("alice", "bob", "d").await.unwrap(); // archives again

    let keys = harness.archive.list_objects("alice/").await.unwrap();
    assert!(!keys.is_empty(), "second archival reached cold storage");
    let meta = harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.message_count, 0);
}

#[tokio::test]
async fn blocked_sender_is_rejected_with_no_writes() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .blocks
        .block(&UserId("bob".into()), &UserId("alice".into()))
        .await;

    let err = harness.ingest("alice", "bob", "let me in").await.unwrap_err();
    assert!(matches!(
        err,
        StrataError::Rejected(RejectionReason::Blocked)
    ));

    assert!(harness
        .store
        .list_by_conversation(&chat("alice", "bob"))
        .await
        .unwrap()
        .is_empty());
    assert!(harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .is_none());

    // The block is directional: bob can still message alice.
    harness.ingest("bob", "alice", "hello").await.unwrap();
}

#[tokio::test]
async fn cache_outage_degrades_but_never_blocks() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.cache.set_failing(true);

    let message = harness.ingest("alice", "bob", "through the outage").await.unwrap();

    // Durable write and counters unaffected by the cache being down.
    let stored = harness
        .store
        .list_by_conversation(&chat("alice", "bob"))
        .await
        .unwrap();
    assert_eq!(stored, vec![message]);
    let meta = harness
        .store
        .get_metadata(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.message_count, 1);

    // Read path serves from the store during the outage too.
    let recent = harness
        .coordinator
        .fetch_recent(&UserId("alice".into()), &UserId("bob".into()))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
async fn miss_then_rebuild_equals_store_contents() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.ingest("alice", "bob", "first").await.unwrap();
    harness.ingest("bob", "alice", "second").await.unwrap();

    // Drop the cached window, forcing the next read to rebuild.
    harness.cache.shutdown().await.unwrap();
    assert!(harness
        .cache
        .get_window(&chat("alice", "bob"))
        .await
        .unwrap()
        .is_none());

    let rebuilt = harness
        .coordinator
        .fetch_recent(&UserId("alice".into()), &UserId("bob".into()))
        .await
        .unwrap();
    let stored = harness
        .store
        .list_by_conversation(&chat("alice", "bob"))
        .await
        .unwrap();
    assert_eq!(rebuilt, stored, "rebuilt window matches the store field-for-field");

    // The rebuild repopulated the cache.
    let window = harness
        .cache
        .get_window(&chat("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(window.messages, stored);
}

#[tokio::test]
async fn rebuild_takes_only_the_last_x_messages() {
    let harness = TestHarness::builder().with_window_size(2).build().await.unwrap();

    for i in 0..4 {
        harness.ingest("alice", "bob", &format!("msg {i}")).await.unwrap();
    }
    harness.cache.shutdown().await.unwrap();

    let recent = harness
        .coordinator
        .fetch_recent(&UserId("alice".into()), &UserId("bob".into()))
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].content, "msg 2");
    assert_eq!(recent[1].content, "msg 3");
}

#[tokio::test]
async fn group_fan_out_delivers_independently() {
    let harness = TestHarness::builder()
        .with_users(&["alice", "bob", "carol"])
        .build()
        .await
        .unwrap();
    harness
        .groups
        .set_members(
            &strata_core::types::GroupId("team".into()),
            vec![
                UserId("alice".into()),
                UserId("bob".into()),
                UserId("carol".into()),
            ],
        )
        .await;
    // Carol has blocked Alice; Bob has not.
    harness
        .blocks
        .block(&UserId("carol".into()), &UserId("alice".into()))
        .await;

    let results = harness.ingest_group("alice", "team", "standup?").await.unwrap();
    assert_eq!(results.len(), 2, "sender excluded from fan-out");

    let bob = results.iter().find(|(u, _)| u.0 == "bob").unwrap();
    assert!(bob.1.is_ok());
    let carol = results.iter().find(|(u, _)| u.0 == "carol").unwrap();
    assert!(matches!(
        carol.1,
        Err(StrataError::Rejected(RejectionReason::Blocked))
    ));

    // One independent message per successful recipient, in its own conversation.
    assert_eq!(
        harness
            .store
            .list_by_conversation(&chat("alice", "bob"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(harness
        .store
        .list_by_conversation(&chat("alice", "carol"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn fan_out_to_unknown_group_is_empty() {
    let harness = TestHarness::builder().build().await.unwrap();
    let results = harness.ingest_group("alice", "nobody", "anyone?").await.unwrap();
    assert!(results.is_empty());
}
