mod helpers;

use brokerline::domain::entities::MessageKind;
use brokerline::domain::errors::ChatError;
use helpers::chat_helpers::{agent, borrower, setup_core, setup_core_with, test_config};

#[tokio::test]
async fn test_mark_read_resets_only_the_callers_counter() {
    let (core, _db) = setup_core().await;
    let thread = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();

    core.messages
        .send_message(&thread.id, "u1", "Priya", None, "one", MessageKind::Text, None)
        .await
        .unwrap();
    core.messages
        .send_message(&thread.id, "u1", "Priya", None, "two", MessageKind::Text, None)
        .await
        .unwrap();
    core.messages
        .send_message(&thread.id, "a1", "Marcus", None, "reply", MessageKind::Text, None)
        .await
        .unwrap();

    let before = core.threads.fetch_thread(&thread.id).await.unwrap();
    assert_eq!(before.unread_count.get("a1"), Some(&2));
    assert_eq!(before.unread_count.get("u1"), Some(&1));

    core.reads.mark_thread_read(&thread.id, "a1").await.unwrap();

    let after = core.threads.fetch_thread(&thread.id).await.unwrap();
    assert_eq!(after.unread_count.get("a1"), Some(&0));
    // The other side's counter is untouched.
    assert_eq!(after.unread_count.get("u1"), Some(&1));
}

#[tokio::test]
async fn test_mark_read_stamps_receipts() {
    let (core, _db) = setup_core().await;
    let thread = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();

    let sent = core
        .messages
        .send_message(&thread.id, "u1", "Priya", None, "read me", MessageKind::Text, None)
        .await
        .unwrap();

    core.reads.mark_thread_read(&thread.id, "a1").await.unwrap();

    let page = core.messages.fetch_messages(&thread.id, 10, None).await.unwrap();
    let stored = page.iter().find(|m| m.id == sent.id).unwrap();
    // The sender's receipt from creation is still there; the reader's got added.
    assert!(stored.read_by.contains_key("u1"));
    assert!(stored.read_by.contains_key("a1"));

    // Marking again changes nothing; receipts only grow.
    let first_stamp = stored.read_by.get("a1").cloned().unwrap();
    core.reads.mark_thread_read(&thread.id, "a1").await.unwrap();
    let page = core.messages.fetch_messages(&thread.id, 10, None).await.unwrap();
    let stored = page.iter().find(|m| m.id == sent.id).unwrap();
    assert_eq!(stored.read_by.get("a1"), Some(&first_stamp));
    assert_eq!(stored.read_by.len(), 2);
}

#[tokio::test]
async fn test_mark_read_is_windowed_but_counter_still_zeroes() {
    let config = brokerline::config::Config {
        read_mark_window: 5,
        ..test_config()
    };
    let (core, _db) = setup_core_with(config).await;
    let thread = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();

    for i in 0..8 {
        core.messages
            .send_message(
                &thread.id,
                "u1",
                "Priya",
                None,
                &format!("msg {}", i),
                MessageKind::Text,
                None,
            )
            .await
            .unwrap();
    }

    core.reads.mark_thread_read(&thread.id, "a1").await.unwrap();

    // Badge is authoritative: zero regardless of window size.
    let after = core.threads.fetch_thread(&thread.id).await.unwrap();
    assert_eq!(after.unread_count.get("a1"), Some(&0));

    // Only the newest five messages carry the reader's receipt.
    let page = core.messages.fetch_messages(&thread.id, 20, None).await.unwrap();
    let with_receipt = page
        .iter()
        .filter(|m| m.read_by.contains_key("a1"))
        .count();
    assert_eq!(with_receipt, 5);
    // Newest-first page: the top five are the stamped ones.
    assert!(page[..5].iter().all(|m| m.read_by.contains_key("a1")));
    assert!(page[5..].iter().all(|m| !m.read_by.contains_key("a1")));
}

#[tokio::test]
async fn test_mark_read_on_missing_thread_fails() {
    let (core, _db) = setup_core().await;
    let result = core.reads.mark_thread_read("missing", "u1").await;
    assert!(matches!(result, Err(ChatError::NotFound(_))));
}
