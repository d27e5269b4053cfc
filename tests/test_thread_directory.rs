mod helpers;

use brokerline::domain::entities::ThreadKind;
use brokerline::domain::errors::ChatError;
use helpers::chat_helpers::{admin, agent, borrower, setup_core};

#[tokio::test]
async fn test_find_or_create_is_idempotent() {
    let (core, _db) = setup_core().await;

    let first = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();

    let second = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);

    // Calling from the other side finds the same thread too.
    let third = core
        .threads
        .find_or_create_thread("a1", agent("Marcus"), "u1", borrower("Priya"), None)
        .await
        .unwrap();
    assert_eq!(first.id, third.id);

    let listed = core.threads.list_threads_for("u1").await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_kind_derived_from_roles() {
    let (core, _db) = setup_core().await;

    let ua = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();
    assert_eq!(ua.kind, ThreadKind::UserAgent);

    let ud = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "adm1", admin("Root"), None)
        .await
        .unwrap();
    assert_eq!(ud.kind, ThreadKind::UserAdmin);

    let ad = core
        .threads
        .find_or_create_thread("a1", agent("Marcus"), "adm1", admin("Root"), None)
        .await
        .unwrap();
    assert_eq!(ad.kind, ThreadKind::AgentAdmin);
}

#[tokio::test]
async fn test_same_role_pairing_rejected() {
    let (core, _db) = setup_core().await;

    let result = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "u2", borrower("Dev"), None)
        .await;
    assert!(matches!(result, Err(ChatError::Validation(_))));

    let result = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "u1", borrower("Priya"), None)
        .await;
    assert!(matches!(result, Err(ChatError::Validation(_))));
}

#[tokio::test]
async fn test_initial_message_lands_in_new_thread() {
    let (core, _db) = setup_core().await;

    let thread = core
        .threads
        .find_or_create_thread(
            "u1",
            borrower("Priya"),
            "a1",
            agent("Marcus"),
            Some("Hi, I saw your listing"),
        )
        .await
        .unwrap();

    let count = core.messages.count_messages(&thread.id).await.unwrap();
    assert_eq!(count, 1);

    let last = thread.last_message.expect("summary should be set");
    assert_eq!(last.text, "Hi, I saw your listing");
    assert_eq!(last.sender_id, "u1");

    // The initial message counts as unread for the other side only.
    assert_eq!(thread.unread_count.get("u1"), Some(&0));
    assert_eq!(thread.unread_count.get("a1"), Some(&1));
}

#[tokio::test]
async fn test_blank_initial_message_is_skipped() {
    let (core, _db) = setup_core().await;

    let thread = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), Some("   "))
        .await
        .unwrap();

    assert_eq!(core.messages.count_messages(&thread.id).await.unwrap(), 0);
    assert!(thread.last_message.is_none());
}

#[tokio::test]
async fn test_archive_and_mute_are_per_participant() {
    let (core, _db) = setup_core().await;

    let thread = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();

    core.threads.archive_thread(&thread.id, "u1", true).await.unwrap();
    core.threads.mute_thread(&thread.id, "a1", true).await.unwrap();

    let reread = core.threads.fetch_thread(&thread.id).await.unwrap();
    assert_eq!(reread.archived.get("u1"), Some(&true));
    assert_eq!(reread.archived.get("a1"), Some(&false));
    assert_eq!(reread.muted.get("u1"), Some(&false));
    assert_eq!(reread.muted.get("a1"), Some(&true));

    // Flags are reversible.
    core.threads.archive_thread(&thread.id, "u1", false).await.unwrap();
    let reread = core.threads.fetch_thread(&thread.id).await.unwrap();
    assert_eq!(reread.archived.get("u1"), Some(&false));
}

#[tokio::test]
async fn test_flags_on_missing_thread_fail() {
    let (core, _db) = setup_core().await;

    let result = core.threads.archive_thread("missing", "u1", true).await;
    assert!(matches!(result, Err(ChatError::NotFound(_))));

    let result = core.threads.mute_thread("missing", "u1", true).await;
    assert!(matches!(result, Err(ChatError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_missing_thread_fails() {
    let (core, _db) = setup_core().await;

    let result = core.threads.fetch_thread("missing").await;
    assert!(matches!(result, Err(ChatError::NotFound(_))));
}

#[tokio::test]
async fn test_thread_lists_order_by_activity() {
    let (core, _db) = setup_core().await;

    let older = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "a1", agent("Marcus"), None)
        .await
        .unwrap();
    let newer = core
        .threads
        .find_or_create_thread("u1", borrower("Priya"), "adm1", admin("Root"), None)
        .await
        .unwrap();

    // A new message bumps the older thread back to the top.
    core.messages
        .send_message(
            &older.id,
            "u1",
            "Priya",
            None,
            "checking in",
            brokerline::domain::entities::MessageKind::Text,
            None,
        )
        .await
        .unwrap();

    let listed = core.threads.list_threads_for("u1").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, older.id);
    assert_eq!(listed[1].id, newer.id);

    let all = core.threads.list_all_threads().await.unwrap();
    assert_eq!(all.len(), 2);
}
