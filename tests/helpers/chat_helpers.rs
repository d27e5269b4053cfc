use brokerline::bootstrap::{build_chat_core, ChatCore};
use brokerline::config::Config;
use brokerline::database::Database;
use brokerline::domain::entities::{ParticipantProfile, ParticipantRole};
use uuid::Uuid;

use super::test_db::setup_test_db;

#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        event_capacity: 100,
        read_mark_window: 50,
        delete_batch_size: 450,
    }
}

#[allow(dead_code)]
pub async fn setup_core() -> (ChatCore, Database) {
    setup_core_with(test_config()).await
}

#[allow(dead_code)]
pub async fn setup_core_with(config: Config) -> (ChatCore, Database) {
    let db = setup_test_db().await;
    let core = build_chat_core(db.clone(), &config);
    (core, db)
}

#[allow(dead_code)]
pub fn borrower(name: &str) -> ParticipantProfile {
    ParticipantProfile {
        display_name: name.to_string(),
        photo_ref: None,
        role: ParticipantRole::User,
    }
}

#[allow(dead_code)]
pub fn agent(name: &str) -> ParticipantProfile {
    ParticipantProfile {
        display_name: name.to_string(),
        photo_ref: Some(format!("blob://avatars/{}", name.to_lowercase())),
        role: ParticipantRole::Agent,
    }
}

#[allow(dead_code)]
pub fn admin(name: &str) -> ParticipantProfile {
    ParticipantProfile {
        display_name: name.to_string(),
        photo_ref: None,
        role: ParticipantRole::Admin,
    }
}

/// Insert a message row directly, bypassing the send transaction. Used to
/// seed large threads with controlled timestamps.
#[allow(dead_code)]
pub async fn insert_raw_message(
    db: &Database,
    thread_id: &str,
    sender_id: &str,
    text: &str,
    created_at: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO messages
            (id, thread_id, sender_id, sender_name, sender_photo_ref, kind, state,
             content, created_at)
         VALUES (?, ?, ?, ?, NULL, 'text', 'active', ?, ?)",
    )
    .bind(&id)
    .bind(thread_id)
    .bind(sender_id)
    .bind(sender_id)
    .bind(text)
    .bind(created_at)
    .execute(db.pool())
    .await
    .expect("Failed to insert raw message");

    sqlx::query(
        "INSERT INTO message_reads (message_id, participant_id, read_at)
         VALUES (?, ?, ?)",
    )
    .bind(&id)
    .bind(sender_id)
    .bind(created_at)
    .execute(db.pool())
    .await
    .expect("Failed to insert sender read receipt");

    id
}

/// Fixed-width timestamp n seconds after a baseline, for deterministic
/// ordering in pagination tests.
#[allow(dead_code)]
pub fn timestamp_at(n: u32) -> String {
    format!(
        "2026-01-01T{:02}:{:02}:{:02}.000000Z",
        n / 3600,
        (n / 60) % 60,
        n % 60
    )
}
