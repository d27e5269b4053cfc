use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

mod messages;
mod presence;
mod threads;

/// Handle to the chat store. Implements every repository port; services hold
/// it behind `Arc<dyn Trait>` so tests can substitute their own storage.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // SQLite permits a single writer; a one-connection pool keeps
        // concurrent transactions from aborting each other with SQLITE_BUSY.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the chat tables if they are missing. Callers run this once at
    /// startup; every statement is idempotent.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS threads (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL CHECK(kind IN ('user_agent', 'user_admin', 'agent_admin')),
                last_message_text TEXT,
                last_message_sender_id TEXT,
                last_message_at TEXT,
                last_message_kind TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS thread_participants (
                thread_id TEXT NOT NULL,
                participant_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                photo_ref TEXT,
                role TEXT NOT NULL CHECK(role IN ('user', 'agent', 'admin')),
                unread_count INTEGER NOT NULL DEFAULT 0,
                archived INTEGER NOT NULL DEFAULT 0,
                muted INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (thread_id, participant_id),
                FOREIGN KEY (thread_id) REFERENCES threads(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_thread_participants_participant
             ON thread_participants(participant_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                sender_name TEXT NOT NULL,
                sender_photo_ref TEXT,
                kind TEXT NOT NULL CHECK(kind IN ('text', 'image', 'document')),
                state TEXT NOT NULL CHECK(state IN ('active', 'edited', 'deleted')) DEFAULT 'active',
                content TEXT NOT NULL,
                edited_at TEXT,
                deleted_at TEXT,
                reply_to_id TEXT,
                reply_to_text TEXT,
                reply_to_sender_name TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (thread_id) REFERENCES threads(id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_thread_created
             ON messages(thread_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS message_reads (
                message_id TEXT NOT NULL,
                participant_id TEXT NOT NULL,
                read_at TEXT NOT NULL,
                PRIMARY KEY (message_id, participant_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS presence (
                uid TEXT PRIMARY KEY,
                is_online INTEGER NOT NULL DEFAULT 0,
                last_seen TEXT NOT NULL,
                typing_in TEXT,
                viewing_thread TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
