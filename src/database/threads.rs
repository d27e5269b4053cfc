use std::collections::BTreeMap;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::database::Database;
use crate::domain::entities::{
    LastMessage, MessageKind, ParticipantProfile, ParticipantRole, Thread, ThreadKind,
};
use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::ports::ThreadRepository;

impl Database {
    fn thread_from_rows(
        thread_row: &SqliteRow,
        participant_rows: &[SqliteRow],
    ) -> ChatResult<Thread> {
        let mut participants = BTreeMap::new();
        let mut unread_count = BTreeMap::new();
        let mut archived = BTreeMap::new();
        let mut muted = BTreeMap::new();

        for row in participant_rows {
            let id: String = row.try_get("participant_id")?;
            participants.insert(
                id.clone(),
                ParticipantProfile {
                    display_name: row.try_get("display_name")?,
                    photo_ref: row.try_get("photo_ref").ok(),
                    role: ParticipantRole::try_from(row.try_get::<String, _>("role")?)?,
                },
            );
            unread_count.insert(id.clone(), row.try_get("unread_count")?);
            archived.insert(id.clone(), row.try_get("archived")?);
            muted.insert(id, row.try_get("muted")?);
        }

        // The summary columns are written as a group; last_message_at decides
        // whether one exists.
        let last_message = match row_opt_string(thread_row, "last_message_at") {
            Some(at) => Some(LastMessage {
                text: thread_row.try_get("last_message_text")?,
                sender_id: thread_row.try_get("last_message_sender_id")?,
                at,
                kind: MessageKind::try_from(thread_row.try_get::<String, _>("last_message_kind")?)?,
            }),
            None => None,
        };

        Ok(Thread {
            id: thread_row.try_get("id")?,
            kind: ThreadKind::try_from(thread_row.try_get::<String, _>("kind")?)?,
            participants,
            unread_count,
            archived,
            muted,
            last_message,
            created_at: thread_row.try_get("created_at")?,
            updated_at: thread_row.try_get("updated_at")?,
        })
    }

    async fn load_thread(&self, thread_id: &str) -> ChatResult<Option<Thread>> {
        let thread_row = sqlx::query(
            "SELECT id, kind, last_message_text, last_message_sender_id, last_message_at,
                    last_message_kind, created_at, updated_at
             FROM threads
             WHERE id = ?",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(thread_row) = thread_row else {
            return Ok(None);
        };

        let participant_rows = sqlx::query(
            "SELECT participant_id, display_name, photo_ref, role, unread_count, archived, muted
             FROM thread_participants
             WHERE thread_id = ?",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Self::thread_from_rows(&thread_row, &participant_rows)?))
    }

    async fn load_thread_list(&self, ids: Vec<String>) -> ChatResult<Vec<Thread>> {
        let mut threads = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(thread) = self.load_thread(&id).await? {
                threads.push(thread);
            }
        }
        Ok(threads)
    }
}

fn row_opt_string(row: &SqliteRow, column: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(column).ok().flatten()
}

#[async_trait::async_trait]
impl ThreadRepository for Database {
    async fn create_thread(&self, thread: &Thread) -> ChatResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO threads (id, kind, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&thread.id)
        .bind(thread.kind.as_str())
        .bind(&thread.created_at)
        .bind(&thread.updated_at)
        .execute(&mut *tx)
        .await?;

        for (participant_id, profile) in &thread.participants {
            sqlx::query(
                "INSERT INTO thread_participants
                    (thread_id, participant_id, display_name, photo_ref, role,
                     unread_count, archived, muted)
                 VALUES (?, ?, ?, ?, ?, 0, 0, 0)",
            )
            .bind(&thread.id)
            .bind(participant_id)
            .bind(&profile.display_name)
            .bind(&profile.photo_ref)
            .bind(profile.role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Thread created: id={}, kind={}, participants={:?}",
            thread.id,
            thread.kind,
            thread.participant_ids()
        );
        Ok(())
    }

    async fn get_thread(&self, thread_id: &str) -> ChatResult<Option<Thread>> {
        self.load_thread(thread_id).await
    }

    async fn threads_for_participant(&self, participant_id: &str) -> ChatResult<Vec<Thread>> {
        let rows = sqlx::query(
            "SELECT t.id
             FROM threads t
             INNER JOIN thread_participants p ON p.thread_id = t.id
             WHERE p.participant_id = ?
             ORDER BY t.updated_at DESC, t.id",
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("id")?);
        }
        self.load_thread_list(ids).await
    }

    async fn all_threads(&self) -> ChatResult<Vec<Thread>> {
        let rows = sqlx::query("SELECT id FROM threads ORDER BY updated_at DESC, id")
            .fetch_all(&self.pool)
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("id")?);
        }
        self.load_thread_list(ids).await
    }

    async fn set_archived(
        &self,
        thread_id: &str,
        participant_id: &str,
        flag: bool,
    ) -> ChatResult<()> {
        let result = sqlx::query(
            "UPDATE thread_participants
             SET archived = ?
             WHERE thread_id = ? AND participant_id = ?",
        )
        .bind(flag)
        .bind(thread_id)
        .bind(participant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ChatError::NotFound(format!(
                "participant {} in thread {}",
                participant_id, thread_id
            )));
        }
        Ok(())
    }

    async fn set_muted(&self, thread_id: &str, participant_id: &str, flag: bool) -> ChatResult<()> {
        let result = sqlx::query(
            "UPDATE thread_participants
             SET muted = ?
             WHERE thread_id = ? AND participant_id = ?",
        )
        .bind(flag)
        .bind(thread_id)
        .bind(participant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ChatError::NotFound(format!(
                "participant {} in thread {}",
                participant_id, thread_id
            )));
        }
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> ChatResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM thread_participants WHERE thread_id = ?")
            .bind(thread_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(thread_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if result.rows_affected() == 0 {
            // Already gone; a resumed cascade lands here harmlessly.
            tracing::debug!("delete_thread: thread {} was already absent", thread_id);
        } else {
            tracing::info!("Thread deleted: id={}", thread_id);
        }
        Ok(())
    }
}
