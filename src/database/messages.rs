use std::collections::BTreeMap;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::database::Database;
use crate::domain::entities::{
    now_rfc3339, LastMessage, Message, MessageKind, MessageState, ReplySnapshot,
};
use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::ports::MessageRepository;

impl Database {
    fn message_from_row(row: &SqliteRow) -> ChatResult<Message> {
        let state_str: String = row.try_get("state")?;
        let content: String = row.try_get("content")?;
        let state = match state_str.as_str() {
            "edited" => MessageState::Edited {
                content,
                edited_at: row
                    .try_get::<Option<String>, _>("edited_at")?
                    .unwrap_or_default(),
            },
            "deleted" => MessageState::Deleted {
                deleted_at: row
                    .try_get::<Option<String>, _>("deleted_at")?
                    .unwrap_or_default(),
            },
            _ => MessageState::Active { content },
        };

        let reply_to = match row.try_get::<Option<String>, _>("reply_to_id")? {
            Some(message_id) => Some(ReplySnapshot {
                message_id,
                text: row
                    .try_get::<Option<String>, _>("reply_to_text")?
                    .unwrap_or_default(),
                sender_name: row
                    .try_get::<Option<String>, _>("reply_to_sender_name")?
                    .unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Message {
            id: row.try_get("id")?,
            thread_id: row.try_get("thread_id")?,
            sender_id: row.try_get("sender_id")?,
            sender_name: row.try_get("sender_name")?,
            sender_photo_ref: row.try_get("sender_photo_ref").ok(),
            kind: MessageKind::try_from(row.try_get::<String, _>("kind")?)?,
            state,
            reply_to,
            read_by: BTreeMap::new(),
            created_at: row.try_get("created_at")?,
        })
    }

    /// Fill `read_by` for a batch of already-loaded messages in one query.
    async fn attach_read_receipts(&self, messages: &mut [Message]) -> ChatResult<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; messages.len()].join(", ");
        let sql = format!(
            "SELECT message_id, participant_id, read_at
             FROM message_reads
             WHERE message_id IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for message in messages.iter() {
            query = query.bind(message.id.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_message: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for row in rows {
            let message_id: String = row.try_get("message_id")?;
            let participant_id: String = row.try_get("participant_id")?;
            let read_at: String = row.try_get("read_at")?;
            by_message
                .entry(message_id)
                .or_default()
                .insert(participant_id, read_at);
        }

        for message in messages.iter_mut() {
            if let Some(reads) = by_message.remove(&message.id) {
                message.read_by = reads;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageRepository for Database {
    async fn append_message(&self, message: &Message, preview: &LastMessage) -> ChatResult<()> {
        let mut tx = self.pool.begin().await?;

        // Guard inside the transaction: a missing parent aborts the whole
        // send, leaving no orphan message behind.
        let thread_row = sqlx::query("SELECT id FROM threads WHERE id = ?")
            .bind(&message.thread_id)
            .fetch_optional(&mut *tx)
            .await?;
        if thread_row.is_none() {
            tx.rollback().await?;
            return Err(ChatError::NotFound(format!(
                "thread {}",
                message.thread_id
            )));
        }

        sqlx::query(
            "INSERT INTO messages
                (id, thread_id, sender_id, sender_name, sender_photo_ref, kind, state,
                 content, edited_at, deleted_at, reply_to_id, reply_to_text,
                 reply_to_sender_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.thread_id)
        .bind(&message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.sender_photo_ref)
        .bind(message.kind.as_str())
        .bind(message.state.as_str())
        .bind(message.state.content())
        .bind(message.state.edited_at())
        .bind(message.state.deleted_at())
        .bind(message.reply_to.as_ref().map(|r| r.message_id.clone()))
        .bind(message.reply_to.as_ref().map(|r| r.text.clone()))
        .bind(message.reply_to.as_ref().map(|r| r.sender_name.clone()))
        .bind(&message.created_at)
        .execute(&mut *tx)
        .await?;

        for (participant_id, read_at) in &message.read_by {
            sqlx::query(
                "INSERT INTO message_reads (message_id, participant_id, read_at)
                 VALUES (?, ?, ?)",
            )
            .bind(&message.id)
            .bind(participant_id)
            .bind(read_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE threads
             SET last_message_text = ?, last_message_sender_id = ?, last_message_at = ?,
                 last_message_kind = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&preview.text)
        .bind(&preview.sender_id)
        .bind(&preview.at)
        .bind(preview.kind.as_str())
        .bind(&message.created_at)
        .bind(&message.thread_id)
        .execute(&mut *tx)
        .await?;

        // Storage-side increment; concurrent sends must both land.
        sqlx::query(
            "UPDATE thread_participants
             SET unread_count = unread_count + 1
             WHERE thread_id = ? AND participant_id <> ?",
        )
        .bind(&message.thread_id)
        .bind(&message.sender_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Message appended: id={}, thread_id={}, kind={}",
            message.id,
            message.thread_id,
            message.kind
        );
        Ok(())
    }

    async fn get_message(&self, thread_id: &str, message_id: &str) -> ChatResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, thread_id, sender_id, sender_name, sender_photo_ref, kind, state,
                    content, edited_at, deleted_at, reply_to_id, reply_to_text,
                    reply_to_sender_name, created_at
             FROM messages
             WHERE thread_id = ? AND id = ?",
        )
        .bind(thread_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut messages = vec![Self::message_from_row(&row)?];
        self.attach_read_receipts(&mut messages).await?;
        Ok(messages.pop())
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: i64,
        before: Option<&str>,
    ) -> ChatResult<Vec<Message>> {
        let rows = if let Some(cursor) = before {
            sqlx::query(
                "SELECT id, thread_id, sender_id, sender_name, sender_photo_ref, kind, state,
                        content, edited_at, deleted_at, reply_to_id, reply_to_text,
                        reply_to_sender_name, created_at
                 FROM messages
                 WHERE thread_id = ? AND created_at < ?
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?",
            )
            .bind(thread_id)
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT id, thread_id, sender_id, sender_name, sender_photo_ref, kind, state,
                        content, edited_at, deleted_at, reply_to_id, reply_to_text,
                        reply_to_sender_name, created_at
                 FROM messages
                 WHERE thread_id = ?
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?",
            )
            .bind(thread_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            messages.push(Self::message_from_row(&row)?);
        }
        self.attach_read_receipts(&mut messages).await?;
        Ok(messages)
    }

    async fn update_state(
        &self,
        thread_id: &str,
        message_id: &str,
        state: &MessageState,
    ) -> ChatResult<()> {
        let result = sqlx::query(
            "UPDATE messages
             SET state = ?, content = ?, edited_at = ?, deleted_at = ?
             WHERE thread_id = ? AND id = ?",
        )
        .bind(state.as_str())
        .bind(state.content())
        .bind(state.edited_at())
        .bind(state.deleted_at())
        .bind(thread_id)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ChatError::NotFound(format!(
                "message {} in thread {}",
                message_id, thread_id
            )));
        }
        Ok(())
    }

    async fn mark_thread_read(
        &self,
        thread_id: &str,
        user_id: &str,
        window: i64,
    ) -> ChatResult<Vec<String>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE thread_participants
             SET unread_count = 0
             WHERE thread_id = ? AND participant_id = ?",
        )
        .bind(thread_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ChatError::NotFound(format!(
                "participant {} in thread {}",
                user_id, thread_id
            )));
        }

        // Only the newest `window` unread messages get receipts; anything
        // older stays unmarked. The counter reset above is authoritative.
        let rows = sqlx::query(
            "SELECT m.id
             FROM messages m
             WHERE m.thread_id = ? AND m.sender_id <> ?
               AND NOT EXISTS (
                   SELECT 1 FROM message_reads r
                   WHERE r.message_id = m.id AND r.participant_id = ?
               )
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT ?",
        )
        .bind(thread_id)
        .bind(user_id)
        .bind(user_id)
        .bind(window)
        .fetch_all(&mut *tx)
        .await?;

        let mut marked = Vec::with_capacity(rows.len());
        let now = now_rfc3339();
        for row in rows {
            let message_id: String = row.try_get("id")?;
            sqlx::query(
                "INSERT INTO message_reads (message_id, participant_id, read_at)
                 VALUES (?, ?, ?)",
            )
            .bind(&message_id)
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
            marked.push(message_id);
        }

        tx.commit().await?;

        tracing::debug!(
            "Thread {} marked read by {}: {} receipts",
            thread_id,
            user_id,
            marked.len()
        );
        Ok(marked)
    }

    async fn delete_message_batch(&self, thread_id: &str, limit: i64) -> ChatResult<u64> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT id FROM messages WHERE thread_id = ? LIMIT ?")
            .bind(thread_id)
            .bind(limit)
            .fetch_all(&mut *tx)
            .await?;

        if rows.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get::<String, _>("id")?);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");

        let sql = format!(
            "DELETE FROM message_reads WHERE message_id IN ({})",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        query.execute(&mut *tx).await?;

        let sql = format!("DELETE FROM messages WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        query.execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(ids.len() as u64)
    }

    async fn count_messages(&self, thread_id: &str) -> ChatResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM messages WHERE thread_id = ?")
            .bind(thread_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }
}
