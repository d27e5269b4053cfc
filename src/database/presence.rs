use sqlx::Row;

use crate::database::Database;
use crate::domain::entities::{now_rfc3339, Presence};
use crate::domain::errors::ChatResult;
use crate::domain::ports::PresenceRepository;

#[async_trait::async_trait]
impl PresenceRepository for Database {
    async fn get_presence(&self, uid: &str) -> ChatResult<Option<Presence>> {
        let row = sqlx::query(
            "SELECT uid, is_online, last_seen, typing_in, viewing_thread
             FROM presence
             WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Presence {
                uid: row.try_get("uid")?,
                is_online: row.try_get("is_online")?,
                last_seen: row.try_get("last_seen")?,
                typing_in: row.try_get("typing_in").ok().flatten(),
                viewing_thread: row.try_get("viewing_thread").ok().flatten(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn set_online(&self, uid: &str, is_online: bool) -> ChatResult<()> {
        // Going offline clears the ephemeral fields in the same statement.
        sqlx::query(
            "INSERT INTO presence (uid, is_online, last_seen, typing_in, viewing_thread)
             VALUES (?, ?, ?, NULL, NULL)
             ON CONFLICT(uid) DO UPDATE SET
                 is_online = excluded.is_online,
                 last_seen = excluded.last_seen,
                 typing_in = CASE WHEN excluded.is_online = 0 THEN NULL ELSE presence.typing_in END,
                 viewing_thread = CASE WHEN excluded.is_online = 0 THEN NULL ELSE presence.viewing_thread END",
        )
        .bind(uid)
        .bind(is_online)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_typing(&self, uid: &str, thread_id: Option<&str>) -> ChatResult<()> {
        sqlx::query(
            "INSERT INTO presence (uid, is_online, last_seen, typing_in, viewing_thread)
             VALUES (?, 0, ?, ?, NULL)
             ON CONFLICT(uid) DO UPDATE SET typing_in = excluded.typing_in",
        )
        .bind(uid)
        .bind(now_rfc3339())
        .bind(thread_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_viewing(&self, uid: &str, thread_id: Option<&str>) -> ChatResult<()> {
        sqlx::query(
            "INSERT INTO presence (uid, is_online, last_seen, typing_in, viewing_thread)
             VALUES (?, 0, ?, NULL, ?)
             ON CONFLICT(uid) DO UPDATE SET viewing_thread = excluded.viewing_thread",
        )
        .bind(uid)
        .bind(now_rfc3339())
        .bind(thread_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
