use crate::domain::entities::{LastMessage, Message, MessageState};
use crate::domain::errors::ChatResult;

#[async_trait::async_trait]
pub trait MessageRepository: Send + Sync {
    /// The send transaction: insert the message and the sender's read
    /// receipt, stamp the parent thread's last-message summary, and bump
    /// `unread_count` for every other participant with a storage-side
    /// increment. All or nothing; fails with NotFound if the thread is
    /// missing and persists no orphan message.
    async fn append_message(&self, message: &Message, preview: &LastMessage) -> ChatResult<()>;

    async fn get_message(&self, thread_id: &str, message_id: &str) -> ChatResult<Option<Message>>;

    /// Up to `limit` messages ordered newest-first; when `before` is given,
    /// only messages strictly older than that timestamp.
    async fn list_messages(
        &self,
        thread_id: &str,
        limit: i64,
        before: Option<&str>,
    ) -> ChatResult<Vec<Message>>;

    /// Overwrite the lifecycle columns (state, content, edited_at,
    /// deleted_at) from the given state. Transition legality is the
    /// service's job.
    async fn update_state(
        &self,
        thread_id: &str,
        message_id: &str,
        state: &MessageState,
    ) -> ChatResult<()>;

    /// One transaction: zero the participant's unread counter and insert
    /// read receipts for the newest `window` messages they have not read and
    /// did not author. Returns the ids that were marked.
    async fn mark_thread_read(
        &self,
        thread_id: &str,
        user_id: &str,
        window: i64,
    ) -> ChatResult<Vec<String>>;

    /// Delete up to `limit` of the thread's messages (and their read rows)
    /// in one transaction. Returns how many went; the cascade loops until
    /// this comes back short.
    async fn delete_message_batch(&self, thread_id: &str, limit: i64) -> ChatResult<u64>;

    async fn count_messages(&self, thread_id: &str) -> ChatResult<i64>;
}
