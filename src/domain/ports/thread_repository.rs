use crate::domain::entities::Thread;
use crate::domain::errors::ChatResult;

#[async_trait::async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Insert the thread document and both participant rows atomically.
    async fn create_thread(&self, thread: &Thread) -> ChatResult<()>;

    async fn get_thread(&self, thread_id: &str) -> ChatResult<Option<Thread>>;

    /// Threads containing the participant, newest activity first.
    async fn threads_for_participant(&self, participant_id: &str) -> ChatResult<Vec<Thread>>;

    /// Every thread in the store, newest activity first (admin view).
    async fn all_threads(&self) -> ChatResult<Vec<Thread>>;

    /// Flip the archived flag under the calling participant's key only.
    async fn set_archived(
        &self,
        thread_id: &str,
        participant_id: &str,
        flag: bool,
    ) -> ChatResult<()>;

    /// Flip the muted flag under the calling participant's key only.
    async fn set_muted(&self, thread_id: &str, participant_id: &str, flag: bool) -> ChatResult<()>;

    /// Remove the thread document and its participant rows. Messages must
    /// already be gone; the cascade loop handles them first.
    async fn delete_thread(&self, thread_id: &str) -> ChatResult<()>;
}
