use crate::domain::entities::Presence;
use crate::domain::errors::ChatResult;

#[async_trait::async_trait]
pub trait PresenceRepository: Send + Sync {
    async fn get_presence(&self, uid: &str) -> ChatResult<Option<Presence>>;

    /// Upsert online state and refresh `last_seen`. Going offline clears
    /// `typing_in` and `viewing_thread` in the same write.
    async fn set_online(&self, uid: &str, is_online: bool) -> ChatResult<()>;

    /// Merge-only upsert of the typing indicator; other fields untouched.
    async fn set_typing(&self, uid: &str, thread_id: Option<&str>) -> ChatResult<()>;

    /// Merge-only upsert of the open-thread marker; other fields untouched.
    async fn set_viewing(&self, uid: &str, thread_id: Option<&str>) -> ChatResult<()>;
}
