use std::sync::Arc;

use crate::domain::entities::{now_rfc3339, Presence};
use crate::domain::errors::ChatResult;
use crate::domain::events::ChatEvent;
use crate::domain::ports::PresenceRepository;
use crate::events::EventBus;

/// Online/offline, typing, and which-thread-is-open state. Independent of
/// thread and message persistence.
#[derive(Clone)]
pub struct PresenceTracker {
    presence: Arc<dyn PresenceRepository>,
    event_bus: EventBus,
}

impl PresenceTracker {
    pub fn new(presence: Arc<dyn PresenceRepository>, event_bus: EventBus) -> Self {
        Self {
            presence,
            event_bus,
        }
    }

    /// Record a heartbeat or an explicit online/offline flip. Going offline
    /// clears typing and viewing state in the same write.
    pub async fn set_online(&self, user_id: &str, is_online: bool) -> ChatResult<()> {
        self.presence.set_online(user_id, is_online).await?;
        self.publish(user_id);
        Ok(())
    }

    /// `None` means "stopped typing".
    pub async fn set_typing(&self, user_id: &str, thread_id: Option<&str>) -> ChatResult<()> {
        self.presence.set_typing(user_id, thread_id).await?;
        self.publish(user_id);
        Ok(())
    }

    /// `None` means "closed the thread".
    pub async fn set_viewing(&self, user_id: &str, thread_id: Option<&str>) -> ChatResult<()> {
        self.presence.set_viewing(user_id, thread_id).await?;
        self.publish(user_id);
        Ok(())
    }

    /// Pull path for callers that need state before the first push arrives.
    /// Users we have never heard from read as offline.
    pub async fn fetch_presence(&self, user_id: &str) -> ChatResult<Presence> {
        Ok(self
            .presence
            .get_presence(user_id)
            .await?
            .unwrap_or_else(|| Presence::offline(user_id.to_string())))
    }

    fn publish(&self, user_id: &str) {
        self.event_bus.publish(ChatEvent::PresenceChanged {
            user_id: user_id.to_string(),
            timestamp: now_rfc3339(),
        });
    }
}
