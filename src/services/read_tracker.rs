use std::sync::Arc;

use crate::domain::entities::now_rfc3339;
use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::events::ChatEvent;
use crate::domain::ports::{MessageRepository, ThreadRepository};
use crate::events::EventBus;

/// Per-participant unread counters and read receipts.
#[derive(Clone)]
pub struct ReadTracker {
    messages: Arc<dyn MessageRepository>,
    threads: Arc<dyn ThreadRepository>,
    event_bus: EventBus,
    read_mark_window: i64,
}

impl ReadTracker {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        threads: Arc<dyn ThreadRepository>,
        event_bus: EventBus,
        read_mark_window: i64,
    ) -> Self {
        Self {
            messages,
            threads,
            event_bus,
            read_mark_window,
        }
    }

    /// Zero the caller's unread counter and stamp receipts on the newest
    /// window of messages they have not read. Messages older than the window
    /// keep no receipt from this call; the counter reset is what the badge
    /// trusts.
    pub async fn mark_thread_read(&self, thread_id: &str, user_id: &str) -> ChatResult<()> {
        let thread = self
            .threads
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("thread {}", thread_id)))?;

        let marked = self
            .messages
            .mark_thread_read(thread_id, user_id, self.read_mark_window)
            .await?;

        let now = now_rfc3339();
        self.event_bus.publish(ChatEvent::MessagesRead {
            thread_id: thread_id.to_string(),
            user_id: user_id.to_string(),
            message_ids: marked,
            timestamp: now.clone(),
        });
        self.event_bus.publish(ChatEvent::ThreadUpdated {
            thread_id: thread_id.to_string(),
            participant_ids: thread.participant_ids(),
            timestamp: now,
        });
        Ok(())
    }
}
