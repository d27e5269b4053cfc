use std::sync::Arc;

use crate::domain::entities::{now_rfc3339, MessageKind, ParticipantProfile, Thread};
use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::events::ChatEvent;
use crate::domain::ports::{MessageRepository, ThreadRepository};
use crate::events::EventBus;
use crate::services::MessageLog;

/// Find-or-create semantics, per-participant flags, thread lists, and the
/// bounded cascade that tears a thread down.
#[derive(Clone)]
pub struct ThreadDirectory {
    threads: Arc<dyn ThreadRepository>,
    messages: Arc<dyn MessageRepository>,
    message_log: MessageLog,
    event_bus: EventBus,
    delete_batch_size: i64,
}

impl ThreadDirectory {
    pub fn new(
        threads: Arc<dyn ThreadRepository>,
        messages: Arc<dyn MessageRepository>,
        message_log: MessageLog,
        event_bus: EventBus,
        delete_batch_size: i64,
    ) -> Self {
        Self {
            threads,
            messages,
            message_log,
            event_bus,
            delete_batch_size,
        }
    }

    /// Return the existing thread for this pair, or create one. Idempotent
    /// on the read path. Two concurrent calls for a brand-new pair can race
    /// and create two threads; storage enforces no pair uniqueness.
    pub async fn find_or_create_thread(
        &self,
        self_id: &str,
        self_profile: ParticipantProfile,
        other_id: &str,
        other_profile: ParticipantProfile,
        initial_message: Option<&str>,
    ) -> ChatResult<Thread> {
        if self_id == other_id {
            return Err(ChatError::Validation(
                "a thread needs two distinct participants".to_string(),
            ));
        }

        let existing = self.threads.threads_for_participant(self_id).await?;
        if let Some(thread) = existing.into_iter().find(|t| t.has_participant(other_id)) {
            return Ok(thread);
        }

        let thread = Thread::new_pair(self_id, self_profile.clone(), other_id, other_profile)?;
        self.threads.create_thread(&thread).await?;

        self.event_bus.publish(ChatEvent::ThreadCreated {
            thread_id: thread.id.clone(),
            participant_ids: thread.participant_ids(),
            timestamp: thread.created_at.clone(),
        });

        if let Some(text) = initial_message {
            if !text.trim().is_empty() {
                self.message_log
                    .send_message(
                        &thread.id,
                        self_id,
                        &self_profile.display_name,
                        self_profile.photo_ref.as_deref(),
                        text,
                        MessageKind::Text,
                        None,
                    )
                    .await?;
            }
        }

        // Re-read so the caller sees the stored state, including the initial
        // message's effect on the summary.
        self.fetch_thread(&thread.id).await
    }

    pub async fn fetch_thread(&self, thread_id: &str) -> ChatResult<Thread> {
        self.threads
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("thread {}", thread_id)))
    }

    /// Threads containing the user, newest activity first.
    pub async fn list_threads_for(&self, user_id: &str) -> ChatResult<Vec<Thread>> {
        self.threads.threads_for_participant(user_id).await
    }

    /// Every thread, newest activity first. Admin tooling only.
    pub async fn list_all_threads(&self) -> ChatResult<Vec<Thread>> {
        self.threads.all_threads().await
    }

    /// Set the archived flag under the calling participant's own key; the
    /// other participant's flags are untouched.
    pub async fn archive_thread(
        &self,
        thread_id: &str,
        participant_id: &str,
        flag: bool,
    ) -> ChatResult<()> {
        let thread = self.fetch_thread(thread_id).await?;
        self.threads
            .set_archived(thread_id, participant_id, flag)
            .await?;

        self.event_bus.publish(ChatEvent::ThreadUpdated {
            thread_id: thread_id.to_string(),
            participant_ids: thread.participant_ids(),
            timestamp: now_rfc3339(),
        });
        Ok(())
    }

    /// Set the muted flag under the calling participant's own key.
    pub async fn mute_thread(
        &self,
        thread_id: &str,
        participant_id: &str,
        flag: bool,
    ) -> ChatResult<()> {
        let thread = self.fetch_thread(thread_id).await?;
        self.threads
            .set_muted(thread_id, participant_id, flag)
            .await?;

        self.event_bus.publish(ChatEvent::ThreadUpdated {
            thread_id: thread_id.to_string(),
            participant_ids: thread.participant_ids(),
            timestamp: now_rfc3339(),
        });
        Ok(())
    }

    /// Tear a thread down: delete messages in bounded batches until the
    /// store is exhausted, then the thread document last. Re-invoking after
    /// a crash mid-loop resumes where it left off.
    pub async fn delete_thread(&self, thread_id: &str) -> ChatResult<()> {
        let thread = self.fetch_thread(thread_id).await?;

        loop {
            let deleted = self
                .messages
                .delete_message_batch(thread_id, self.delete_batch_size)
                .await?;
            tracing::debug!(
                "delete_thread {}: batch removed {} messages",
                thread_id,
                deleted
            );
            if deleted < self.delete_batch_size as u64 {
                break;
            }
        }

        self.threads.delete_thread(thread_id).await?;

        self.event_bus.publish(ChatEvent::ThreadDeleted {
            thread_id: thread_id.to_string(),
            participant_ids: thread.participant_ids(),
            timestamp: now_rfc3339(),
        });
        Ok(())
    }
}
