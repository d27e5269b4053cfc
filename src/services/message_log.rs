use std::sync::Arc;

use crate::domain::entities::{
    now_rfc3339, LastMessage, Message, MessageKind, MessageState, ReplySnapshot,
};
use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::events::ChatEvent;
use crate::domain::ports::{MessageRepository, ThreadRepository};
use crate::events::EventBus;

/// Owns the message append path, pagination, and the edit/delete lifecycle.
#[derive(Clone)]
pub struct MessageLog {
    messages: Arc<dyn MessageRepository>,
    threads: Arc<dyn ThreadRepository>,
    event_bus: EventBus,
}

impl MessageLog {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        threads: Arc<dyn ThreadRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            messages,
            threads,
            event_bus,
        }
    }

    /// Append a message and update the parent thread's summary and unread
    /// counters in one atomic unit. Fails before any write on empty text,
    /// and with NotFound if the thread does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn send_message(
        &self,
        thread_id: &str,
        sender_id: &str,
        sender_name: &str,
        sender_photo_ref: Option<&str>,
        content: &str,
        kind: MessageKind,
        reply_to: Option<ReplySnapshot>,
    ) -> ChatResult<Message> {
        Message::validate_content(kind, content).map_err(ChatError::Validation)?;

        let thread = self
            .threads
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("thread {}", thread_id)))?;

        if !thread.has_participant(sender_id) {
            return Err(ChatError::Validation(format!(
                "sender {} is not a participant of thread {}",
                sender_id, thread_id
            )));
        }

        let message = Message::new(
            thread_id.to_string(),
            sender_id.to_string(),
            sender_name.to_string(),
            sender_photo_ref.map(String::from),
            kind,
            content.to_string(),
            reply_to,
        );

        let preview = LastMessage {
            text: kind.preview(content),
            sender_id: sender_id.to_string(),
            at: message.created_at.clone(),
            kind,
        };

        self.messages.append_message(&message, &preview).await?;

        self.event_bus.publish(ChatEvent::MessageAppended {
            message_id: message.id.clone(),
            thread_id: thread_id.to_string(),
            sender_id: sender_id.to_string(),
            timestamp: message.created_at.clone(),
        });
        // The thread document changed too (summary, counters); thread-list
        // subscribers need to hear about it.
        self.event_bus.publish(ChatEvent::ThreadUpdated {
            thread_id: thread_id.to_string(),
            participant_ids: thread.participant_ids(),
            timestamp: message.created_at.clone(),
        });

        Ok(message)
    }

    /// Newest-first page of messages; `before` narrows to strictly older
    /// ones (cursor pagination, no overlap).
    pub async fn fetch_messages(
        &self,
        thread_id: &str,
        limit: i64,
        before: Option<&str>,
    ) -> ChatResult<Vec<Message>> {
        self.messages.list_messages(thread_id, limit, before).await
    }

    /// Replace the text of an active or previously edited text message.
    /// Deleted messages reject the edit; deletion is absorbing.
    pub async fn edit_message(
        &self,
        thread_id: &str,
        message_id: &str,
        new_text: &str,
    ) -> ChatResult<()> {
        let message = self
            .messages
            .get_message(thread_id, message_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("message {}", message_id)))?;

        if message.state.is_deleted() {
            return Err(ChatError::Validation(
                "cannot edit a deleted message".to_string(),
            ));
        }
        if message.kind != MessageKind::Text {
            return Err(ChatError::Validation(
                "only text messages can be edited".to_string(),
            ));
        }
        Message::validate_content(MessageKind::Text, new_text).map_err(ChatError::Validation)?;

        let now = now_rfc3339();
        let state = MessageState::Edited {
            content: new_text.to_string(),
            edited_at: now.clone(),
        };
        self.messages
            .update_state(thread_id, message_id, &state)
            .await?;

        self.event_bus.publish(ChatEvent::MessageUpdated {
            message_id: message_id.to_string(),
            thread_id: thread_id.to_string(),
            timestamp: now,
        });
        Ok(())
    }

    /// Soft-delete: content becomes the fixed redaction text. Deleting an
    /// already-deleted message is a no-op.
    pub async fn delete_message(&self, thread_id: &str, message_id: &str) -> ChatResult<()> {
        let message = self
            .messages
            .get_message(thread_id, message_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("message {}", message_id)))?;

        if message.state.is_deleted() {
            return Ok(());
        }

        let now = now_rfc3339();
        let state = MessageState::Deleted {
            deleted_at: now.clone(),
        };
        self.messages
            .update_state(thread_id, message_id, &state)
            .await?;

        self.event_bus.publish(ChatEvent::MessageUpdated {
            message_id: message_id.to_string(),
            thread_id: thread_id.to_string(),
            timestamp: now,
        });
        Ok(())
    }

    pub async fn count_messages(&self, thread_id: &str) -> ChatResult<i64> {
        self.messages.count_messages(thread_id).await
    }
}
