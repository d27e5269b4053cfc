use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::now_rfc3339;
use crate::domain::errors::{ChatError, ChatResult};

/// Content kept in place of a deleted message.
pub const REDACTED_TEXT: &str = "This message was deleted";

/// What a message carries: plain text or a reference into the attachment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Document,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Document => "document",
        }
    }

    /// Human-readable thread summary line for this kind. Attachment payloads
    /// are never surfaced raw.
    pub fn preview(&self, content: &str) -> String {
        match self {
            MessageKind::Text => content.to_string(),
            MessageKind::Image => "Sent an image".to_string(),
            MessageKind::Document => "Sent a document".to_string(),
        }
    }
}

impl TryFrom<String> for MessageKind {
    type Error = ChatError;

    fn try_from(s: String) -> ChatResult<Self> {
        match s.as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "document" => Ok(MessageKind::Document),
            other => Err(ChatError::Validation(format!(
                "unknown message kind: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message lifecycle. Active can be edited repeatedly; Deleted is absorbing
/// and keeps only the redaction text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MessageState {
    Active { content: String },
    Edited { content: String, edited_at: String },
    Deleted { deleted_at: String },
}

impl MessageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageState::Active { .. } => "active",
            MessageState::Edited { .. } => "edited",
            MessageState::Deleted { .. } => "deleted",
        }
    }

    /// The content string as stored; the redaction text once deleted.
    pub fn content(&self) -> &str {
        match self {
            MessageState::Active { content } | MessageState::Edited { content, .. } => content,
            MessageState::Deleted { .. } => REDACTED_TEXT,
        }
    }

    pub fn edited_at(&self) -> Option<&str> {
        match self {
            MessageState::Edited { edited_at, .. } => Some(edited_at),
            _ => None,
        }
    }

    pub fn deleted_at(&self) -> Option<&str> {
        match self {
            MessageState::Deleted { deleted_at } => Some(deleted_at),
            _ => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, MessageState::Deleted { .. })
    }
}

/// Denormalized snapshot of the message being replied to, not a live
/// reference — later edits or deletes do not touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySnapshot {
    pub message_id: String,
    pub text: String,
    pub sender_name: String,
}

/// One unit of content inside a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_photo_ref: Option<String>,
    pub kind: MessageKind,
    #[serde(flatten)]
    pub state: MessageState,
    pub reply_to: Option<ReplySnapshot>,
    /// Participant id -> timestamp of first read. The sender is present from
    /// creation; entries are never removed.
    pub read_by: BTreeMap<String, String>,
    pub created_at: String,
}

impl Message {
    pub fn new(
        thread_id: String,
        sender_id: String,
        sender_name: String,
        sender_photo_ref: Option<String>,
        kind: MessageKind,
        content: String,
        reply_to: Option<ReplySnapshot>,
    ) -> Self {
        let now = now_rfc3339();
        let mut read_by = BTreeMap::new();
        read_by.insert(sender_id.clone(), now.clone());

        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            sender_id,
            sender_name,
            sender_photo_ref,
            kind,
            state: MessageState::Active { content },
            reply_to,
            read_by,
            created_at: now,
        }
    }

    /// Reject empty or whitespace-only text before anything touches storage.
    /// Attachment kinds carry a store reference instead, which only needs to
    /// be non-empty.
    pub fn validate_content(kind: MessageKind, content: &str) -> Result<(), String> {
        match kind {
            MessageKind::Text => {
                if content.trim().is_empty() {
                    return Err("message text cannot be empty".to_string());
                }
            }
            MessageKind::Image | MessageKind::Document => {
                if content.is_empty() {
                    return Err("attachment reference cannot be empty".to_string());
                }
            }
        }
        Ok(())
    }
}
