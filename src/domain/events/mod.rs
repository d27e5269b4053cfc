/// Change notifications published after every committed mutation. Subscribers
/// use these to decide when to requery their snapshot; payloads identify what
/// changed, not the new state.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    ThreadCreated {
        thread_id: String,
        participant_ids: Vec<String>,
        timestamp: String,
    },
    ThreadUpdated {
        thread_id: String,
        participant_ids: Vec<String>,
        timestamp: String,
    },
    ThreadDeleted {
        thread_id: String,
        participant_ids: Vec<String>,
        timestamp: String,
    },
    MessageAppended {
        message_id: String,
        thread_id: String,
        sender_id: String,
        timestamp: String,
    },
    MessageUpdated {
        message_id: String,
        thread_id: String,
        timestamp: String,
    },
    MessagesRead {
        thread_id: String,
        user_id: String,
        message_ids: Vec<String>,
        timestamp: String,
    },
    PresenceChanged {
        user_id: String,
        timestamp: String,
    },
}

impl ChatEvent {
    /// Thread the event belongs to, for message-window subscriptions.
    pub fn message_thread_id(&self) -> Option<&str> {
        match self {
            ChatEvent::MessageAppended { thread_id, .. }
            | ChatEvent::MessageUpdated { thread_id, .. }
            | ChatEvent::MessagesRead { thread_id, .. } => Some(thread_id),
            _ => None,
        }
    }

    /// Participant ids of a thread-level event, for thread-list filtering.
    pub fn thread_participants(&self) -> Option<&[String]> {
        match self {
            ChatEvent::ThreadCreated {
                participant_ids, ..
            }
            | ChatEvent::ThreadUpdated {
                participant_ids, ..
            }
            | ChatEvent::ThreadDeleted {
                participant_ids, ..
            } => Some(participant_ids),
            _ => None,
        }
    }
}
