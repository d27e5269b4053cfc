use serde::{Deserialize, Serialize};

use crate::domain::entities::now_rfc3339;

/// Ephemeral per-user state, decoupled from thread and message persistence.
/// Created lazily on first write, mutated by client heartbeats, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presence {
    pub uid: String,
    pub is_online: bool,
    pub last_seen: String,
    /// Thread the user is currently typing in, if any.
    pub typing_in: Option<String>,
    /// Thread the user currently has open, if any.
    pub viewing_thread: Option<String>,
}

impl Presence {
    /// Fresh offline record for a user we have never seen.
    pub fn offline(uid: String) -> Self {
        Self {
            uid,
            is_online: false,
            last_seen: now_rfc3339(),
            typing_in: None,
            viewing_thread: None,
        }
    }
}
