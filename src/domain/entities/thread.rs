use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::{now_rfc3339, MessageKind};
use crate::domain::errors::{ChatError, ChatResult};

/// Role a participant plays in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    User,
    Agent,
    Admin,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::User => "user",
            ParticipantRole::Agent => "agent",
            ParticipantRole::Admin => "admin",
        }
    }
}

impl TryFrom<String> for ParticipantRole {
    type Error = ChatError;

    fn try_from(s: String) -> ChatResult<Self> {
        match s.as_str() {
            "user" => Ok(ParticipantRole::User),
            "agent" => Ok(ParticipantRole::Agent),
            "admin" => Ok(ParticipantRole::Admin),
            other => Err(ChatError::Validation(format!(
                "unknown participant role: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thread flavor, derived from the roles of its two participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadKind {
    UserAgent,
    UserAdmin,
    AgentAdmin,
}

impl ThreadKind {
    /// Fixed precedence table: user+agent, user+admin, agent+admin.
    /// Same-role pairings have no kind and cannot form a thread.
    pub fn derive(a: ParticipantRole, b: ParticipantRole) -> Option<Self> {
        use ParticipantRole::*;
        match (a, b) {
            (User, Agent) | (Agent, User) => Some(ThreadKind::UserAgent),
            (User, Admin) | (Admin, User) => Some(ThreadKind::UserAdmin),
            (Agent, Admin) | (Admin, Agent) => Some(ThreadKind::AgentAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadKind::UserAgent => "user_agent",
            ThreadKind::UserAdmin => "user_admin",
            ThreadKind::AgentAdmin => "agent_admin",
        }
    }
}

impl TryFrom<String> for ThreadKind {
    type Error = ChatError;

    fn try_from(s: String) -> ChatResult<Self> {
        match s.as_str() {
            "user_agent" => Ok(ThreadKind::UserAgent),
            "user_admin" => Ok(ThreadKind::UserAdmin),
            "agent_admin" => Ok(ThreadKind::AgentAdmin),
            other => Err(ChatError::Validation(format!(
                "unknown thread kind: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Denormalized snapshot of a participant, taken at thread creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub display_name: String,
    pub photo_ref: Option<String>,
    pub role: ParticipantRole,
}

/// Summary of the newest message, denormalized onto the thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub sender_id: String,
    pub at: String,
    pub kind: MessageKind,
}

/// A conversation between exactly two participants. The per-participant maps
/// carry one entry per participant id, created with the thread and never
/// losing entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub kind: ThreadKind,
    pub participants: BTreeMap<String, ParticipantProfile>,
    pub unread_count: BTreeMap<String, i64>,
    pub archived: BTreeMap<String, bool>,
    pub muted: BTreeMap<String, bool>,
    pub last_message: Option<LastMessage>,
    pub created_at: String,
    pub updated_at: String,
}

impl Thread {
    /// Build a fresh thread for a pair of distinct participants, deriving the
    /// kind from their roles and seeding every per-participant map.
    pub fn new_pair(
        a_id: &str,
        a_profile: ParticipantProfile,
        b_id: &str,
        b_profile: ParticipantProfile,
    ) -> ChatResult<Self> {
        if a_id == b_id {
            return Err(ChatError::Validation(
                "a thread needs two distinct participants".to_string(),
            ));
        }

        let kind = ThreadKind::derive(a_profile.role, b_profile.role).ok_or_else(|| {
            ChatError::Validation(format!(
                "unsupported participant pairing: {} and {}",
                a_profile.role, b_profile.role
            ))
        })?;

        let now = now_rfc3339();
        let mut participants = BTreeMap::new();
        let mut unread_count = BTreeMap::new();
        let mut archived = BTreeMap::new();
        let mut muted = BTreeMap::new();
        for (id, profile) in [(a_id, a_profile), (b_id, b_profile)] {
            participants.insert(id.to_string(), profile);
            unread_count.insert(id.to_string(), 0);
            archived.insert(id.to_string(), false);
            muted.insert(id.to_string(), false);
        }

        Ok(Thread {
            id: Uuid::new_v4().to_string(),
            kind,
            participants,
            unread_count,
            archived,
            muted,
            last_message: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// The two participant ids, in sorted order.
    pub fn participant_ids(&self) -> Vec<String> {
        self.participants.keys().cloned().collect()
    }

    pub fn has_participant(&self, uid: &str) -> bool {
        self.participants.contains_key(uid)
    }

    /// The counterpart of `uid`, if `uid` belongs to this thread.
    pub fn other_participant(&self, uid: &str) -> Option<&str> {
        if !self.has_participant(uid) {
            return None;
        }
        self.participants
            .keys()
            .find(|id| id.as_str() != uid)
            .map(String::as_str)
    }
}
