//! In-memory session store.
//!
//! The authoritative in-process registry of known chat sessions and the
//! ordered message log per session. All mutation operations are total,
//! synchronous state transitions with no I/O; the application layer's
//! reducer is the single writer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder title for sessions the backend has not titled yet.
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// A named conversation thread with a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    /// Backend timestamp, carried verbatim (ISO-8601). The client never
    /// does date arithmetic on it.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Session {
    /// A session synthesized locally when the backend is unreachable.
    /// Stamped like a remote record so the list renders uniformly.
    pub fn local(id: String) -> Self {
        Self {
            id,
            title: DEFAULT_SESSION_TITLE.to_string(),
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Attachment payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    Document,
    Audio,
}

/// A binary payload attached to a single user message.
///
/// `content` is always populated (base64) before the attachment enters a
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One turn in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Attachment>,
}

impl Message {
    pub fn user(text: impl Into<String>, media: Vec<Attachment>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            media,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            media: Vec::new(),
        }
    }
}

/// Session registry plus per-session message logs and the active-session
/// marker.
///
/// Invariants: every conversation key names a session in the set (delete
/// removes both atomically); a non-`None` active id names an existing
/// session; message logs are append-only except for whole-session clears.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    conversations: HashMap<String, Vec<Message>>,
    active_session_id: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    /// Messages for a session; a missing key reads as an empty log.
    pub fn messages(&self, id: &str) -> &[Message] {
        self.conversations.get(id).map_or(&[], Vec::as_slice)
    }

    /// Replaces the full session set. Conversation state is untouched.
    pub fn set_sessions(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
    }

    /// Sets the active session. Callers are responsible for the id existing.
    pub fn set_active_session(&mut self, id: Option<String>) {
        self.active_session_id = id;
    }

    /// Replaces the message log for a session.
    pub fn set_messages(&mut self, id: &str, messages: Vec<Message>) {
        self.conversations.insert(id.to_string(), messages);
    }

    /// Appends a message, treating a missing key as an empty log.
    pub fn append_message(&mut self, id: &str, message: Message) {
        self.conversations.entry(id.to_string()).or_default().push(message);
    }

    /// Resets a session's log to empty without removing the session.
    pub fn clear_session_messages(&mut self, id: &str) {
        self.conversations.insert(id.to_string(), Vec::new());
    }

    /// Removes the session, its message log, and the active marker if it
    /// pointed here. One atomic transition.
    pub fn remove_session(&mut self, id: &str) {
        self.sessions.retain(|s| s.id != id);
        self.conversations.remove(id);
        if self.active_session_id.as_deref() == Some(id) {
            self.active_session_id = None;
        }
    }

    /// In-place title rewrite, preserving position and all other fields.
    pub fn update_session_title(&mut self, id: &str, title: impl Into<String>) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            session.title = title.into();
        }
    }

    /// Merges a session record: updates in place when the id is known,
    /// otherwise prepends. Used when a create response (remote or locally
    /// synthesized) arrives.
    pub fn upsert_session(&mut self, session: Session) {
        if let Some(existing) = self.sessions.iter_mut().find(|s| s.id == session.id) {
            *existing = session;
        } else {
            self.sessions.insert(0, session);
        }
    }
}
