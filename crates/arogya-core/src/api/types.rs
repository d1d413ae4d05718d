use serde::{Deserialize, Serialize};

use crate::store::{Attachment, AttachmentKind, DEFAULT_SESSION_TITLE, Role, Session};

#[derive(Debug, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SessionSummary {
    /// Normalizes a remote record into a store session, defaulting an
    /// absent or blank title to the placeholder.
    pub fn into_session(self) -> Session {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string());
        Session {
            id: self.id,
            title,
            updated_at: self.updated_at.filter(|at| !at.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoteMessage {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionDetail {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<RemoteMessage>,
}

#[derive(Debug, Serialize)]
pub struct NewSessionRequest<'a> {
    pub user_id: &'a str,
}

/// Wire form of an attachment.
///
/// The backend's media vocabulary has no `document` kind; documents travel
/// as the generic `text` kind, everything else passes through.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MediaPayload {
    pub kind: &'static str,
    pub content: String,
}

impl From<&Attachment> for MediaPayload {
    fn from(attachment: &Attachment) -> Self {
        let kind = match attachment.kind {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::Document => "text",
            AttachmentKind::Audio => "audio",
        };
        Self {
            kind,
            content: attachment.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub user_id: &'a str,
    pub session_id: &'a str,
    pub message: &'a str,
    /// Explicit response-language lock; `None` asks the backend to detect.
    pub language_lock: Option<&'a str>,
    pub media: Vec<MediaPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub citations: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct SpeechRequest<'a> {
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct SpeechReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub detected_lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HealthReply {
    pub ok: bool,
    #[serde(default)]
    pub llm_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
