//! Effect handlers.
//!
//! Pure async functions: the runtime spawns them and sends the returned
//! event to the inbox. Failures never escape — every handler converts its
//! error into the event the reducer expects, logging the cause.

use arogya_core::api::{BackendClient, ChatRequest, MediaPayload, SessionSummary};
use arogya_core::store::{Message, Session};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use crate::effects::Draft;
use crate::events::{AppEvent, ChatEvent, SessionEvent, VoiceEvent};

/// Loads the session list for a user.
pub async fn sessions_load(api: BackendClient, user_id: String) -> AppEvent {
    match api.list_sessions(&user_id).await {
        Ok(summaries) => AppEvent::Session(SessionEvent::Loaded {
            sessions: summaries
                .into_iter()
                .map(SessionSummary::into_session)
                .collect(),
        }),
        Err(error) => {
            tracing::warn!("Session list load failed: {error:#}");
            AppEvent::Session(SessionEvent::LoadFailed)
        }
    }
}

/// Loads one session's title and message history.
pub async fn session_detail_load(
    api: BackendClient,
    generation: u64,
    session_id: String,
    user_id: String,
) -> AppEvent {
    match api.session_detail(&session_id, &user_id).await {
        Ok(detail) => AppEvent::Session(SessionEvent::DetailLoaded {
            generation,
            session_id,
            title: detail.title,
            messages: detail
                .messages
                .into_iter()
                .map(|m| Message {
                    role: m.role,
                    text: m.text,
                    media: Vec::new(),
                })
                .collect(),
        }),
        Err(error) => {
            tracing::warn!("Session detail load failed for {session_id}: {error:#}");
            AppEvent::Session(SessionEvent::DetailFailed {
                generation,
                session_id,
            })
        }
    }
}

/// Requests a new session; degrades to a locally synthesized one so the
/// flow is identical online or offline except for persistence.
pub async fn session_create(
    api: BackendClient,
    user_id: String,
    pending_send: Option<Draft>,
) -> AppEvent {
    let session = match api.create_session(&user_id).await {
        Ok(summary) => summary.into_session(),
        Err(error) => {
            tracing::warn!("Session create failed, synthesizing local session: {error:#}");
            Session::local(Uuid::new_v4().to_string())
        }
    };
    AppEvent::Session(SessionEvent::Created {
        session,
        pending_send,
    })
}

/// Best-effort remote delete. Local removal happens regardless of the
/// remote outcome.
pub async fn session_delete(api: BackendClient, session_id: String, user_id: String) -> AppEvent {
    if let Err(error) = api.delete_session(&session_id, &user_id).await {
        tracing::warn!("Remote delete failed for {session_id} (removing locally): {error:#}");
    }
    AppEvent::Session(SessionEvent::Deleted { session_id })
}

/// Sends one user turn to the inference endpoint.
pub async fn chat_send(
    api: BackendClient,
    user_id: String,
    session_id: String,
    draft: Draft,
) -> AppEvent {
    let media: Vec<MediaPayload> = draft.media.iter().map(MediaPayload::from).collect();
    let request = ChatRequest {
        user_id: &user_id,
        session_id: &session_id,
        message: &draft.text,
        language_lock: draft.language_lock.as_deref(),
        media,
    };
    match api.chat(&request).await {
        Ok(reply) => AppEvent::Chat(ChatEvent::Completed {
            session_id,
            response: reply.response,
            title: reply.title,
        }),
        Err(error) => {
            tracing::warn!("Chat request failed for {session_id}: {error:#}");
            AppEvent::Chat(ChatEvent::Failed { session_id })
        }
    }
}

/// Uploads a finished take for transcription.
pub async fn transcribe_recording(api: BackendClient, wav: Vec<u8>) -> AppEvent {
    let audio_base64 = BASE64.encode(&wav);
    match api.transcribe(&audio_base64).await {
        Ok(reply) => AppEvent::Voice(VoiceEvent::TranscriptionCompleted {
            text: reply.text.unwrap_or_default(),
            detected_lang: reply.detected_lang,
        }),
        Err(error) => {
            tracing::warn!("Transcription failed: {error:#}");
            // The backend's detail message when it sent one, else generic.
            AppEvent::Voice(VoiceEvent::TranscriptionFailed {
                detail: error.to_string(),
            })
        }
    }
}
