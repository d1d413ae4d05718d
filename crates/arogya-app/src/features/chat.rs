//! Message exchange reducer.
//!
//! A send is optimistic: the user turn lands in the store before any
//! network call, the composer clears immediately, and a failed exchange is
//! absorbed into the conversation as a fixed assistant reply rather than
//! thrown to the caller.

use arogya_core::store::Message;

use crate::effects::{Draft, Effect, SESSION_REFRESH_DELAY};
use crate::events::ChatEvent;
use crate::state::AppState;

/// Wire text for a message that is attachments only.
pub const ATTACHMENT_PLACEHOLDER: &str = "[attachment]";

/// Assistant text when the backend reply carries no response field.
pub const NO_RESPONSE_FALLBACK: &str = "No response received.";

/// Assistant text when the exchange fails outright.
pub const SEND_FAILURE_MESSAGE: &str =
    "Could not reach the assistant. Please check your connection and try again.";

/// Handles a composer submit.
///
/// No-op unless there is an identified user and something to send. When no
/// session is active, one is created first and the draft rides along.
pub fn handle_submit(state: &mut AppState) -> Vec<Effect> {
    if state.user_id.is_none() {
        return vec![];
    }
    let text = state.composer.text.trim().to_string();
    if text.is_empty() && state.composer.attachments.is_empty() {
        return vec![];
    }

    let draft = Draft {
        text: if text.is_empty() {
            ATTACHMENT_PLACEHOLDER.to_string()
        } else {
            text
        },
        // Snapshot: later composer changes must not affect this send.
        media: state.composer.attachments.clone(),
        language_lock: state.language.lock().map(str::to_string),
    };

    match state.store.active_session_id().map(str::to_string) {
        Some(session_id) => start_send(state, session_id, draft),
        None => vec![Effect::CreateSession {
            pending_send: Some(draft),
        }],
    }
}

/// Appends the optimistic user turn, clears the composer, and issues the
/// chat request. Shared by the direct path and the create-then-send path.
pub(crate) fn start_send(state: &mut AppState, session_id: String, draft: Draft) -> Vec<Effect> {
    state.store.append_message(
        &session_id,
        Message::user(draft.text.clone(), draft.media.clone()),
    );
    state.composer.clear();
    vec![Effect::SendChat { session_id, draft }]
}

pub fn handle_chat_event(state: &mut AppState, event: ChatEvent) -> Vec<Effect> {
    match event {
        ChatEvent::Completed {
            session_id,
            response,
            title,
        } => {
            // The session may have been deleted while the exchange was in
            // flight; a reply must not resurrect it.
            if state.store.session(&session_id).is_none() {
                return vec![];
            }
            let text = response
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());
            state.store.append_message(&session_id, Message::assistant(text));
            if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
                state.store.update_session_title(&session_id, title);
            }
            vec![Effect::ScheduleSessionRefresh {
                delay: SESSION_REFRESH_DELAY,
            }]
        }
        ChatEvent::Failed { session_id } => {
            if state.store.session(&session_id).is_none() {
                return vec![];
            }
            state
                .store
                .append_message(&session_id, Message::assistant(SEND_FAILURE_MESSAGE));
            vec![Effect::ScheduleSessionRefresh {
                delay: SESSION_REFRESH_DELAY,
            }]
        }
    }
}
