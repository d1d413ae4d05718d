//! Session sync reducer.
//!
//! Applies remote reconciliation results to the store and degrades to
//! locally synthesized state when the backend is unreachable: the UI
//! always has at least one session to operate on, online or offline.

use arogya_core::store::Session;
use uuid::Uuid;

use crate::effects::Effect;
use crate::events::SessionEvent;
use crate::features::chat;
use crate::state::AppState;

pub fn handle_session_event(state: &mut AppState, event: SessionEvent) -> Vec<Effect> {
    match event {
        SessionEvent::RefreshRequested => vec![Effect::LoadSessions],
        SessionEvent::Loaded { sessions } => {
            state.store.set_sessions(sessions);
            vec![]
        }
        SessionEvent::LoadFailed => {
            // Degrade to a single synthesized session, but only when
            // nothing is active; a live conversation keeps its list.
            if state.store.active_session_id().is_none() {
                let session = Session::local(Uuid::new_v4().to_string());
                state.store.set_sessions(vec![session]);
            }
            vec![]
        }
        SessionEvent::Selected { session_id } => {
            state.store.set_active_session(Some(session_id.clone()));
            state.detail_generation += 1;
            vec![Effect::LoadSessionDetail {
                generation: state.detail_generation,
                session_id,
            }]
        }
        SessionEvent::DetailLoaded {
            generation,
            session_id,
            title,
            messages,
        } => {
            // A later switch supersedes this response, and a session
            // deleted in the meantime must not be resurrected.
            if generation != state.detail_generation || state.store.session(&session_id).is_none() {
                return vec![];
            }
            state.store.set_messages(&session_id, messages);
            if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
                state.store.update_session_title(&session_id, title);
            }
            vec![]
        }
        SessionEvent::DetailFailed {
            generation,
            session_id,
        } => {
            if generation != state.detail_generation || state.store.session(&session_id).is_none() {
                return vec![];
            }
            // Never leave stale history on a failed load.
            state.store.clear_session_messages(&session_id);
            vec![]
        }
        SessionEvent::CreateRequested => vec![Effect::CreateSession { pending_send: None }],
        SessionEvent::Created {
            session,
            pending_send,
        } => {
            let session_id = session.id.clone();
            state.store.upsert_session(session);
            state.store.set_active_session(Some(session_id.clone()));
            state.composer.clear();
            state.notice = None;
            match pending_send {
                Some(draft) => chat::start_send(state, session_id, draft),
                None => vec![],
            }
        }
        SessionEvent::DeleteRequested { session_id } => {
            vec![Effect::DeleteSession { session_id }]
        }
        SessionEvent::Deleted { session_id } => {
            state.store.remove_session(&session_id);
            vec![]
        }
    }
}
