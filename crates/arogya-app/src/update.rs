//! The main reducer function.
//!
//! All state mutations happen here. The runtime calls
//! `update(state, event)` and executes the returned effects. This is the
//! single source of truth for how events modify state.

use crate::effects::Effect;
use crate::events::{AppEvent, InputEvent};
use crate::features::{chat, sessions, voice};
use crate::state::AppState;

pub fn update(state: &mut AppState, event: AppEvent) -> Vec<Effect> {
    match event {
        AppEvent::Input(event) => handle_input_event(state, event),
        AppEvent::Session(event) => sessions::handle_session_event(state, event),
        AppEvent::Chat(event) => chat::handle_chat_event(state, event),
        AppEvent::Voice(event) => voice::handle_voice_event(state, event),
    }
}

fn handle_input_event(state: &mut AppState, event: InputEvent) -> Vec<Effect> {
    match event {
        InputEvent::SetText(text) => {
            state.composer.text = text;
            vec![]
        }
        InputEvent::AttachmentAdded(attachment) => {
            state.composer.attachments.push(attachment);
            vec![]
        }
        InputEvent::LanguageSelected(selector) => {
            state.language = selector;
            vec![]
        }
        InputEvent::Submitted => chat::handle_submit(state),
    }
}
