//! Application state composition.
//!
//! `AppState` combines the session store with the composer, the language
//! selector, and the voice-capture state. It is mutated only by the
//! reducer; the runtime and the CLI read it.

use arogya_core::language::LanguageSelector;
use arogya_core::store::{Attachment, SessionStore};

use crate::features::voice::VoiceState;

/// Pending user input: text plus attachments staged for the next send.
#[derive(Debug, Default)]
pub struct Composer {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl Composer {
    pub fn clear(&mut self) {
        self.text.clear();
        self.attachments.clear();
    }

    /// Appends transcribed text, space-joined with whatever is already
    /// staged.
    pub fn append_transcript(&mut self, transcript: &str) {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return;
        }
        if self.text.is_empty() {
            self.text.push_str(transcript);
        } else {
            self.text.push(' ');
            self.text.push_str(transcript);
        }
    }
}

/// Application state. Single writer: the reducer.
#[derive(Debug)]
pub struct AppState {
    /// Stable user identifier from the identity collaborator, if signed in.
    pub user_id: Option<String>,
    /// Sessions, per-session logs, active marker.
    pub store: SessionStore,
    /// Staged input for the next send.
    pub composer: Composer,
    /// Response-language selector.
    pub language: LanguageSelector,
    /// Voice capture state machine.
    pub voice: VoiceState,
    /// Generation stamp for session-detail loads; responses carrying a
    /// stale generation are dropped.
    pub detail_generation: u64,
    /// Latest advisory message for the user (errors are strings here,
    /// never panics).
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(user_id: Option<String>, language: LanguageSelector) -> Self {
        Self {
            user_id,
            store: SessionStore::new(),
            composer: Composer::default(),
            language,
            voice: VoiceState::Idle,
            detail_generation: 0,
            notice: None,
        }
    }

    /// Takes the pending notice, if any, for display.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
