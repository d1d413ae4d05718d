//! Application events.
//!
//! Everything that can change state flows through here: user intents from
//! the CLI and async results sent back by the runtime's handlers. The
//! reducer is the only consumer.

use arogya_core::store::{Attachment, Message, Session};

use crate::audio::recognition::RecognitionError;
use crate::effects::Draft;

#[derive(Debug)]
pub enum AppEvent {
    Input(InputEvent),
    Session(SessionEvent),
    Chat(ChatEvent),
    Voice(VoiceEvent),
}

/// Composer intents from the UI.
#[derive(Debug)]
pub enum InputEvent {
    SetText(String),
    AttachmentAdded(Attachment),
    LanguageSelected(arogya_core::language::LanguageSelector),
    /// Send the current composer contents.
    Submitted,
}

/// Session lifecycle: user intents plus sync results.
#[derive(Debug)]
pub enum SessionEvent {
    /// Reload the session list from the backend.
    RefreshRequested,
    Loaded {
        sessions: Vec<Session>,
    },
    LoadFailed,
    /// Switch the active session (triggers a detail load).
    Selected {
        session_id: String,
    },
    DetailLoaded {
        generation: u64,
        session_id: String,
        title: Option<String>,
        messages: Vec<Message>,
    },
    DetailFailed {
        generation: u64,
        session_id: String,
    },
    CreateRequested,
    /// A session arrived: from the backend, or synthesized locally when
    /// the backend was unreachable. `pending_send` carries a draft that
    /// was waiting on the session id.
    Created {
        session: Session,
        pending_send: Option<Draft>,
    },
    DeleteRequested {
        session_id: String,
    },
    /// Remote delete finished (or failed); local removal happens now
    /// either way.
    Deleted {
        session_id: String,
    },
}

/// Chat exchange results.
#[derive(Debug)]
pub enum ChatEvent {
    Completed {
        session_id: String,
        response: Option<String>,
        title: Option<String>,
    },
    Failed {
        session_id: String,
    },
}

/// Voice capture: user intents, recognizer callbacks, recorder and
/// transcription results.
#[derive(Debug)]
pub enum VoiceEvent {
    StartRequested,
    StopRequested,
    /// A live recognition session was constructed and is listening.
    LiveStarted,
    /// Live recognition could not be constructed (no capability, or the
    /// constructor failed); fall through to raw recording.
    LiveUnavailable,
    LiveTranscript(String),
    LiveError(RecognitionError),
    /// The live session terminated (natural end or after a stop request).
    LiveEnded,
    RecorderStarted,
    RecorderFailed {
        error: String,
    },
    TranscriptionCompleted {
        text: String,
        detected_lang: Option<String>,
    },
    TranscriptionFailed {
        detail: String,
    },
}
