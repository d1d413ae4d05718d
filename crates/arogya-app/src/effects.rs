//! Effects returned by the reducer for the runtime to execute.
//!
//! Effects represent I/O and task spawning only (no direct state
//! mutations). This keeps the reducer pure: it only mutates state and
//! returns effects, never performs I/O itself. Device acquisition for
//! voice capture lives behind effects for the same reason: the transition
//! logic stays testable without a microphone.

use std::time::Duration;

use arogya_core::store::Attachment;

/// A snapshot of the composer taken at submit time, decoupled from later
/// composer changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub media: Vec<Attachment>,
    pub language_lock: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the session list for the current user.
    LoadSessions,

    /// Fetch one session's title and message history. The generation is
    /// echoed back so stale responses can be dropped.
    LoadSessionDetail { generation: u64, session_id: String },

    /// Ask the backend for a new session; synthesize one locally on
    /// failure. An attached draft is sent once the session exists.
    CreateSession { pending_send: Option<Draft> },

    /// Best-effort remote delete; local removal follows regardless.
    DeleteSession { session_id: String },

    /// POST the user turn to the inference endpoint.
    SendChat { session_id: String, draft: Draft },

    /// Fire-and-forget session-list refresh after a delay (picks up
    /// server-generated titles). Never cancelled.
    ScheduleSessionRefresh { delay: Duration },

    /// Begin a voice capture: try live recognition first, fall through to
    /// raw recording when the capability is unavailable.
    StartVoiceCapture { language: String },

    /// Gracefully stop the live recognition session (stop errors are
    /// swallowed; termination arrives as `LiveEnded`).
    StopLiveRecognition,

    /// Acquire the microphone and start buffering raw audio.
    StartRecorder,

    /// Stop the recorder, release the device, and send the buffered audio
    /// for transcription.
    StopRecorderAndTranscribe,
}

/// Delay before the post-send session-list refresh. The backend generates
/// a session title asynchronously after the first turn; this refresh picks
/// it up.
pub const SESSION_REFRESH_DELAY: Duration = Duration::from_millis(1200);
