//! Live speech recognition capability seam.
//!
//! Platform live recognition (when a host integration provides one) is a
//! strictly better capture path than record-then-transcribe: no upload,
//! incremental results. It is also the less reliable one, so everything
//! here is built for failure: construction may be refused, and a running
//! session reports errors through events rather than panicking.
//!
//! The runtime holds at most one [`LiveSession`] at a time.

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::events::AppEvent;

/// Error classes a live recognition session can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// The recognition service is unreachable. This is the transient
    /// infrastructure class that triggers automatic failover to raw
    /// recording; it is never surfaced to the user directly.
    ServiceUnreachable,
    /// Anything else (permission denied, no speech, aborted). Surfaced as
    /// a notice; no fallback.
    Other(String),
}

impl std::fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceUnreachable => f.write_str("recognition service unreachable"),
            Self::Other(message) => f.write_str(message),
        }
    }
}

/// A running live recognition session.
///
/// The session reports back by sending [`AppEvent::Voice`] events on the
/// sender it was given: `LiveTranscript` for a final result, `LiveError`
/// for failures, and `LiveEnded` exactly once on termination (natural end
/// or after [`stop`](LiveSession::stop)).
pub trait LiveSession: Send {
    /// Requests a graceful stop. Termination still arrives as `LiveEnded`.
    fn stop(&mut self) -> Result<()>;
}

/// A provider of live recognition sessions.
///
/// Sessions are single-shot, non-continuous, final-results-only. `start`
/// may fail (or the capability may simply not be registered with the
/// runtime), in which case capture falls through to raw recording.
pub trait LiveRecognition: Send + Sync {
    fn start(
        &self,
        language: &str,
        events: UnboundedSender<AppEvent>,
    ) -> Result<Box<dyn LiveSession>>;
}
