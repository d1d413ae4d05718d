//! Voice capture state machine.
//!
//! A single voice session is either a live recognition stream or a raw
//! microphone recording, never both. The transition function here is
//! pure; the runtime performs the actual device and recognizer work and
//! reports back through [`VoiceEvent`]s.
//!
//! The one designed transition between the two active states is the
//! failover on [`RecognitionError::ServiceUnreachable`]: the live session
//! is torn down and a raw recording is started in its place, with no
//! user-visible error for that specific condition.

use arogya_core::language::{DEFAULT_LANGUAGE, LanguageSelector, normalize_language_code};

use crate::audio::recognition::RecognitionError;
use crate::effects::Effect;
use crate::events::VoiceEvent;
use crate::state::AppState;

/// Notice shown when the microphone cannot be acquired.
pub const MIC_UNAVAILABLE_NOTICE: &str =
    "Microphone unavailable. Check your input device and permissions.";

/// Capture state. At most one voice session is alive at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    /// A live recognition session is listening.
    Live,
    /// Raw audio is being buffered from the microphone.
    Recording,
}

impl VoiceState {
    pub fn is_capturing(self) -> bool {
        !matches!(self, VoiceState::Idle)
    }
}

pub fn handle_voice_event(state: &mut AppState, event: VoiceEvent) -> Vec<Effect> {
    match event {
        VoiceEvent::StartRequested => {
            // Re-entry guard: one capture at a time.
            if state.voice.is_capturing() {
                return vec![];
            }
            vec![Effect::StartVoiceCapture {
                language: state.language.recognition_hint().to_string(),
            }]
        }
        VoiceEvent::StopRequested => match state.voice {
            // Graceful stop; LiveEnded brings us back to Idle.
            VoiceState::Live => vec![Effect::StopLiveRecognition],
            VoiceState::Recording => {
                state.voice = VoiceState::Idle;
                vec![Effect::StopRecorderAndTranscribe]
            }
            VoiceState::Idle => vec![],
        },
        VoiceEvent::LiveStarted => {
            state.voice = VoiceState::Live;
            vec![]
        }
        VoiceEvent::LiveUnavailable => {
            // No live capability (or its constructor failed): fall through
            // to raw recording directly.
            vec![Effect::StartRecorder]
        }
        VoiceEvent::LiveTranscript(transcript) => {
            state.composer.append_transcript(&transcript);
            vec![]
        }
        VoiceEvent::LiveError(error) => {
            // Only a live session can report these; anything later is a
            // stale callback.
            if state.voice != VoiceState::Live {
                return vec![];
            }
            match error {
                RecognitionError::ServiceUnreachable => {
                    // Failover: tear down the live session and go straight
                    // to raw recording. Not surfaced to the user.
                    state.voice = VoiceState::Idle;
                    vec![Effect::StopLiveRecognition, Effect::StartRecorder]
                }
                RecognitionError::Other(message) => {
                    state.notice = Some(format!("Voice recognition error: {message}"));
                    vec![]
                }
            }
        }
        VoiceEvent::LiveEnded => {
            // The session may already have been replaced by a recording
            // (failover); only a still-live session returns to Idle here.
            if state.voice == VoiceState::Live {
                state.voice = VoiceState::Idle;
            }
            vec![]
        }
        VoiceEvent::RecorderStarted => {
            state.voice = VoiceState::Recording;
            vec![]
        }
        VoiceEvent::RecorderFailed { error } => {
            state.voice = VoiceState::Idle;
            state.notice = Some(format!("{MIC_UNAVAILABLE_NOTICE} ({error})"));
            vec![]
        }
        VoiceEvent::TranscriptionCompleted {
            text,
            detected_lang,
        } => {
            state.composer.append_transcript(&text);
            if state.language == LanguageSelector::Auto
                && let Some(lang) = detected_lang
                && !lang.trim().is_empty()
            {
                state.language = LanguageSelector::Locked(normalize_language_code(
                    Some(&lang),
                    DEFAULT_LANGUAGE,
                ));
            }
            vec![]
        }
        VoiceEvent::TranscriptionFailed { detail } => {
            state.notice = Some(detail);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AppEvent;
    use crate::update::update;

    fn state() -> AppState {
        AppState::new(Some("u1".to_string()), LanguageSelector::Auto)
    }

    fn voice(state: &mut AppState, event: VoiceEvent) -> Vec<Effect> {
        update(state, AppEvent::Voice(event))
    }

    #[test]
    fn test_start_from_idle_requests_capture() {
        let mut state = state();
        let effects = voice(&mut state, VoiceEvent::StartRequested);
        assert_eq!(
            effects,
            vec![Effect::StartVoiceCapture {
                language: "en-IN".to_string()
            }]
        );
        // State does not change until the runtime reports back.
        assert_eq!(state.voice, VoiceState::Idle);
    }

    #[test]
    fn test_start_uses_locked_language_hint() {
        let mut state = state();
        state.language = LanguageSelector::Locked("hi-IN".to_string());
        let effects = voice(&mut state, VoiceEvent::StartRequested);
        assert_eq!(
            effects,
            vec![Effect::StartVoiceCapture {
                language: "hi-IN".to_string()
            }]
        );
    }

    #[test]
    fn test_start_is_noop_while_capturing() {
        let mut state = state();
        state.voice = VoiceState::Live;
        assert!(voice(&mut state, VoiceEvent::StartRequested).is_empty());
        state.voice = VoiceState::Recording;
        assert!(voice(&mut state, VoiceEvent::StartRequested).is_empty());
    }

    #[test]
    fn test_live_transcript_appends_space_joined() {
        let mut state = state();
        state.voice = VoiceState::Live;
        state.composer.text = "I have".to_string();
        voice(&mut state, VoiceEvent::LiveTranscript("a headache".to_string()));
        assert_eq!(state.composer.text, "I have a headache");
        assert_eq!(state.voice, VoiceState::Live);
    }

    #[test]
    fn test_unreachable_recognizer_fails_over_to_recorder() {
        let mut state = state();
        state.voice = VoiceState::Live;
        let effects = voice(
            &mut state,
            VoiceEvent::LiveError(RecognitionError::ServiceUnreachable),
        );
        assert_eq!(
            effects,
            vec![Effect::StopLiveRecognition, Effect::StartRecorder]
        );
        // No user-visible notice for this specific condition.
        assert_eq!(state.notice, None);
        assert_eq!(state.voice, VoiceState::Idle);

        // The recorder acquisition succeeding completes the failover.
        voice(&mut state, VoiceEvent::RecorderStarted);
        assert_eq!(state.voice, VoiceState::Recording);
    }

    #[test]
    fn test_other_recognition_errors_surface_without_fallback() {
        let mut state = state();
        state.voice = VoiceState::Live;
        let effects = voice(
            &mut state,
            VoiceEvent::LiveError(RecognitionError::Other("not-allowed".to_string())),
        );
        assert!(effects.is_empty());
        assert!(state.notice.as_deref().unwrap().contains("not-allowed"));
    }

    #[test]
    fn test_live_ended_returns_to_idle() {
        let mut state = state();
        state.voice = VoiceState::Live;
        voice(&mut state, VoiceEvent::LiveEnded);
        assert_eq!(state.voice, VoiceState::Idle);
    }

    #[test]
    fn test_live_ended_after_failover_keeps_recording() {
        let mut state = state();
        state.voice = VoiceState::Recording;
        // Stale termination callback from the torn-down live session.
        voice(&mut state, VoiceEvent::LiveEnded);
        assert_eq!(state.voice, VoiceState::Recording);
    }

    #[test]
    fn test_stop_while_recording_transcribes_and_idles() {
        let mut state = state();
        state.voice = VoiceState::Recording;
        let effects = voice(&mut state, VoiceEvent::StopRequested);
        assert_eq!(effects, vec![Effect::StopRecorderAndTranscribe]);
        assert_eq!(state.voice, VoiceState::Idle);
    }

    #[test]
    fn test_stop_while_live_is_graceful() {
        let mut state = state();
        state.voice = VoiceState::Live;
        let effects = voice(&mut state, VoiceEvent::StopRequested);
        assert_eq!(effects, vec![Effect::StopLiveRecognition]);
        // Still Live until the termination callback fires.
        assert_eq!(state.voice, VoiceState::Live);
    }

    #[test]
    fn test_recorder_failure_surfaces_and_idles() {
        let mut state = state();
        let effects = voice(
            &mut state,
            VoiceEvent::RecorderFailed {
                error: "no input device".to_string(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.voice, VoiceState::Idle);
        assert!(state.notice.as_deref().unwrap().contains("Microphone unavailable"));
    }

    #[test]
    fn test_transcription_appends_and_adopts_detected_language() {
        let mut state = state();
        state.composer.text = "symptoms:".to_string();
        voice(
            &mut state,
            VoiceEvent::TranscriptionCompleted {
                text: "bukhaar hai".to_string(),
                detected_lang: Some("hi".to_string()),
            },
        );
        assert_eq!(state.composer.text, "symptoms: bukhaar hai");
        assert_eq!(state.language, LanguageSelector::Locked("hi-IN".to_string()));
    }

    #[test]
    fn test_transcription_keeps_locked_language() {
        let mut state = state();
        state.language = LanguageSelector::Locked("ta-IN".to_string());
        voice(
            &mut state,
            VoiceEvent::TranscriptionCompleted {
                text: "hello".to_string(),
                detected_lang: Some("hi".to_string()),
            },
        );
        assert_eq!(state.language, LanguageSelector::Locked("ta-IN".to_string()));
    }

    #[test]
    fn test_transcription_unknown_language_defaults() {
        let mut state = state();
        voice(
            &mut state,
            VoiceEvent::TranscriptionCompleted {
                text: "hello".to_string(),
                detected_lang: Some("xx".to_string()),
            },
        );
        assert_eq!(state.language, LanguageSelector::Locked("en-IN".to_string()));
    }

    #[test]
    fn test_transcription_failure_sets_notice() {
        let mut state = state();
        voice(
            &mut state,
            VoiceEvent::TranscriptionFailed {
                detail: "STT failed: upstream".to_string(),
            },
        );
        assert_eq!(state.notice.as_deref(), Some("STT failed: upstream"));
        assert_eq!(state.voice, VoiceState::Idle);
    }
}
