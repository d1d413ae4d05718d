//! Application runtime - executes effects, owns audio handles.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox pattern
//!
//! Async handlers send `AppEvent`s to the inbox sender; the driver (the
//! CLI loop, or a test) receives them from the paired receiver and feeds
//! them back through [`Runtime::dispatch`]. This keeps the store
//! single-writer: every mutation goes through the reducer on the driver's
//! task.
//!
//! ## Audio ownership
//!
//! The live recognition session and the microphone recorder are owned
//! here, at most one of each, and voice-capture effects are executed
//! inline (device setup is quick and the result events must win any race
//! with further user input).

pub mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arogya_core::api::BackendClient;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::audio::recognition::{LiveRecognition, LiveSession};
use crate::audio::recorder::Recorder;
use crate::effects::Effect;
use crate::events::{AppEvent, VoiceEvent};
use crate::state::AppState;
use crate::update;

pub struct Runtime {
    /// Application state (mutated only via dispatch -> reducer).
    pub state: AppState,
    api: BackendClient,
    inbox_tx: UnboundedSender<AppEvent>,
    /// Live recognition capability, when the host provides one.
    recognizer: Option<Arc<dyn LiveRecognition>>,
    /// The running live session, if any. Single owner.
    live_session: Option<Box<dyn LiveSession>>,
    /// The running raw recording, if any. Single owner.
    recorder: Option<Recorder>,
}

impl Runtime {
    /// Creates a runtime and the inbox receiver the driver should poll.
    pub fn new(state: AppState, api: BackendClient) -> (Self, UnboundedReceiver<AppEvent>) {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        (
            Self {
                state,
                api,
                inbox_tx,
                recognizer: None,
                live_session: None,
                recorder: None,
            },
            inbox_rx,
        )
    }

    /// Registers a live recognition capability. Without one, voice capture
    /// goes straight to raw recording.
    pub fn set_recognizer(&mut self, recognizer: Arc<dyn LiveRecognition>) {
        self.recognizer = Some(recognizer);
    }

    /// A sender for injecting events from outside (recognizer callbacks,
    /// timers).
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.inbox_tx.clone()
    }

    /// Runs an event through the reducer and executes the returned
    /// effects.
    pub fn dispatch(&mut self, event: AppEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler, sending its result event to the inbox.
    fn spawn_effect<F>(&self, f: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f.await);
        });
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::LoadSessions => {
                let Some(user_id) = self.state.user_id.clone() else {
                    return;
                };
                self.spawn_effect(handlers::sessions_load(self.api.clone(), user_id));
            }
            Effect::LoadSessionDetail {
                generation,
                session_id,
            } => {
                let Some(user_id) = self.state.user_id.clone() else {
                    return;
                };
                self.spawn_effect(handlers::session_detail_load(
                    self.api.clone(),
                    generation,
                    session_id,
                    user_id,
                ));
            }
            Effect::CreateSession { pending_send } => {
                let Some(user_id) = self.state.user_id.clone() else {
                    return;
                };
                self.spawn_effect(handlers::session_create(
                    self.api.clone(),
                    user_id,
                    pending_send,
                ));
            }
            Effect::DeleteSession { session_id } => {
                let Some(user_id) = self.state.user_id.clone() else {
                    return;
                };
                self.spawn_effect(handlers::session_delete(
                    self.api.clone(),
                    session_id,
                    user_id,
                ));
            }
            Effect::SendChat { session_id, draft } => {
                let Some(user_id) = self.state.user_id.clone() else {
                    return;
                };
                self.spawn_effect(handlers::chat_send(
                    self.api.clone(),
                    user_id,
                    session_id,
                    draft,
                ));
            }
            Effect::ScheduleSessionRefresh { delay } => self.schedule_session_refresh(delay),
            Effect::StartVoiceCapture { language } => self.start_voice_capture(&language),
            Effect::StopLiveRecognition => {
                // Stop errors are swallowed; termination arrives as
                // LiveEnded from the session itself.
                if let Some(mut session) = self.live_session.take()
                    && let Err(error) = session.stop()
                {
                    tracing::debug!("Live recognition stop failed: {error:#}");
                }
            }
            Effect::StartRecorder => self.start_recorder(),
            Effect::StopRecorderAndTranscribe => self.stop_recorder_and_transcribe(),
        }
    }

    /// Fire-and-forget deferred refresh. Deliberately not cancelled by
    /// later sends; the list replace is idempotent.
    fn schedule_session_refresh(&self, delay: Duration) {
        let Some(user_id) = self.state.user_id.clone() else {
            return;
        };
        let api = self.api.clone();
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(handlers::sessions_load(api, user_id).await);
        });
    }

    fn start_voice_capture(&mut self, language: &str) {
        // Single owner: never two captures at once.
        if self.live_session.is_some() || self.recorder.is_some() {
            return;
        }
        match self.recognizer.as_ref() {
            Some(recognizer) => {
                match recognizer.start(language, self.inbox_tx.clone()) {
                    Ok(session) => {
                        self.live_session = Some(session);
                        self.dispatch(AppEvent::Voice(VoiceEvent::LiveStarted));
                    }
                    Err(error) => {
                        tracing::debug!("Live recognition unavailable: {error:#}");
                        self.dispatch(AppEvent::Voice(VoiceEvent::LiveUnavailable));
                    }
                }
            }
            None => self.dispatch(AppEvent::Voice(VoiceEvent::LiveUnavailable)),
        }
    }

    fn start_recorder(&mut self) {
        if self.recorder.is_some() {
            return;
        }
        match Recorder::start() {
            Ok(recorder) => {
                self.recorder = Some(recorder);
                self.dispatch(AppEvent::Voice(VoiceEvent::RecorderStarted));
            }
            Err(error) => {
                tracing::warn!("Microphone acquisition failed: {error:#}");
                self.dispatch(AppEvent::Voice(VoiceEvent::RecorderFailed {
                    error: error.to_string(),
                }));
            }
        }
    }

    fn stop_recorder_and_transcribe(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let api = self.api.clone();
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            // Recorder::stop blocks on the capture thread handshake.
            let stopped = tokio::task::spawn_blocking(move || recorder.stop()).await;
            let event = match stopped {
                Ok(Ok(wav)) => handlers::transcribe_recording(api, wav).await,
                Ok(Err(error)) => AppEvent::Voice(VoiceEvent::TranscriptionFailed {
                    detail: format!("Recording failed: {error}"),
                }),
                Err(error) => AppEvent::Voice(VoiceEvent::TranscriptionFailed {
                    detail: format!("Recording failed: {error}"),
                }),
            };
            let _ = tx.send(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use arogya_core::language::LanguageSelector;
    use tokio::sync::mpsc::UnboundedSender;

    use super::*;
    use crate::audio::recognition::RecognitionError;
    use crate::features::voice::VoiceState;

    /// Scripted recognizer: hands the event sender to the test so it can
    /// play recognizer callbacks.
    struct ScriptedRecognition {
        sessions: std::sync::Mutex<Vec<UnboundedSender<AppEvent>>>,
    }

    struct ScriptedSession;

    impl crate::audio::recognition::LiveSession for ScriptedSession {
        fn stop(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl LiveRecognition for ScriptedRecognition {
        fn start(
            &self,
            _language: &str,
            events: UnboundedSender<AppEvent>,
        ) -> anyhow::Result<Box<dyn crate::audio::recognition::LiveSession>> {
            self.sessions.lock().unwrap().push(events);
            Ok(Box::new(ScriptedSession))
        }
    }

    struct FailingRecognition;

    impl LiveRecognition for FailingRecognition {
        fn start(
            &self,
            _language: &str,
            _events: UnboundedSender<AppEvent>,
        ) -> anyhow::Result<Box<dyn crate::audio::recognition::LiveSession>> {
            anyhow::bail!("recognizer construction refused")
        }
    }

    fn runtime() -> (Runtime, tokio::sync::mpsc::UnboundedReceiver<AppEvent>) {
        let state = AppState::new(Some("u1".to_string()), LanguageSelector::Auto);
        let api = BackendClient::new("http://127.0.0.1:9", None).unwrap();
        Runtime::new(state, api)
    }

    #[tokio::test]
    async fn test_voice_start_enters_live_with_recognizer() {
        let (mut runtime, _inbox) = runtime();
        runtime.set_recognizer(Arc::new(ScriptedRecognition {
            sessions: std::sync::Mutex::new(Vec::new()),
        }));

        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));

        assert_eq!(runtime.state.voice, VoiceState::Live);
        assert!(runtime.live_session.is_some());
    }

    #[tokio::test]
    async fn test_voice_start_repeated_is_noop() {
        let (mut runtime, _inbox) = runtime();
        runtime.set_recognizer(Arc::new(ScriptedRecognition {
            sessions: std::sync::Mutex::new(Vec::new()),
        }));

        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));
        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));

        assert_eq!(runtime.state.voice, VoiceState::Live);
    }

    #[tokio::test]
    async fn test_live_transcript_lands_in_composer() {
        let (mut runtime, _inbox) = runtime();
        runtime.set_recognizer(Arc::new(ScriptedRecognition {
            sessions: std::sync::Mutex::new(Vec::new()),
        }));

        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));
        runtime.dispatch(AppEvent::Voice(VoiceEvent::LiveTranscript(
            "chest pain".to_string(),
        )));

        assert_eq!(runtime.state.composer.text, "chest pain");
    }

    #[tokio::test]
    async fn test_unreachable_error_attempts_microphone() {
        let (mut runtime, _inbox) = runtime();
        runtime.set_recognizer(Arc::new(ScriptedRecognition {
            sessions: std::sync::Mutex::new(Vec::new()),
        }));

        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));
        assert_eq!(runtime.state.voice, VoiceState::Live);

        runtime.dispatch(AppEvent::Voice(VoiceEvent::LiveError(
            RecognitionError::ServiceUnreachable,
        )));

        // The live session was torn down and a microphone acquisition was
        // attempted. With no input device in the test environment the
        // machine lands in Idle with the unavailable notice; with one it
        // lands in Recording. Either way the failover itself produced no
        // recognition-error notice.
        assert!(runtime.live_session.is_none());
        match runtime.state.voice {
            VoiceState::Recording => assert_eq!(runtime.state.notice, None),
            VoiceState::Idle => {
                let notice = runtime.state.notice.as_deref().unwrap_or_default();
                assert!(notice.contains("Microphone unavailable"), "unexpected notice: {notice}");
            }
            VoiceState::Live => panic!("failover must leave the live state"),
        }
    }

    #[tokio::test]
    async fn test_failed_recognizer_construction_falls_through() {
        let (mut runtime, _inbox) = runtime();
        runtime.set_recognizer(Arc::new(FailingRecognition));

        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));

        // Construction threw: no live session; raw recording was attempted
        // directly.
        assert!(runtime.live_session.is_none());
        assert_ne!(runtime.state.voice, VoiceState::Live);
    }

    #[tokio::test]
    async fn test_stop_live_reaches_idle_via_termination() {
        let (mut runtime, _inbox) = runtime();
        runtime.set_recognizer(Arc::new(ScriptedRecognition {
            sessions: std::sync::Mutex::new(Vec::new()),
        }));

        runtime.dispatch(AppEvent::Voice(VoiceEvent::StartRequested));
        runtime.dispatch(AppEvent::Voice(VoiceEvent::StopRequested));
        assert!(runtime.live_session.is_none());

        // Termination callback completes the transition.
        runtime.dispatch(AppEvent::Voice(VoiceEvent::LiveEnded));
        assert_eq!(runtime.state.voice, VoiceState::Idle);
    }
}
