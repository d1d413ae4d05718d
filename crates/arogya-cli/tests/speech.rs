//! Integration tests for the speech endpoints: record-then-transcribe
//! result handling and speech synthesis.

mod support;

use std::time::Duration;

use arogya_app::events::{AppEvent, VoiceEvent};
use arogya_app::runtime::handlers;
use arogya_core::api::BackendClient;
use arogya_core::language::LanguageSelector;
use serde_json::json;
use support::{can_bind_localhost, runtime_against};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_transcription_appends_and_adopts_language() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stt-tts"))
        .and(body_partial_json(json!({"mode": "stt"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "bukhaar hai",
            "detected_lang": "hi"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = BackendClient::new(&server.uri(), Some(Duration::from_secs(5))).unwrap();
    let event = handlers::transcribe_recording(api, vec![0, 1, 2, 3]).await;
    assert!(matches!(
        &event,
        AppEvent::Voice(VoiceEvent::TranscriptionCompleted { text, detected_lang })
            if text == "bukhaar hai" && detected_lang.as_deref() == Some("hi")
    ));

    // Applying the event appends the transcript and, with the selector on
    // auto, adopts the normalized detected language.
    let (mut runtime, _inbox) = runtime_against(&server.uri());
    runtime.state.composer.text = "symptoms:".to_string();
    runtime.dispatch(event);
    assert_eq!(runtime.state.composer.text, "symptoms: bukhaar hai");
    assert_eq!(
        runtime.state.language,
        LanguageSelector::Locked("hi-IN".to_string())
    );
}

#[tokio::test]
async fn test_transcription_failure_carries_backend_detail() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stt-tts"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "STT failed: upstream model error"})),
        )
        .mount(&server)
        .await;

    let api = BackendClient::new(&server.uri(), Some(Duration::from_secs(5))).unwrap();
    let event = handlers::transcribe_recording(api, vec![0; 64]).await;
    let AppEvent::Voice(VoiceEvent::TranscriptionFailed { detail }) = &event else {
        panic!("expected a transcription failure, got {event:?}");
    };
    assert_eq!(detail, "STT failed: upstream model error");

    // The failure becomes an advisory notice, never a crash.
    let (mut runtime, _inbox) = runtime_against(&server.uri());
    runtime.dispatch(event);
    assert_eq!(
        runtime.state.take_notice().as_deref(),
        Some("STT failed: upstream model error")
    );
}

#[tokio::test]
async fn test_synthesis_round_trip() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stt-tts"))
        .and(body_partial_json(json!({
            "mode": "tts",
            "text": "Stay hydrated.",
            "target_lang": "hi-IN"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audio_base64": "UklGRgAAAABXQVZF"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = BackendClient::new(&server.uri(), Some(Duration::from_secs(5))).unwrap();
    let reply = api.synthesize("Stay hydrated.", Some("hi-IN")).await.unwrap();
    assert_eq!(reply.audio_base64.as_deref(), Some("UklGRgAAAABXQVZF"));
}
