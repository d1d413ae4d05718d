//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::time::Duration;

use arogya_app::events::AppEvent;
use arogya_app::runtime::Runtime;
use arogya_app::state::AppState;
use arogya_core::api::BackendClient;
use arogya_core::language::LanguageSelector;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// A runtime for user `u1` talking to the given base URL.
pub fn runtime_against(base_url: &str) -> (Runtime, UnboundedReceiver<AppEvent>) {
    let api = BackendClient::new(base_url, Some(Duration::from_secs(5))).expect("build client");
    let state = AppState::new(Some("u1".to_string()), LanguageSelector::Auto);
    Runtime::new(state, api)
}

/// Waits for the next handler result from the inbox.
pub async fn next_event(inbox: &mut UnboundedReceiver<AppEvent>) -> AppEvent {
    tokio::time::timeout(Duration::from_secs(5), inbox.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("inbox closed")
}

/// Waits for the next event with a custom timeout.
pub async fn next_event_within(
    inbox: &mut UnboundedReceiver<AppEvent>,
    timeout: Duration,
) -> AppEvent {
    tokio::time::timeout(timeout, inbox.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("inbox closed")
}
