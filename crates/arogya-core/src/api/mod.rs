//! HTTP client for the assistant backend.
//!
//! JSON over HTTP against a configurable base URL. Transport failures,
//! non-2xx statuses, and malformed bodies all surface as `anyhow` errors;
//! callers decide whether a failure degrades to local state or becomes a
//! user-visible notice.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::de::DeserializeOwned;

mod types;

pub use types::{
    ChatReply, ChatRequest, HealthReply, MediaPayload, RemoteMessage, SessionDetail,
    SessionSummary, SpeechReply,
};

use types::{ErrorBody, NewSessionRequest, SpeechRequest};

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for the given base URL.
    ///
    /// `timeout` bounds each request; `None` leaves requests unbounded
    /// (useful for slow speech transcription on weak links).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|_| anyhow!("Failed to build HTTP client"))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /sessions?user_id= — the session list for a user.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        let url = format!("{}/sessions", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|_| anyhow!("Session list request failed"))?;
        Self::decode(response).await
    }

    /// POST /session/new — asks the backend for a fresh session.
    pub async fn create_session(&self, user_id: &str) -> Result<SessionSummary> {
        let url = format!("{}/session/new", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&NewSessionRequest { user_id })
            .send()
            .await
            .map_err(|_| anyhow!("Session create request failed"))?;
        Self::decode(response).await
    }

    /// GET /sessions/{id}?user_id= — title plus full message history.
    pub async fn session_detail(&self, session_id: &str, user_id: &str) -> Result<SessionDetail> {
        let url = format!("{}/sessions/{}", self.base_url, session_id);
        let response = self
            .http
            .get(url)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|_| anyhow!("Session detail request failed"))?;
        Self::decode(response).await
    }

    /// DELETE /sessions/{id}?user_id=.
    pub async fn delete_session(&self, session_id: &str, user_id: &str) -> Result<()> {
        let url = format!("{}/sessions/{}", self.base_url, session_id);
        let response = self
            .http
            .delete(url)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|_| anyhow!("Session delete request failed"))?;
        if !response.status().is_success() {
            bail!("Session delete failed with status {}", response.status());
        }
        Ok(())
    }

    /// POST /chat — one user turn, returning the assistant turn.
    pub async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply> {
        let url = format!("{}/chat", self.base_url);
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|_| anyhow!("Chat request failed"))?;
        Self::decode(response).await
    }

    /// POST /stt-tts mode=stt — transcribes base64 audio.
    pub async fn transcribe(&self, audio_base64: &str) -> Result<SpeechReply> {
        self.speech(&SpeechRequest {
            mode: "stt",
            audio_base64: Some(audio_base64),
            text: None,
            target_lang: None,
        })
        .await
    }

    /// POST /stt-tts mode=tts — synthesizes speech for a reply.
    pub async fn synthesize(&self, text: &str, target_lang: Option<&str>) -> Result<SpeechReply> {
        self.speech(&SpeechRequest {
            mode: "tts",
            audio_base64: None,
            text: Some(text),
            target_lang,
        })
        .await
    }

    async fn speech(&self, request: &SpeechRequest<'_>) -> Result<SpeechReply> {
        let url = format!("{}/stt-tts", self.base_url);
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|_| anyhow!("Speech request failed"))?;
        Self::decode(response).await
    }

    /// GET /health — advisory backend status probe.
    pub async fn health(&self) -> Result<HealthReply> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|_| anyhow!("Health request failed"))?;
        Self::decode(response).await
    }

    /// Decodes a 2xx JSON body, or surfaces the backend's `detail` message
    /// for error statuses when it sends one.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.detail)
                .filter(|detail| !detail.is_empty());
            match detail {
                Some(detail) => bail!("{}", detail),
                None => bail!("Backend request failed with status {}", status),
            }
        }
        response
            .json()
            .await
            .map_err(|_| anyhow!("Failed to decode backend response"))
    }
}
