//! CLI command implementations.

pub mod chat;
pub mod sessions;

use anyhow::{Context, Result};
use arogya_core::config::Config;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::backend_client;

/// Probes the backend's health endpoint.
pub async fn health(config: &Config) -> Result<()> {
    let api = backend_client(config)?;
    let reply = api.health().await?;
    if reply.ok {
        println!("Backend at {} is healthy.", api.base_url());
    } else {
        println!(
            "Backend at {} reports a problem: {}",
            api.base_url(),
            reply.llm_status.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

/// Synthesizes speech for a text and writes the WAV bytes to a file.
pub async fn speak(config: &Config, text: &str, output: &str) -> Result<()> {
    let api = backend_client(config)?;
    let selector = super::language_selector(config);
    let reply = api.synthesize(text, selector.lock()).await?;
    let audio_base64 = reply
        .audio_base64
        .context("Backend returned no audio for the text")?;
    let bytes = BASE64
        .decode(audio_base64.as_bytes())
        .context("Backend returned invalid audio encoding")?;
    std::fs::write(output, bytes).with_context(|| format!("Failed to write {output}"))?;
    println!("Wrote {output}");
    Ok(())
}
