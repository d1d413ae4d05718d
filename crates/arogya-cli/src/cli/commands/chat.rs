//! Interactive chat loop.
//!
//! Drives the application runtime from stdin: plain lines are sent as
//! messages, slash commands manage sessions, language, attachments, and
//! voice capture. The loop observes the store after every dispatch and
//! prints whatever appeared.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use arogya_app::events::{AppEvent, InputEvent, SessionEvent, VoiceEvent};
use arogya_app::runtime::Runtime;
use arogya_app::state::AppState;
use arogya_core::config::Config;
use arogya_core::language::LanguageSelector;
use arogya_core::store::{Attachment, AttachmentKind, Role};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::io::AsyncBufReadExt;

use super::super::{backend_client, language_selector, require_user};

const HELP: &str = "\
Commands:
  /new              start a new session
  /sessions         list known sessions
  /switch <n|id>    switch the active session
  /delete <n|id>    delete a session
  /lang <code>      set response language (or \"auto\")
  /attach <file>    stage a file for the next message
  /voice            start/stop voice input
  /refresh          reload the session list
  /quit             exit
Anything else is sent to the assistant.";

/// How long to wait for in-flight work after stdin closes. Covers the
/// deferred session refresh.
const DRAIN_QUIET_WINDOW: Duration = Duration::from_millis(1500);

pub async fn run(config: &Config) -> Result<()> {
    let user_id = require_user(config)?;
    let api = backend_client(config)?;

    // Advisory probe; an unreachable backend never blocks the client.
    match api.health().await {
        Ok(reply) if reply.ok => tracing::info!("Backend healthy at {}", api.base_url()),
        Ok(reply) => tracing::warn!(
            "Backend degraded: {}",
            reply.llm_status.as_deref().unwrap_or("unknown")
        ),
        Err(error) => tracing::warn!("Backend unreachable, running offline: {error:#}"),
    }

    let state = AppState::new(Some(user_id), language_selector(config));
    let (mut runtime, mut inbox) = Runtime::new(state, api);

    println!("arogya - type /help for commands.");
    runtime.dispatch(AppEvent::Session(SessionEvent::RefreshRequested));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut printer = Printer::default();

    loop {
        tokio::select! {
            maybe_event = inbox.recv() => {
                let Some(event) = maybe_event else { break };
                runtime.dispatch(event);
            }
            maybe_line = lines.next_line() => {
                match maybe_line {
                    Ok(Some(line)) => {
                        if handle_line(&mut runtime, line.trim()) {
                            return Ok(());
                        }
                    }
                    // EOF (piped input): finish in-flight work, then exit.
                    Ok(None) | Err(_) => break,
                }
            }
        }
        printer.flush(&mut runtime.state);
    }

    while let Ok(Some(event)) = tokio::time::timeout(DRAIN_QUIET_WINDOW, inbox.recv()).await {
        runtime.dispatch(event);
        printer.flush(&mut runtime.state);
    }

    Ok(())
}

/// Handles one input line. Returns true when the loop should exit.
fn handle_line(runtime: &mut Runtime, line: &str) -> bool {
    match line {
        "" => {}
        "/quit" | "/exit" => return true,
        "/help" => println!("{HELP}"),
        "/new" => runtime.dispatch(AppEvent::Session(SessionEvent::CreateRequested)),
        "/sessions" => print_sessions(&runtime.state),
        "/refresh" => runtime.dispatch(AppEvent::Session(SessionEvent::RefreshRequested)),
        "/voice" => {
            let event = if runtime.state.voice.is_capturing() {
                VoiceEvent::StopRequested
            } else {
                VoiceEvent::StartRequested
            };
            runtime.dispatch(AppEvent::Voice(event));
        }
        _ => {
            if let Some(code) = line.strip_prefix("/lang ") {
                runtime.dispatch(AppEvent::Input(InputEvent::LanguageSelected(
                    LanguageSelector::parse(code),
                )));
                println!("Language: {}", runtime.state.language);
            } else if let Some(target) = line.strip_prefix("/switch ") {
                match resolve_session(&runtime.state, target.trim()) {
                    Some(session_id) => {
                        runtime.dispatch(AppEvent::Session(SessionEvent::Selected { session_id }));
                    }
                    None => println!("No such session: {target}"),
                }
            } else if let Some(target) = line.strip_prefix("/delete ") {
                match resolve_session(&runtime.state, target.trim()) {
                    Some(session_id) => {
                        runtime
                            .dispatch(AppEvent::Session(SessionEvent::DeleteRequested { session_id }));
                    }
                    None => println!("No such session: {target}"),
                }
            } else if let Some(path) = line.strip_prefix("/attach ") {
                match attachment_from_path(path.trim()) {
                    Ok(attachment) => {
                        println!(
                            "Staged {} ({} attachment)",
                            attachment.name.as_deref().unwrap_or(path),
                            kind_label(attachment.kind)
                        );
                        runtime.dispatch(AppEvent::Input(InputEvent::AttachmentAdded(attachment)));
                    }
                    Err(error) => println!("! {error:#}"),
                }
            } else if line.starts_with('/') {
                println!("Unknown command. Type /help.");
            } else {
                runtime.dispatch(AppEvent::Input(InputEvent::SetText(line.to_string())));
                runtime.dispatch(AppEvent::Input(InputEvent::Submitted));
            }
        }
    }
    false
}

fn print_sessions(state: &AppState) {
    if state.store.sessions().is_empty() {
        println!("No sessions.");
        return;
    }
    for (index, session) in state.store.sessions().iter().enumerate() {
        let marker = if state.store.active_session_id() == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker}{:>3}. {}  [{}]", index + 1, session.title, session.id);
    }
}

/// Resolves a 1-based list index or a raw session id.
fn resolve_session(state: &AppState, target: &str) -> Option<String> {
    if let Ok(index) = target.parse::<usize>() {
        return state
            .store
            .sessions()
            .get(index.checked_sub(1)?)
            .map(|s| s.id.clone());
    }
    state.store.session(target).map(|s| s.id.clone())
}

/// Reads a file into a staged attachment, inferring the kind from the
/// extension.
fn attachment_from_path(path: &str) -> Result<Attachment> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path}"))?;
    let kind = match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg" | "png" | "gif" | "webp") => AttachmentKind::Image,
        Some("mp4" | "mov" | "webm" | "mkv") => AttachmentKind::Video,
        Some("wav" | "mp3" | "ogg" | "m4a" | "flac") => AttachmentKind::Audio,
        _ => AttachmentKind::Document,
    };
    Ok(Attachment {
        kind,
        content: BASE64.encode(&bytes),
        name: Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string),
    })
}

fn kind_label(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Image => "image",
        AttachmentKind::Video => "video",
        AttachmentKind::Document => "document",
        AttachmentKind::Audio => "audio",
    }
}

/// Prints store changes since the last flush: new messages in the active
/// session, session switches, and pending notices.
#[derive(Default)]
struct Printer {
    session_id: Option<String>,
    printed: usize,
}

impl Printer {
    fn flush(&mut self, state: &mut AppState) {
        let active = state.store.active_session_id().map(str::to_string);
        if active != self.session_id {
            self.session_id = active;
            self.printed = 0;
            if let Some(id) = &self.session_id {
                let title = state
                    .store
                    .session(id)
                    .map_or_else(String::new, |s| s.title.clone());
                println!("--- {title} ---");
            }
        }

        if let Some(id) = &self.session_id {
            let messages = state.store.messages(id);
            self.printed = self.printed.min(messages.len());
            for message in &messages[self.printed..] {
                match message.role {
                    Role::User => println!("you: {}", message.text),
                    Role::Assistant => println!("assistant: {}", message.text),
                }
            }
            self.printed = messages.len();
        }

        if let Some(notice) = state.take_notice() {
            println!("! {notice}");
        }
    }
}
