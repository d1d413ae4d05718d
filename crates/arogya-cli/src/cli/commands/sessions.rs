//! One-shot session management commands.

use anyhow::Result;
use arogya_core::api::SessionSummary;
use arogya_core::config::Config;

use super::super::{backend_client, require_user};

/// Lists the user's sessions, newest first (backend order).
pub async fn list(config: &Config) -> Result<()> {
    let user_id = require_user(config)?;
    let api = backend_client(config)?;
    let sessions: Vec<_> = api
        .list_sessions(&user_id)
        .await?
        .into_iter()
        .map(SessionSummary::into_session)
        .collect();

    if sessions.is_empty() {
        println!("No sessions.");
        return Ok(());
    }
    for session in sessions {
        match session.updated_at {
            Some(at) => println!("{}  {}  ({})", session.id, session.title, at),
            None => println!("{}  {}", session.id, session.title),
        }
    }
    Ok(())
}

/// Deletes a session by id.
pub async fn delete(config: &Config, id: &str) -> Result<()> {
    let user_id = require_user(config)?;
    let api = backend_client(config)?;
    api.delete_session(id, &user_id).await?;
    println!("Deleted {id}");
    Ok(())
}
