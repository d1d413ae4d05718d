//! Core types and services for the arogya chat client.
//!
//! This crate has no UI or event-loop knowledge: it provides the
//! configuration, the backend API client, the in-memory session store,
//! and language-code normalization. The application layer
//! (`arogya-app`) composes these behind its reducer/runtime split.

pub mod api;
pub mod config;
pub mod language;
pub mod store;
