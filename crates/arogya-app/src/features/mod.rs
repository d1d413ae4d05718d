//! Feature reducers: one module per slice of application behavior.

pub mod chat;
pub mod sessions;
pub mod voice;
