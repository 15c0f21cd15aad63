//! Domain objects the chat pane renders: users and emotes.

pub mod emotes;
pub mod user;
