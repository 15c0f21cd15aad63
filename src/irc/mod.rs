//! Twitch chat over IRC: connection, message tags and the viewer's slash
//! commands.

pub mod commands;
pub mod connection;
pub mod tags;
