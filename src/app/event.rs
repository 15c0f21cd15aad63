use crate::chat::emotes::EmoteDef;
use crate::emotes::Feed;
use crossterm::event::Event as CrosstermEvent;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// IRC message received from Twitch chat
    IrcMessage {
        message: irc::client::prelude::Message,
    },

    /// IRC connection state changed
    IrcConnected,
    IrcDisconnected {
        reason: String,
    },
    IrcError {
        error: String,
    },

    /// An emote feed finished loading (possibly empty on failure)
    EmotesLoaded {
        feed: Feed,
        emotes: Vec<EmoteDef>,
    },

    /// Tick for UI refresh and the auto-scroll re-check
    Tick,
}
