use crate::emotes::Feed;

/// Side effects requested by the handler, executed by the main loop which
/// owns the IRC sender and the emote fetcher.
#[derive(Debug, PartialEq)]
pub enum Action {
    SendMessage { text: String },
    SendAction { text: String },
    RequestEmotes { feed: Feed, force: bool },
    EmotesFinished { feed: Feed },
    ReloadConfig,
    Quit { message: Option<String> },
}
