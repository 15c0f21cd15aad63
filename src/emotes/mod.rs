//! Third-party emote providers (BetterTTV, FrankerFaceZ).
//!
//! Feeds are fetched in background tasks; parsed emotes travel back to the
//! event loop as `AppEvent::EmotesLoaded` and only there enter the catalog.

pub mod bttv;
pub mod cache;
pub mod fetcher;
pub mod ffz;

use crate::chat::emotes::{EmoteDef, EmoteSource};

/// One remote emote feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feed {
    BttvGlobal,
    /// BTTV looks channels up by Twitch room id.
    BttvChannel { stream: String, room_id: String },
    FfzGlobal,
    FfzChannel { stream: String },
}

impl Feed {
    pub fn source(&self) -> EmoteSource {
        match self {
            Feed::BttvGlobal | Feed::BttvChannel { .. } => EmoteSource::Bttv,
            Feed::FfzGlobal | Feed::FfzChannel { .. } => EmoteSource::Ffz,
        }
    }

    /// Channel the feed is restricted to, `None` for global feeds.
    pub fn stream(&self) -> Option<&str> {
        match self {
            Feed::BttvChannel { stream, .. } | Feed::FfzChannel { stream } => Some(stream),
            Feed::BttvGlobal | Feed::FfzGlobal => None,
        }
    }

    pub fn url(&self) -> String {
        match self {
            Feed::BttvGlobal => bttv::GLOBAL_URL.to_string(),
            Feed::BttvChannel { room_id, .. } => bttv::channel_url(room_id),
            Feed::FfzGlobal => ffz::GLOBAL_URL.to_string(),
            Feed::FfzChannel { stream } => ffz::room_url(stream),
        }
    }

    /// File name the feed body is cached under.
    pub fn cache_name(&self) -> String {
        match self {
            Feed::BttvGlobal => "bttv_global".to_string(),
            Feed::BttvChannel { stream, .. } => format!("bttv_channel_{}", stream.to_lowercase()),
            Feed::FfzGlobal => "ffz_global".to_string(),
            Feed::FfzChannel { stream } => format!("ffz_channel_{}", stream.to_lowercase()),
        }
    }

    pub fn parse(&self, body: &str) -> Vec<EmoteDef> {
        match self {
            Feed::BttvGlobal => bttv::parse_global(body),
            Feed::BttvChannel { stream, .. } => bttv::parse_channel(body, stream),
            Feed::FfzGlobal => ffz::parse_global(body),
            Feed::FfzChannel { stream } => ffz::parse_room(body, stream),
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.stream() {
            Some(stream) => write!(f, "{} emotes for #{}", self.source(), stream),
            None => write!(f, "global {} emotes", self.source()),
        }
    }
}
