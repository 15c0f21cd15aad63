//! BetterTTV emote feeds.

use crate::chat::emotes::{EmoteDef, EmoteSource};
use serde::Deserialize;
use serde_json::Value;

pub const GLOBAL_URL: &str = "https://api.betterttv.net/3/cached/emotes/global";

pub fn channel_url(room_id: &str) -> String {
    format!("https://api.betterttv.net/3/cached/users/twitch/{}", room_id)
}

#[derive(Debug, Deserialize)]
struct BttvEmote {
    id: String,
    code: String,
}

impl BttvEmote {
    fn into_def(self) -> EmoteDef {
        let url = format!("https://cdn.betterttv.net/emote/{}/1x", self.id);
        EmoteDef::new(&self.code, EmoteSource::Bttv, &url)
    }
}

fn parse_list(items: &[Value]) -> Vec<EmoteDef> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<BttvEmote>(item.clone()) {
            Ok(emote) if !emote.code.is_empty() => Some(emote.into_def()),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Skipping BTTV emote {}: {}", item, e);
                None
            }
        })
        .collect()
}

/// Parse the global feed, a plain array of emotes.
pub fn parse_global(body: &str) -> Vec<EmoteDef> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => parse_list(&items),
        Ok(_) => {
            tracing::warn!("BTTV global feed is not an array");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Failed to parse BTTV global feed: {}", e);
            Vec::new()
        }
    }
}

/// Parse a channel feed: the channel's own and shared emotes, restricted to
/// `stream`.
pub fn parse_channel(body: &str, stream: &str) -> Vec<EmoteDef> {
    let root = match serde_json::from_str::<Value>(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Failed to parse BTTV feed for {}: {}", stream, e);
            return Vec::new();
        }
    };
    ["channelEmotes", "sharedEmotes"]
        .iter()
        .filter_map(|key| root.get(key).and_then(Value::as_array))
        .flat_map(|items| parse_list(items))
        .map(|emote| emote.with_stream(stream))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_skips_bad_items() {
        let body = r#"[
            {"id": "54fa8f1401e468494b85b537", "code": ":tf:", "imageType": "png"},
            {"id": 12, "code": "Broken"},
            {"code": "NoId"},
            {"id": "566ca04265dbbdab32ec054a", "code": "FeelsBadMan"}
        ]"#;
        let emotes = parse_global(body);
        let codes: Vec<&str> = emotes.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec![":tf:", "FeelsBadMan"]);
        assert_eq!(
            emotes[1].url,
            "https://cdn.betterttv.net/emote/566ca04265dbbdab32ec054a/1x"
        );
        assert_eq!(emotes[0].source, EmoteSource::Bttv);
    }

    #[test]
    fn test_parse_global_garbage() {
        assert!(parse_global("<html>").is_empty());
        assert!(parse_global("{}").is_empty());
    }

    #[test]
    fn test_parse_channel() {
        let body = r#"{
            "id": "x",
            "channelEmotes": [{"id": "a1", "code": "OwnEmote"}],
            "sharedEmotes": [{"id": "b2", "code": "SharedEmote"}, {"bad": true}]
        }"#;
        let emotes = parse_channel(body, "Streamer");
        assert_eq!(emotes.len(), 2);
        assert!(emotes.iter().all(|e| e.stream.as_deref() == Some("streamer")));
    }
}
