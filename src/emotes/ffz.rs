//! FrankerFaceZ emote feeds.

use crate::chat::emotes::{EmoteDef, EmoteSource};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub const GLOBAL_URL: &str = "https://api.frankerfacez.com/v1/set/global";

pub fn room_url(stream: &str) -> String {
    format!("https://api.frankerfacez.com/v1/room/{}", stream.to_lowercase())
}

#[derive(Debug, Deserialize)]
struct FfzEmote {
    name: String,
    urls: HashMap<String, String>,
}

impl FfzEmote {
    fn into_def(self) -> Option<EmoteDef> {
        let url = self.urls.get("1")?;
        let url = if url.starts_with("//") {
            format!("https:{}", url)
        } else {
            url.clone()
        };
        Some(EmoteDef::new(&self.name, EmoteSource::Ffz, &url))
    }
}

fn parse_set(set: &Value) -> Vec<EmoteDef> {
    let Some(items) = set.get("emoticons").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<FfzEmote>(item.clone()) {
            Ok(emote) => emote.into_def(),
            Err(e) => {
                tracing::debug!("Skipping FFZ emote: {}", e);
                None
            }
        })
        .collect()
}

fn parse_root(body: &str, what: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Failed to parse FFZ {} feed: {}", what, e);
            None
        }
    }
}

/// Parse the global feed, keeping only the default sets everyone sees.
pub fn parse_global(body: &str) -> Vec<EmoteDef> {
    let Some(root) = parse_root(body, "global") else {
        return Vec::new();
    };
    let Some(sets) = root.get("sets").and_then(Value::as_object) else {
        return Vec::new();
    };
    let defaults: Vec<String> = root
        .get("default_sets")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().map(|id| id.to_string()).collect())
        .unwrap_or_default();
    sets.iter()
        .filter(|(id, _)| defaults.contains(id))
        .flat_map(|(_, set)| parse_set(set))
        .collect()
}

/// Parse a room feed; every set in it belongs to `stream`.
pub fn parse_room(body: &str, stream: &str) -> Vec<EmoteDef> {
    let Some(root) = parse_root(body, "room") else {
        return Vec::new();
    };
    root.get("sets")
        .and_then(Value::as_object)
        .map(|sets| {
            sets.values()
                .flat_map(parse_set)
                .map(|emote| emote.with_stream(stream))
                .collect()
        })
        .unwrap_or_default()
}
