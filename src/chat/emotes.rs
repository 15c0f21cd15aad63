//! Emote definitions and the catalog the pane draws them from.
//!
//! Third-party providers deliver whole batches of [`EmoteDef`]s (see
//! `crate::emotes`); [`Emoticons`] files each batch under global,
//! per-channel or per-emote-set buckets. The pane only sees the read side,
//! [`EmoteCatalog`].

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

const TWITCH_CDN: &str = "https://static-cdn.jtvnw.net/emoticons/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmoteSource {
    Twitch,
    Bttv,
    Ffz,
}

impl fmt::Display for EmoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmoteSource::Twitch => write!(f, "Twitch"),
            EmoteSource::Bttv => write!(f, "BTTV"),
            EmoteSource::Ffz => write!(f, "FFZ"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmoteDef {
    pub code: String,
    pub source: EmoteSource,
    pub url: String,
    /// Twitch emote set this emote belongs to (subscriber/turbo emotes).
    pub emote_set: Option<String>,
    /// Channel the emote is restricted to.
    pub stream: Option<String>,
    pattern: Option<Regex>,
}

impl EmoteDef {
    pub fn new(code: &str, source: EmoteSource, url: &str) -> Self {
        let pattern = match Regex::new(&regex::escape(code)) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Unusable emote code {:?}: {}", code, e);
                None
            }
        };
        Self {
            code: code.to_string(),
            source,
            url: url.to_string(),
            emote_set: None,
            stream: None,
            pattern,
        }
    }

    /// A native Twitch emote by its numeric id.
    pub fn twitch(id: &str, code: &str) -> Self {
        let url = format!("{}/{}/default/dark/1.0", TWITCH_CDN, id);
        Self::new(code, EmoteSource::Twitch, &url)
    }

    pub fn with_set(mut self, set: &str) -> Self {
        self.emote_set = Some(set.to_string());
        self
    }

    pub fn with_stream(mut self, stream: &str) -> Self {
        self.stream = Some(stream.to_lowercase());
        self
    }

    /// All non-overlapping occurrences of this emote in `text` that stand
    /// as a whole word, as byte ranges `start..end`.
    pub fn find_all(&self, text: &str) -> Vec<(usize, usize)> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        pattern
            .find_iter(text)
            .filter(|m| is_word_boundary(text, m.start(), m.end()))
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
}

/// Read access to the known emotes.
pub trait EmoteCatalog {
    fn emotes_for_set(&self, set: &str) -> Vec<Arc<EmoteDef>>;
    fn global(&self) -> Vec<Arc<EmoteDef>>;
    /// Emotes restricted to `stream`, including the stream's own subscriber set.
    fn for_channel(&self, stream: &str) -> Vec<Arc<EmoteDef>>;
    fn is_ignored(&self, emote: &EmoteDef) -> bool;
}

/// Emotes keyed by provider and code, so equal codes from different
/// providers do not replace each other.
type Bucket = HashMap<(EmoteSource, String), Arc<EmoteDef>>;

#[derive(Debug, Default)]
pub struct Emoticons {
    global: Bucket,
    by_stream: HashMap<String, Bucket>,
    by_set: HashMap<String, Bucket>,
    ignored: HashSet<String>,
}

impl Emoticons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all global emotes from `source` with `emotes`. Emotes that
    /// carry a set or stream are filed under those instead.
    pub fn received_emoticons(&mut self, source: EmoteSource, emotes: Vec<EmoteDef>) {
        self.global.retain(|_, e| e.source != source);
        for bucket in self.by_set.values_mut() {
            bucket.retain(|_, e| e.source != source);
        }
        self.by_set.retain(|_, bucket| !bucket.is_empty());
        for emote in emotes {
            self.insert(emote);
        }
    }

    /// Replace the emotes `source` provides for `stream`.
    pub fn channel_emoticons_received(
        &mut self,
        stream: &str,
        source: EmoteSource,
        emotes: Vec<EmoteDef>,
    ) {
        let stream = stream.to_lowercase();
        let bucket = self.by_stream.entry(stream.clone()).or_default();
        bucket.retain(|_, e| e.source != source);
        for emote in emotes {
            let emote = if emote.stream.is_none() {
                emote.with_stream(&stream)
            } else {
                emote
            };
            self.insert(emote);
        }
    }

    /// Add emotes to `set`, keeping what the set already holds.
    pub fn set_emoticons_received(&mut self, set: &str, emotes: Vec<EmoteDef>) {
        for emote in emotes {
            self.insert(emote.with_set(set));
        }
    }

    fn insert(&mut self, emote: EmoteDef) {
        let bucket = if let Some(set) = &emote.emote_set {
            self.by_set.entry(set.clone()).or_default()
        } else if let Some(stream) = &emote.stream {
            self.by_stream.entry(stream.clone()).or_default()
        } else {
            &mut self.global
        };
        bucket.insert((emote.source, emote.code.clone()), Arc::new(emote));
    }

    pub fn ignore(&mut self, code: &str) {
        self.ignored.insert(code.to_string());
    }

    pub fn unignore(&mut self, code: &str) {
        self.ignored.remove(code);
    }

    pub fn global_count(&self) -> usize {
        self.global.len()
    }

    pub fn channel_count(&self, stream: &str) -> usize {
        self.by_stream
            .get(&stream.to_lowercase())
            .map_or(0, |b| b.len())
    }
}

impl EmoteCatalog for Emoticons {
    fn emotes_for_set(&self, set: &str) -> Vec<Arc<EmoteDef>> {
        self.by_set
            .get(set)
            .map(|b| b.values().cloned().collect())
            .unwrap_or_default()
    }

    fn global(&self) -> Vec<Arc<EmoteDef>> {
        self.global.values().cloned().collect()
    }

    fn for_channel(&self, stream: &str) -> Vec<Arc<EmoteDef>> {
        self.by_stream
            .get(&stream.to_lowercase())
            .map(|b| b.values().cloned().collect())
            .unwrap_or_default()
    }

    fn is_ignored(&self, emote: &EmoteDef) -> bool {
        self.ignored.contains(&emote.code)
    }
}
