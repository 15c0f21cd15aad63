//! Detection of URLs and emotes inside message text.
//!
//! URLs are found first so they win any overlap with emotes. Emotes are then
//! collected from the author's emote sets, the global emotes and the channel
//! emotes, in that order; the first span to claim a range keeps it.

use crate::chat::emotes::{EmoteCatalog, EmoteDef};
use crate::chat::user::User;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?://|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’])"#,
    )
    .expect("valid URL pattern")
});

#[derive(Debug, Clone)]
pub enum SpecialKind {
    Url(String),
    Emote(Arc<EmoteDef>),
}

#[derive(Debug, Clone)]
pub struct Special {
    /// Exclusive byte offset.
    pub end: usize,
    pub kind: SpecialKind,
}

/// Non-overlapping specials keyed by start byte offset.
#[derive(Debug, Clone, Default)]
pub struct SpanSet {
    spans: BTreeMap<usize, Special>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        // Only the last span starting before `end` can reach into the range,
        // since stored spans never overlap each other.
        self.spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, special)| special.end > start)
    }

    /// Claim `start..end` unless any part of it is already taken.
    pub fn insert(&mut self, start: usize, end: usize, kind: SpecialKind) -> bool {
        if start >= end || self.overlaps(start, end) {
            return false;
        }
        self.spans.insert(start, Special { end, kind });
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Special)> {
        self.spans.iter().map(|(start, special)| (*start, special))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Find every URL and emote occurrence in `text` written by `author`.
pub fn find_specials(
    text: &str,
    author: &User,
    catalog: &dyn EmoteCatalog,
    emotes_enabled: bool,
) -> SpanSet {
    let mut spans = SpanSet::new();
    find_urls(text, &mut spans);
    if emotes_enabled {
        for set in author.emote_sets() {
            find_emotes(text, &catalog.emotes_for_set(&set), catalog, &mut spans);
        }
        find_emotes(text, &catalog.global(), catalog, &mut spans);
        find_emotes(text, &catalog.for_channel(author.stream()), catalog, &mut spans);
    }
    spans
}

pub fn find_urls(text: &str, spans: &mut SpanSet) {
    for m in URL_PATTERN.find_iter(text) {
        if let Some(href) = check_url(m.as_str()) {
            spans.insert(m.start(), m.end(), SpecialKind::Url(href));
        }
    }
}

/// Returns the link target if `found` parses as a URI, adding a scheme to
/// bare `www.` style matches.
fn check_url(found: &str) -> Option<String> {
    let href = if found.contains("://") {
        found.to_string()
    } else {
        format!("http://{}", found)
    };
    match url::Url::parse(&href) {
        Ok(parsed) if parsed.host_str().is_some() => Some(href),
        _ => {
            tracing::debug!("Rejected URL candidate {:?}", found);
            None
        }
    }
}

fn find_emotes(
    text: &str,
    emotes: &[Arc<EmoteDef>],
    catalog: &dyn EmoteCatalog,
    spans: &mut SpanSet,
) {
    for emote in emotes {
        if catalog.is_ignored(emote) {
            continue;
        }
        for (start, end) in emote.find_all(text) {
            spans.insert(start, end, SpecialKind::Emote(emote.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::emotes::{EmoteSource, Emoticons};

    fn codes(spans: &SpanSet) -> Vec<(usize, usize, String)> {
        spans
            .iter()
            .map(|(start, s)| {
                let what = match &s.kind {
                    SpecialKind::Url(href) => format!("url:{}", href),
                    SpecialKind::Emote(e) => format!("emote:{}", e.code),
                };
                (start, s.end, what)
            })
            .collect()
    }

    fn assert_no_overlap(spans: &SpanSet) {
        let ranges: Vec<(usize, usize)> = spans.iter().map(|(s, sp)| (s, sp.end)).collect();
        for pair in ranges.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "overlap in {:?}", ranges);
        }
    }

    #[test]
    fn test_span_set_rejects_overlap() {
        let mut spans = SpanSet::new();
        assert!(spans.insert(5, 10, SpecialKind::Url("a".into())));
        assert!(!spans.insert(0, 6, SpecialKind::Url("b".into())));
        assert!(!spans.insert(9, 12, SpecialKind::Url("c".into())));
        assert!(!spans.insert(6, 8, SpecialKind::Url("d".into())));
        assert!(spans.insert(10, 12, SpecialKind::Url("e".into())));
        assert!(spans.insert(0, 5, SpecialKind::Url("f".into())));
        assert_eq!(spans.len(), 3);
        assert_no_overlap(&spans);
    }

    #[test]
    fn test_finds_urls() {
        let mut spans = SpanSet::new();
        find_urls("see https://example.com/path. and www.rust-lang.org", &mut spans);
        assert_eq!(
            codes(&spans),
            vec![
                (4, 28, "url:https://example.com/path".to_string()),
                (34, 51, "url:http://www.rust-lang.org".to_string()),
            ]
        );
    }

    #[test]
    fn test_plain_words_are_not_urls() {
        let mut spans = SpanSet::new();
        find_urls("hello there, how are you?", &mut spans);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_url_wins_over_emote() {
        let mut catalog = Emoticons::new();
        catalog.received_emoticons(
            EmoteSource::Bttv,
            vec![EmoteDef::new("https://x.io/a", EmoteSource::Bttv, "")],
        );
        let user = User::new("viewer", "#chan");
        let spans = find_specials("https://x.io/a", &user, &catalog, true);
        assert_eq!(codes(&spans), vec![(0, 14, "url:https://x.io/a".to_string())]);
    }

    #[test]
    fn test_emote_sources_in_precedence_order() {
        let mut catalog = Emoticons::new();
        catalog.received_emoticons(
            EmoteSource::Twitch,
            vec![EmoteDef::new("Kappa", EmoteSource::Twitch, "sub").with_set("7")],
        );
        catalog.received_emoticons(
            EmoteSource::Bttv,
            vec![EmoteDef::new("Kappa", EmoteSource::Bttv, "global")],
        );
        let user = User::new("viewer", "#chan");
        user.update(|info| info.emote_sets = vec!["7".into()]);

        let spans = find_specials("Kappa Kappa", &user, &catalog, true);
        assert_eq!(spans.len(), 2);
        for (_, special) in spans.iter() {
            match &special.kind {
                SpecialKind::Emote(e) => assert_eq!(e.url, "sub"),
                SpecialKind::Url(_) => panic!("unexpected url"),
            }
        }
    }

    #[test]
    fn test_emotes_disabled_keeps_urls() {
        let mut catalog = Emoticons::new();
        catalog.received_emoticons(
            EmoteSource::Ffz,
            vec![EmoteDef::new("LUL", EmoteSource::Ffz, "")],
        );
        let user = User::new("viewer", "#chan");
        let spans = find_specials("LUL www.example.org LUL", &user, &catalog, false);
        assert_eq!(spans.len(), 1);
        let spans = find_specials("LUL www.example.org LUL", &user, &catalog, true);
        assert_eq!(spans.len(), 3);
        assert_no_overlap(&spans);
    }

    #[test]
    fn test_ignored_and_channel_emotes() {
        let mut catalog = Emoticons::new();
        catalog.channel_emoticons_received(
            "chan",
            EmoteSource::Ffz,
            vec![EmoteDef::new("Own", EmoteSource::Ffz, "")],
        );
        catalog.channel_emoticons_received(
            "other",
            EmoteSource::Ffz,
            vec![EmoteDef::new("Foreign", EmoteSource::Ffz, "")],
        );
        catalog.received_emoticons(
            EmoteSource::Bttv,
            vec![EmoteDef::new("Muted", EmoteSource::Bttv, "")],
        );
        catalog.ignore("Muted");
        let user = User::new("viewer", "#chan");
        let spans = find_specials("Own Foreign Muted", &user, &catalog, true);
        assert_eq!(codes(&spans), vec![(0, 3, "emote:Own".to_string())]);
    }
}
