//! Background loading of emote feeds with an in-flight guard per feed.

use crate::app::event::AppEvent;
use crate::chat::emotes::EmoteDef;
use crate::emotes::cache::EmoteCache;
use crate::emotes::Feed;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
}

pub struct EmoteFetcher {
    client: reqwest::Client,
    cache: Option<EmoteCache>,
    max_age: Duration,
    pending: HashSet<Feed>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl EmoteFetcher {
    pub fn new(
        event_tx: mpsc::UnboundedSender<AppEvent>,
        cache: Option<EmoteCache>,
        max_age: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chatpane/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            cache,
            max_age,
            pending: HashSet::new(),
            event_tx,
        })
    }

    pub fn is_pending(&self, feed: &Feed) -> bool {
        self.pending.contains(feed)
    }

    /// Start loading `feed`. A non-forced request is answered from the cache
    /// when possible. Returns `false` if the feed is already being loaded.
    pub fn request(&mut self, feed: Feed, force: bool) -> bool {
        if self.is_pending(&feed) {
            tracing::debug!("Already loading {}", feed);
            return false;
        }
        self.pending.insert(feed.clone());

        let client = self.client.clone();
        let cache = self.cache.clone();
        let max_age = self.max_age;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let emotes = load(&client, cache.as_ref(), max_age, &feed, force).await;
            let _ = tx.send(AppEvent::EmotesLoaded { feed, emotes });
        });
        true
    }

    /// Clear the in-flight flag once the result reached the event loop.
    pub fn finished(&mut self, feed: &Feed) {
        self.pending.remove(feed);
    }
}

async fn load(
    client: &reqwest::Client,
    cache: Option<&EmoteCache>,
    max_age: Duration,
    feed: &Feed,
    force: bool,
) -> Vec<EmoteDef> {
    let name = feed.cache_name();
    if let (Some(cache), false) = (cache, force) {
        match cache.load(&name, max_age) {
            Ok(body) => {
                let emotes = feed.parse(&body);
                if !emotes.is_empty() {
                    tracing::info!("Loaded {} {} from cache", emotes.len(), feed);
                    return emotes;
                }
            }
            Err(e) => tracing::debug!("No usable cache for {}: {}", feed, e),
        }
    }

    let body = match download(client, &feed.url()).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", feed, e);
            return Vec::new();
        }
    };
    let emotes = feed.parse(&body);
    tracing::info!("Fetched {} {}", emotes.len(), feed);
    if let (Some(cache), false) = (cache, emotes.is_empty()) {
        if let Err(e) = cache.save(&name, &body) {
            tracing::warn!("{:#}", e);
        }
    }
    emotes
}

async fn download(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cached_feed_and_in_flight_guard() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmoteCache::new(dir.path());
        cache
            .save("bttv_global", r#"[{"id": "1", "code": "Cached"}]"#)
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut fetcher =
            EmoteFetcher::new(tx, Some(cache), Duration::from_secs(3600)).unwrap();
        assert!(fetcher.request(Feed::BttvGlobal, false));
        assert!(!fetcher.request(Feed::BttvGlobal, true));
        assert!(fetcher.is_pending(&Feed::BttvGlobal));

        match rx.recv().await {
            Some(AppEvent::EmotesLoaded { feed, emotes }) => {
                assert_eq!(feed, Feed::BttvGlobal);
                assert_eq!(emotes.len(), 1);
                assert_eq!(emotes[0].code, "Cached");
                fetcher.finished(&feed);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!fetcher.is_pending(&Feed::BttvGlobal));
    }
}
