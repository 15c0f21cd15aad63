//! On-disk cache for emote feed bodies.
//!
//! A cache file holds the UNIX time of the write on its first line, followed
//! by the raw body as it came from the server.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cache file at {0}")]
    Missing(PathBuf),
    #[error("cache file has no valid timestamp header")]
    MalformedHeader,
    #[error("cache expired ({} seconds old)", .0.as_secs())]
    Expired(Duration),
    #[error("cache read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct EmoteCache {
    dir: PathBuf,
}

impl EmoteCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<cache dir>/chatpane/emotes`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("chatpane").join("emotes"))
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.cache", name))
    }

    /// Load the body cached under `name` if it is younger than `max_age`.
    pub fn load(&self, name: &str, max_age: Duration) -> Result<String, CacheError> {
        let path = self.path(name);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::Missing(path));
            }
            Err(e) => return Err(e.into()),
        };
        parse(&contents, max_age, unix_now()).map(str::to_string)
    }

    pub fn save(&self, name: &str, body: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {}", self.dir.display()))?;
        let path = self.path(name);
        std::fs::write(&path, format!("{}\n{}", unix_now(), body))
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;
        tracing::debug!("Cached {} bytes in {}", body.len(), path.display());
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Split cache `contents` into header and body, checking the age against
/// `now` (UNIX seconds).
pub fn parse(contents: &str, max_age: Duration, now: u64) -> Result<&str, CacheError> {
    let (header, body) = contents.split_once('\n').unwrap_or((contents, ""));
    let written: u64 = header
        .trim()
        .parse()
        .map_err(|_| CacheError::MalformedHeader)?;
    let age = Duration::from_secs(now.saturating_sub(written));
    if age > max_age {
        return Err(CacheError::Expired(age));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_parse() {
        assert_eq!(parse("1000\n[1,2]\nmore", DAY, 2000).unwrap(), "[1,2]\nmore");
        assert!(matches!(
            parse("soon\n[]", DAY, 2000),
            Err(CacheError::MalformedHeader)
        ));
        assert!(matches!(
            parse("1000\n[]", Duration::from_secs(10), 2000),
            Err(CacheError::Expired(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmoteCache::new(dir.path().join("emotes"));
        assert!(matches!(
            cache.load("bttv_global", DAY),
            Err(CacheError::Missing(_))
        ));
        cache.save("bttv_global", "[{\"id\":\"1\"}]").unwrap();
        assert_eq!(cache.load("bttv_global", DAY).unwrap(), "[{\"id\":\"1\"}]");
    }

    #[test]
    fn test_old_file_is_expired() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmoteCache::new(dir.path());
        std::fs::write(cache.path("ffz_global"), "12\n{}").unwrap();
        assert!(matches!(
            cache.load("ffz_global", DAY),
            Err(CacheError::Expired(_))
        ));
    }
}
