//! Diagnostic logging to a file.
//!
//! The terminal belongs to the TUI, so `tracing` output goes to
//! `<cache dir>/chatpane/chatpane.log`. The filter comes from `CHATPANE_LOG`
//! and defaults to `info`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CHATPANE_LOG";

pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("chatpane").join("chatpane.log"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the log file path, or `None` if
/// the file could not be opened, in which case nothing is logged.
pub fn init() -> Option<PathBuf> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }

    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let file = opts.open(&path).ok()?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(env_filter())
        .try_init()
        .ok()?;
    tracing::info!("chatpane {} starting", env!("CARGO_PKG_VERSION"));
    Some(path)
}
