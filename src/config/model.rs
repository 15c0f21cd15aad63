//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box.

use serde::{Deserialize, Serialize};

use super::nickname::generate_nickname;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub pane: PaneConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub emotes: EmotesConfig,
}

/// Twitch chat connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    /// Channel to watch, with or without the leading `#`.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Login name. An anonymous `justinfan` login is used when unset.
    #[serde(default)]
    pub nickname: Option<String>,
    /// `oauth:...` token, required for sending messages.
    #[serde(default)]
    pub oauth_token: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub tls: bool,
    /// Extra words that highlight a message besides the own login.
    #[serde(default)]
    pub highlight_words: Vec<String>,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            nickname: None,
            oauth_token: None,
            host: default_host(),
            port: default_port(),
            tls: true,
            highlight_words: Vec::new(),
        }
    }
}

impl TwitchConfig {
    /// Channel name in IRC form (`#name`, lowercase).
    pub fn irc_channel(&self) -> String {
        format!("#{}", self.channel.trim_start_matches('#').to_lowercase())
    }

    /// Configured login or a fresh anonymous one.
    pub fn login(&self) -> String {
        self.nickname
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(generate_nickname)
    }
}

/// Chat pane behavior. Numeric values are clamped by the pane, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneConfig {
    #[serde(default = "default_true")]
    pub timestamp: bool,
    /// chrono format string; empty disables timestamps.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_true")]
    pub emoticons: bool,
    /// Badge glyphs in front of nicks.
    #[serde(default = "default_true")]
    pub usericons: bool,
    #[serde(default = "default_true")]
    pub auto_scroll: bool,
    /// Seconds after a manual scroll before following new lines again.
    #[serde(default = "default_auto_scroll_time")]
    pub auto_scroll_time: i64,
    #[serde(default)]
    pub show_ban_messages: bool,
    #[serde(default = "default_true")]
    pub combine_ban_messages: bool,
    /// Negative replaces deleted messages, 0 strikes them through, N keeps
    /// the first N characters.
    #[serde(default = "default_deleted_messages_mode")]
    pub deleted_messages_mode: i64,
    #[serde(default)]
    pub action_colored: bool,
    /// Maximum number of lines kept.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: i64,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            timestamp: true,
            timestamp_format: default_timestamp_format(),
            emoticons: true,
            usericons: true,
            auto_scroll: true,
            auto_scroll_time: default_auto_scroll_time(),
            show_ban_messages: false,
            combine_ban_messages: true,
            deleted_messages_mode: default_deleted_messages_mode(),
            action_colored: false,
            buffer_size: default_buffer_size(),
        }
    }
}

/// Color overrides per text category, e.g. `url = "#5fafff"` or
/// `info = "yellow"`. Unset entries use the built-in theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub foreground: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub compact: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub emote: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub deleted: Option<String>,
    #[serde(default)]
    pub search_result: Option<String>,
}

impl ThemeConfig {
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "foreground" | "standard" => &self.foreground,
            "background" => &self.background,
            "info" => &self.info,
            "highlight" => &self.highlight,
            "nick" => &self.nick,
            "timestamp" => &self.timestamp,
            "compact" => &self.compact,
            "url" => &self.url,
            "emote" => &self.emote,
            "icon" => &self.icon,
            "deleted" => &self.deleted,
            "search_result" => &self.search_result,
            _ => return None,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Third-party emote providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotesConfig {
    #[serde(default = "default_true")]
    pub bttv: bool,
    #[serde(default = "default_true")]
    pub ffz: bool,
    /// Cached feeds older than this are fetched again.
    #[serde(default = "default_cache_expiry_hours")]
    pub cache_expiry_hours: u64,
    /// Codes never turned into emotes.
    #[serde(default)]
    pub ignored: Vec<String>,
}

impl Default for EmotesConfig {
    fn default() -> Self {
        Self {
            bttv: true,
            ffz: true,
            cache_expiry_hours: default_cache_expiry_hours(),
            ignored: Vec::new(),
        }
    }
}

fn default_channel() -> String {
    "twitch".to_string()
}
fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}
fn default_port() -> u16 {
    6697
}
fn default_true() -> bool {
    true
}
fn default_timestamp_format() -> String {
    "[%H:%M]".to_string()
}
fn default_auto_scroll_time() -> i64 {
    30
}
fn default_deleted_messages_mode() -> i64 {
    30
}
fn default_buffer_size() -> i64 {
    250
}
fn default_cache_expiry_hours() -> u64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.twitch.channel, "twitch");
        assert_eq!(config.twitch.port, 6697);
        assert_eq!(config.pane.buffer_size, 250);
        assert!(!config.pane.show_ban_messages);
        assert!(config.pane.combine_ban_messages);
        assert_eq!(config.emotes.cache_expiry_hours, 24);
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r##"
            [twitch]
            channel = "#Forsen"
            nickname = "  Viewer "

            [pane]
            deleted_messages_mode = -1
            buffer_size = 5

            [theme]
            url = "#5fafff"
            info = ""
            "##,
        )
        .unwrap();
        assert_eq!(config.twitch.irc_channel(), "#forsen");
        assert_eq!(config.twitch.login(), "viewer");
        assert_eq!(config.pane.deleted_messages_mode, -1);
        assert_eq!(config.pane.buffer_size, 5);
        assert!(config.pane.timestamp);
        assert_eq!(config.theme.get("url"), Some("#5fafff"));
        assert_eq!(config.theme.get("info"), None);
        assert_eq!(config.theme.get("nope"), None);
    }

    #[test]
    fn test_anonymous_login_when_unset() {
        let config = TwitchConfig::default();
        assert!(super::super::nickname::is_anonymous(&config.login()));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.pane.timestamp_format, "[%H:%M]");
        assert_eq!(back.twitch.host, "irc.chat.twitch.tv");
    }
}
