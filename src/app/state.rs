use crate::chat::emotes::Emoticons;
use crate::chat::user::Users;
use crate::config::nickname::is_anonymous;
use crate::config::AppConfig;
use crate::pane::style::StyleKind;
use crate::pane::ChannelTextPane;
use ratatui::layout::Rect;
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Default)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Replace the line, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
        self.history_index = None;
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history_index = None;
        if !text.is_empty() {
            self.history.push(text.clone());
        }
        text
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let idx = match self.history_index {
            Some(i) if i > 0 => i - 1,
            Some(_) => return,
            None => self.history.len() - 1,
        };
        self.history_index = Some(idx);
        self.text = self.history[idx].clone();
        self.cursor = self.text.len();
    }

    pub fn history_down(&mut self) {
        match self.history_index {
            Some(i) if i + 1 < self.history.len() => {
                let idx = i + 1;
                self.history_index = Some(idx);
                self.text = self.history[idx].clone();
                self.cursor = self.text.len();
            }
            Some(_) => {
                self.history_index = None;
                self.text.clear();
                self.cursor = 0;
            }
            None => {}
        }
    }

    pub fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut pos = self.cursor;
        // Skip trailing whitespace
        while pos > 0 && self.text.as_bytes().get(pos - 1) == Some(&b' ') {
            pos -= 1;
        }
        // Skip word characters
        while pos > 0 && self.text.as_bytes().get(pos - 1) != Some(&b' ') {
            pos -= 1;
        }
        self.text.drain(pos..self.cursor);
        self.cursor = pos;
    }
}

pub struct AppState {
    pub config: AppConfig,
    /// Login used for the connection.
    pub login: String,
    /// `#channel`
    pub channel: String,
    pub room_id: Option<String>,
    pub connection: ConnectionStatus,
    pub pane: ChannelTextPane,
    pub users: Users,
    pub emoticons: Emoticons,
    pub input: InputState,
    pub should_quit: bool,
    pub quit_message: Option<String>,
    pub dirty: bool,
    pub status_message: Option<String>,
    /// Message area of the last frame, for mouse hit-testing.
    pub message_viewport: Cell<Rect>,
}

impl AppState {
    pub fn new(config: AppConfig, login: String) -> Self {
        let channel = config.twitch.irc_channel();
        let pane = ChannelTextPane::new(Box::new(config.clone()));
        let mut emoticons = Emoticons::new();
        for code in &config.emotes.ignored {
            emoticons.ignore(code);
        }
        Self {
            users: Users::new(&channel),
            config,
            login,
            channel,
            room_id: None,
            connection: ConnectionStatus::Connecting,
            pane,
            emoticons,
            input: InputState::new(),
            should_quit: false,
            quit_message: None,
            dirty: true,
            status_message: None,
            message_viewport: Cell::new(Rect::default()),
        }
    }

    /// Channel name without `#`, as emote providers know it.
    pub fn stream(&self) -> &str {
        self.channel.trim_start_matches('#')
    }

    pub fn can_chat(&self) -> bool {
        !is_anonymous(&self.login) && self.config.twitch.oauth_token.is_some()
    }

    pub fn info(&mut self, text: &str) {
        self.pane.print_line(text, StyleKind::Info);
        self.dirty = true;
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(text.into());
        self.dirty = true;
    }

    /// Swap in a freshly loaded config and restyle what is on screen.
    pub fn apply_config(&mut self, config: AppConfig) {
        let restyled = self.pane.set_style_source(Box::new(config.clone()));
        tracing::info!("Config reloaded, {} runs restyled", restyled);
        for code in &config.emotes.ignored {
            self.emoticons.ignore(code);
        }
        self.config = config;
        self.dirty = true;
    }

    /// Whether a message from someone else should be highlighted: it
    /// mentions the own login or one of the configured words.
    pub fn is_highlight(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        let login = (!is_anonymous(&self.login)).then_some(self.login.as_str());
        login
            .into_iter()
            .chain(self.config.twitch.highlight_words.iter().map(String::as_str))
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .any(|w| contains_word(&text, &w.to_lowercase()))
    }

    pub fn status_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        let connection = match self.connection {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Disconnected => "disconnected",
        };
        let mut s = format!(
            "{} | {} lines | {} chatters | emotes: {} global, {} channel",
            connection,
            self.pane.document().len(),
            self.users.len(),
            self.emoticons.global_count(),
            self.emoticons.channel_count(self.stream()),
        );
        if self.pane.is_paused() {
            s.push_str(" | PAUSED");
        } else if self.pane.scroll_offset() > 0 {
            s.push_str(&format!(" | -{}", self.pane.scroll_offset()));
        }
        s
    }
}

/// `word` occurs in `text` not directly surrounded by alphanumerics.
fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(i, m)| {
        let before = text[..i].chars().next_back();
        let after = text[i + m.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric() || c == '_')
            && !after.is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_editing() {
        let mut input = InputState::new();
        for c in "héllo wörld".chars() {
            input.insert_char(c);
        }
        input.delete_word_back();
        assert_eq!(input.text, "héllo ");
        input.move_home();
        input.move_right();
        input.move_right();
        input.delete_back();
        assert_eq!(input.text, "hllo ");
        assert_eq!(input.take_text(), "hllo ");
        assert!(input.text.is_empty());
        input.history_up();
        assert_eq!(input.text, "hllo ");
        input.history_down();
        assert!(input.text.is_empty());
    }

    #[test]
    fn test_highlight_words() {
        let mut config = AppConfig::default();
        config.twitch.highlight_words = vec!["Pog".into()];
        let state = AppState::new(config, "viewer".into());
        assert!(state.is_highlight("hey @Viewer look"));
        assert!(state.is_highlight("pog"));
        assert!(!state.is_highlight("viewers are here"));
        assert!(!state.is_highlight("PogChamp"));
    }

    #[test]
    fn test_anonymous_login_never_highlights() {
        let state = AppState::new(AppConfig::default(), "justinfan12345".into());
        assert!(!state.is_highlight("justinfan12345"));
        assert!(!state.can_chat());
    }
}
