//! The configuration as the chat pane's style and settings source.

use super::model::AppConfig;
use crate::pane::style::{SettingValue, StyleKind, StyleSource};
use crate::ui::theme::Theme;
use ratatui::style::{Color, Style};

fn parse_color(name: &str, raw: &str) -> Option<Color> {
    match raw.parse::<Color>() {
        Ok(color) => Some(color),
        Err(_) => {
            tracing::warn!("Invalid color {:?} for theme.{}, using default", raw, name);
            None
        }
    }
}

impl StyleSource for AppConfig {
    fn style(&self, kind: StyleKind) -> Style {
        let style = Theme::pane_style(kind);
        match self.color(kind.name()) {
            // Search results are marked with a background, everything else
            // with a foreground.
            Some(color) if kind == StyleKind::SearchResult => style.bg(color),
            Some(color) => style.fg(color),
            None => style,
        }
    }

    fn color(&self, name: &str) -> Option<Color> {
        self.theme
            .get(name)
            .and_then(|raw| parse_color(name, raw))
    }

    fn timestamp_format(&self) -> Option<String> {
        Some(self.pane.timestamp_format.clone())
    }

    fn setting(&self, name: &str) -> Option<SettingValue> {
        let pane = &self.pane;
        let value = match name {
            "timestamp" => SettingValue::Bool(pane.timestamp),
            "emoticons" => SettingValue::Bool(pane.emoticons),
            "usericons" => SettingValue::Bool(pane.usericons),
            "auto_scroll" => SettingValue::Bool(pane.auto_scroll),
            "show_ban_messages" => SettingValue::Bool(pane.show_ban_messages),
            "combine_ban_messages" => SettingValue::Bool(pane.combine_ban_messages),
            "action_colored" => SettingValue::Bool(pane.action_colored),
            "auto_scroll_time" => SettingValue::Int(pane.auto_scroll_time),
            "deleted_messages_mode" => SettingValue::Int(pane.deleted_messages_mode),
            "buffer_size" => SettingValue::Int(pane.buffer_size),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::style::{BoolSetting, Redaction, StyleRegistry};

    #[test]
    fn test_color_overrides() {
        let mut config = AppConfig::default();
        config.theme.url = Some("#102030".into());
        config.theme.info = Some("not a color".into());
        config.theme.search_result = Some("red".into());
        config.theme.background = Some("black".into());

        assert_eq!(config.style(StyleKind::Url).fg, Some(Color::Rgb(0x10, 0x20, 0x30)));
        assert_eq!(config.style(StyleKind::Info), Theme::pane_style(StyleKind::Info));
        assert_eq!(config.style(StyleKind::SearchResult).bg, Some(Color::Red));
        assert_eq!(config.color("background"), Some(Color::Black));
    }

    #[test]
    fn test_settings_flow_into_registry() {
        let mut config = AppConfig::default();
        config.pane.show_ban_messages = true;
        config.pane.buffer_size = 1_000_000;
        config.pane.deleted_messages_mode = -1;
        config.pane.timestamp_format = String::new();

        let registry = StyleRegistry::new(Box::new(config));
        assert!(registry.get(BoolSetting::ShowBanMessages));
        assert_eq!(registry.buffer_size(), 10_000);
        assert_eq!(registry.redaction(), Redaction::Replace);
        assert_eq!(registry.timestamp_format(), None);
    }
}
