//! Named text styles and pane settings.
//!
//! The pane never reads configuration directly; it asks a [`StyleSource`]
//! through a [`StyleRegistry`], which caches the last seen styles so a
//! refresh can report exactly which categories changed.

use ratatui::style::{Color, Style};
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Style categories a run can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleKind {
    Standard,
    Info,
    Highlight,
    Nick,
    Timestamp,
    Compact,
    Url,
    Emote,
    Icon,
    Deleted,
    SearchResult,
}

impl StyleKind {
    pub const ALL: [StyleKind; 11] = [
        StyleKind::Standard,
        StyleKind::Info,
        StyleKind::Highlight,
        StyleKind::Nick,
        StyleKind::Timestamp,
        StyleKind::Compact,
        StyleKind::Url,
        StyleKind::Emote,
        StyleKind::Icon,
        StyleKind::Deleted,
        StyleKind::SearchResult,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleKind::Standard => "standard",
            StyleKind::Info => "info",
            StyleKind::Highlight => "highlight",
            StyleKind::Nick => "nick",
            StyleKind::Timestamp => "timestamp",
            StyleKind::Compact => "compact",
            StyleKind::Url => "url",
            StyleKind::Emote => "emote",
            StyleKind::Icon => "icon",
            StyleKind::Deleted => "deleted",
            StyleKind::SearchResult => "search_result",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

/// Theme and settings provider consumed by the pane.
pub trait StyleSource {
    fn style(&self, kind: StyleKind) -> Style;
    fn color(&self, name: &str) -> Option<Color>;
    /// chrono format string for line timestamps, `None` for no timestamps.
    fn timestamp_format(&self) -> Option<String>;
    fn setting(&self, name: &str) -> Option<SettingValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolSetting {
    Timestamp,
    Emoticons,
    Usericons,
    AutoScroll,
    ShowBanMessages,
    CombineBanMessages,
    ActionColored,
}

impl BoolSetting {
    pub const ALL: [BoolSetting; 7] = [
        BoolSetting::Timestamp,
        BoolSetting::Emoticons,
        BoolSetting::Usericons,
        BoolSetting::AutoScroll,
        BoolSetting::ShowBanMessages,
        BoolSetting::CombineBanMessages,
        BoolSetting::ActionColored,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoolSetting::Timestamp => "timestamp",
            BoolSetting::Emoticons => "emoticons",
            BoolSetting::Usericons => "usericons",
            BoolSetting::AutoScroll => "auto_scroll",
            BoolSetting::ShowBanMessages => "show_ban_messages",
            BoolSetting::CombineBanMessages => "combine_ban_messages",
            BoolSetting::ActionColored => "action_colored",
        }
    }

    pub fn default_value(self) -> bool {
        match self {
            BoolSetting::Timestamp
            | BoolSetting::Emoticons
            | BoolSetting::Usericons
            | BoolSetting::AutoScroll
            | BoolSetting::CombineBanMessages => true,
            BoolSetting::ShowBanMessages | BoolSetting::ActionColored => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntSetting {
    /// Seconds after a manual scroll before auto-scroll resumes.
    AutoScrollTime,
    /// Negative: replace, 0: strike, N: shorten to N characters.
    DeletedMessagesMode,
    /// Maximum number of lines kept.
    BufferSize,
}

impl IntSetting {
    pub const ALL: [IntSetting; 3] = [
        IntSetting::AutoScrollTime,
        IntSetting::DeletedMessagesMode,
        IntSetting::BufferSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntSetting::AutoScrollTime => "auto_scroll_time",
            IntSetting::DeletedMessagesMode => "deleted_messages_mode",
            IntSetting::BufferSize => "buffer_size",
        }
    }

    pub fn default_value(self) -> i64 {
        match self {
            IntSetting::AutoScrollTime => 30,
            IntSetting::DeletedMessagesMode => 30,
            IntSetting::BufferSize => 250,
        }
    }

    pub fn range(self) -> RangeInclusive<i64> {
        match self {
            IntSetting::AutoScrollTime => 5..=1234,
            IntSetting::DeletedMessagesMode => -1..=9_999_999,
            IntSetting::BufferSize => 10..=10_000,
        }
    }
}

/// How the content of a deleted message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    /// Replace the content with a fixed placeholder.
    Replace,
    /// Strike through the content, text unchanged.
    Strike,
    /// Keep at most N characters, then an ellipsis marker, struck through.
    Shorten(usize),
}

impl Redaction {
    pub fn from_mode(mode: i64) -> Self {
        match mode {
            m if m < 0 => Redaction::Replace,
            0 => Redaction::Strike,
            n => Redaction::Shorten(n as usize),
        }
    }
}

pub struct StyleRegistry {
    source: Box<dyn StyleSource>,
    styles: HashMap<StyleKind, Style>,
    bools: HashMap<BoolSetting, bool>,
    ints: HashMap<IntSetting, i64>,
    timestamp_format: Option<String>,
    background: Option<Color>,
}

impl StyleRegistry {
    pub fn new(source: Box<dyn StyleSource>) -> Self {
        let mut registry = Self {
            source,
            styles: HashMap::new(),
            bools: HashMap::new(),
            ints: HashMap::new(),
            timestamp_format: None,
            background: None,
        };
        registry.refresh();
        registry
    }

    /// Swap the source. Takes effect with the next `refresh`.
    pub fn set_source(&mut self, source: Box<dyn StyleSource>) {
        self.source = source;
    }

    /// Re-read every style and setting. Returns the style categories whose
    /// attributes differ from the previously cached copy.
    pub fn refresh(&mut self) -> HashSet<StyleKind> {
        let mut changed = HashSet::new();
        for kind in StyleKind::ALL {
            let style = self.source.style(kind);
            if self.styles.get(&kind) != Some(&style) {
                changed.insert(kind);
                self.styles.insert(kind, style);
            }
        }

        for setting in BoolSetting::ALL {
            let value = match self.source.setting(setting.name()) {
                Some(SettingValue::Bool(b)) => b,
                _ => setting.default_value(),
            };
            self.bools.insert(setting, value);
        }
        for setting in IntSetting::ALL {
            let value = match self.source.setting(setting.name()) {
                Some(SettingValue::Int(v)) => {
                    let range = setting.range();
                    v.clamp(*range.start(), *range.end())
                }
                _ => setting.default_value(),
            };
            self.ints.insert(setting, value);
        }

        self.timestamp_format = self.source.timestamp_format().filter(|f| !f.is_empty());
        self.background = self.source.color("background");
        changed
    }

    pub fn style(&self, kind: StyleKind) -> Style {
        self.styles.get(&kind).copied().unwrap_or_default()
    }

    pub fn get(&self, setting: BoolSetting) -> bool {
        self.bools
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.default_value())
    }

    pub fn int(&self, setting: IntSetting) -> i64 {
        self.ints
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.default_value())
    }

    pub fn buffer_size(&self) -> usize {
        self.int(IntSetting::BufferSize) as usize
    }

    pub fn auto_scroll_timeout(&self) -> Duration {
        Duration::from_secs(self.int(IntSetting::AutoScrollTime) as u64)
    }

    pub fn redaction(&self) -> Redaction {
        Redaction::from_mode(self.int(IntSetting::DeletedMessagesMode))
    }

    /// Timestamp format, only when timestamps are enabled.
    pub fn timestamp_format(&self) -> Option<&str> {
        if self.get(BoolSetting::Timestamp) {
            self.timestamp_format.as_deref()
        } else {
            None
        }
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ratatui::style::Modifier;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory style source whose contents tests can change after the
    /// registry has been built.
    #[derive(Clone, Default)]
    pub(crate) struct TestStyles {
        pub styles: Rc<RefCell<HashMap<StyleKind, Style>>>,
        pub settings: Rc<RefCell<HashMap<String, SettingValue>>>,
    }

    impl TestStyles {
        pub fn set(&self, name: &str, value: SettingValue) {
            self.settings.borrow_mut().insert(name.to_string(), value);
        }

        pub fn set_style(&self, kind: StyleKind, style: Style) {
            self.styles.borrow_mut().insert(kind, style);
        }
    }

    impl StyleSource for TestStyles {
        fn style(&self, kind: StyleKind) -> Style {
            self.styles.borrow().get(&kind).copied().unwrap_or_default()
        }

        fn color(&self, _name: &str) -> Option<Color> {
            None
        }

        fn timestamp_format(&self) -> Option<String> {
            None
        }

        fn setting(&self, name: &str) -> Option<SettingValue> {
            self.settings.borrow().get(name).cloned()
        }
    }

    #[test]
    fn test_defaults() {
        let registry = StyleRegistry::new(Box::new(TestStyles::default()));
        assert_eq!(registry.buffer_size(), 250);
        assert_eq!(registry.auto_scroll_timeout(), Duration::from_secs(30));
        assert_eq!(registry.redaction(), Redaction::Shorten(30));
        assert!(registry.get(BoolSetting::CombineBanMessages));
        assert!(!registry.get(BoolSetting::ShowBanMessages));
    }

    #[test]
    fn test_numeric_settings_are_clamped() {
        let styles = TestStyles::default();
        styles.set("buffer_size", SettingValue::Int(3));
        styles.set("auto_scroll_time", SettingValue::Int(5000));
        styles.set("deleted_messages_mode", SettingValue::Int(-50));
        let registry = StyleRegistry::new(Box::new(styles));
        assert_eq!(registry.buffer_size(), 10);
        assert_eq!(registry.auto_scroll_timeout(), Duration::from_secs(1234));
        assert_eq!(registry.redaction(), Redaction::Replace);
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let styles = TestStyles::default();
        styles.set("auto_scroll", SettingValue::Int(0));
        let registry = StyleRegistry::new(Box::new(styles));
        assert!(registry.get(BoolSetting::AutoScroll));
    }

    #[test]
    fn test_refresh_reports_only_changed_categories() {
        let styles = TestStyles::default();
        let mut registry = StyleRegistry::new(Box::new(styles.clone()));
        assert!(registry.refresh().is_empty());

        styles.set_style(StyleKind::Info, Style::default().fg(Color::Yellow));
        let changed = registry.refresh();
        assert_eq!(changed, HashSet::from([StyleKind::Info]));
        assert_eq!(registry.style(StyleKind::Info).fg, Some(Color::Yellow));

        styles.set_style(
            StyleKind::Info,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
        assert_eq!(registry.refresh(), HashSet::from([StyleKind::Info]));
    }

    #[test]
    fn test_redaction_from_mode() {
        assert_eq!(Redaction::from_mode(-1), Redaction::Replace);
        assert_eq!(Redaction::from_mode(0), Redaction::Strike);
        assert_eq!(Redaction::from_mode(20), Redaction::Shorten(20));
    }
}
