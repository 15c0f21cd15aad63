use crate::pane::style::StyleKind;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const TEXT_PRIMARY: Color = Color::Rgb(0xd8, 0xde, 0xe9);
    pub const TEXT_SECONDARY: Color = Color::Rgb(0xa3, 0xab, 0xb8);
    pub const TEXT_MUTED: Color = Color::Rgb(0x6b, 0x72, 0x80);
    pub const ACCENT_TEAL: Color = Color::Rgb(0x5f, 0xd7, 0xaf);
    pub const ACCENT_AMBER: Color = Color::Rgb(0xff, 0xc8, 0x57);
    pub const ACCENT_ROSE: Color = Color::Rgb(0xf0, 0x71, 0x78);
    pub const ACCENT_LAVENDER: Color = Color::Rgb(0xb4, 0x8e, 0xad);
    pub const ACCENT_BLUE: Color = Color::Rgb(0x5f, 0xaf, 0xff);
    pub const BG_ELEVATED: Color = Color::Rgb(0x24, 0x28, 0x33);
    pub const BORDER_DIM: Color = Color::Rgb(0x3b, 0x42, 0x52);

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER_DIM)
    }

    pub fn border_type() -> BorderType {
        BorderType::Rounded
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input_text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BG_ELEVATED)
    }

    pub fn scrollbar_thumb() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    pub fn scrollbar_track() -> Style {
        Style::default().fg(Self::BORDER_DIM)
    }

    /// Built-in look of each chat pane text category.
    pub fn pane_style(kind: StyleKind) -> Style {
        let base = Style::default();
        match kind {
            StyleKind::Standard => base.fg(Self::TEXT_PRIMARY),
            StyleKind::Info => base.fg(Self::ACCENT_AMBER),
            StyleKind::Highlight => base.fg(Self::ACCENT_ROSE).add_modifier(Modifier::BOLD),
            StyleKind::Nick => base.fg(Self::ACCENT_TEAL).add_modifier(Modifier::BOLD),
            StyleKind::Timestamp => base.fg(Self::TEXT_MUTED),
            StyleKind::Compact => base.fg(Self::TEXT_SECONDARY),
            StyleKind::Url => base.fg(Self::ACCENT_BLUE).add_modifier(Modifier::UNDERLINED),
            StyleKind::Emote => base.fg(Self::ACCENT_LAVENDER).add_modifier(Modifier::ITALIC),
            StyleKind::Icon => base.fg(Self::ACCENT_AMBER),
            StyleKind::Deleted => base.fg(Self::TEXT_MUTED),
            StyleKind::SearchResult => base.bg(Self::BG_ELEVATED).add_modifier(Modifier::REVERSED),
        }
    }
}
