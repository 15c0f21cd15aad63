use crate::app::state::{AppState, ConnectionStatus};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let bg = Style::default().bg(Theme::BG_ELEVATED);
    let accent = bg.fg(Theme::ACCENT_TEAL).add_modifier(Modifier::BOLD);
    let separator = Span::styled(" │ ", bg.fg(Theme::BORDER_DIM));

    let connection = match state.connection {
        ConnectionStatus::Connected => Span::styled("live", bg.fg(Theme::ACCENT_TEAL)),
        ConnectionStatus::Connecting => Span::styled("connecting…", bg.fg(Theme::ACCENT_AMBER)),
        ConnectionStatus::Disconnected => Span::styled("offline", bg.fg(Theme::ACCENT_ROSE)),
    };

    let line = Line::from(vec![
        Span::styled(" # ", accent),
        Span::styled(state.stream(), accent),
        separator.clone(),
        connection,
        separator,
        Span::styled(
            "/help for commands",
            bg.fg(Theme::TEXT_SECONDARY).add_modifier(Modifier::ITALIC),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).style(bg), area);
}
