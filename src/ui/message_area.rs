//! The chat pane on screen.
//!
//! Lines are wrapped here rather than by `Paragraph`, so that a screen cell
//! can be mapped back to a document line and display column for mouse
//! hit-testing.

use crate::app::state::AppState;
use crate::pane::document::Line as DocLine;
use crate::pane::ChannelTextPane;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use unicode_width::UnicodeWidthChar;

/// One screen row of a wrapped document line.
#[derive(Debug)]
pub struct Row {
    /// Document line index.
    pub line: usize,
    /// Display column of the line where this row starts.
    pub start: usize,
    pub spans: Vec<Span<'static>>,
}

/// Break a document line into rows of at most `width` cells.
pub fn wrap_line(index: usize, line: &DocLine, width: usize) -> Vec<Row> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = Row {
        line: index,
        start: 0,
        spans: Vec::new(),
    };
    let mut row_width = 0;
    let mut column = 0;

    for run in line.runs() {
        let mut piece = String::new();
        for c in run.text.chars() {
            let w = c.width().unwrap_or(0);
            if row_width + w > width && row_width > 0 {
                if !piece.is_empty() {
                    row.spans
                        .push(Span::styled(std::mem::take(&mut piece), run.style()));
                }
                rows.push(std::mem::replace(
                    &mut row,
                    Row {
                        line: index,
                        start: column,
                        spans: Vec::new(),
                    },
                ));
                row_width = 0;
            }
            piece.push(c);
            row_width += w;
            column += w;
        }
        if !piece.is_empty() {
            row.spans.push(Span::styled(piece, run.style()));
        }
    }
    rows.push(row);
    rows
}

/// Rows visible in an area of `width` x `height`, top to bottom. The newest
/// shown line is the one `scroll_offset` lines above the tail.
pub fn visible_rows(pane: &ChannelTextPane, width: usize, height: usize) -> Vec<Row> {
    let doc = pane.document();
    let Some(bottom) = doc.len().checked_sub(1 + pane.scroll_offset()) else {
        return Vec::new();
    };

    let mut rows: Vec<Row> = Vec::new();
    for index in (0..=bottom).rev() {
        if rows.len() >= height {
            break;
        }
        let Some(line) = doc.line(index) else {
            continue;
        };
        let mut wrapped = wrap_line(index, line, width);
        wrapped.append(&mut rows);
        rows = wrapped;
    }
    let skip = rows.len().saturating_sub(height);
    rows.split_off(skip)
}

/// Document line and display column under the screen cell `(x, y)` of the
/// text area `area`.
pub fn hit_test(pane: &ChannelTextPane, area: Rect, x: u16, y: u16) -> Option<(usize, usize)> {
    if !area.contains(Position::new(x, y)) {
        return None;
    }
    let rows = visible_rows(pane, area.width as usize, area.height as usize);
    let row = rows.get((y - area.y) as usize)?;
    Some((row.line, row.start + (x - area.x) as usize))
}

/// Text area inside the border, one column kept free for the scrollbar.
pub fn text_area(area: Rect) -> Rect {
    let inner = block(false).inner(area);
    Rect {
        width: inner.width.saturating_sub(1),
        ..inner
    }
}

fn block(paused: bool) -> Block<'static> {
    let title = if paused { " Chat [paused] " } else { " Chat " };
    Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border())
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let pane = &state.pane;
    let mut block = block(pane.is_paused());
    if let Some(bg) = pane.styles().background() {
        block = block.style(Style::default().bg(bg));
    }
    let text = text_area(area);
    state.message_viewport.set(text);
    frame.render_widget(block, area);

    let rows = visible_rows(pane, text.width as usize, text.height as usize);
    let lines: Vec<Line> = rows.into_iter().map(|row| Line::from(row.spans)).collect();
    frame.render_widget(Paragraph::new(lines), text);

    // Scrollbar
    let total = pane.document().len();
    if total > 1 {
        let position = total.saturating_sub(1 + pane.scroll_offset());
        let mut scrollbar_state = ScrollbarState::new(total).position(position);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("┃")
            .track_symbol(Some("│"))
            .thumb_style(Theme::scrollbar_thumb())
            .track_style(Theme::scrollbar_track());
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}
