//! The bounded, append-oriented chat document.
//!
//! A [`Document`] is a queue of [`Line`]s, each an ordered list of styled
//! [`Run`]s. Text is only ever appended at the tail; older lines change only
//! through redaction, ban-counter updates, search highlighting and restyling,
//! and leave only through head eviction or [`Document::clear`].

use crate::chat::emotes::EmoteDef;
use crate::chat::user::{same_user, Badge, UserRef};
use crate::pane::specials::{SpanSet, SpecialKind};
use crate::pane::style::{Redaction, StyleKind, StyleRegistry};
use ratatui::style::{Color, Modifier, Style};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

/// Replacement text for fully redacted messages.
pub const DELETED_PLACEHOLDER: &str = "<message deleted>";
/// Appended to shortened redacted messages.
pub const ELLIPSIS: &str = "[..]";

/// Chat lines place the author early (timestamp, badges, nick), so only
/// this many leading runs are checked when attributing a line to a user.
const USER_SCAN_DEPTH: usize = 12;

#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("line {index} does not exist (document has {len} lines)")]
    NoSuchLine { index: usize, len: usize },
    #[error("line {0} has no message content")]
    NoMessage(usize),
}

#[derive(Debug, Clone)]
pub enum RunKind {
    Text,
    Timestamp,
    Badge(Badge),
    Nick,
    /// Separator right after the nick; everything after it is message content.
    MessageStart { msg_id: Option<String> },
    /// First run of a ban/timeout notice.
    BanMarker { at: Instant },
    /// Trailing `(N)` counter of a coalesced ban notice.
    BanCount(u32),
    Url(String),
    /// One emote occurrence. Adjacent identical emotes are separate runs.
    Emote(Arc<EmoteDef>),
}

#[derive(Debug, Clone)]
pub struct Run {
    pub text: String,
    pub kind: RunKind,
    pub category: StyleKind,
    pub user: Option<UserRef>,
    pub color: Option<Color>,
    pub struck: bool,
    pub highlighted: bool,
    style: Style,
}

impl Run {
    pub fn new(text: impl Into<String>, category: StyleKind) -> Self {
        Self {
            text: text.into(),
            kind: RunKind::Text,
            category,
            user: None,
            color: None,
            struck: false,
            highlighted: false,
            style: Style::default(),
        }
    }

    pub fn with_kind(mut self, kind: RunKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_user(mut self, user: &UserRef) -> Self {
        self.user = Some(user.clone());
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// A plain run with the same attributes and different text.
    fn derive(&self, text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: RunKind::Text,
            ..self.clone()
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }

    fn resolve(&mut self, styles: &StyleRegistry) {
        let mut style = styles.style(self.category);
        if let Some(color) = self.color {
            style = style.fg(color);
        }
        if self.struck {
            style = style
                .patch(styles.style(StyleKind::Deleted))
                .add_modifier(Modifier::CROSSED_OUT);
        }
        if self.highlighted {
            style = style.patch(styles.style(StyleKind::SearchResult));
        }
        self.style = style;
    }

    fn affected_by(&self, changed: &HashSet<StyleKind>) -> bool {
        changed.contains(&self.category)
            || (self.struck && changed.contains(&StyleKind::Deleted))
            || (self.highlighted && changed.contains(&StyleKind::SearchResult))
    }
}

#[derive(Debug, Clone)]
pub struct Line {
    id: u64,
    runs: Vec<Run>,
    deleted: bool,
}

impl Line {
    fn new(id: u64) -> Self {
        Self {
            id,
            runs: Vec::new(),
            deleted: false,
        }
    }

    /// Stable identity of the line, unaffected by eviction of older lines.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Index of the message boundary run, if this is a chat message line.
    pub fn message_start(&self) -> Option<usize> {
        self.runs
            .iter()
            .take(USER_SCAN_DEPTH)
            .position(|r| matches!(r.kind, RunKind::MessageStart { .. }))
    }

    /// The author of this chat message line.
    pub fn author(&self) -> Option<&UserRef> {
        self.message_start()
            .and_then(|i| self.runs[i].user.as_ref())
    }

    pub fn is_by(&self, user: &UserRef) -> bool {
        self.author().is_some_and(|author| same_user(author, user))
    }

    pub fn msg_id(&self) -> Option<&str> {
        let run = &self.runs[self.message_start()?];
        match &run.kind {
            RunKind::MessageStart { msg_id } => msg_id.as_deref(),
            _ => None,
        }
    }

    /// The ban marker, if this line is a ban notice. The marker sits on the
    /// first run after the timestamp.
    pub fn ban_marker(&self) -> Option<(&UserRef, Instant)> {
        let first = self
            .runs
            .iter()
            .find(|r| !matches!(r.kind, RunKind::Timestamp))?;
        match (&first.kind, &first.user) {
            (RunKind::BanMarker { at }, Some(user)) => Some((user, *at)),
            _ => None,
        }
    }

    pub fn ban_count(&self) -> Option<u32> {
        match self.runs.last()?.kind {
            RunKind::BanCount(n) => Some(n),
            _ => None,
        }
    }

    /// Message content as plain text (everything after the boundary run).
    #[cfg(test)]
    pub fn message_text(&self) -> Option<String> {
        let start = self.message_start()? + 1;
        Some(self.runs[start..].iter().map(|r| r.text.as_str()).collect())
    }

    /// The run covering display column `column`.
    pub fn run_at(&self, column: usize) -> Option<&Run> {
        let mut x = 0;
        for run in &self.runs {
            let w = run.width();
            if column < x + w {
                return Some(run);
            }
            x += w;
        }
        None
    }
}

/// What appending needs to know about the rest of the pane.
pub struct AppendContext<'a> {
    pub styles: &'a StyleRegistry,
    /// Whether the view currently shows the newest line.
    pub at_tail: bool,
}

/// Whether a new line should trigger eviction. At the tail the buffer is
/// trimmed early, at three quarters of capacity.
pub fn should_evict(line_count: usize, buffer_size: usize, at_tail: bool) -> bool {
    line_count > buffer_size || (at_tail && line_count * 4 > buffer_size * 3)
}

/// Lines removed per eviction trigger.
pub const EVICT_STEP: usize = 2;

#[derive(Debug, Default)]
pub struct Document {
    lines: VecDeque<Line>,
    next_id: u64,
    line_open: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &Line> + ExactSizeIterator {
        self.lines.iter()
    }

    /// Current index of the line with the given id, if it is still present.
    pub fn position_of(&self, id: u64) -> Option<usize> {
        let first = self.lines.front()?.id;
        let index = id.checked_sub(first)? as usize;
        self.lines
            .get(index)
            .filter(|line| line.id == id)
            .map(|_| index)
    }

    /// Number of lines ever started, including evicted ones.
    pub fn lines_created(&self) -> u64 {
        self.next_id
    }

    fn ensure_open_line(&mut self, ctx: &AppendContext) {
        if self.line_open {
            return;
        }
        if should_evict(self.lines.len(), ctx.styles.buffer_size(), ctx.at_tail) {
            self.evict_oldest(EVICT_STEP);
        }
        self.lines.push_back(Line::new(self.next_id));
        self.next_id += 1;
        self.line_open = true;
    }

    /// Append a single run at the tail, starting a new line if the previous
    /// one was ended.
    pub fn append_run(&mut self, mut run: Run, ctx: &AppendContext) {
        self.ensure_open_line(ctx);
        run.resolve(ctx.styles);
        if let Some(line) = self.lines.back_mut() {
            line.runs.push(run);
        }
    }

    /// Append `text`, split into runs at the special spans. Text between
    /// spans takes the attributes of `base`.
    pub fn append(&mut self, text: &str, base: &Run, spans: &SpanSet, ctx: &AppendContext) {
        let mut pos = 0;
        for (start, special) in spans.iter() {
            let end = special.end;
            if start < pos
                || end > text.len()
                || !text.is_char_boundary(start)
                || !text.is_char_boundary(end)
            {
                tracing::warn!("Skipping invalid span {}..{} in {:?}", start, end, text);
                continue;
            }
            if start > pos {
                self.append_run(base.derive(&text[pos..start]), ctx);
            }
            let run = match &special.kind {
                SpecialKind::Url(href) => {
                    let mut run = base.derive(&text[start..end]).with_kind(RunKind::Url(href.clone()));
                    run.category = StyleKind::Url;
                    run.color = None;
                    run
                }
                SpecialKind::Emote(emote) => {
                    let mut run = base
                        .derive(&text[start..end])
                        .with_kind(RunKind::Emote(emote.clone()));
                    run.category = StyleKind::Emote;
                    run.color = None;
                    run
                }
            };
            self.append_run(run, ctx);
            pos = end;
        }
        if pos < text.len() || text.is_empty() {
            self.append_run(base.derive(&text[pos..]), ctx);
        }
    }

    /// End the current line; the next append starts a new one.
    pub fn end_line(&mut self) {
        self.line_open = false;
    }

    /// Remove the `n` oldest lines.
    pub fn evict_oldest(&mut self, n: usize) {
        let n = n.min(self.lines.len());
        self.lines.drain(..n);
        if self.lines.is_empty() {
            self.line_open = false;
        }
        tracing::trace!("Evicted {} lines, {} remain", n, self.lines.len());
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.line_open = false;
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut Line, DocumentError> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(DocumentError::NoSuchLine { index, len })
    }

    pub fn mark_line_deleted(&mut self, index: usize) -> Result<(), DocumentError> {
        self.line_mut(index)?.deleted = true;
        Ok(())
    }

    /// Apply a redaction to the message content of a line. Returns `false`
    /// if the line had already been deleted.
    pub fn redact_line(
        &mut self,
        index: usize,
        mode: Redaction,
        styles: &StyleRegistry,
    ) -> Result<bool, DocumentError> {
        let line = self.line_mut(index)?;
        if line.deleted {
            return Ok(false);
        }
        let start = line.message_start().ok_or(DocumentError::NoMessage(index))? + 1;

        match mode {
            Redaction::Replace => {
                line.runs.truncate(start);
                let mut placeholder = Run::new(DELETED_PLACEHOLDER, StyleKind::Deleted);
                placeholder.user = line.runs[start - 1].user.clone();
                line.runs.push(placeholder);
            }
            Redaction::Strike => {
                strike(&mut line.runs[start..]);
            }
            Redaction::Shorten(max) => {
                shorten(&mut line.runs, start, max);
                strike(&mut line.runs[start..]);
            }
        }
        line.deleted = true;
        for run in &mut line.runs[start..] {
            run.resolve(styles);
        }
        Ok(true)
    }

    /// Indices of the chat lines written by `user`, oldest first.
    pub fn find_lines_by_user(&self, user: &UserRef) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_by(user))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn find_line_by_msg_id(&self, msg_id: &str) -> Option<usize> {
        self.lines
            .iter()
            .rposition(|line| line.msg_id() == Some(msg_id))
    }

    /// Set the trailing `(N)` counter of a ban notice, replacing an existing
    /// counter in place.
    pub fn set_ban_count(
        &mut self,
        index: usize,
        count: u32,
        styles: &StyleRegistry,
    ) -> Result<(), DocumentError> {
        let line = self.line_mut(index)?;
        let mut run = Run::new(format!(" ({})", count), StyleKind::Info)
            .with_kind(RunKind::BanCount(count));
        run.resolve(styles);
        if line.ban_count().is_some() {
            line.runs.pop();
        }
        line.runs.push(run);
        Ok(())
    }

    pub fn highlight_line(&mut self, index: usize, styles: &StyleRegistry) -> Result<(), DocumentError> {
        let line = self.line_mut(index)?;
        for run in &mut line.runs {
            run.highlighted = true;
            run.resolve(styles);
        }
        Ok(())
    }

    pub fn clear_highlights(&mut self, styles: &StyleRegistry) {
        for line in &mut self.lines {
            for run in line.runs.iter_mut().filter(|r| r.highlighted) {
                run.highlighted = false;
                run.resolve(styles);
            }
        }
    }

    /// Re-resolve the style of every run touched by a changed category.
    /// Returns the number of runs updated.
    pub fn restyle(&mut self, changed: &HashSet<StyleKind>, styles: &StyleRegistry) -> usize {
        if changed.is_empty() {
            return 0;
        }
        let mut updated = 0;
        for line in &mut self.lines {
            for run in line.runs.iter_mut().filter(|r| r.affected_by(changed)) {
                run.resolve(styles);
                updated += 1;
            }
        }
        updated
    }
}

fn strike(runs: &mut [Run]) {
    for run in runs {
        run.struck = true;
    }
}

/// Cut the content starting at run `start` down to `max` characters and add
/// the ellipsis marker. Content that already fits is left alone.
fn shorten(runs: &mut Vec<Run>, start: usize, max: usize) {
    let total: usize = runs[start..].iter().map(|r| r.text.chars().count()).sum();
    if total <= max {
        return;
    }
    let mut remaining = max;
    let mut keep = start;
    for run in &mut runs[start..] {
        let count = run.text.chars().count();
        if count <= remaining {
            remaining -= count;
            keep += 1;
            continue;
        }
        if remaining > 0 {
            run.text = run.text.chars().take(remaining).collect();
            if !matches!(run.kind, RunKind::Text) {
                run.kind = RunKind::Text;
                run.category = StyleKind::Standard;
            }
            keep += 1;
        }
        break;
    }
    let user = runs[start - 1].user.clone();
    runs.truncate(keep);
    let mut ellipsis = Run::new(ELLIPSIS, StyleKind::Standard);
    ellipsis.user = user;
    runs.push(ellipsis);
}
