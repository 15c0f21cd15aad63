//! The channel text pane: a bounded chat document plus the controllers
//! that mutate it (compact batching, ban handling, search, scrolling).
//!
//! [`ChannelTextPane`] is owned by the app state and only ever touched from
//! the event loop task.

pub mod ban;
pub mod compact;
pub mod document;
pub mod scroll;
pub mod search;
pub mod specials;
pub mod style;

use crate::chat::emotes::{EmoteCatalog, EmoteDef};
use crate::chat::user::{Badge, UserRef};
use compact::{CompactMode, CompactStep};
use document::{AppendContext, Document, DocumentError, Run, RunKind};
use scroll::ScrollController;
use search::SearchEngine;
use specials::find_specials;
use std::fmt::Write as _;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use style::{BoolSetting, StyleKind, StyleRegistry, StyleSource};

pub type Clock = Rc<dyn Fn() -> Instant>;

/// Extra details of a chat message.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    /// `/me` message.
    pub action: bool,
    /// Mentions the viewer or matches a highlight rule.
    pub highlighted: bool,
    /// Twitch message id, used for single message deletion.
    pub msg_id: Option<String>,
}

/// Semantic attributes of the run under a screen position.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub text: String,
    pub user: Option<UserRef>,
    pub url: Option<String>,
    pub emote: Option<Arc<EmoteDef>>,
    pub badge: Option<Badge>,
    pub deleted: bool,
}

pub struct ChannelTextPane {
    styles: StyleRegistry,
    doc: Document,
    compact: CompactMode,
    scroll: ScrollController,
    search: SearchEngine,
    clock: Clock,
}

impl ChannelTextPane {
    pub fn new(source: Box<dyn StyleSource>) -> Self {
        Self::with_clock(source, Rc::new(Instant::now))
    }

    pub fn with_clock(source: Box<dyn StyleSource>, clock: Clock) -> Self {
        Self {
            styles: StyleRegistry::new(source),
            doc: Document::new(),
            compact: CompactMode::new(),
            scroll: ScrollController::new(),
            search: SearchEngine::new(),
            clock,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll.offset()
    }

    pub fn is_paused(&self) -> bool {
        self.scroll.is_paused()
    }

    fn now(&self) -> Instant {
        (self.clock)()
    }

    fn timestamp(&self) -> Option<Run> {
        let format = self.styles.timestamp_format()?;
        let mut text = String::new();
        if write!(text, "{} ", chrono::Local::now().format(format)).is_err() {
            tracing::warn!("Invalid timestamp format {:?}", format);
            return None;
        }
        Some(Run::new(text, StyleKind::Timestamp).with_kind(RunKind::Timestamp))
    }

    fn close_compact(&mut self) {
        if self.compact.close() {
            self.doc.end_line();
        }
    }

    /// Scroll decision after a mutation that started at `created_before`.
    fn after_print(&mut self, created_before: u64) {
        let added = (self.doc.lines_created() - created_before) as usize;
        let now = self.now();
        self.scroll.after_mutation(
            added,
            self.doc.len(),
            self.styles.get(BoolSetting::AutoScroll),
            self.styles.auto_scroll_timeout(),
            now,
        );
    }

    pub fn print_message(
        &mut self,
        user: &UserRef,
        text: &str,
        options: MessageOptions,
        emotes: &dyn EmoteCatalog,
    ) {
        self.close_compact();
        let before = self.doc.lines_created();
        let timestamp = self.timestamp();
        let spans = find_specials(text, user, emotes, self.styles.get(BoolSetting::Emoticons));

        let ctx = AppendContext {
            styles: &self.styles,
            at_tail: self.scroll.at_tail(),
        };
        if let Some(run) = timestamp {
            self.doc.append_run(run, &ctx);
        }
        if self.styles.get(BoolSetting::Usericons) {
            for badge in user.badges() {
                self.doc.append_run(
                    Run::new(badge.glyph(), StyleKind::Icon)
                        .with_kind(RunKind::Badge(badge))
                        .with_user(user),
                    &ctx,
                );
            }
        }

        let color = user.color();
        if options.action {
            self.doc.append_run(
                Run::new("* ", StyleKind::Nick).with_user(user).with_color(color),
                &ctx,
            );
        }
        self.doc.append_run(
            Run::new(user.display_nick(), StyleKind::Nick)
                .with_kind(RunKind::Nick)
                .with_user(user)
                .with_color(color),
            &ctx,
        );
        let separator = if options.action { " " } else { ": " };
        self.doc.append_run(
            Run::new(separator, StyleKind::Standard)
                .with_kind(RunKind::MessageStart {
                    msg_id: options.msg_id,
                })
                .with_user(user),
            &ctx,
        );

        let category = if options.highlighted {
            StyleKind::Highlight
        } else {
            StyleKind::Standard
        };
        let mut base = Run::new("", category).with_user(user);
        if options.action && self.styles.get(BoolSetting::ActionColored) {
            base = base.with_color(color);
        }
        self.doc.append(text, &base, &spans, &ctx);
        self.doc.end_line();
        self.after_print(before);
    }

    /// Print a system line in the given style.
    pub fn print_line(&mut self, text: &str, kind: StyleKind) {
        self.close_compact();
        let before = self.doc.lines_created();
        let timestamp = self.timestamp();
        let ctx = AppendContext {
            styles: &self.styles,
            at_tail: self.scroll.at_tail(),
        };
        if let Some(run) = timestamp {
            self.doc.append_run(run, &ctx);
        }
        self.doc.append_run(Run::new(text, kind), &ctx);
        self.doc.end_line();
        self.after_print(before);
    }

    /// Print an event such as a join or part, batched with directly
    /// preceding events of the same kind.
    pub fn print_compact(&mut self, kind: &str, user: &UserRef) {
        let before = self.doc.lines_created();
        let now = self.now();
        let step = self.compact.print(kind, now);
        let timestamp = match step {
            CompactStep::Open { .. } => self.timestamp(),
            CompactStep::Continue => None,
        };
        let ctx = AppendContext {
            styles: &self.styles,
            at_tail: self.scroll.at_tail(),
        };
        match step {
            CompactStep::Open { flush } => {
                if flush {
                    self.doc.end_line();
                }
                if let Some(run) = timestamp {
                    self.doc.append_run(run, &ctx);
                }
                self.doc
                    .append_run(Run::new(format!("{}: ", kind), StyleKind::Compact), &ctx);
            }
            CompactStep::Continue => {
                self.doc.append_run(Run::new(", ", StyleKind::Compact), &ctx);
            }
        }
        self.doc.append_run(
            Run::new(user.display_nick(), StyleKind::Compact).with_user(user),
            &ctx,
        );
        self.after_print(before);
    }

    fn redact(&mut self, index: usize) {
        let mode = self.styles.redaction();
        match self.doc.redact_line(index, mode, &self.styles) {
            Ok(_) => {}
            Err(DocumentError::NoMessage(_)) => {
                // Nothing to strike, but the line still counts as deleted.
                if let Err(e) = self.doc.mark_line_deleted(index) {
                    tracing::warn!("Could not mark line deleted: {}", e);
                }
            }
            Err(e) => tracing::warn!("Could not redact line: {}", e),
        }
    }

    /// Apply the deleted-message style to every line by `user`.
    pub fn clear_user_messages(&mut self, user: &UserRef) {
        for index in self.doc.find_lines_by_user(user) {
            self.redact(index);
        }
        self.after_print(self.doc.lines_created());
    }

    /// Handle a ban or timeout of `user` (`duration` in seconds, `None` for a
    /// permanent ban), or the deletion of one message when `target_msg_id`
    /// is given.
    pub fn user_banned(
        &mut self,
        user: &UserRef,
        duration: Option<u64>,
        reason: Option<&str>,
        target_msg_id: Option<&str>,
    ) {
        let show = self.styles.get(BoolSetting::ShowBanMessages);

        if let Some(msg_id) = target_msg_id {
            match self.doc.find_line_by_msg_id(msg_id) {
                Some(index) => {
                    self.redact(index);
                    self.after_print(self.doc.lines_created());
                }
                None => tracing::debug!("Deleted message {} is not in the buffer", msg_id),
            }
            if show {
                self.print_line(
                    &format!("{} had a message deleted", user.display_nick()),
                    StyleKind::Info,
                );
            }
            return;
        }

        self.clear_user_messages(user);
        if !show {
            return;
        }

        let now = self.now();
        if self.styles.get(BoolSetting::CombineBanMessages) {
            match ban::coalesce(&mut self.doc, user, now, &self.styles) {
                Ok(true) => {
                    self.after_print(self.doc.lines_created());
                    return;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Could not combine ban messages: {}", e),
            }
        }

        let mut text = match duration {
            Some(seconds) => format!("{} has been timed out ({}s)", user.display_nick(), seconds),
            None => format!("{} has been banned", user.display_nick()),
        };
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            let _ = write!(text, " [{}]", reason);
        }

        self.close_compact();
        let before = self.doc.lines_created();
        let timestamp = self.timestamp();
        let ctx = AppendContext {
            styles: &self.styles,
            at_tail: self.scroll.at_tail(),
        };
        if let Some(run) = timestamp {
            self.doc.append_run(run, &ctx);
        }
        self.doc.append_run(
            Run::new(text, StyleKind::Info)
                .with_kind(RunKind::BanMarker { at: now })
                .with_user(user),
            &ctx,
        );
        self.doc.end_line();
        self.after_print(before);
    }

    /// Find and highlight the next older line containing `query`.
    pub fn search(&mut self, query: &str) -> bool {
        let found = self.search.search(&mut self.doc, query, &self.styles);
        match found {
            Some(index) => {
                let now = self.now();
                self.scroll.scroll_to_line(index, self.doc.len(), now);
            }
            None => self.scroll.scroll_to_tail(),
        }
        found.is_some()
    }

    pub fn reset_search(&mut self) {
        self.search.reset(&mut self.doc, &self.styles);
    }

    /// Re-read styles and settings from the current source.
    pub fn refresh_styles(&mut self) -> usize {
        let changed = self.styles.refresh();
        self.doc.restyle(&changed, &self.styles)
    }

    pub fn set_style_source(&mut self, source: Box<dyn StyleSource>) -> usize {
        self.styles.set_source(source);
        self.refresh_styles()
    }

    pub fn clear(&mut self) {
        self.compact.close();
        self.doc.clear();
        self.search.reset(&mut self.doc, &self.styles);
        self.scroll.scroll_to_tail();
    }

    /// Deferred scroll re-check, called once per event loop tick.
    pub fn on_idle(&mut self) {
        let now = self.now();
        self.scroll.on_idle(
            self.styles.get(BoolSetting::AutoScroll),
            self.styles.auto_scroll_timeout(),
            now,
        );
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let now = self.now();
        self.scroll.user_scroll_up(lines, self.doc.len(), now);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let now = self.now();
        self.scroll.user_scroll_down(lines, now);
    }

    pub fn scroll_to_tail(&mut self) {
        self.scroll.scroll_to_tail();
    }

    pub fn toggle_scroll_pause(&mut self) -> bool {
        self.scroll.toggle_pause()
    }

    /// Attributes of the run at display `column` of line `line`.
    pub fn run_at(&self, line: usize, column: usize) -> Option<RunInfo> {
        let l = self.doc.line(line)?;
        let run = l.run_at(column)?;
        let (url, emote) = match &run.kind {
            RunKind::Url(href) => (Some(href.clone()), None),
            RunKind::Emote(emote) => (None, Some(emote.clone())),
            _ => (None, None),
        };
        let badge = match run.kind {
            RunKind::Badge(badge) => Some(badge),
            _ => None,
        };
        Some(RunInfo {
            text: run.text.clone(),
            user: run.user.clone(),
            url,
            emote,
            badge,
            deleted: l.is_deleted(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::emotes::{EmoteSource, Emoticons};
    use crate::chat::user::{same_user, User};
    use crate::pane::document::{DELETED_PLACEHOLDER, ELLIPSIS};
    use crate::pane::style::tests::TestStyles;
    use crate::pane::style::SettingValue;
    use ratatui::style::{Color, Modifier};
    use std::cell::Cell;
    use std::time::Duration;

    struct Harness {
        pane: ChannelTextPane,
        styles: TestStyles,
        time: Rc<Cell<Instant>>,
        emotes: Emoticons,
    }

    impl Harness {
        fn new() -> Self {
            let styles = TestStyles::default();
            let time = Rc::new(Cell::new(Instant::now()));
            let clock_time = time.clone();
            let pane = ChannelTextPane::with_clock(
                Box::new(styles.clone()),
                Rc::new(move || clock_time.get()),
            );
            Self {
                pane,
                styles,
                time,
                emotes: Emoticons::new(),
            }
        }

        fn set(&mut self, name: &str, value: SettingValue) {
            self.styles.set(name, value);
            self.pane.refresh_styles();
        }

        fn advance(&self, secs: u64) {
            self.time.set(self.time.get() + Duration::from_secs(secs));
        }

        fn say(&mut self, user: &UserRef, text: &str) {
            self.pane
                .print_message(user, text, MessageOptions::default(), &self.emotes);
        }

        fn texts(&self) -> Vec<String> {
            self.pane.document().lines().map(|l| l.text()).collect()
        }
    }

    fn user(name: &str) -> UserRef {
        Rc::new(User::new(name, "#chan"))
    }

    #[test]
    fn test_message_layout() {
        let mut h = Harness::new();
        let alice = user("alice");
        alice.update(|info| {
            info.display_nick = Some("Alice".into());
            info.color = Some(Color::Red);
            info.badges = vec![Badge::Moderator];
        });
        h.say(&alice, "hello");
        assert_eq!(h.texts(), vec!["@Alice: hello"]);
        let line = h.pane.document().line(0).unwrap();
        assert_eq!(line.runs()[1].style().fg, Some(Color::Red));
        assert!(line.is_by(&alice));

        h.set("usericons", SettingValue::Bool(false));
        h.say(&alice, "again");
        assert_eq!(h.texts()[1], "Alice: again");
    }

    #[test]
    fn test_action_coloring() {
        let mut h = Harness::new();
        let bob = user("bob");
        bob.update(|info| info.color = Some(Color::Green));
        let action = MessageOptions {
            action: true,
            ..Default::default()
        };
        h.pane.print_message(&bob, "waves", action.clone(), &h.emotes);
        assert_eq!(h.texts(), vec!["* bob waves"]);
        let content = h.pane.document().line(0).unwrap().runs().last().unwrap().clone();
        assert_eq!(content.style().fg, None);

        h.set("action_colored", SettingValue::Bool(true));
        h.pane.print_message(&bob, "waves", action, &h.emotes);
        let content = h.pane.document().line(1).unwrap().runs().last().unwrap().clone();
        assert_eq!(content.style().fg, Some(Color::Green));
    }

    #[test]
    fn test_emotes_and_urls_become_runs() {
        let mut h = Harness::new();
        h.emotes.received_emoticons(
            EmoteSource::Bttv,
            vec![EmoteDef::new("LUL", EmoteSource::Bttv, "https://cdn/lul")],
        );
        let carol = user("carol");
        h.say(&carol, "LUL see https://example.com");
        let info = h.pane.run_at(0, 7).unwrap();
        assert_eq!(info.emote.map(|e| e.code.clone()), Some("LUL".to_string()));
        let info = h.pane.run_at(0, 20).unwrap();
        assert_eq!(info.url.as_deref(), Some("https://example.com"));
        assert!(same_user(info.user.as_ref().unwrap(), &carol));
        assert!(!info.deleted);
    }

    #[test]
    fn test_compact_batches_of_ten() {
        let mut h = Harness::new();
        let users: Vec<UserRef> = (0..12).map(|i| user(&format!("u{}", i))).collect();
        for u in &users {
            h.pane.print_compact("JOIN", u);
        }
        let texts = h.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(
            texts[0],
            "JOIN: u0, u1, u2, u3, u4, u5, u6, u7, u8, u9"
        );
        assert_eq!(texts[1], "JOIN: u10, u11");
    }

    #[test]
    fn test_other_print_closes_compact() {
        let mut h = Harness::new();
        let dave = user("dave");
        h.pane.print_compact("JOIN", &dave);
        h.pane.print_line("Connected", StyleKind::Info);
        h.pane.print_compact("JOIN", &dave);
        assert_eq!(h.texts(), vec!["JOIN: dave", "Connected", "JOIN: dave"]);
    }

    #[test]
    fn test_ban_notices_coalesce_within_window() {
        let mut h = Harness::new();
        h.set("show_ban_messages", SettingValue::Bool(true));
        let eve = user("eve");
        h.pane.user_banned(&eve, Some(60), None, None);
        h.advance(5);
        h.pane.user_banned(&eve, Some(60), None, None);
        assert_eq!(h.texts(), vec!["eve has been timed out (60s) (2)"]);

        h.advance(11);
        h.pane.user_banned(&eve, None, Some("spam"), None);
        assert_eq!(
            h.texts(),
            vec![
                "eve has been timed out (60s) (2)",
                "eve has been banned [spam]"
            ]
        );
    }

    #[test]
    fn test_message_between_bans_prevents_coalescing() {
        let mut h = Harness::new();
        h.set("show_ban_messages", SettingValue::Bool(true));
        let eve = user("eve");
        h.pane.user_banned(&eve, Some(10), None, None);
        h.advance(2);
        h.say(&eve, "i am back");
        h.advance(1);
        h.pane.user_banned(&eve, Some(10), None, None);
        assert_eq!(h.texts().len(), 3);
        assert_eq!(h.pane.document().line(2).unwrap().ban_count(), None);
    }

    #[test]
    fn test_coalesced_ban_still_scrolls() {
        let mut h = Harness::new();
        h.set("show_ban_messages", SettingValue::Bool(true));
        h.set("auto_scroll_time", SettingValue::Int(5));
        for i in 0..20 {
            h.pane.print_line(&format!("line {}", i), StyleKind::Standard);
        }
        let eve = user("eve");
        h.pane.user_banned(&eve, Some(60), None, None);
        h.pane.on_idle();
        h.pane.scroll_up(5);
        h.advance(6);
        h.pane.user_banned(&eve, Some(60), None, None);
        assert_eq!(
            h.texts().last().unwrap(),
            "eve has been timed out (60s) (2)"
        );
        assert_eq!(h.pane.scroll_offset(), 0);
    }

    #[test]
    fn test_redaction_runs_scroll_decision() {
        let mut h = Harness::new();
        h.set("auto_scroll_time", SettingValue::Int(5));
        let eve = user("eve");
        for i in 0..10 {
            h.say(&eve, &format!("msg {}", i));
        }
        h.pane.scroll_up(3);
        h.advance(6);
        h.pane.clear_user_messages(&eve);
        assert_eq!(h.pane.scroll_offset(), 0);
    }

    #[test]
    fn test_badge_under_cursor() {
        let mut h = Harness::new();
        let judy = user("judy");
        judy.update(|info| info.badges = vec![Badge::Moderator]);
        h.say(&judy, "hi");
        let info = h.pane.run_at(0, 0).unwrap();
        assert_eq!(info.badge, Some(Badge::Moderator));
        assert!(h.pane.run_at(0, 3).unwrap().badge.is_none());
    }

    #[test]
    fn test_combine_off_prints_each_notice() {
        let mut h = Harness::new();
        h.set("show_ban_messages", SettingValue::Bool(true));
        h.set("combine_ban_messages", SettingValue::Bool(false));
        let eve = user("eve");
        h.pane.user_banned(&eve, None, None, None);
        h.pane.user_banned(&eve, None, None, None);
        assert_eq!(h.texts().len(), 2);
    }

    #[test]
    fn test_ban_redacts_without_notice_by_default() {
        let mut h = Harness::new();
        h.set("deleted_messages_mode", SettingValue::Int(-1));
        let frank = user("frank");
        let grace = user("grace");
        h.say(&frank, "bad words");
        h.say(&grace, "nice words");
        h.pane.user_banned(&frank, Some(600), None, None);
        assert_eq!(
            h.texts(),
            vec![
                format!("frank: {}", DELETED_PLACEHOLDER),
                "grace: nice words".to_string()
            ]
        );
    }

    #[test]
    fn test_redaction_modes() {
        let message = "abcdefghijklmnopqrstuvwxyz012345678";
        for (mode, expected) in [
            (-1, DELETED_PLACEHOLDER.to_string()),
            (0, message.to_string()),
            (20, format!("abcdefghijklmnopqrst{}", ELLIPSIS)),
        ] {
            let mut h = Harness::new();
            h.set("deleted_messages_mode", SettingValue::Int(mode));
            let heidi = user("heidi");
            h.say(&heidi, message);
            h.pane.user_banned(&heidi, None, None, None);
            let line = h.pane.document().line(0).unwrap();
            assert!(line.is_deleted());
            assert_eq!(line.message_text().unwrap(), expected);
            if mode >= 0 {
                let content = line.runs().last().unwrap();
                assert!(content.style().add_modifier.contains(Modifier::CROSSED_OUT));
            }
        }
    }

    #[test]
    fn test_single_message_deletion() {
        let mut h = Harness::new();
        h.set("deleted_messages_mode", SettingValue::Int(0));
        h.set("show_ban_messages", SettingValue::Bool(true));
        let ivan = user("ivan");
        for (id, text) in [("m1", "first"), ("m2", "second")] {
            let options = MessageOptions {
                msg_id: Some(id.into()),
                ..Default::default()
            };
            h.pane.print_message(&ivan, text, options, &h.emotes);
        }
        h.pane.user_banned(&ivan, None, None, Some("m1"));
        let doc = h.pane.document();
        assert!(doc.line(0).unwrap().is_deleted());
        assert!(!doc.line(1).unwrap().is_deleted());
        assert_eq!(doc.line(2).unwrap().text(), "ivan had a message deleted");
        assert!(h.pane.run_at(0, 7).unwrap().deleted);
    }

    #[test]
    fn test_search_scrolls_to_match() {
        let mut h = Harness::new();
        for i in 0..10 {
            let text = if i == 3 || i == 7 { "hello world" } else { "nothing" };
            h.pane.print_line(text, StyleKind::Standard);
        }
        assert!(h.pane.search("HELLO"));
        assert_eq!(h.pane.scroll_offset(), 2);
        assert!(h.pane.search("hello"));
        assert_eq!(h.pane.scroll_offset(), 6);
        assert!(!h.pane.search("hello"));
        assert_eq!(h.pane.scroll_offset(), 0);
    }

    #[test]
    fn test_scroll_holds_then_resumes() {
        let mut h = Harness::new();
        for i in 0..20 {
            h.pane.print_line(&format!("line {}", i), StyleKind::Standard);
        }
        h.pane.scroll_up(5);
        h.pane.print_line("new", StyleKind::Standard);
        assert_eq!(h.pane.scroll_offset(), 6);
        h.advance(31);
        h.pane.print_line("newer", StyleKind::Standard);
        assert_eq!(h.pane.scroll_offset(), 0);

        h.pane.toggle_scroll_pause();
        h.pane.print_line("paused", StyleKind::Standard);
        assert_eq!(h.pane.scroll_offset(), 1);
    }

    #[test]
    fn test_restyle_and_clear() {
        let mut h = Harness::new();
        h.pane.print_line("note", StyleKind::Info);
        h.styles
            .set_style(StyleKind::Info, ratatui::style::Style::default().fg(Color::Cyan));
        assert_eq!(h.pane.refresh_styles(), 1);
        assert_eq!(
            h.pane.document().line(0).unwrap().runs()[0].style().fg,
            Some(Color::Cyan)
        );
        h.pane.clear();
        assert!(h.pane.document().is_empty());
        assert_eq!(h.pane.scroll_offset(), 0);
    }
}
