//! Viewport position and the auto-follow decision.
//!
//! The offset counts lines above the newest one, so `0` means the view is
//! at the tail. Appends while scrolled up grow the offset to keep the same
//! lines on screen.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct ScrollController {
    offset: usize,
    last_user_scroll: Option<Instant>,
    paused: bool,
    recheck: bool,
}

impl ScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn at_tail(&self) -> bool {
        self.offset == 0
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Whether the view should jump to the tail after a mutation.
    pub fn should_follow(&self, auto_scroll: bool, timeout: Duration, now: Instant) -> bool {
        if !auto_scroll || self.paused {
            return false;
        }
        self.at_tail()
            || self
                .last_user_scroll
                .map_or(true, |t| now.saturating_duration_since(t) > timeout)
    }

    /// Scroll decision after `added` new lines were appended. A follow is
    /// checked again on the next idle tick.
    pub fn after_mutation(
        &mut self,
        added: usize,
        line_count: usize,
        auto_scroll: bool,
        timeout: Duration,
        now: Instant,
    ) {
        if self.should_follow(auto_scroll, timeout, now) {
            self.offset = 0;
            self.recheck = true;
        } else {
            self.offset += added;
            self.clamp(line_count);
        }
    }

    /// Deferred second half of [`after_mutation`](Self::after_mutation).
    pub fn on_idle(&mut self, auto_scroll: bool, timeout: Duration, now: Instant) {
        if !self.recheck {
            return;
        }
        self.recheck = false;
        if self.should_follow(auto_scroll, timeout, now) {
            self.offset = 0;
        }
    }

    pub fn user_scroll_up(&mut self, lines: usize, line_count: usize, now: Instant) {
        self.offset += lines;
        self.clamp(line_count);
        self.last_user_scroll = Some(now);
    }

    pub fn user_scroll_down(&mut self, lines: usize, now: Instant) {
        self.offset = self.offset.saturating_sub(lines);
        self.last_user_scroll = Some(now);
    }

    pub fn scroll_to_tail(&mut self) {
        self.offset = 0;
    }

    /// Put the line at `index` at the bottom of the view. Counts as a user
    /// scroll, so auto-follow leaves it in place for a while.
    pub fn scroll_to_line(&mut self, index: usize, line_count: usize, now: Instant) {
        self.offset = line_count.saturating_sub(index + 1);
        self.last_user_scroll = Some(now);
    }

    pub fn clamp(&mut self, line_count: usize) {
        self.offset = self.offset.min(line_count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_follows_at_tail() {
        let mut scroll = ScrollController::new();
        let now = Instant::now();
        scroll.after_mutation(1, 10, true, TIMEOUT, now);
        assert!(scroll.at_tail());
    }

    #[test]
    fn test_recent_user_scroll_holds_position() {
        let mut scroll = ScrollController::new();
        let now = Instant::now();
        scroll.user_scroll_up(5, 100, now);
        scroll.after_mutation(2, 102, true, TIMEOUT, now + Duration::from_secs(10));
        assert_eq!(scroll.offset(), 7);
        scroll.after_mutation(1, 103, true, TIMEOUT, now + Duration::from_secs(31));
        assert!(scroll.at_tail());
    }

    #[test]
    fn test_auto_scroll_off_and_pause() {
        let mut scroll = ScrollController::new();
        let now = Instant::now();
        scroll.user_scroll_up(3, 100, now);
        scroll.after_mutation(1, 101, false, TIMEOUT, now + Duration::from_secs(60));
        assert_eq!(scroll.offset(), 4);

        let mut paused = ScrollController::new();
        assert!(paused.toggle_pause());
        assert!(!paused.should_follow(true, TIMEOUT, now));
        assert!(!paused.toggle_pause());
        assert!(paused.should_follow(true, TIMEOUT, now));
    }

    #[test]
    fn test_idle_recheck_runs_once() {
        let mut scroll = ScrollController::new();
        let now = Instant::now();
        scroll.after_mutation(1, 10, true, TIMEOUT, now);
        scroll.user_scroll_up(2, 10, now);
        scroll.on_idle(true, TIMEOUT, now);
        // The user scrolled between the append and the idle tick.
        assert_eq!(scroll.offset(), 2);
        scroll.on_idle(true, TIMEOUT, now + Duration::from_secs(60));
        assert_eq!(scroll.offset(), 2);
    }

    #[test]
    fn test_scroll_to_line_and_clamp() {
        let mut scroll = ScrollController::new();
        scroll.scroll_to_line(3, 10, Instant::now());
        assert_eq!(scroll.offset(), 6);
        scroll.clamp(4);
        assert_eq!(scroll.offset(), 3);
        scroll.user_scroll_down(10, Instant::now());
        assert!(scroll.at_tail());
    }
}
