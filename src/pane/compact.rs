//! Batching of consecutive same-kind event notices (joins, parts, mod
//! changes) onto a single line.

use std::time::{Duration, Instant};

/// Entries per compact line.
pub const MAX_BATCH: usize = 10;
/// Time after which an open batch no longer accepts entries.
pub const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Open {
        kind: String,
        started_at: Instant,
        count: usize,
    },
}

/// What the caller has to write for a compact entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactStep {
    /// Start a new line with the prefix, then the entry. `flush` means a
    /// previous batch was open and its line must be ended first.
    Open { flush: bool },
    /// Write a separator, then the entry, on the current line.
    Continue,
}

#[derive(Debug)]
pub struct CompactMode {
    state: State,
}

impl Default for CompactMode {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl CompactMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    #[cfg(test)]
    pub fn current_kind(&self) -> Option<&str> {
        match &self.state {
            State::Open { kind, .. } => Some(kind),
            State::Idle => None,
        }
    }

    /// Register one entry of `kind` at `now`.
    pub fn print(&mut self, kind: &str, now: Instant) -> CompactStep {
        if let State::Open {
            kind: open_kind,
            started_at,
            count,
        } = &mut self.state
        {
            if open_kind == kind
                && *count < MAX_BATCH
                && now.saturating_duration_since(*started_at) < TIMEOUT
            {
                *count += 1;
                return CompactStep::Continue;
            }
        }
        let flush = self.is_open();
        self.state = State::Open {
            kind: kind.to_string(),
            started_at: now,
            count: 1,
        };
        CompactStep::Open { flush }
    }

    /// Close the current batch. Returns whether one was open, in which case
    /// the caller ends the line.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = State::Idle;
        was_open
    }
}
