//! Merging of repeated ban/timeout notices for the same user.

use crate::chat::user::{same_user, UserRef};
use crate::pane::document::{Document, DocumentError};
use crate::pane::style::StyleRegistry;
use std::time::{Duration, Instant};

/// Notices for the same user closer together than this are merged.
pub const MAX_COMBINE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanTarget {
    /// Merge into the notice at `line`, whose counter becomes `count`.
    Coalesce { line: usize, count: u32 },
    NewNotice,
}

/// Find the notice a new ban of `user` at `now` should merge into.
///
/// Scans from the newest line. A chat message from the user ends the scan,
/// since a ban after it is about new behavior.
pub fn find_target(doc: &Document, user: &UserRef, now: Instant) -> BanTarget {
    for (index, line) in doc.lines().enumerate().rev() {
        if line.is_by(user) {
            return BanTarget::NewNotice;
        }
        let Some((banned, at)) = line.ban_marker() else {
            continue;
        };
        if !same_user(banned, user) {
            continue;
        }
        if now.saturating_duration_since(at) < MAX_COMBINE_WINDOW {
            return BanTarget::Coalesce {
                line: index,
                count: line.ban_count().unwrap_or(1) + 1,
            };
        }
        // Older notices for this user are further out of the window.
        break;
    }
    BanTarget::NewNotice
}

/// Merge a new ban of `user` into a recent notice if there is one.
/// Returns `Ok(false)` when the caller has to print a new notice.
pub fn coalesce(
    doc: &mut Document,
    user: &UserRef,
    now: Instant,
    styles: &StyleRegistry,
) -> Result<bool, DocumentError> {
    match find_target(doc, user, now) {
        BanTarget::Coalesce { line, count } => {
            doc.set_ban_count(line, count, styles)?;
            tracing::debug!("Combined ban notice for {} (count {})", user.nick(), count);
            Ok(true)
        }
        BanTarget::NewNotice => Ok(false),
    }
}
