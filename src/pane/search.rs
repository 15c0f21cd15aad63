//! Backward text search with a resumable cursor.

use crate::pane::document::Document;
use crate::pane::style::StyleRegistry;

#[derive(Debug, Default)]
pub struct SearchEngine {
    /// Id of the line of the last match.
    cursor: Option<u64>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Highlight the next older line containing `query` (case-insensitive)
    /// and return its index. Repeated calls step further back; when nothing
    /// is left the cursor is cleared and `None` returned.
    pub fn search(
        &mut self,
        doc: &mut Document,
        query: &str,
        styles: &StyleRegistry,
    ) -> Option<usize> {
        if query.is_empty() || doc.is_empty() {
            return None;
        }
        doc.clear_highlights(styles);

        let start = self
            .cursor
            .and_then(|id| doc.position_of(id))
            .unwrap_or(doc.len());
        let needle = query.to_lowercase();
        let found = doc
            .lines()
            .enumerate()
            .take(start)
            .rev()
            .find(|(_, line)| line.text().to_lowercase().contains(&needle))
            .map(|(index, line)| (index, line.id()));

        match found {
            Some((index, id)) => {
                if let Err(e) = doc.highlight_line(index, styles) {
                    tracing::warn!("Search highlight failed: {}", e);
                }
                self.cursor = Some(id);
                Some(index)
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }

    pub fn reset(&mut self, doc: &mut Document, styles: &StyleRegistry) {
        self.cursor = None;
        doc.clear_highlights(styles);
    }
}
