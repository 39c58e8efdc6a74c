//! Tracks which element currently carries the reading highlight.
//!
//! At most one element is highlighted at a time. The tracked id is a weak
//! back-reference into the live page; it is never dereferenced here, only
//! reported so the page surface can apply or remove the class.

use ego_tree::NodeId;

/// Class applied to the element being spoken.
pub const HIGHLIGHT_CLASS: &str = "tts-current-reading";

#[derive(Debug, Default)]
pub struct HighlightTracker {
    current: Option<NodeId>,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `id`, replacing any prior highlight.
    pub fn mark(&mut self, id: NodeId) {
        self.current = Some(id);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PageDocument;

    #[test]
    fn at_most_one_element_highlighted() {
        let doc = PageDocument::parse("<p id=\"a\">A.</p><p id=\"b\">B.</p>");
        let a = doc.select_first("#a").expect("a");
        let b = doc.select_first("#b").expect("b");

        let mut tracker = HighlightTracker::new();
        tracker.mark(a);
        tracker.mark(b);
        assert_eq!(tracker.current(), Some(b));

        tracker.clear();
        assert_eq!(tracker.current(), None);
    }
}
