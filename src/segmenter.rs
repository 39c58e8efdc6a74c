//! Selection segmentation: turn an arbitrary text selection into an
//! ordered, deduplicated sequence of meaningful content blocks.
//!
//! Selections spanning multiple semantic blocks are read block-by-block so
//! highlighting can track progress; the ancestor search is capped so a
//! stray anchor never absorbs unrelated page chrome into a container.

use crate::dom::{PageDocument, SelectionRange};
use once_cell::sync::Lazy;
use ego_tree::NodeId;
use std::collections::HashSet;
use tracing::debug;

/// Block-level tags considered natural units of readable content.
static MEANINGFUL_CONTAINERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td", "th", "blockquote", "pre", "div",
    ]
    .into_iter()
    .collect()
});

/// How many ancestor levels to inspect when resolving an anchor's container.
const ANCESTOR_SEARCH_LEVELS: usize = 3;

/// One segmented element scheduled for sequential playback. Holds only a
/// node id; trimmed text is re-resolved from the document at use time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadableUnit {
    id: NodeId,
}

impl ReadableUnit {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn trimmed_text(&self, doc: &PageDocument) -> Option<String> {
        doc.trimmed_text(self.id)
    }
}

/// Compute the ordered readable units covered by a selection.
pub fn segment(doc: &PageDocument, range: &SelectionRange) -> Vec<ReadableUnit> {
    if range.trimmed_text().is_empty() {
        return Vec::new();
    }

    let start_container = find_meaningful_parent(doc, range.start());
    let end_container = find_meaningful_parent(doc, range.end());

    let mut collected: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut push_unique = |id: NodeId, collected: &mut Vec<NodeId>| {
        if seen.insert(id) {
            collected.push(id);
        }
    };

    if start_container == end_container {
        if let Some(id) = start_container {
            push_unique(id, &mut collected);
        }
    } else {
        if let (Some(start), Some(end)) = (start_container, end_container) {
            if let Some(root) = doc.common_ancestor(start, end) {
                for candidate in doc.descendant_elements(root) {
                    if !doc.intersects(candidate, range) {
                        continue;
                    }
                    let meaningful = doc
                        .tag(candidate)
                        .map(|tag| MEANINGFUL_CONTAINERS.contains(tag))
                        .unwrap_or(false);
                    if !meaningful {
                        continue;
                    }
                    if has_text(doc, candidate) {
                        push_unique(candidate, &mut collected);
                    }
                }
            }
        }

        // No meaningful container between the anchors; fall back to the
        // anchor containers themselves.
        if collected.is_empty() {
            if let Some(id) = start_container {
                push_unique(id, &mut collected);
            }
            if let Some(id) = end_container {
                push_unique(id, &mut collected);
            }
        }
    }

    let mut units: Vec<NodeId> = collected
        .into_iter()
        .filter(|id| has_text(doc, *id))
        .collect();
    units.sort_by_key(|id| doc.position(*id).unwrap_or(usize::MAX));

    debug!(unit_count = units.len(), "Segmented selection");
    units.into_iter().map(|id| ReadableUnit { id }).collect()
}

fn has_text(doc: &PageDocument, id: NodeId) -> bool {
    doc.trimmed_text(id)
        .map(|text| !text.is_empty())
        .unwrap_or(false)
}

/// Walk up from an anchor, at most [`ANCESTOR_SEARCH_LEVELS`] levels,
/// looking for the nearest meaningful container. Falls back to the anchor's
/// immediate parent element (or the anchor itself when it is an element).
fn find_meaningful_parent(doc: &PageDocument, anchor: NodeId) -> Option<NodeId> {
    let node = doc.node(anchor)?;
    let origin = if node.value().is_element() {
        node
    } else {
        node.parent()?
    };

    let mut current = Some(origin);
    for _ in 0..ANCESTOR_SEARCH_LEVELS {
        let Some(candidate) = current else { break };
        let meaningful = candidate
            .value()
            .as_element()
            .map(|el| MEANINGFUL_CONTAINERS.contains(el.name()))
            .unwrap_or(false);
        if meaningful {
            return Some(candidate.id());
        }
        current = candidate.parent();
    }

    Some(origin.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PageDocument;

    fn range(doc: &PageDocument, from: &str, to: &str) -> SelectionRange {
        let a = doc.find_text(from).expect("start anchor");
        let b = doc.find_text(to).expect("end anchor");
        SelectionRange::between(doc, a, b)
    }

    #[test]
    fn selection_inside_one_container_yields_that_unit() {
        let doc = PageDocument::parse("<p id=\"only\">Hello world.</p>");
        let range = range(&doc, "Hello", "world");
        let units = segment(&doc, &range);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id(), doc.select_first("#only").expect("p"));
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let doc = PageDocument::parse("<p>   </p>");
        let a = doc.find_text(" ").expect("whitespace text");
        let range = SelectionRange::between(&doc, a, a);
        assert!(segment(&doc, &range).is_empty());
    }

    #[test]
    fn spanning_selection_is_ordered_by_document_position() {
        let doc = PageDocument::parse(
            "<div><p id=\"a\">First paragraph.</p>\
             <p id=\"b\">Second paragraph.</p>\
             <p id=\"c\">Third paragraph.</p></div>",
        );
        let range = range(&doc, "First", "Third");
        let units = segment(&doc, &range);

        let ids: Vec<_> = units.iter().map(|u| u.id()).collect();
        let expected = vec![
            doc.select_first("#a").expect("a"),
            doc.select_first("#b").expect("b"),
            doc.select_first("#c").expect("c"),
        ];
        assert_eq!(ids, expected);
    }

    #[test]
    fn reversed_anchor_order_still_reads_forward() {
        let doc = PageDocument::parse(
            "<div><p id=\"a\">First paragraph.</p><p id=\"b\">Second paragraph.</p></div>",
        );
        let range = range(&doc, "Second", "First");
        let units = segment(&doc, &range);
        let ids: Vec<_> = units.iter().map(|u| u.id()).collect();
        assert_eq!(
            ids,
            vec![
                doc.select_first("#a").expect("a"),
                doc.select_first("#b").expect("b"),
            ]
        );
    }

    #[test]
    fn units_never_have_empty_text() {
        let doc = PageDocument::parse(
            "<div><p id=\"a\">Readable.</p><p id=\"empty\">   </p><p id=\"b\">Also readable.</p></div>",
        );
        let range = range(&doc, "Readable", "Also");
        for unit in segment(&doc, &range) {
            let text = unit.trimmed_text(&doc).expect("attached element");
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn anchor_walks_up_to_nearest_meaningful_container() {
        // Anchor text sits inside <em><span>, two inline levels below the <p>.
        let doc =
            PageDocument::parse("<p id=\"p\"><em><span>Deeply nested words.</span></em></p>");
        let range = range(&doc, "Deeply", "words");
        let units = segment(&doc, &range);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id(), doc.select_first("#p").expect("p"));
    }

    #[test]
    fn anchor_deeper_than_search_limit_falls_back_to_parent() {
        // Four inline levels between the text and the <p>; the walk gives up
        // and keeps the immediate parent.
        let doc = PageDocument::parse(
            "<p><em><span><b><i>Too deep to resolve.</i></b></span></em></p>",
        );
        let range = range(&doc, "Too", "resolve");
        let units = segment(&doc, &range);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id(), doc.select_first("i").expect("i"));
    }

    #[test]
    fn selection_across_list_items_collects_each_item() {
        let doc = PageDocument::parse(
            "<ul><li id=\"one\">One.</li><li id=\"two\">Two.</li><li id=\"three\">Three.</li></ul>",
        );
        let range = range(&doc, "One", "Three");
        let ids: Vec<_> = segment(&doc, &range).iter().map(|u| u.id()).collect();
        assert_eq!(
            ids,
            vec![
                doc.select_first("#one").expect("one"),
                doc.select_first("#two").expect("two"),
                doc.select_first("#three").expect("three"),
            ]
        );
    }

    #[test]
    fn duplicate_containers_appear_once() {
        let doc = PageDocument::parse("<p id=\"p\">Alpha beta gamma.</p>");
        let range = range(&doc, "Alpha", "gamma");
        assert_eq!(segment(&doc, &range).len(), 1);
    }
}
