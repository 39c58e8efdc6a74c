//! Page document model over `scraper::Html`.
//!
//! A parsed page is indexed once with pre-order position intervals so that
//! document order, subtree containment, and range intersection are cheap
//! lookups. Element references are node ids into the live tree; text is
//! always re-resolved at use time, never cached.

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet};

/// Pre-order interval of a node: `enter` is the node's own position,
/// `exit` is one past its last descendant.
#[derive(Debug, Clone, Copy)]
struct Span {
    enter: usize,
    exit: usize,
}

pub struct PageDocument {
    html: Html,
    spans: HashMap<NodeId, Span>,
}

impl PageDocument {
    pub fn parse(contents: &str) -> Self {
        let html = Html::parse_document(contents);
        let mut spans = HashMap::new();
        let mut next = 0usize;
        assign_spans(html.tree.root(), &mut next, &mut spans);
        Self { html, spans }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Document-order position; earlier nodes sort first.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.spans.get(&id).map(|span| span.enter)
    }

    fn span(&self, id: NodeId) -> Option<Span> {
        self.spans.get(&id).copied()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.value().as_element().map(|el| el.name())
    }

    /// Rendered text of an element, whitespace-collapsed and trimmed.
    /// `None` when the node is detached or not an element.
    pub fn trimmed_text(&self, id: NodeId) -> Option<String> {
        let node = self.node(id)?;
        let element = ElementRef::wrap(node)?;
        let raw: String = element.text().collect();
        Some(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Nearest ancestor shared by both nodes (either node itself when one
    /// contains the other).
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let a_node = self.node(a)?;
        let b_node = self.node(b)?;

        let mut chain = HashSet::new();
        chain.insert(a);
        for ancestor in a_node.ancestors() {
            chain.insert(ancestor.id());
        }

        if chain.contains(&b) {
            return Some(b);
        }
        for ancestor in b_node.ancestors() {
            if chain.contains(&ancestor.id()) {
                return Some(ancestor.id());
            }
        }
        None
    }

    /// All element descendants of `root` in document order, `root` excluded.
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        self.node(root)
            .map(|node| {
                node.descendants()
                    .skip(1)
                    .filter(|n| n.value().is_element())
                    .map(|n| n.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when the element's subtree overlaps the region covered by the
    /// range, endpoints included.
    pub fn intersects(&self, id: NodeId, range: &SelectionRange) -> bool {
        let (Some(el), Some(start), Some(end)) = (
            self.span(id),
            self.span(range.start),
            self.span(range.end),
        ) else {
            return false;
        };
        el.enter < end.exit && start.enter < el.exit
    }

    /// First node matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector).ok()?;
        self.html.select(&selector).next().map(|el| el.id())
    }

    /// First text node containing `needle`; used to anchor selections.
    pub fn find_text(&self, needle: &str) -> Option<NodeId> {
        self.html
            .tree
            .root()
            .descendants()
            .find(|node| {
                node.value()
                    .as_text()
                    .map(|text| text.text.contains(needle))
                    .unwrap_or(false)
            })
            .map(|node| node.id())
    }
}

fn assign_spans(node: NodeRef<'_, Node>, next: &mut usize, spans: &mut HashMap<NodeId, Span>) {
    let enter = *next;
    *next += 1;
    for child in node.children() {
        assign_spans(child, next, spans);
    }
    spans.insert(node.id(), Span { enter, exit: *next });
}

/// A platform text selection: a start/end anchor pair plus the string
/// content of the covered region. Read-only input to segmentation.
#[derive(Debug, Clone)]
pub struct SelectionRange {
    start: NodeId,
    end: NodeId,
    text: String,
}

impl SelectionRange {
    /// Build a range between two anchor nodes, in either order. The string
    /// content is the concatenation of all text nodes covered by the pair's
    /// pre-order interval.
    pub fn between(doc: &PageDocument, a: NodeId, b: NodeId) -> Self {
        let (start, end) = match (doc.position(a), doc.position(b)) {
            (Some(pa), Some(pb)) if pb < pa => (b, a),
            _ => (a, b),
        };

        let mut text = String::new();
        if let (Some(lo), Some(hi)) = (doc.span(start), doc.span(end)) {
            for node in doc.html.tree.root().descendants() {
                let Some(fragment) = node.value().as_text() else {
                    continue;
                };
                if let Some(span) = doc.span(node.id()) {
                    if span.enter >= lo.enter && span.enter < hi.exit {
                        text.push_str(&fragment.text);
                    }
                }
            }
        }

        Self { start, end, text }
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="article">
            <p id="first">Alpha block.</p>
            <p id="second">Beta <em>inline</em> block.</p>
        </div>
        <p id="outside">Gamma block.</p>
    </body></html>"#;

    #[test]
    fn positions_follow_document_order() {
        let doc = PageDocument::parse(PAGE);
        let first = doc.select_first("#first").expect("first");
        let second = doc.select_first("#second").expect("second");
        let outside = doc.select_first("#outside").expect("outside");
        assert!(doc.position(first) < doc.position(second));
        assert!(doc.position(second) < doc.position(outside));
    }

    #[test]
    fn common_ancestor_of_siblings_is_their_container() {
        let doc = PageDocument::parse(PAGE);
        let first = doc.select_first("#first").expect("first");
        let second = doc.select_first("#second").expect("second");
        let article = doc.select_first("#article").expect("article");
        assert_eq!(doc.common_ancestor(first, second), Some(article));
    }

    #[test]
    fn common_ancestor_of_nested_nodes_is_the_outer_node() {
        let doc = PageDocument::parse(PAGE);
        let second = doc.select_first("#second").expect("second");
        let inline = doc.select_first("em").expect("em");
        assert_eq!(doc.common_ancestor(inline, second), Some(second));
    }

    #[test]
    fn range_text_covers_anchors_in_either_order() {
        let doc = PageDocument::parse(PAGE);
        let alpha = doc.find_text("Alpha").expect("alpha text");
        let beta = doc.find_text("Beta").expect("beta text");

        let forward = SelectionRange::between(&doc, alpha, beta);
        let backward = SelectionRange::between(&doc, beta, alpha);
        assert!(forward.text().contains("Alpha block."));
        assert!(forward.text().contains("Beta "));
        assert_eq!(forward.text(), backward.text());
    }

    #[test]
    fn trimmed_text_collapses_whitespace() {
        let doc = PageDocument::parse("<p id=\"a\">  Hello\n   <b>world</b>. </p>");
        let p = doc.select_first("#a").expect("p");
        assert_eq!(doc.trimmed_text(p).as_deref(), Some("Hello world."));
    }

    #[test]
    fn intersection_tracks_range_bounds() {
        let doc = PageDocument::parse(PAGE);
        let alpha = doc.find_text("Alpha").expect("alpha text");
        let beta = doc.find_text("Beta").expect("beta text");
        let range = SelectionRange::between(&doc, alpha, beta);

        let first = doc.select_first("#first").expect("first");
        let outside = doc.select_first("#outside").expect("outside");
        assert!(doc.intersects(first, &range));
        assert!(!doc.intersects(outside, &range));
    }
}
