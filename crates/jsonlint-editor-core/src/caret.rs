//! Caret coordinate translation.
//!
//! The surface is rebuilt from scratch on every pass, so a caret can not be
//! kept as a reference to a node. Instead it is kept as a char offset into
//! the logical text and translated to and from a `(node, offset)` point in
//! whatever tree is currently rendered.
//!
//! Counting rules, shared by both directions:
//! - a text node counts its chars
//! - an opaque node (e.g. a fold indicator) counts zero, including its
//!   descendants
//! - a block node followed by a sibling counts one extra char, the `\n`
//!   between two lines

use std::iter::successors;

/// A node in a rendered tree, as seen by the caret translator.
///
/// Implemented for browser DOM nodes and for the in-crate
/// [`MarkupTree`](crate::markup::MarkupTree).
pub trait CaretNode: Clone + PartialEq {
    fn parent(&self) -> Option<Self>;
    fn first_child(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;
    fn previous_sibling(&self) -> Option<Self>;

    /// Text of a text node, `None` for elements.
    fn text(&self) -> Option<String>;

    /// Length of a text node in chars.
    fn text_len(&self) -> usize {
        self.text().map(|t| t.chars().count()).unwrap_or(0)
    }

    /// Line containers.
    fn is_block(&self) -> bool;

    /// Nodes whose content is not part of the text.
    fn is_opaque(&self) -> bool;
}

/// A position in a rendered tree.
///
/// For text nodes `offset` is a char offset into the text. For elements it
/// is a child index, as in the DOM selection model.
#[derive(Debug, Clone, PartialEq)]
pub struct CaretPoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> CaretPoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

fn children<N: CaretNode>(node: &N) -> impl Iterator<Item = N> {
    successors(node.first_child(), |n| n.next_sibling())
}

/// Chars contributed by `node` and everything below it.
pub fn full_len<N: CaretNode>(node: &N) -> usize {
    if node.is_opaque() {
        return 0;
    }
    if node.text().is_some() {
        return node.text_len();
    }
    children(node).map(|child| span_len(&child)).sum()
}

/// Chars contributed by `node` within its parent, line separator included.
fn span_len<N: CaretNode>(node: &N) -> usize {
    let separator = usize::from(node.is_block() && node.next_sibling().is_some());
    full_len(node) + separator
}

/// The text the tree represents, following the counting rules.
pub fn collect_text<N: CaretNode>(root: &N) -> String {
    let mut out = String::new();
    push_text(root, &mut out);
    out
}

fn push_text<N: CaretNode>(node: &N, out: &mut String) {
    if node.is_opaque() {
        return;
    }
    if let Some(text) = node.text() {
        out.push_str(&text);
        return;
    }
    for child in children(node) {
        push_text(&child, out);
        if child.is_block() && child.next_sibling().is_some() {
            out.push('\n');
        }
    }
}

/// Logical offset of a point, or `None` when the point is outside `root`.
pub fn get_position<N: CaretNode>(root: &N, point: &CaretPoint<N>) -> Option<usize> {
    // Path from the focus up to the root, and the outermost opaque node on it.
    let mut opaque = None;
    let mut cursor = point.node.clone();
    while cursor != *root {
        if cursor.is_opaque() {
            opaque = Some(cursor.clone());
        }
        cursor = cursor.parent()?;
    }

    let (node, mut position) = match opaque {
        // Anything inside an opaque node maps to the point just before it.
        Some(node) => (node, 0),
        None if point.node.text().is_some() => {
            let len = point.node.text_len();
            (point.node.clone(), point.offset.min(len))
        }
        None => {
            let before: usize = children(&point.node)
                .take(point.offset)
                .map(|child| span_len(&child))
                .sum();
            (point.node.clone(), before)
        }
    };

    let mut cursor = node;
    while cursor != *root {
        let mut sibling = cursor.previous_sibling();
        while let Some(prev) = sibling {
            position += span_len(&prev);
            sibling = prev.previous_sibling();
        }
        cursor = cursor.parent()?;
    }

    tracing::trace!(target: "jsonlint::caret", position, "read caret position");
    Some(position)
}

/// Point in the tree for a logical offset.
///
/// Walks the tree depth first, consuming the offset. The point lands inside
/// the text node that holds it, or on an empty line container. Offsets past
/// the end land on the last spot reached, and on the root itself when the
/// tree has nowhere to put a caret.
pub fn set_position<N: CaretNode>(root: &N, offset: usize) -> CaretPoint<N> {
    let mut seek = Seek {
        remaining: offset,
        fallback: None,
    };
    let point = match seek.visit(root) {
        Some(point) => point,
        None => seek
            .fallback
            .unwrap_or_else(|| CaretPoint::new(root.clone(), 0)),
    };
    tracing::trace!(
        target: "jsonlint::caret",
        offset,
        in_node_offset = point.offset,
        "placing caret"
    );
    point
}

struct Seek<N> {
    remaining: usize,
    fallback: Option<CaretPoint<N>>,
}

impl<N: CaretNode> Seek<N> {
    fn visit(&mut self, node: &N) -> Option<CaretPoint<N>> {
        if node.is_opaque() {
            return None;
        }

        if node.text().is_some() {
            let len = node.text_len();
            if self.remaining <= len {
                return Some(CaretPoint::new(node.clone(), self.remaining));
            }
            self.remaining -= len;
            self.fallback = Some(CaretPoint::new(node.clone(), len));
            return None;
        }

        if node.is_block() && full_len(node) == 0 {
            if self.remaining == 0 {
                return Some(CaretPoint::new(node.clone(), 0));
            }
            self.fallback = Some(CaretPoint::new(node.clone(), 0));
        }

        for child in children(node) {
            if let Some(point) = self.visit(&child) {
                return Some(point);
            }
            if child.is_block() && child.next_sibling().is_some() {
                self.remaining = self.remaining.saturating_sub(1);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::FoldState;
    use crate::highlight::highlight;
    use crate::lines::LineView;
    use crate::markup::MarkupTree;

    const DOC: &str = "{\n  \"name\": \"x\",\n\n  \"nested\": {\n    \"b\": [1, 2]\n  },\n  \"ok\": true\n}";

    fn assert_round_trip(markup: &str, text: &str) {
        let tree = MarkupTree::parse(markup);
        let root = tree.root();
        assert_eq!(collect_text(&root), text);
        for p in 0..=text.chars().count() {
            let point = set_position(&root, p);
            assert_eq!(get_position(&root, &point), Some(p), "offset {p}");
        }
    }

    #[test]
    fn test_round_trip_highlighted() {
        assert_round_trip(&highlight(DOC), DOC);
    }

    #[test]
    fn test_round_trip_empty_and_blank_lines() {
        assert_round_trip(&highlight(""), "");
        assert_round_trip(&highlight("\n\n"), "\n\n");
    }

    #[test]
    fn test_round_trip_with_folds() {
        let mut view = LineView::from_text(DOC);
        let mut folds = FoldState::new();
        folds.collapse(&mut view, 3);
        assert_round_trip(&view.to_html(), DOC);
    }

    #[test]
    fn test_empty_line_caret_lands_on_block() {
        let tree = MarkupTree::parse(&highlight("{\n\n}"));
        let root = tree.root();
        let point = set_position(&root, 2);
        assert!(point.node.is_block());
        assert_eq!(point.offset, 0);
    }

    #[test]
    fn test_past_end_lands_at_last_text() {
        let tree = MarkupTree::parse(&highlight("{}"));
        let root = tree.root();
        let point = set_position(&root, 99);
        assert_eq!(point.node.text().as_deref(), Some("}"));
        assert_eq!(point.offset, 1);
    }

    #[test]
    fn test_point_inside_opaque_maps_before_it() {
        let markup = r#"<div class="line">ab<span contenteditable="false">…}</span></div><div class="line">c</div>"#;
        let tree = MarkupTree::parse(markup);
        let root = tree.root();
        let line = root.first_child().unwrap();
        let indicator = line.first_child().unwrap().next_sibling().unwrap();
        let inner = indicator.first_child().unwrap();

        assert_eq!(get_position(&root, &CaretPoint::new(inner, 1)), Some(2));
        assert_eq!(get_position(&root, &CaretPoint::new(line.clone(), 2)), Some(2));
        assert_eq!(collect_text(&root), "ab\nc");
    }

    #[test]
    fn test_element_focus_uses_child_index() {
        let tree = MarkupTree::parse(&highlight("ab\ncd"));
        let root = tree.root();
        assert_eq!(get_position(&root, &CaretPoint::new(root.clone(), 1)), Some(3));
        assert_eq!(get_position(&root, &CaretPoint::new(root.clone(), 2)), Some(5));
    }

    #[test]
    fn test_focus_outside_root() {
        let tree = MarkupTree::parse(&highlight("ab\ncd"));
        let root = tree.root();
        let first_line = root.first_child().unwrap();
        let second_line = first_line.next_sibling().unwrap();
        assert_eq!(
            get_position(&first_line, &CaretPoint::new(second_line, 0)),
            None
        );
    }
}
