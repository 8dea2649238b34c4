//! Browser caret: the core caret translator run over live DOM nodes.
//!
//! DOM selections count text offsets in UTF-16 code units while the session
//! counts chars, so every crossing converts at the text node.

use jsonlint_editor_core::{
    CaretNode, CaretPoint, PlatformError, Selection, char_to_utf16_offset, get_position,
    set_position, utf16_to_char_offset,
};
use wasm_bindgen::JsCast;

/// A DOM node as seen by the caret translator.
#[derive(Clone, Debug)]
pub struct DomNode(pub web_sys::Node);

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }
}

impl CaretNode for DomNode {
    fn parent(&self) -> Option<Self> {
        self.0.parent_node().map(DomNode)
    }

    fn first_child(&self) -> Option<Self> {
        self.0.first_child().map(DomNode)
    }

    fn next_sibling(&self) -> Option<Self> {
        self.0.next_sibling().map(DomNode)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.0.previous_sibling().map(DomNode)
    }

    fn text(&self) -> Option<String> {
        (self.0.node_type() == web_sys::Node::TEXT_NODE)
            .then(|| self.0.text_content().unwrap_or_default())
    }

    fn is_block(&self) -> bool {
        self.0.node_name().eq_ignore_ascii_case("div")
    }

    fn is_opaque(&self) -> bool {
        self.0
            .dyn_ref::<web_sys::Element>()
            .is_some_and(|el| el.get_attribute("contenteditable").as_deref() == Some("false"))
    }
}

/// Logical offset of a DOM boundary point inside `editor`.
///
/// `dom_offset` is in DOM units: UTF-16 code units for text nodes, a child
/// index for elements. `None` when the point is outside the editor.
pub fn dom_point_to_offset(
    editor: &web_sys::Node,
    node: &web_sys::Node,
    dom_offset: u32,
) -> Option<usize> {
    let node = DomNode(node.clone());
    let offset = match node.text() {
        Some(text) => utf16_to_char_offset(&text, dom_offset as usize),
        None => dom_offset as usize,
    };
    get_position(&DomNode(editor.clone()), &CaretPoint::new(node, offset))
}

/// DOM boundary point for a logical offset inside `editor`.
pub fn offset_to_dom_point(editor: &web_sys::Node, offset: usize) -> (web_sys::Node, u32) {
    let point = set_position(&DomNode(editor.clone()), offset);
    let dom_offset = match point.node.text() {
        Some(text) => char_to_utf16_offset(&text, point.offset),
        None => point.offset,
    };
    (point.node.0, dom_offset as u32)
}

/// Reads and places the caret of one editor element through the window
/// selection.
#[derive(Clone, Debug)]
pub struct BrowserCaret {
    editor: web_sys::HtmlElement,
}

impl BrowserCaret {
    pub fn new(editor: web_sys::HtmlElement) -> Self {
        Self { editor }
    }

    pub fn editor(&self) -> &web_sys::HtmlElement {
        &self.editor
    }

    /// Current selection, `None` when it is outside the editor.
    pub fn selection(&self) -> Option<Selection> {
        let selection = web_sys::window()?.get_selection().ok()??;
        let root: &web_sys::Node = self.editor.as_ref();
        let anchor = dom_point_to_offset(root, &selection.anchor_node()?, selection.anchor_offset())?;
        let head = dom_point_to_offset(root, &selection.focus_node()?, selection.focus_offset())?;
        Some(Selection::new(anchor, head))
    }

    pub fn caret(&self) -> Option<usize> {
        self.selection().map(|s| s.head)
    }

    /// Collapse the window selection at a logical offset.
    pub fn restore(&self, offset: usize) -> Result<(), PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let (node, node_offset) = offset_to_dom_point(self.editor.as_ref(), offset);

        tracing::trace!(
            target: "jsonlint::caret",
            offset,
            node_offset,
            node = %node.node_name(),
            "restoring caret"
        );

        let selection = window
            .get_selection()
            .map_err(|e| format!("get_selection failed: {:?}", e))?
            .ok_or("no selection object")?;
        let range = document
            .create_range()
            .map_err(|e| format!("create_range failed: {:?}", e))?;
        range
            .set_start(&node, node_offset)
            .map_err(|e| format!("set_start failed: {:?}", e))?;
        range.collapse_with_to_start(true);

        selection
            .remove_all_ranges()
            .map_err(|e| format!("remove_all_ranges failed: {:?}", e))?;
        selection
            .add_range(&range)
            .map_err(|e| format!("add_range failed: {:?}", e))?;
        Ok(())
    }
}
