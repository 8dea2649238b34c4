//! A minimal tree for the markup this crate emits.
//!
//! Parses line containers, token spans, fold indicators, `<br>` and the
//! common character entities into an arena of nodes that implements
//! [`CaretNode`]. This lets the caret translator run without a DOM, and lets
//! headless hosts recover plain text from rendered markup.

use std::cell::{Cell, RefCell};

use crate::caret::{self, CaretNode};
use crate::platform::{Downloader, Notice, Notifier, PlatformError, RenderSurface};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    parent: Option<usize>,
    first_child: Option<usize>,
    last_child: Option<usize>,
    next_sibling: Option<usize>,
    previous_sibling: Option<usize>,
}

/// Arena-backed element tree. Node 0 is a synthetic root.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<NodeEntry>,
}

impl MarkupTree {
    /// Parse markup. Never fails; unknown constructs become text and unclosed
    /// elements are closed at the end of input.
    pub fn parse(markup: &str) -> Self {
        let mut tree = MarkupTree {
            nodes: vec![NodeEntry {
                data: NodeData::Element {
                    tag: "#root".into(),
                    attrs: Vec::new(),
                },
                parent: None,
                first_child: None,
                last_child: None,
                next_sibling: None,
                previous_sibling: None,
            }],
        };
        let chars: Vec<char> = markup.chars().collect();
        let mut stack = vec![0usize];
        let mut i = 0;
        let mut text = String::new();

        while i < chars.len() {
            if chars[i] == '<' {
                if let Some(tag) = scan_tag(&chars, i) {
                    let parent = stack.last().copied().unwrap_or(0);
                    if !text.is_empty() {
                        tree.append(parent, NodeData::Text(std::mem::take(&mut text)));
                    }
                    i = tag.end;
                    match tag.kind {
                        TagKind::Close(name) => {
                            if let Some(depth) = stack
                                .iter()
                                .rposition(|&id| id != 0 && tree.tag_of(id) == Some(name.as_str()))
                            {
                                stack.truncate(depth);
                            }
                        }
                        TagKind::Open {
                            name,
                            attrs,
                            self_closing,
                        } => {
                            let void = self_closing || VOID_TAGS.contains(&name.as_str());
                            let id = tree.append(parent, NodeData::Element { tag: name, attrs });
                            if !void {
                                stack.push(id);
                            }
                        }
                    }
                    continue;
                }
            }
            if chars[i] == '&' {
                if let Some((decoded, len)) = decode_entity(&chars[i..]) {
                    text.push(decoded);
                    i += len;
                    continue;
                }
            }
            text.push(chars[i]);
            i += 1;
        }
        if !text.is_empty() {
            let parent = stack.last().copied().unwrap_or(0);
            tree.append(parent, NodeData::Text(text));
        }
        tree
    }

    pub fn root(&self) -> MarkupNode<'_> {
        MarkupNode { tree: self, id: 0 }
    }

    fn append(&mut self, parent: usize, data: NodeData) -> usize {
        let id = self.nodes.len();
        let previous = self.nodes[parent].last_child;
        self.nodes.push(NodeEntry {
            data,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            next_sibling: None,
            previous_sibling: previous,
        });
        match previous {
            Some(prev) => self.nodes[prev].next_sibling = Some(id),
            None => self.nodes[parent].first_child = Some(id),
        }
        self.nodes[parent].last_child = Some(id);
        id
    }

    fn tag_of(&self, id: usize) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }
}

/// A node borrowed from a [`MarkupTree`].
#[derive(Debug, Clone, Copy)]
pub struct MarkupNode<'a> {
    tree: &'a MarkupTree,
    id: usize,
}

impl PartialEq for MarkupNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<'a> MarkupNode<'a> {
    fn entry(&self) -> &'a NodeEntry {
        &self.tree.nodes[self.id]
    }

    fn at(&self, id: Option<usize>) -> Option<Self> {
        id.map(|id| MarkupNode {
            tree: self.tree,
            id,
        })
    }

    /// Tag name, `None` for text nodes.
    pub fn tag(&self) -> Option<&'a str> {
        self.tree.tag_of(self.id)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match &self.entry().data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

impl CaretNode for MarkupNode<'_> {
    fn parent(&self) -> Option<Self> {
        self.at(self.entry().parent)
    }

    fn first_child(&self) -> Option<Self> {
        self.at(self.entry().first_child)
    }

    fn next_sibling(&self) -> Option<Self> {
        self.at(self.entry().next_sibling)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.at(self.entry().previous_sibling)
    }

    fn text(&self) -> Option<String> {
        match &self.entry().data {
            NodeData::Text(text) => Some(text.clone()),
            NodeData::Element { .. } => None,
        }
    }

    fn text_len(&self) -> usize {
        match &self.entry().data {
            NodeData::Text(text) => text.chars().count(),
            NodeData::Element { .. } => 0,
        }
    }

    fn is_block(&self) -> bool {
        self.tag() == Some("div")
    }

    fn is_opaque(&self) -> bool {
        self.attr("contenteditable") == Some("false")
    }
}

/// Plain text represented by markup, with opaque nodes dropped and line
/// containers joined by `\n`.
pub fn strip_markup(markup: &str) -> String {
    caret::collect_text(&MarkupTree::parse(markup).root())
}

enum TagKind {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
}

struct Tag {
    kind: TagKind,
    end: usize,
}

/// Scan a tag starting at the `<` at `start`. `None` if it is not a tag.
fn scan_tag(chars: &[char], start: usize) -> Option<Tag> {
    let mut j = start + 1;
    let closing = chars.get(j) == Some(&'/');
    if closing {
        j += 1;
    }
    let name_start = j;
    while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '-') {
        j += 1;
    }
    if j == name_start {
        return None;
    }
    let name: String = chars[name_start..j]
        .iter()
        .collect::<String>()
        .to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;
    loop {
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        match chars.get(j) {
            None => return None,
            Some('>') => {
                j += 1;
                break;
            }
            Some('/') => {
                self_closing = true;
                j += 1;
            }
            Some(_) => {
                let key_start = j;
                while j < chars.len()
                    && !chars[j].is_whitespace()
                    && !matches!(chars[j], '=' | '>' | '/')
                {
                    j += 1;
                }
                let key: String = chars[key_start..j].iter().collect();
                let mut value = String::new();
                if chars.get(j) == Some(&'=') {
                    j += 1;
                    match chars.get(j).copied() {
                        Some(quote) if quote == '"' || quote == '\'' => {
                            j += 1;
                            let value_start = j;
                            while j < chars.len() && chars[j] != quote {
                                j += 1;
                            }
                            value = decode_text(&chars[value_start..j.min(chars.len())]);
                            j += 1;
                        }
                        _ => {
                            let value_start = j;
                            while j < chars.len() && !chars[j].is_whitespace() && chars[j] != '>' {
                                j += 1;
                            }
                            value = chars[value_start..j].iter().collect();
                        }
                    }
                }
                attrs.push((key.to_ascii_lowercase(), value));
            }
        }
    }

    let kind = if closing {
        TagKind::Close(name)
    } else {
        TagKind::Open {
            name,
            attrs,
            self_closing,
        }
    };
    Some(Tag { kind, end: j })
}

fn decode_entity(chars: &[char]) -> Option<(char, usize)> {
    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];
    ENTITIES.iter().find_map(|(entity, c)| {
        let len = entity.chars().count();
        let matches = chars.len() >= len && chars[..len].iter().copied().eq(entity.chars());
        matches.then_some((*c, len))
    })
}

fn decode_text(chars: &[char]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        if let Some((c, len)) = decode_entity(&chars[i..]) {
            out.push(c);
            i += len;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// A headless [`RenderSurface`] that keeps the last rendered markup.
///
/// The caret is stored the way a browser would store it: as a point in the
/// rendered tree, translated from and back to a logical offset. It also
/// records notices and downloads, which makes it the host for native tests
/// and for tools that drive a session without a DOM.
#[derive(Debug, Default)]
pub struct MarkupSurface {
    editor: RefCell<String>,
    gutter: RefCell<String>,
    caret: Cell<Option<usize>>,
    notices: RefCell<Vec<Notice>>,
    downloads: RefCell<Vec<(String, String)>>,
}

impl MarkupSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor_markup(&self) -> String {
        self.editor.borrow().clone()
    }

    pub fn gutter_markup(&self) -> String {
        self.gutter.borrow().clone()
    }

    /// Text currently shown, recovered from the editor markup.
    pub fn text(&self) -> String {
        strip_markup(&self.editor.borrow())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn downloads(&self) -> Vec<(String, String)> {
        self.downloads.borrow().clone()
    }

    /// Move the caret as a user click would.
    pub fn place_caret(&self, offset: Option<usize>) {
        self.caret.set(offset);
    }
}

impl RenderSurface for MarkupSurface {
    fn render(&self, editor_markup: &str, gutter_markup: &str) -> Result<(), PlatformError> {
        *self.editor.borrow_mut() = editor_markup.to_string();
        *self.gutter.borrow_mut() = gutter_markup.to_string();
        Ok(())
    }

    fn render_gutter(&self, gutter_markup: &str) -> Result<(), PlatformError> {
        *self.gutter.borrow_mut() = gutter_markup.to_string();
        Ok(())
    }

    fn caret(&self) -> Option<usize> {
        self.caret.get()
    }

    fn restore_caret(&self, offset: usize) -> Result<(), PlatformError> {
        let markup = self.editor.borrow();
        let tree = MarkupTree::parse(&markup);
        let root = tree.root();
        let point = caret::set_position(&root, offset);
        let resolved = caret::get_position(&root, &point)
            .ok_or_else(|| PlatformError::from("caret landed outside the editor"))?;
        self.caret.set(Some(resolved));
        Ok(())
    }
}

impl Notifier for MarkupSurface {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

impl Downloader for MarkupSurface {
    fn download(&self, file_name: &str, text: &str) -> Result<(), PlatformError> {
        self.downloads
            .borrow_mut()
            .push((file_name.to_string(), text.to_string()));
        Ok(())
    }
}
