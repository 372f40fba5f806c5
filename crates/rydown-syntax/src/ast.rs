//! The typed syntax tree.
//!
//! Every node kind is its own [`Node`] variant with named fields, so the
//! walker and the renderers match exhaustively. Children always keep source
//! order.

use std::collections::BTreeMap;

use serde::Serialize;

/// A parsed and resolved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
    /// Deepest heading level seen, 0 when there are no headings.
    pub max_heading_level: u8,
    /// Every `[key]: url` definition in the document.
    pub references: RefTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// ATX heading; `level` is the number of `#` characters, 1 to 6.
    Heading { level: u8, children: Vec<Node> },
    /// Setext heading. Always level 1 whatever the underline.
    Subheading { children: Vec<Node> },
    Paragraph { children: Vec<Node> },
    EmphasisStrong { children: Vec<Node> },
    Emphasis { children: Vec<Node> },
    Strong { children: Vec<Node> },
    InlineCode { text: String },
    Link { children: Vec<Node>, url: String },
    /// `[text][key]`. `url` stays `None` until the resolution pass.
    RefLink {
        children: Vec<Node>,
        key: String,
        url: Option<String>,
    },
    Figure { children: Vec<Node>, url: String },
    /// A flat run of bullets; nesting is carried by each item's `indent`.
    UnorderedList { items: Vec<Node> },
    OrderedList { items: Vec<Node> },
    /// An ordered list item. A nested list is its last child.
    ListItem { children: Vec<Node> },
    UnorderedListItem { children: Vec<Node>, indent: usize },
    /// Tab-indented code, dedented.
    BlockCode { text: String, language: String },
    FencedCode { text: String, language: String },
    Blockquote { children: Vec<Node> },
    Table { header: TableRow, rows: Vec<TableRow> },
    HorizontalLine,
    Text { text: String },
    /// A `[key]: url` definition, kept in the tree where it was written.
    RefLinkDef { key: String, url: String },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// Child nodes (list items for lists); empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Subheading { children }
            | Node::Paragraph { children }
            | Node::EmphasisStrong { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Link { children, .. }
            | Node::RefLink { children, .. }
            | Node::Figure { children, .. }
            | Node::ListItem { children }
            | Node::UnorderedListItem { children, .. }
            | Node::Blockquote { children } => children,
            Node::UnorderedList { items } | Node::OrderedList { items } => items,
            Node::InlineCode { .. }
            | Node::BlockCode { .. }
            | Node::FencedCode { .. }
            | Node::Table { .. }
            | Node::HorizontalLine
            | Node::Text { .. }
            | Node::RefLinkDef { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Subheading { children }
            | Node::Paragraph { children }
            | Node::EmphasisStrong { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Link { children, .. }
            | Node::RefLink { children, .. }
            | Node::Figure { children, .. }
            | Node::ListItem { children }
            | Node::UnorderedListItem { children, .. }
            | Node::Blockquote { children } => children,
            Node::UnorderedList { items } | Node::OrderedList { items } => items,
            Node::InlineCode { .. }
            | Node::BlockCode { .. }
            | Node::FencedCode { .. }
            | Node::Table { .. }
            | Node::HorizontalLine
            | Node::Text { .. }
            | Node::RefLinkDef { .. } => &mut [],
        }
    }

    /// Concatenated text of every descendant `Text` and `InlineCode`.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text { text } | Node::InlineCode { text } => text.clone(),
            _ => self.children().iter().map(Node::plain_text).collect(),
        }
    }
}

/// One table row, split on `|`. Cells keep their surrounding spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn parse(line: &str) -> Self {
        Self {
            cells: line.split('|').map(str::to_string).collect(),
        }
    }
}

/// Link keys to URLs, in key order.
///
/// Keys are case-sensitive and stored as written. Defining a key twice
/// keeps the later URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RefTable(BTreeMap<String, String>);

impl RefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URL this definition replaced, if any.
    pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), url.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
