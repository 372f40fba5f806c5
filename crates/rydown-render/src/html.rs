//! HTML output.
//!
//! Every block ends with a newline; inline markup never does. Code blocks go
//! through the configured [`Highlighter`] after tab expansion.

use rydown_syntax::{Document, Node, TableRow};

use crate::highlight::Highlighter;
use crate::text::{code_text, expand_tabs, html_text};

/// Tab stop used for code blocks unless configured otherwise.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Renders a resolved [`Document`] as an HTML fragment.
pub struct HtmlRenderer<'h> {
    highlighter: &'h dyn Highlighter,
    tab_width: usize,
}

impl<'h> HtmlRenderer<'h> {
    pub fn new(highlighter: &'h dyn Highlighter) -> Self {
        Self {
            highlighter,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        for node in &document.children {
            self.block(node, &mut out);
        }
        out
    }

    fn block(&self, node: &Node, out: &mut String) {
        match node {
            Node::Heading { level, children } => {
                out.push_str(&format!("<h{level}>"));
                self.inline(children, out);
                out.push_str(&format!("</h{level}>\n"));
            }
            Node::Subheading { children } => self.wrapped("<h1>", children, "</h1>\n", out),
            Node::Paragraph { children } => self.wrapped("<p>", children, "</p>\n", out),
            Node::Blockquote { children } => {
                self.wrapped("<blockquote><p>", children, "</p></blockquote>\n", out)
            }
            Node::Figure { children, url } => {
                out.push_str(&format!(
                    "<figure><img src='{}' /><figcaption>",
                    html_escape::encode_single_quoted_attribute(url)
                ));
                self.inline(children, out);
                out.push_str("</figcaption></figure>\n");
            }
            Node::UnorderedList { items } => {
                nested_bullets(items, out, |children, out| self.item_body(children, out))
            }
            Node::OrderedList { items } => {
                out.push_str("<ol>\n");
                for item in items {
                    out.push_str("<li>");
                    self.item_body(item.children(), out);
                    out.push_str("</li>\n");
                }
                out.push_str("</ol>\n");
            }
            Node::BlockCode { text, language } | Node::FencedCode { text, language } => {
                let code = expand_tabs(text, self.tab_width);
                out.push_str(&self.highlighter.highlight(&code, language));
                out.push('\n');
            }
            Node::Table { header, rows } => table(header, rows, out),
            Node::HorizontalLine => out.push_str("<hr />\n"),
            Node::RefLinkDef { .. } => {}
            inline => self.inline(std::slice::from_ref(inline), out),
        }
    }

    fn wrapped(&self, open: &str, children: &[Node], close: &str, out: &mut String) {
        out.push_str(open);
        self.inline(children, out);
        out.push_str(close);
    }

    fn inline(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text { text } => out.push_str(&html_text(text)),
                Node::Emphasis { children } => self.wrapped("<em>", children, "</em>", out),
                Node::Strong { children } => self.wrapped("<strong>", children, "</strong>", out),
                Node::EmphasisStrong { children } => {
                    self.wrapped("<em><strong>", children, "</strong></em>", out)
                }
                Node::InlineCode { text } => {
                    out.push_str("<code>");
                    out.push_str(&code_text(text));
                    out.push_str("</code>");
                }
                Node::Link { children, url } => self.anchor(url, children, out),
                Node::RefLink { children, url, .. } => {
                    self.anchor(url.as_deref().unwrap_or_default(), children, out)
                }
                Node::ListItem { children } | Node::UnorderedListItem { children, .. } => {
                    self.item_body(children, out)
                }
                block => self.block(block, out),
            }
        }
    }

    fn anchor(&self, url: &str, children: &[Node], out: &mut String) {
        out.push_str(&format!(
            "<a href='{}'>",
            html_escape::encode_single_quoted_attribute(url)
        ));
        self.inline(children, out);
        out.push_str("</a>");
    }

    /// Phrases inline, then any nested list as a block inside the item.
    fn item_body(&self, children: &[Node], out: &mut String) {
        let (phrases, lists) = split_nested(children);
        self.inline(phrases, out);
        for list in lists {
            out.push('\n');
            self.block(list, out);
        }
    }
}

/// Splits an item's children into its phrases and the nested lists that
/// trail them.
pub(crate) fn split_nested(children: &[Node]) -> (&[Node], &[Node]) {
    let at = children
        .iter()
        .position(|node| matches!(node, Node::OrderedList { .. } | Node::UnorderedList { .. }))
        .unwrap_or(children.len());
    children.split_at(at)
}

/// Writes a flat run of bullets as nested `<ul>` lists.
///
/// Levels are relative to the shallowest bullet and never skip: an item at
/// most one level deeper than the one before it. A deeper item opens a list
/// inside the open `<li>`; a shallower one closes one list per level.
pub(crate) fn nested_bullets<F>(items: &[Node], out: &mut String, mut body: F)
where
    F: FnMut(&[Node], &mut String),
{
    let base = items.iter().filter_map(bullet_indent).min().unwrap_or(0);
    let mut level = 0;
    out.push_str("<ul>\n");
    for (i, item) in items.iter().enumerate() {
        let indent = bullet_indent(item).unwrap_or(base);
        if i == 0 {
            level = 0;
        } else {
            let target = (indent - base).min(level + 1);
            if target > level {
                out.push_str("\n<ul>\n");
            } else {
                out.push_str("</li>\n");
                for _ in target..level {
                    out.push_str("</ul></li>\n");
                }
            }
            level = target;
        }
        out.push_str("<li>");
        body(item.children(), out);
    }
    if !items.is_empty() {
        out.push_str("</li>\n");
    }
    for _ in 0..level {
        out.push_str("</ul></li>\n");
    }
    out.push_str("</ul>\n");
}

fn bullet_indent(node: &Node) -> Option<usize> {
    match node {
        Node::UnorderedListItem { indent, .. } => Some(*indent),
        _ => None,
    }
}

fn table(header: &TableRow, rows: &[TableRow], out: &mut String) {
    out.push_str("<table>\n<thead>\n");
    row(header, "th", out);
    out.push_str("</thead>\n");
    if !rows.is_empty() {
        out.push_str("<tbody>\n");
        for body_row in rows {
            row(body_row, "td", out);
        }
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>\n");
}

fn row(row: &TableRow, cell: &str, out: &mut String) {
    out.push_str("<tr>");
    for text in &row.cells {
        out.push_str(&format!(
            "<{cell}>{}</{cell}>",
            html_escape::encode_text(text.trim())
        ));
    }
    out.push_str("</tr>\n");
}
