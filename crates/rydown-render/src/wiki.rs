//! MediaWiki markup output.
//!
//! Text keeps its line breaks. Lists use `*` prefixes at the top level, but
//! items of an ordered list are HTML (`<ol><li>`), so anything nested inside
//! one is written as HTML as well.

use rydown_syntax::{Document, Node, TableRow};

use crate::highlight::Highlighter;
use crate::html::{nested_bullets, split_nested, DEFAULT_TAB_WIDTH};
use crate::text::{code_text, expand_tabs, wiki_text};

/// Renders a resolved [`Document`] as wiki markup.
pub struct WikiRenderer<'h> {
    highlighter: &'h dyn Highlighter,
    tab_width: usize,
}

impl<'h> WikiRenderer<'h> {
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
                let marks = "=".repeat(usize::from(*level));
                out.push_str(&marks);
                out.push(' ');
                self.inline(children, out);
                out.push(' ');
                out.push_str(&marks);
                out.push('\n');
            }
            // Underlined headings are always top level.
            Node::Subheading { children } => {
                out.push_str("= ");
                self.inline(children, out);
                out.push_str(" =\n");
            }
            Node::Paragraph { children } => {
                out.push_str("<p>");
                self.inline(children, out);
                out.push_str("</p>\n");
            }
            Node::Blockquote { children } => {
                out.push_str("<blockquote><p>");
                self.inline(children, out);
                out.push_str("</p></blockquote>\n");
            }
            Node::Figure { children, url } => {
                out.push_str("<span class=\"plainlinks\">[{{fullurl:");
                self.inline(children, out);
                out.push_str(&format!("}}}} {url}]</span>"));
            }
            Node::UnorderedList { items } => {
                for item in items {
                    let Node::UnorderedListItem { children, indent } = item else {
                        continue;
                    };
                    out.push_str(&"*".repeat(indent + 1));
                    self.item_body(children, out);
                    out.push('\n');
                }
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
            Node::FencedCode { text, language } => {
                out.push_str(&format!(
                    "<syntaxhighlight lang='{language}'>{text}</syntaxhighlight>\n"
                ));
            }
            Node::BlockCode { text, language } => {
                let code = expand_tabs(text, self.tab_width);
                out.push_str(&self.highlighter.highlight(&code, language));
                out.push('\n');
            }
            Node::Table { header, rows } => table(header, rows, out),
            Node::HorizontalLine => out.push_str("----\n"),
            Node::RefLinkDef { .. } => {}
            inline => self.inline(std::slice::from_ref(inline), out),
        }
    }

    fn inline(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text { text } => out.push_str(&wiki_text(text)),
                Node::Emphasis { children } => self.quoted("''", children, out),
                Node::Strong { children } => self.quoted("'''", children, out),
                Node::EmphasisStrong { children } => self.quoted("'''''", children, out),
                Node::InlineCode { text } => {
                    out.push_str("<code>");
                    out.push_str(&code_text(text));
                    out.push_str("</code>");
                }
                Node::Link { children, url } => {
                    out.push('[');
                    out.push_str(url);
                    out.push(' ');
                    self.inline(children, out);
                    out.push(']');
                }
                Node::RefLink { children, key, url } => {
                    let url = url.as_deref().unwrap_or_default();
                    let target = url.split(' ').next().unwrap_or_default();
                    out.push_str(&format!("[{target}#{key} "));
                    self.inline(children, out);
                    out.push(']');
                }
                Node::ListItem { children } | Node::UnorderedListItem { children, .. } => {
                    self.item_body(children, out)
                }
                block => self.block(block, out),
            }
        }
    }

    fn quoted(&self, marks: &str, children: &[Node], out: &mut String) {
        out.push_str(marks);
        self.inline(children, out);
        out.push_str(marks);
    }

    /// Item phrases and nested lists, each trimmed and run together.
    fn item_body(&self, children: &[Node], out: &mut String) {
        let (phrases, lists) = split_nested(children);
        let mut text = String::new();
        self.inline(phrases, &mut text);
        out.push_str(text.trim());
        for list in lists {
            let mut nested = String::new();
            match list {
                Node::UnorderedList { items } => {
                    nested_bullets(items, &mut nested, |children, out| self.item_body(children, out))
                }
                other => self.block(other, &mut nested),
            }
            out.push_str(nested.trim());
        }
    }
}

/// `{|` table with a `!` header row and `|-` between rows.
fn table(header: &TableRow, rows: &[TableRow], out: &mut String) {
    out.push_str("\n{|\n!");
    out.push_str(&header.cells.join("\n!"));
    if !rows.is_empty() {
        out.push_str("\n|-\n");
        let body: Vec<String> = rows
            .iter()
            .map(|row| format!("|{}", row.cells.join("\n|")))
            .collect();
        out.push_str(&body.join("\n|-\n"));
    }
    out.push_str("\n|}\n");
}
