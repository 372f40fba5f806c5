//! # Inline-Level Grammar
//!
//! Phrases are the runs inside a block: plain text, emphasis, code spans and
//! links. The lexer has already matched the delimiters, so most phrases are
//! a single token; only links and reference links span several.
//!
//! ## Line Breaks
//!
//! A single newline inside a block is kept as a `Text("\n")` phrase when the
//! next line carries on with more phrases. Whether it does depends on the
//! enclosing block:
//!
//! | Context      | Newline continues the block when the next token is |
//! |--------------|-----------------------------------------------------|
//! | heading      | never                                               |
//! | blockquote   | a phrase, or another `>` marker                     |
//! | anything else| a phrase that does not open a table                 |
//!
//! ## Unclosed Labels
//!
//! The lexer only opens a link after checking that a target follows, but a
//! code span inside the label can still swallow the closing bracket. An
//! unclosed label is reported and its phrases are kept as plain content,
//! preceded by the literal opening bracket.

use crate::ast::Node;
use crate::parser::Parser;
use crate::token::TokenKind;

use super::table_ahead;

/// The block a phrase list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Paragraph,
    Heading,
    ListItem,
    Blockquote,
    /// Link, reference link or figure text.
    Label,
}

/// Parses phrases until a token that cannot continue the block.
pub fn phrases(p: &mut Parser<'_>, ctx: Context) -> Vec<Node> {
    let mut nodes = Vec::new();
    loop {
        let kind = p.current();
        if kind.is_phrase_start() {
            phrase(p, &mut nodes);
        } else if kind == TokenKind::Newline && continues(p, ctx) {
            p.bump();
            nodes.push(Node::text("\n"));
        } else {
            return nodes;
        }
    }
}

/// Whether the newline under the cursor joins the next line to this block.
fn continues(p: &Parser<'_>, ctx: Context) -> bool {
    let next = p.nth(1);
    match ctx {
        Context::Heading => false,
        Context::Blockquote if next == TokenKind::Blockquote => true,
        _ => next.is_phrase_start() && !table_ahead(p, 1),
    }
}

fn phrase(p: &mut Parser<'_>, out: &mut Vec<Node>) {
    match p.current() {
        TokenKind::LinkStart => link(p, out),
        TokenKind::RefLinkStart => ref_link(p, out),
        _ => {
            let Some(token) = p.bump() else {
                return;
            };
            let text = token.value.clone();
            out.push(match token.kind {
                TokenKind::EmphasisStrong => Node::EmphasisStrong {
                    children: vec![Node::text(text)],
                },
                TokenKind::Strong => Node::Strong {
                    children: vec![Node::text(text)],
                },
                TokenKind::Emphasis => Node::Emphasis {
                    children: vec![Node::text(text)],
                },
                TokenKind::InlineCode => Node::InlineCode { text },
                // plain text, escapes, stray brackets, table-like text
                _ => Node::text(text),
            });
        }
    }
}

/// `[` Phrase* `](url)`
fn link(p: &mut Parser<'_>, out: &mut Vec<Node>) {
    let opener = p.current_text();
    p.bump();
    let children = phrases(p, Context::Label);
    if p.at(TokenKind::LinkUrl) {
        let url = p.current_text().to_string();
        p.bump();
        out.push(Node::Link { children, url });
    } else {
        unclosed(p, "link", opener, children, out);
    }
}

/// `[` Phrase* `][key]`; the URL is attached later by the walker.
fn ref_link(p: &mut Parser<'_>, out: &mut Vec<Node>) {
    let opener = p.current_text();
    p.bump();
    let children = phrases(p, Context::Label);
    if p.at(TokenKind::RefLinkKey) {
        let key = p.current_text().to_string();
        p.bump();
        out.push(Node::RefLink {
            children,
            key,
            url: None,
        });
    } else {
        unclosed(p, "reference link", opener, children, out);
    }
}

pub fn unclosed(
    p: &mut Parser<'_>,
    what: &str,
    opener: &str,
    children: Vec<Node>,
    out: &mut Vec<Node>,
) {
    p.error(format!("unclosed {what} label before {:?}", p.current()));
    out.push(Node::text(opener));
    out.extend(children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn inline(input: &str, ctx: Context) -> Vec<Node> {
        let tokens = tokenize(input);
        let mut p = Parser::new(&tokens);
        phrases(&mut p, ctx)
    }

    #[test]
    fn emphasis_wraps_its_text() {
        assert_eq!(
            inline("a *b* **c** ***d***", Context::Paragraph),
            vec![
                Node::text("a "),
                Node::Emphasis {
                    children: vec![Node::text("b")]
                },
                Node::text(" "),
                Node::Strong {
                    children: vec![Node::text("c")]
                },
                Node::text(" "),
                Node::EmphasisStrong {
                    children: vec![Node::text("d")]
                },
            ]
        );
    }

    #[test]
    fn newline_joins_lines_of_a_paragraph() {
        assert_eq!(
            inline("one\ntwo", Context::Paragraph),
            vec![Node::text("one"), Node::text("\n"), Node::text("two")]
        );
    }

    #[test]
    fn heading_stops_at_newline() {
        assert_eq!(inline("one\ntwo", Context::Heading), vec![Node::text("one")]);
    }

    #[test]
    fn paragraph_stops_before_a_table() {
        let nodes = inline("intro\na|b|c\n-|-|-\n", Context::Paragraph);
        assert_eq!(nodes, vec![Node::text("intro")]);
    }

    #[test]
    fn link_collects_label_and_url() {
        assert_eq!(
            inline("[a *b*](http://x/)", Context::Paragraph),
            vec![Node::Link {
                children: vec![
                    Node::text("a "),
                    Node::Emphasis {
                        children: vec![Node::text("b")]
                    }
                ],
                url: "http://x/".to_string(),
            }]
        );
    }

    #[test]
    fn reference_link_is_left_unresolved() {
        assert_eq!(
            inline("[text][key]", Context::Paragraph),
            vec![Node::RefLink {
                children: vec![Node::text("text")],
                key: "key".to_string(),
                url: None,
            }]
        );
    }

    #[test]
    fn unclosed_label_falls_back_to_text() {
        let tokens = tokenize("[a `b](c) d`");
        let mut p = Parser::new(&tokens);
        let nodes = phrases(&mut p, Context::Paragraph);
        assert_eq!(nodes[0], Node::text("["));
        assert_eq!(nodes[1], Node::text("a "));
        let output = p.parse();
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].message.contains("unclosed link label"));
    }
}
