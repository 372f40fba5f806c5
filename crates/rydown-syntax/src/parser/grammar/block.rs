//! Block-level grammar rules.

use crate::ast::{Node, TableRow};
use crate::parser::Parser;
use crate::token::TokenKind;

use super::inline::{self, Context};
use super::{end_of_block, table_ahead};

/// Language given to code blocks that do not name one.
const DEFAULT_LANGUAGE: &str = "text";

/// Parse a block element.
///
/// Returns `None` for separators and for tokens that were discarded during
/// recovery.
pub fn block(p: &mut Parser<'_>) -> Option<Node> {
    let node = match p.current() {
        TokenKind::BlankLines | TokenKind::ListEnd | TokenKind::Newline => {
            p.bump();
            return None;
        }
        TokenKind::HeadingStart => heading(p),
        TokenKind::HorizontalLine => {
            p.bump();
            end_of_block(p);
            Node::HorizontalLine
        }
        TokenKind::Blockquote => blockquote(p),
        TokenKind::TableContent if table_ahead(p, 0) => table(p),
        TokenKind::UnorderedItemStart => unordered_list(p, 0).0,
        kind if kind.ordered_depth().is_some() => ordered_list(p, kind).0,
        TokenKind::BlockCode => block_code(p),
        TokenKind::FencedCode | TokenKind::FencedCodeWithLanguage => fenced_code(p),
        TokenKind::FigureStart => figure(p),
        TokenKind::RefLinkDef => ref_link_def(p),
        kind if kind.is_phrase_start() => paragraph(p),
        kind => {
            p.error(format!("unexpected {kind:?} {:?}", p.current_text()));
            p.bump();
            return None;
        }
    };
    Some(node)
}

/// `#{1,6} ` Phrase* [` #`] end-of-line
fn heading(p: &mut Parser<'_>) -> Node {
    let hashes = p.current_text().bytes().filter(|b| *b == b'#').count();
    let level = hashes.clamp(1, 6) as u8;
    p.bump();

    let children = inline::phrases(p, Context::Heading);
    p.eat(TokenKind::HeadingEnd);
    if !end_of_block(p) {
        p.error(format!("expected end of heading, found {:?}", p.current()));
    }

    p.saw_heading(level);
    Node::Heading { level, children }
}

/// A paragraph, or a setext subheading when the phrases are underlined.
fn paragraph(p: &mut Parser<'_>) -> Node {
    let children = inline::phrases(p, Context::Paragraph);

    let underlined = matches!(
        p.nth(1),
        TokenKind::UnderDivider | TokenKind::HorizontalLine
    );
    if p.at(TokenKind::Newline) && underlined {
        p.bump();
        p.bump();
        end_of_block(p);
        return Node::Subheading { children };
    }

    end_of_block(p);
    Node::Paragraph { children }
}

/// `>` lines. A line without a marker continues the quote; a blank line
/// ends it. A bare `>` line stands for an empty line inside the quote.
fn blockquote(p: &mut Parser<'_>) -> Node {
    let mut children = Vec::new();
    p.bump();
    loop {
        if p.at(TokenKind::Newline) && p.nth(1) == TokenKind::Blockquote {
            p.bump();
            p.bump();
            children.push(Node::text(" "));
            children.push(Node::text("\n"));
            continue;
        }
        children.extend(inline::phrases(p, Context::Blockquote));
        if !p.eat(TokenKind::Blockquote) {
            end_of_block(p);
            return Node::Blockquote { children };
        }
    }
}

/// Header row, marker row, then body rows until the end of the block.
fn table(p: &mut Parser<'_>) -> Node {
    let header = TableRow::parse(p.current_text());
    p.bump();
    p.bump();
    p.bump();

    let mut rows = Vec::new();
    while p.at(TokenKind::Newline) && p.nth(1) == TokenKind::TableContent {
        p.bump();
        rows.push(TableRow::parse(p.current_text()));
        p.bump();
    }
    end_of_block(p);
    Node::Table { header, rows }
}

/// Items of one ordered tier. `start` is the item token of that tier.
///
/// The flag is true when a blank line closed the list, which also closes
/// every list enclosing it.
fn ordered_list(p: &mut Parser<'_>, start: TokenKind) -> (Node, bool) {
    let depth = start.ordered_depth().unwrap_or(1);
    let mut items = Vec::new();
    let mut closed = false;
    while !closed && p.at(start) {
        p.bump();
        let mut children = inline::phrases(p, Context::ListItem);
        closed = item_tail(p, &mut children, Some(depth));
        items.push(Node::ListItem { children });
    }
    (Node::OrderedList { items }, closed)
}

/// Bullets indented at least `min_indent` units. Deeper bullets stay in the
/// same list and carry their own indent.
fn unordered_list(p: &mut Parser<'_>, min_indent: usize) -> (Node, bool) {
    let mut items = Vec::new();
    let mut closed = false;
    while !closed && p.nth_token(0).is_some_and(|t| is_bullet(t.kind, t.indent, min_indent)) {
        let indent = p.bump().map_or(0, |t| t.indent);
        let mut children = inline::phrases(p, Context::ListItem);
        closed = item_tail(p, &mut children, None);
        items.push(Node::UnorderedListItem { children, indent });
    }
    (Node::UnorderedList { items }, closed)
}

fn is_bullet(kind: TokenKind, indent: usize, min_indent: usize) -> bool {
    kind == TokenKind::UnorderedItemStart && indent >= min_indent
}

/// Handles what follows an item's phrases and returns true if the list is
/// closed.
///
/// A single newline may introduce a nested list, which becomes the item's
/// last child: the next ordered tier under any item, or bullets indented
/// past an ordered item of tiers 1 to 3.
fn item_tail(p: &mut Parser<'_>, children: &mut Vec<Node>, depth: Option<usize>) -> bool {
    match p.current() {
        TokenKind::ListEnd | TokenKind::BlankLines => {
            p.bump();
            return true;
        }
        TokenKind::Eof => return true,
        TokenKind::Newline => {}
        _ => return false,
    }

    let deeper = TokenKind::ordered_item(depth.unwrap_or(1) + 1);
    if let Some(kind) = deeper.filter(|kind| p.nth(1) == *kind) {
        p.bump();
        let (list, closed) = ordered_list(p, kind);
        children.push(list);
        return closed;
    }

    let bullets_at = depth.filter(|d| *d < 4).filter(|d| {
        p.nth_token(1)
            .is_some_and(|t| is_bullet(t.kind, t.indent, *d))
    });
    if let Some(min_indent) = bullets_at {
        p.bump();
        let (list, closed) = unordered_list(p, min_indent);
        children.push(list);
        return closed;
    }

    p.bump();
    false
}

/// Tab-indented code. A first line of `:::lang` names the language.
fn block_code(p: &mut Parser<'_>) -> Node {
    let value = p.current_text();
    p.bump();
    let tagged = value
        .strip_prefix(":::")
        .and_then(|rest| rest.split_once('\n'));
    let (language, text) = match tagged {
        Some((language, code)) if !language.trim().is_empty() => (language.trim(), code),
        Some((_, code)) => (DEFAULT_LANGUAGE, code),
        None => (DEFAULT_LANGUAGE, value),
    };
    Node::BlockCode {
        text: text.to_string(),
        language: language.to_string(),
    }
}

/// A fenced block. The fence line holds the language of a tagged block;
/// the code is everything between that line and the closing fence.
fn fenced_code(p: &mut Parser<'_>) -> Node {
    let tagged = p.at(TokenKind::FencedCodeWithLanguage);
    let value = p.current_text();
    p.bump();

    let body = value.get(3..value.len().saturating_sub(3)).unwrap_or("");
    let mut lines = body.split('\n');
    let first = lines.next().unwrap_or("").trim();
    let language = if tagged && !first.is_empty() {
        first
    } else {
        DEFAULT_LANGUAGE
    };
    let text = lines.collect::<Vec<_>>().join("\n");

    end_of_block(p);
    Node::FencedCode {
        text,
        language: language.to_string(),
    }
}

/// `![` Phrase* `](url)` on its own line.
fn figure(p: &mut Parser<'_>) -> Node {
    let opener = p.current_text();
    p.bump();
    let children = inline::phrases(p, Context::Label);
    if !p.at(TokenKind::FigureUrl) {
        let mut fallback = Vec::new();
        inline::unclosed(p, "figure", opener, children, &mut fallback);
        end_of_block(p);
        return Node::Paragraph { children: fallback };
    }

    let url = p.current_text().to_string();
    p.bump();
    end_of_block(p);
    Node::Figure { children, url }
}

/// `[key]: url`. The definition is recorded in the reference table and
/// also kept in the tree.
fn ref_link_def(p: &mut Parser<'_>) -> Node {
    let value = p.current_text();
    p.bump();

    let (key, url) = value.split_once(':').unwrap_or((value, ""));
    let key = key.trim();
    let key = key
        .strip_prefix('[')
        .and_then(|k| k.strip_suffix(']'))
        .unwrap_or(key);
    let url = url.trim();

    p.define(key, url);
    end_of_block(p);
    Node::RefLinkDef {
        key: key.to_string(),
        url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::ParseOutput;
    use pretty_assertions::assert_eq;

    fn parsed(input: &str) -> ParseOutput {
        Parser::new(&tokenize(input)).parse()
    }

    fn blocks(input: &str) -> Vec<Node> {
        parsed(input).children
    }

    fn item(text: &str) -> Node {
        Node::ListItem {
            children: vec![Node::text(text)],
        }
    }

    fn bullet(text: &str, indent: usize) -> Node {
        Node::UnorderedListItem {
            children: vec![Node::text(text)],
            indent,
        }
    }

    #[test]
    fn atx_heading_with_and_without_closing_hashes() {
        assert_eq!(
            blocks("### Heading 3 ###\n\n## Two\n"),
            vec![
                Node::Heading {
                    level: 3,
                    children: vec![Node::text("Heading 3")]
                },
                Node::Heading {
                    level: 2,
                    children: vec![Node::text("Two")]
                },
            ]
        );
    }

    #[test]
    fn underlined_text_is_a_subheading() {
        assert_eq!(
            blocks("Heading 1\n=========\nOnly one newline\n"),
            vec![
                Node::Subheading {
                    children: vec![Node::text("Heading 1")]
                },
                Node::Paragraph {
                    children: vec![Node::text("Only one newline")]
                },
            ]
        );
    }

    #[test]
    fn dashes_under_text_are_a_subheading_too() {
        assert_eq!(
            blocks("Title\n-----\n"),
            vec![Node::Subheading {
                children: vec![Node::text("Title")]
            }]
        );
    }

    #[test]
    fn horizontal_line_between_paragraphs() {
        assert_eq!(
            blocks("a\n\n-----\n\nb\n"),
            vec![
                Node::Paragraph {
                    children: vec![Node::text("a")]
                },
                Node::HorizontalLine,
                Node::Paragraph {
                    children: vec![Node::text("b")]
                },
            ]
        );
    }

    #[test]
    fn bullets_form_one_flat_list() {
        assert_eq!(
            blocks("* apples\n  * oranges\n\t\t* pears\n\n"),
            vec![Node::UnorderedList {
                items: vec![bullet("apples", 0), bullet("oranges", 1), bullet("pears", 2)]
            }]
        );
    }

    #[test]
    fn ordered_items_keep_source_order() {
        assert_eq!(
            blocks("2. a\n3. b\n1. c\n"),
            vec![Node::OrderedList {
                items: vec![item("a"), item("b"), item("c")]
            }]
        );
    }

    #[test]
    fn nested_ordered_list_is_the_last_child_of_its_item() {
        assert_eq!(
            blocks("1. a\n\t1. b\n\t2. c\n2. d\n\n"),
            vec![Node::OrderedList {
                items: vec![
                    Node::ListItem {
                        children: vec![
                            Node::text("a"),
                            Node::OrderedList {
                                items: vec![item("b"), item("c")]
                            },
                        ]
                    },
                    item("d"),
                ]
            }]
        );
    }

    #[test]
    fn four_ordered_tiers() {
        let nodes = blocks("1. a\n\t1. b\n\t\t1. c\n\t\t\t1. d\n\n");
        let mut depth = 0;
        let mut node = &nodes[0];
        while let Node::OrderedList { items } = node {
            depth += 1;
            match items[0].children().last() {
                Some(last) => node = last,
                None => break,
            }
        }
        assert_eq!(depth, 4);
    }

    #[test]
    fn bullets_nest_under_an_ordered_item() {
        assert_eq!(
            blocks("1. a\n  * b\n  * c\n2. d\n"),
            vec![Node::OrderedList {
                items: vec![
                    Node::ListItem {
                        children: vec![
                            Node::text("a"),
                            Node::UnorderedList {
                                items: vec![bullet("b", 1), bullet("c", 1)]
                            },
                        ]
                    },
                    item("d"),
                ]
            }]
        );
    }

    #[test]
    fn three_space_bullet_nests_under_an_ordered_item() {
        assert_eq!(
            blocks("1. first\n   * nested\n2. second\n\n"),
            vec![Node::OrderedList {
                items: vec![
                    Node::ListItem {
                        children: vec![
                            Node::text("first"),
                            Node::UnorderedList {
                                items: vec![bullet("nested", 1)]
                            },
                        ]
                    },
                    item("second"),
                ]
            }]
        );
    }

    #[test]
    fn one_space_bullet_is_a_sibling() {
        assert_eq!(
            blocks("* a\n * b\n\n"),
            vec![Node::UnorderedList {
                items: vec![bullet("a", 0), bullet("b", 0)]
            }]
        );
    }

    #[test]
    fn ordered_list_nests_under_a_bullet() {
        assert_eq!(
            blocks("* a\n\t1. b\n* c\n"),
            vec![Node::UnorderedList {
                items: vec![
                    Node::UnorderedListItem {
                        children: vec![
                            Node::text("a"),
                            Node::OrderedList {
                                items: vec![item("b")]
                            },
                        ],
                        indent: 0,
                    },
                    bullet("c", 0),
                ]
            }]
        );
    }

    #[test]
    fn blank_line_closes_a_list() {
        let nodes = blocks("* a\n\nafter\n");
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[1], Node::Paragraph { .. }));
    }

    #[test]
    fn table_header_and_rows() {
        assert_eq!(
            blocks("a|b|c\n-|-|-\nd|e|f\ng|h|i\n\n"),
            vec![Node::Table {
                header: TableRow::parse("a|b|c"),
                rows: vec![TableRow::parse("d|e|f"), TableRow::parse("g|h|i")],
            }]
        );
    }

    #[test]
    fn table_without_body_rows() {
        let nodes = blocks("a|b|c\n-|-|-\n\n");
        assert!(matches!(&nodes[0], Node::Table { rows, .. } if rows.is_empty()));
    }

    #[test]
    fn table_like_line_without_marker_is_text() {
        assert_eq!(
            blocks("a|b|c\n\n"),
            vec![Node::Paragraph {
                children: vec![Node::text("a|b|c")]
            }]
        );
    }

    #[test]
    fn blockquote_with_a_bare_marker_line() {
        let nodes = blocks("> one\n>\n> two\n\n");
        assert_eq!(
            nodes,
            vec![Node::Blockquote {
                children: vec![
                    Node::text(" one"),
                    Node::text("\n"),
                    Node::text(" "),
                    Node::text("\n"),
                    Node::text(" two"),
                ]
            }]
        );
    }

    #[test]
    fn lazy_lines_continue_a_quote_until_a_blank_line() {
        let nodes = blocks("> one\ntwo\n\n> three\n\n");
        assert_eq!(
            nodes,
            vec![
                Node::Blockquote {
                    children: vec![Node::text(" one"), Node::text("\n"), Node::text("two")]
                },
                Node::Blockquote {
                    children: vec![Node::text(" three")]
                },
            ]
        );
    }

    #[test]
    fn indented_code_with_a_language_line() {
        assert_eq!(
            blocks("\t:::python\n\tprint(1)\n\n"),
            vec![Node::BlockCode {
                text: "print(1)\n".to_string(),
                language: "python".to_string(),
            }]
        );
    }

    #[test]
    fn indented_code_defaults_to_text() {
        assert_eq!(
            blocks("\tls\n\n"),
            vec![Node::BlockCode {
                text: "ls\n".to_string(),
                language: "text".to_string(),
            }]
        );
    }

    #[rstest::rstest]
    #[case("```bash\nls -la```\n", "ls -la", "bash")]
    #[case("```\nThis is a code block.```\n", "This is a code block.", "text")]
    #[case("~~~\nx = 1\n~~~\n", "x = 1\n", "text")]
    fn fenced_code_language_and_body(
        #[case] input: &str,
        #[case] text: &str,
        #[case] language: &str,
    ) {
        assert_eq!(
            blocks(input),
            vec![Node::FencedCode {
                text: text.to_string(),
                language: language.to_string(),
            }]
        );
    }

    #[test]
    fn figure_block() {
        assert_eq!(
            blocks("![Image](https://www.example.com/img.png)\n"),
            vec![Node::Figure {
                children: vec![Node::text("Image")],
                url: "https://www.example.com/img.png".to_string(),
            }]
        );
    }

    #[test]
    fn reference_definition_fills_the_table() {
        let output = parsed("[id]: http://example.com/  \n");
        assert_eq!(
            output.children,
            vec![Node::RefLinkDef {
                key: "id".to_string(),
                url: "http://example.com/".to_string(),
            }]
        );
        assert_eq!(output.references.get("id"), Some("http://example.com/"));
    }

    #[test]
    fn escaped_period_stays_in_the_paragraph() {
        assert_eq!(
            blocks("1986\\. What a great season.\n"),
            vec![Node::Paragraph {
                children: vec![
                    Node::text("1986"),
                    Node::text("."),
                    Node::text(" What a great season."),
                ]
            }]
        );
    }

    #[test]
    fn stray_token_is_discarded_with_a_diagnostic() {
        let output = parsed("==\ntext\n");
        assert_eq!(
            output.children,
            vec![Node::Paragraph {
                children: vec![Node::text("text")]
            }]
        );
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].line, 1);
    }
}
