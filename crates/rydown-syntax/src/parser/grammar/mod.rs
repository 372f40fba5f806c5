//! # Grammar Rules
//!
//! Each production is a function that takes a `&mut Parser`, consumes the
//! tokens it recognises and returns the node it built.
//!
//! ## Module Structure
//!
//! - [`block`] - Block-level productions (headings, paragraphs, lists,
//!   quotes, tables, code, reference definitions)
//! - [`inline`] - Phrases inside a block (emphasis, code spans, links)
//!
//! ## Shape
//!
//! ```text
//! Document   := Block*
//! Block      := Heading | Subheading | Paragraph | Figure | UnorderedList
//!             | OrderedList | BlockCode | FencedCode | Blockquote
//!             | HorizontalLine | Table | RefLinkDef
//! Heading    := HEADING_START Phrase* [HEADING_END] (NEWLINE | BLANK_LINES | EOF)
//! Subheading := Phrase+ NEWLINE (UNDER_DIVIDER | HORIZONTAL_LINE) (NEWLINE | BLANK_LINES | EOF)
//! Paragraph  := Phrase+ (NEWLINE | BLANK_LINES | EOF)
//! ```
//!
//! Lists, quotes and tables are described next to their functions in
//! [`block`].

mod block;
mod inline;

use crate::ast::Node;
use crate::parser::Parser;
use crate::token::TokenKind;

/// Parse the root document.
pub fn document(p: &mut Parser<'_>) -> Vec<Node> {
    let mut children = Vec::new();
    while !p.at_end() {
        if let Some(node) = block::block(p) {
            children.push(node);
        }
    }
    children
}

/// Consumes the end of a line-terminated block.
///
/// Returns false, consuming nothing, when the block is followed by something
/// other than a line break.
fn end_of_block(p: &mut Parser<'_>) -> bool {
    p.eat(TokenKind::Newline) || p.eat(TokenKind::BlankLines) || p.at_end()
}

/// A table starts `offset` tokens ahead: content row, newline, marker row.
fn table_ahead(p: &Parser<'_>, offset: usize) -> bool {
    p.nth(offset) == TokenKind::TableContent
        && p.nth(offset + 1) == TokenKind::Newline
        && p.nth(offset + 2) == TokenKind::TableMarker
}
