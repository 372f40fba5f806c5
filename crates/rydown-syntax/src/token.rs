//! Token kinds produced by the [lexer](crate::lexer) and consumed by the
//! [parser](crate::parser).

use serde::Serialize;

/// The kind of a lexical token.
///
/// Kinds are coarse on purpose: the grammar decides whether a [`Text`] run
/// belongs to a paragraph, a heading or a link label. A handful of kinds
/// only exist while a particular [`Mode`](crate::lexer::Mode) is on top of
/// the lexer's stack (heading end, link url, table marker, nested ordered
/// items, list end).
///
/// [`Text`]: TokenKind::Text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `#` to `######` followed by a space, at the start of a line.
    HeadingStart,
    /// ` #` to ` ######` closing an ATX heading.
    HeadingEnd,
    /// A run of two or more `=`/`-` used to underline a setext heading.
    UnderDivider,
    /// Three or more `-`.
    HorizontalLine,
    /// `>` at the start of a line.
    Blockquote,
    /// `***text***`; the value is the text between the delimiters.
    EmphasisStrong,
    /// `**text**`
    Strong,
    /// `*text*`
    Emphasis,
    /// `` `code` ``; newline runs inside are collapsed to one space.
    InlineCode,
    /// A tab-indented block terminated by a blank line; the value is dedented.
    BlockCode,
    /// A fence whose opening line carries a language tag.
    FencedCodeWithLanguage,
    /// A fence without a language tag.
    FencedCode,
    /// A run of ordinary characters.
    Text,
    /// `[` opening a `[label](url)` link.
    LinkStart,
    /// `](url)`; the value is the url.
    LinkUrl,
    /// A stray `[` or `]`.
    LinkSpecialChar,
    /// `[` opening a `[label][key]` reference link.
    RefLinkStart,
    /// `][key]`; the value is the key.
    RefLinkKey,
    /// A whole `[key]: url` definition line.
    RefLinkDef,
    /// A table separator row such as `-|-|-` or `|:-:|-:|`.
    TableMarker,
    /// A line with at least two `|`-separated fields.
    TableContent,
    /// `1. ` with no indentation.
    OrderedItemStart,
    /// An ordered item indented by one unit.
    OrderedItem2Start,
    /// An ordered item indented by two units.
    OrderedItem3Start,
    /// An ordered item indented by three units.
    OrderedItem4Start,
    /// `*`, `+` or `-` followed by whitespace, optionally indented.
    UnorderedItemStart,
    /// A blank-line run that closes a list.
    ListEnd,
    /// `![` opening a figure.
    FigureStart,
    /// `](url)` closing a figure; the value is the url.
    FigureUrl,
    /// Two or more newlines, or a final newline at the end of input.
    BlankLines,
    /// A single newline.
    Newline,
    /// `\x`; the value is the escaped character.
    Escape,
    /// Past the last token.
    Eof,
}

impl TokenKind {
    /// Kinds that can begin a phrase (inline content).
    pub fn is_phrase_start(self) -> bool {
        matches!(
            self,
            TokenKind::Text
                | TokenKind::TableContent
                | TokenKind::LinkSpecialChar
                | TokenKind::Escape
                | TokenKind::EmphasisStrong
                | TokenKind::Strong
                | TokenKind::Emphasis
                | TokenKind::InlineCode
                | TokenKind::LinkStart
                | TokenKind::RefLinkStart
        )
    }

    /// Kinds that begin a list item of any flavour or depth.
    pub fn is_list_item_start(self) -> bool {
        self == TokenKind::UnorderedItemStart || self.ordered_depth().is_some()
    }

    /// Nesting depth (1..=4) of an ordered item start.
    pub fn ordered_depth(self) -> Option<usize> {
        match self {
            TokenKind::OrderedItemStart => Some(1),
            TokenKind::OrderedItem2Start => Some(2),
            TokenKind::OrderedItem3Start => Some(3),
            TokenKind::OrderedItem4Start => Some(4),
            _ => None,
        }
    }

    /// The ordered item start kind for a nesting depth.
    pub fn ordered_item(depth: usize) -> Option<TokenKind> {
        match depth {
            1 => Some(TokenKind::OrderedItemStart),
            2 => Some(TokenKind::OrderedItem2Start),
            3 => Some(TokenKind::OrderedItem3Start),
            4 => Some(TokenKind::OrderedItem4Start),
            _ => None,
        }
    }
}

/// A token with its decoded value.
///
/// `value` is what the grammar needs, not necessarily the source slice:
/// emphasis tokens drop their delimiters, escapes keep only the escaped
/// character, and code blocks are dedented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// 1-based line on which the token starts.
    pub line: usize,
    /// Indentation units (a tab or two spaces) in front of a list marker.
    pub indent: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            indent: 0,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_depth_roundtrips_through_kind() {
        for depth in 1..=4 {
            let kind = TokenKind::ordered_item(depth).unwrap();
            assert_eq!(kind.ordered_depth(), Some(depth));
            assert!(kind.is_list_item_start());
        }
        assert_eq!(TokenKind::ordered_item(5), None);
    }

    #[test]
    fn block_markers_are_not_phrases() {
        assert!(!TokenKind::Blockquote.is_phrase_start());
        assert!(!TokenKind::Newline.is_phrase_start());
        assert!(!TokenKind::FigureStart.is_phrase_start());
        assert!(TokenKind::TableContent.is_phrase_start());
    }
}
