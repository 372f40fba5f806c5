//! # Lexer - Moded Tokenizing
//!
//! The lexer turns document text into a flat [`Token`] sequence. The same
//! characters mean different things depending on context: a ` #` closes a
//! heading, `](` ends a link label, `-|-|-` only separates a table header
//! from its body. Context is tracked with a **stack of modes**.
//!
//! ## Modes
//!
//! ```text
//! Default ── `# `  ──▶ Heading  ── newline / ` #` ──▶ pop
//!         ── `[`   ──▶ Link     ── `](url)`       ──▶ pop
//!         ── `[`   ──▶ RefLink  ── `][key]`       ──▶ pop
//!         ── `![`  ──▶ Figure   ── `](url)`       ──▶ pop
//!         ── `* `  ──▶ List     ── blank lines    ──▶ pop
//!         ── `a|b|`──▶ Table    ── blank lines    ──▶ pop
//! ```
//!
//! Modes are *inclusive*: every default rule stays active inside a mode,
//! and the mode's own rules are simply tried first.
//!
//! ## Priority
//!
//! At each position the rules are tried in a fixed order and the **first**
//! match wins, not the longest. Block markers (headings, list items, quotes,
//! fences, tables, reference definitions) only match at the start of a line.
//!
//! ## Errors
//!
//! A character no rule accepts is reported as a [`Diagnostic`], logged, and
//! skipped. There is no fatal lexing error.
//!
//! ```
//! use rydown_syntax::lexer::tokenize;
//! use rydown_syntax::token::TokenKind;
//!
//! let kinds: Vec<_> = tokenize("# Title\n").into_iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::HeadingStart, TokenKind::Text, TokenKind::BlankLines]
//! );
//! ```

mod cursor;
mod indent;
mod rules;

use std::borrow::Cow;

use log::{debug, warn};

use crate::diagnostic::Diagnostic;
use crate::token::{Token, TokenKind};
use rules::{Lookahead, Match, Rule, Scan};

/// A lexical context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    Heading,
    Link,
    RefLink,
    Figure,
    List,
    Table,
}

impl Mode {
    /// Rules tried before the default table while this mode is on top.
    fn rules(self) -> &'static [Rule] {
        match self {
            Mode::Default => &[],
            Mode::Heading => HEADING_RULES,
            Mode::Link => LINK_RULES,
            Mode::RefLink => REF_LINK_RULES,
            Mode::Figure => FIGURE_RULES,
            Mode::List => LIST_RULES,
            Mode::Table => TABLE_RULES,
        }
    }

    /// Modes closed by a blank line when nothing else closed them. A link
    /// label left open never spans a paragraph break.
    fn closes_on_blank_line(self) -> bool {
        !matches!(self, Mode::Default)
    }
}

const HEADING_RULES: &[Rule] = &[rules::heading_text, rules::heading_end];
const LINK_RULES: &[Rule] = &[rules::link_url];
const REF_LINK_RULES: &[Rule] = &[rules::ref_link_key];
const FIGURE_RULES: &[Rule] = &[rules::figure_url];
const LIST_RULES: &[Rule] = &[rules::nested_ordered_item, rules::list_end];
const TABLE_RULES: &[Rule] = &[rules::table_marker];

const DEFAULT_RULES: &[Rule] = &[
    rules::heading_start,
    rules::horizontal_line,
    rules::emphasis_strong,
    rules::strong,
    rules::emphasis,
    rules::under_divider,
    rules::blockquote,
    rules::table_content,
    rules::ordered_item,
    rules::unordered_item,
    rules::block_code,
    rules::fenced_code_with_language,
    rules::fenced_code,
    rules::figure_start,
    rules::link_start,
    rules::ref_link_start,
    rules::inline_code,
    rules::escape,
    rules::comment,
    rules::blank_lines,
    rules::newline,
    rules::ref_link_def,
    rules::text,
    rules::link_special_char,
];

/// A reusable, stateful tokenizer.
///
/// The mode stack survives between calls to [`Lexer::tokenize`]; call
/// [`Lexer::reset`] before lexing an unrelated document.
#[derive(Debug)]
pub struct Lexer {
    modes: Vec<Mode>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            modes: vec![Mode::Default],
            diagnostics: Vec::new(),
        }
    }

    /// Drops every pushed mode and all collected diagnostics.
    pub fn reset(&mut self) {
        self.modes.clear();
        self.modes.push(Mode::Default);
        self.diagnostics.clear();
    }

    /// The innermost active mode.
    pub fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Default)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Tokenizes `text`, starting from the current mode stack.
    ///
    /// `\r\n` line endings are read as `\n`.
    pub fn tokenize(&mut self, text: &str) -> Vec<Token> {
        let text = normalize_newlines(text);
        let text = text.as_ref();
        let indents = indent::measure(text);
        let ahead = Lookahead::new(text);
        let mut tokens = Vec::new();
        let mut pos = 0;
        let mut line = 1;

        while pos < text.len() {
            let scan = Scan {
                text,
                pos,
                line: line - 1,
                line_start: pos == 0 || text.as_bytes()[pos - 1] == b'\n',
                indent: indents.get(line - 1).copied().unwrap_or_default(),
                in_list: self.modes.contains(&Mode::List),
                ahead: &ahead,
            };

            let Some(found) = self.first_match(&scan) else {
                let skipped = text[pos..].chars().next().map_or(1, char::len_utf8);
                let diagnostic = Diagnostic::lex(
                    line,
                    format!("illegal character {:?}", &text[pos..pos + skipped]),
                );
                warn!("{diagnostic}");
                self.diagnostics.push(diagnostic);
                pos += skipped;
                continue;
            };

            if let Some(kind) = found.kind {
                self.transition(kind);
                tokens.push(Token::new(kind, found.value, line).with_indent(found.indent));
            }
            line += text[pos..pos + found.len].matches('\n').count();
            pos += found.len;
        }

        tokens
    }

    fn first_match(&self, scan: &Scan<'_>) -> Option<Match> {
        self.mode()
            .rules()
            .iter()
            .chain(DEFAULT_RULES)
            .find_map(|rule| rule(scan))
    }

    /// Applies the mode change a token implies.
    fn transition(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::HeadingStart => self.push(Mode::Heading),
            TokenKind::LinkStart => self.push(Mode::Link),
            TokenKind::RefLinkStart => self.push(Mode::RefLink),
            TokenKind::FigureStart => self.push(Mode::Figure),
            TokenKind::OrderedItemStart | TokenKind::UnorderedItemStart => {
                if self.mode() != Mode::List {
                    self.push(Mode::List);
                }
            }
            TokenKind::TableContent => {
                if self.mode() != Mode::Table {
                    self.push(Mode::Table);
                }
            }
            TokenKind::HeadingEnd => self.pop(Mode::Heading),
            TokenKind::LinkUrl => self.pop(Mode::Link),
            TokenKind::RefLinkKey => self.pop(Mode::RefLink),
            TokenKind::FigureUrl => self.pop(Mode::Figure),
            TokenKind::Newline => self.pop(Mode::Heading),
            TokenKind::BlankLines | TokenKind::ListEnd => {
                while self.mode().closes_on_blank_line() {
                    debug!("leave {:?} mode at blank line", self.mode());
                    self.modes.pop();
                }
            }
            _ => {}
        }
    }

    fn push(&mut self, mode: Mode) {
        debug!("enter {mode:?} mode");
        self.modes.push(mode);
    }

    /// Pops `mode` if it is on top; the default mode is never popped.
    fn pop(&mut self, mode: Mode) {
        if mode != Mode::Default && self.mode() == mode {
            debug!("leave {mode:?} mode");
            self.modes.pop();
        }
    }
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Tokenizes `text` with a fresh [`Lexer`].
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new().tokenize(text)
}
