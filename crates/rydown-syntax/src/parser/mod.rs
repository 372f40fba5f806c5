//! # Parser - Recursive Descent over Tokens
//!
//! The parser walks the flat token stream produced by the
//! [`lexer`](crate::lexer) and builds [`Node`]s directly. Every production
//! is a function in [`grammar`] that receives `&mut Parser` and uses its
//! methods to:
//!
//! - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`
//! - Consume tokens: `bump()`, `eat()`
//! - Record side effects: `define()`, `saw_heading()`, `error()`
//!
//! ## Side Tables
//!
//! Two values are collected while the tree is built rather than computed
//! afterwards:
//!
//! - the **reference table**: every `[key]: url` definition, in whatever order
//!   it appears. Reference links are *not* looked up here; the
//!   [`walker`](crate::walker) does that once the whole document is read,
//!   so a definition may follow its use.
//! - the **maximum heading level** seen so far.
//!
//! ## Error Recovery
//!
//! When no production accepts the current token, the parser records a
//! [`Diagnostic`] naming the token and its line, discards exactly that
//! token and carries on with the next block. Parsing never fails; a
//! malformed document still yields a best-effort tree.
//!
//! ```
//! use rydown_syntax::lexer::tokenize;
//! use rydown_syntax::parser::Parser;
//!
//! let tokens = tokenize("# Hello\n");
//! let output = Parser::new(&tokens).parse();
//! assert_eq!(output.children.len(), 1);
//! assert_eq!(output.max_heading_level, 1);
//! ```

mod grammar;

use log::warn;

use crate::ast::{Node, RefTable};
use crate::diagnostic::Diagnostic;
use crate::token::{Token, TokenKind};

/// Everything one pass over a token stream produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    pub children: Vec<Node>,
    pub references: RefTable,
    pub max_heading_level: u8,
    pub diagnostics: Vec<Diagnostic>,
}

/// The parser state machine.
///
/// Holds the token stream, the current position and the side tables that
/// productions update as they reduce.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    references: RefTable,
    max_heading_level: u8,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            references: RefTable::new(),
            max_heading_level: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parses the whole token stream.
    pub fn parse(mut self) -> ParseOutput {
        let children = grammar::document(&mut self);
        ParseOutput {
            children,
            references: self.references,
            max_heading_level: self.max_heading_level,
            diagnostics: self.diagnostics,
        }
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> TokenKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> TokenKind {
        self.nth_token(n).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    pub fn nth_token(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Value of the current token, empty at EOF.
    pub fn current_text(&self) -> &'t str {
        self.nth_token(0).map(|t| t.value.as_str()).unwrap_or("")
    }

    /// Line of the current token; past the end, the line of the last one.
    pub fn current_line(&self) -> usize {
        self.nth_token(0)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    /// Records a parse diagnostic at the current token.
    pub fn error(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::parse(self.current_line(), message);
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Adds a reference definition; a later one replaces an earlier one.
    pub fn define(&mut self, key: impl Into<String>, url: impl Into<String>) {
        self.references.insert(key, url);
    }

    pub fn saw_heading(&mut self, level: u8) {
        self.max_heading_level = self.max_heading_level.max(level);
    }
}
