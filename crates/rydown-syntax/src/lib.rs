//! # rydown-syntax
//!
//! Lexer, parser and reference resolver for the rydown Markdown dialect: a
//! small, deliberately constrained subset of Markdown aimed at static site
//! and wiki generation.
//!
//! ## Architecture Overview
//!
//! The pipeline has three stages:
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Nodes + RefTable → Walker → Document
//!               (modes)          (grammar)                   (resolve)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! A hand-written scanner with a stack of lexical modes. At each position
//! the first matching rule wins; the active mode's rules are tried before
//! the default ones.
//!
//! ```text
//! "# Hello\n" → [HeadingStart("# "), Text("Hello"), BlankLines("\n")]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Recursive descent over the token stream, building a typed [`ast::Node`]
//! tree. Reference definitions are collected into a [`RefTable`] on the way.
//!
//! ### 3. Walker ([`walker`] module)
//!
//! A depth-first pass that attaches URLs to reference links. A key without
//! a definition fails the whole parse with a [`ResolutionError`].
//!
//! ## Module Structure
//!
//! ```text
//! rydown-syntax/
//! ├── lib.rs           # This file - MarkdownParser session and parse()
//! ├── token.rs         # TokenKind and Token
//! ├── diagnostic.rs    # Recoverable lex/parse problems
//! ├── ast.rs           # Node, Document, RefTable
//! ├── walker.rs        # Reference resolution
//! ├── lexer/
//! │   ├── mod.rs       # Lexer, mode stack, rule priority
//! │   ├── rules.rs     # One function per token rule
//! │   ├── indent.rs    # Per-line indentation units
//! │   └── cursor.rs    # Byte cursor used by the rules
//! └── parser/
//!     ├── mod.rs       # Parser cursor and side tables
//!     └── grammar/
//!         ├── mod.rs   # Document production
//!         ├── block.rs # Headings, lists, quotes, tables, code
//!         └── inline.rs# Emphasis, code spans, links
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use rydown_syntax::{parse, ast::Node};
//!
//! let doc = parse("# Hello\n").unwrap();
//! assert_eq!(doc.max_heading_level, 1);
//! assert!(matches!(doc.children[0], Node::Heading { level: 1, .. }));
//! ```
//!
//! Reference links may be used before they are defined:
//!
//! ```
//! use rydown_syntax::parse;
//!
//! let doc = parse("[an example][id]\n\n[id]: http://example.com/\n").unwrap();
//! assert_eq!(doc.references.get("id"), Some("http://example.com/"));
//!
//! assert!(parse("[dangling][nowhere]\n").is_err());
//! ```

pub mod ast;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod walker;

use log::debug;

pub use ast::{Document, Node, RefTable, TableRow};
pub use diagnostic::Diagnostic;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};
pub use walker::ResolutionError;

/// A reusable parsing session.
///
/// Holds the lexer's mode stack, the running maximum heading level, the
/// reference table and the diagnostics of the last parse. [`parse`] resets
/// all of it first, so nothing leaks from one document into the next. One
/// session must not be shared between threads; create one per task.
///
/// [`parse`]: MarkdownParser::parse
#[derive(Debug, Default)]
pub struct MarkdownParser {
    lexer: Lexer,
    max_heading_level: u8,
    references: RefTable,
    diagnostics: Vec<Diagnostic>,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinitializes the mode stack and all parser state.
    pub fn reset(&mut self) {
        self.lexer.reset();
        self.max_heading_level = 0;
        self.references.clear();
        self.diagnostics.clear();
    }

    /// Lexes, parses and resolves `text` into a finished document.
    ///
    /// Leading whitespace is stripped before lexing. Lex and parse problems
    /// are recorded in [`diagnostics`](Self::diagnostics) and never fail the
    /// call; an undefined reference key does.
    pub fn parse(&mut self, text: &str) -> Result<Document, ResolutionError> {
        self.reset();

        let tokens = self.lexer.tokenize(text.trim_start());
        self.diagnostics.extend(self.lexer.take_diagnostics());
        debug!("lexed {} tokens", tokens.len());

        let output = Parser::new(&tokens).parse();
        self.max_heading_level = output.max_heading_level;
        self.references = output.references;
        self.diagnostics.extend(output.diagnostics);

        let mut children = output.children;
        walker::resolve(&mut children, &self.references)?;

        Ok(Document {
            children,
            max_heading_level: self.max_heading_level,
            references: self.references.clone(),
        })
    }

    /// Runs only the lexer, continuing from the current mode stack.
    pub fn tokenize(&mut self, text: &str) -> Vec<Token> {
        let tokens = self.lexer.tokenize(text);
        self.diagnostics.extend(self.lexer.take_diagnostics());
        tokens
    }

    /// Deepest ATX heading level of the last parse.
    pub fn max_heading_level(&self) -> u8 {
        self.max_heading_level
    }

    /// Reference definitions of the last parse.
    pub fn references(&self) -> &RefTable {
        &self.references
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Parses `text` with a fresh [`MarkdownParser`].
pub fn parse(text: &str) -> Result<Document, ResolutionError> {
    MarkdownParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn children(input: &str) -> Vec<Node> {
        parse(input).unwrap().children
    }

    #[rstest]
    #[case("# one\n", 1)]
    #[case("## two ##\n", 2)]
    #[case("### three\n", 3)]
    #[case("#### four ####\n", 4)]
    #[case("##### five\n", 5)]
    #[case("###### six ###\n", 6)]
    fn heading_level_counts_hashes(#[case] input: &str, #[case] level: u8) {
        let doc = parse(input).unwrap();
        assert!(matches!(doc.children[0], Node::Heading { level: l, .. } if l == level));
        assert_eq!(doc.max_heading_level, level);
    }

    #[test]
    fn heading_scenario() {
        assert_eq!(
            children("# Heading 1\n"),
            vec![Node::Heading {
                level: 1,
                children: vec![Node::text("Heading 1")]
            }]
        );
    }

    #[test]
    fn subheading_scenario() {
        assert_eq!(
            children("Heading 1\n=========\n"),
            vec![Node::Subheading {
                children: vec![Node::text("Heading 1")]
            }]
        );
    }

    #[rstest]
    #[case("*text*", Node::Emphasis { children: vec![Node::text("text")] })]
    #[case("**text**", Node::Strong { children: vec![Node::text("text")] })]
    #[case("***text***", Node::EmphasisStrong { children: vec![Node::text("text")] })]
    fn emphasis_wraps_content_verbatim(#[case] input: &str, #[case] expected: Node) {
        assert_eq!(
            children(input),
            vec![Node::Paragraph {
                children: vec![expected]
            }]
        );
    }

    #[test]
    fn bullet_list_scenario() {
        let nodes = children("* apples\n* oranges\n* pears\n\n");
        let [Node::UnorderedList { items }] = nodes.as_slice() else {
            panic!("expected one list, got {nodes:?}");
        };
        assert_eq!(items.len(), 3);
        assert!(
            items
                .iter()
                .all(|item| matches!(item, Node::UnorderedListItem { indent: 0, .. }))
        );
    }

    #[test]
    fn tab_and_space_indents_nest_the_same() {
        assert_eq!(children("* a\n  * b\n"), children("* a\n\t* b\n"));
        let nodes = children("* a\n\t* b\n");
        assert!(matches!(
            &nodes[0],
            Node::UnorderedList { items } if matches!(items[1], Node::UnorderedListItem { indent: 1, .. })
        ));
    }

    #[test]
    fn reference_link_scenario() {
        let doc = parse("[an example][id]\n\n[id]: http://example.com/\n").unwrap();
        assert_eq!(
            doc.children[0],
            Node::Paragraph {
                children: vec![Node::RefLink {
                    children: vec![Node::text("an example")],
                    key: "id".to_string(),
                    url: Some("http://example.com/".to_string()),
                }]
            }
        );
        assert_eq!(
            doc.references.iter().collect::<Vec<_>>(),
            [("id", "http://example.com/")]
        );
    }

    #[test]
    fn reference_resolution_is_order_independent() {
        let url = |input: &str| {
            let doc = parse(input).unwrap();
            let link = doc
                .children
                .iter()
                .flat_map(Node::children)
                .find(|n| matches!(n, Node::RefLink { .. }))
                .cloned();
            match link {
                Some(Node::RefLink { url, .. }) => url,
                _ => None,
            }
        };
        assert_eq!(url("[a][k]\n\n[k]: /url\n"), Some("/url".to_string()));
        assert_eq!(url("[k]: /url\n\n[a][k]\n"), Some("/url".to_string()));
    }

    #[test]
    fn missing_reference_fails_the_parse() {
        let err = parse("[a][one] and [b][two]\n").unwrap_err();
        assert_eq!(err.keys, ["one", "two"]);
    }

    #[test]
    fn ordered_numbers_are_ignored() {
        let nodes = children("2. a\n3. b\n1. c\n");
        let [Node::OrderedList { items }] = nodes.as_slice() else {
            panic!("expected one ordered list, got {nodes:?}");
        };
        let texts: Vec<_> = items.iter().map(Node::plain_text).collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn table_scenario() {
        let nodes = children("a|b|c\n-|-|-\n\n");
        let [Node::Table { header, rows }] = nodes.as_slice() else {
            panic!("expected one table, got {nodes:?}");
        };
        assert_eq!(header.cells.len(), 3);
        assert!(rows.is_empty());
    }

    #[test]
    fn comment_scenario() {
        assert_eq!(
            children("<-- Comment -->Comment in the beginning of line\n"),
            vec![Node::Paragraph {
                children: vec![Node::text("Comment in the beginning of line")]
            }]
        );
        assert_eq!(children("<-- Comment -->"), vec![]);
    }

    #[test]
    fn leading_whitespace_is_stripped() {
        assert_eq!(children("\n\n  # Title\n"), children("# Title\n"));
    }

    #[test]
    fn reset_between_parses_leaks_nothing() {
        let text = "## Title\n\n[a][k]\n\n[k]: /k\n";
        let mut parser = MarkdownParser::new();
        let first = parser.parse(text).unwrap();
        parser.reset();
        let second = parser.parse(text).unwrap();
        assert_eq!(first, second);

        parser.parse("plain\n").unwrap();
        assert_eq!(parser.max_heading_level(), 0);
        assert!(parser.references().is_empty());
    }

    #[test]
    fn walker_agrees_with_the_running_maximum() {
        let doc = parse("## a\n\n> q\n\n#### b\n").unwrap();
        assert_eq!(walker::max_heading_level(&doc.children), doc.max_heading_level);
        assert_eq!(doc.max_heading_level, 4);
    }

    #[test]
    fn diagnostics_are_collected_from_both_stages() {
        let mut parser = MarkdownParser::new();
        let doc = parser.parse("5 * 3\n\n==\n\nok\n").unwrap();
        assert_eq!(doc.children.len(), 2);
        let stages: Vec<_> = parser.diagnostics().iter().map(|d| d.stage).collect();
        assert_eq!(
            stages,
            [diagnostic::Stage::Lex, diagnostic::Stage::Parse]
        );
    }

    #[test]
    fn document_serializes_to_yaml() {
        let doc = parse("# Hi\n\n[x][k]\n\n[k]: /k\n").unwrap();
        insta::assert_yaml_snapshot!(doc, @r#"
        children:
          - kind: heading
            level: 1
            children:
              - kind: text
                text: Hi
          - kind: paragraph
            children:
              - kind: ref_link
                children:
                  - kind: text
                    text: x
                key: k
                url: /k
          - kind: ref_link_def
            key: k
            url: /k
        max_heading_level: 1
        references:
          k: /k
        "#);
    }
}
