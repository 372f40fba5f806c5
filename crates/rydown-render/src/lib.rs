//! # rydown-render
//!
//! Turns a resolved [`rydown_syntax::Document`] into HTML or MediaWiki
//! markup.
//!
//! ```
//! let html = rydown_render::to_html("# Hi\n\nIt's *here*.\n").unwrap();
//! assert_eq!(html, "<h1>Hi</h1>\n<p>It&rsquo;s <em>here</em>.</p>\n");
//!
//! let wiki = rydown_render::to_wiki("# Hi\n").unwrap();
//! assert_eq!(wiki, "= Hi =\n");
//! ```
//!
//! Code blocks are passed to a [`Highlighter`]; [`PlainHighlighter`] only
//! escapes them.

pub mod highlight;
pub mod html;
pub mod text;
pub mod wiki;

use std::fmt;
use std::str::FromStr;

use log::debug;
use rydown_syntax::{Document, MarkdownParser, ResolutionError};

pub use highlight::{Highlighter, PlainHighlighter};
pub use html::{HtmlRenderer, DEFAULT_TAB_WIDTH};
pub use wiki::WikiRenderer;

/// Output markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Html,
    Wiki,
}

impl Format {
    /// File extension for rendered output.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Wiki => "wiki",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Html => "html",
            Format::Wiki => "wiki",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Format::Html),
            "wiki" | "mediawiki" => Ok(Format::Wiki),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Renders `document` with the default tab width.
pub fn render(document: &Document, format: Format, highlighter: &dyn Highlighter) -> String {
    render_with_tab_width(document, format, highlighter, DEFAULT_TAB_WIDTH)
}

pub fn render_with_tab_width(
    document: &Document,
    format: Format,
    highlighter: &dyn Highlighter,
    tab_width: usize,
) -> String {
    debug!(
        "rendering {} blocks as {format} (tab width {tab_width})",
        document.children.len()
    );
    match format {
        Format::Html => HtmlRenderer::new(highlighter)
            .with_tab_width(tab_width)
            .render(document),
        Format::Wiki => WikiRenderer::new(highlighter)
            .with_tab_width(tab_width)
            .render(document),
    }
}

/// Parses and renders in one step.
pub fn convert(text: &str, format: Format) -> Result<String, ResolutionError> {
    let document = MarkdownParser::new().parse(text)?;
    Ok(render(&document, format, &PlainHighlighter))
}

pub fn to_html(text: &str) -> Result<String, ResolutionError> {
    convert(text, Format::Html)
}

pub fn to_wiki(text: &str) -> Result<String, ResolutionError> {
    convert(text, Format::Wiki)
}
