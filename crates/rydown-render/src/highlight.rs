//! Code block highlighting seam.
//!
//! Renderers hand code blocks to a [`Highlighter`] instead of formatting
//! them themselves, so a syntax highlighter can be plugged in by the caller.

/// Turns a code block into markup.
pub trait Highlighter {
    /// `language` is the block's language tag, `"text"` when none was given.
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Escapes the code and wraps it in `<pre>`, ignoring the language.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> String {
        format!("<pre>{}</pre>", html_escape::encode_text(code))
    }
}

impl<F> Highlighter for F
where
    F: Fn(&str, &str) -> String,
{
    fn highlight(&self, code: &str, language: &str) -> String {
        self(code, language)
    }
}
