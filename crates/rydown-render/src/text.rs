//! Typography for plain text runs.
//!
//! Both renderers escape the same characters and curl the same quotes.
//! HTML output additionally folds newlines into spaces and turns `---` and
//! `--` into em and en dashes.

use std::sync::OnceLock;

use regex::Regex;

/// Text of a `Text` node as HTML.
pub fn html_text(raw: &str) -> String {
    let value = raw.replace('\n', " ");
    let value = escape_ampersands(&value);
    let value = value.replace("---", "&mdash;").replace("--", "&ndash;");
    let value = value.replace('<', "&lt;").replace('>', "&gt;");
    smart_quotes(&value)
}

/// Text of a `Text` node as wiki markup. Line breaks are kept.
pub fn wiki_text(raw: &str) -> String {
    let value = escape_ampersands(raw);
    let value = value.replace('<', "&lt;").replace('>', "&gt;");
    smart_quotes(&value)
}

/// Code spans only get the markup characters escaped.
pub fn code_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes every `&` that does not already start an entity such as
/// `&amp;` or `&#8212;`.
pub fn escape_ampersands(value: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let entity = ENTITY.get_or_init(|| Regex::new(r"^[\w#]\w+;").expect("Invalid entity regex"));

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at + 1..];
        if entity.is_match(rest) {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
    }
    out.push_str(rest);
    out
}

/// Which neighbour of a quote decides its direction.
#[derive(Clone, Copy)]
enum Side {
    /// Closing: the quote follows a non-space.
    Right,
    /// Opening: the quote precedes a non-space.
    Left,
}

/// Quote passes, in order. Pairs come first so `"'` is not split into two
/// single-quote decisions, and right-hand quotes come before left-hand ones
/// so apostrophes close.
const QUOTE_PASSES: [(&str, &str, Side); 8] = [
    ("\"'", "&rdquo;&rsquo;", Side::Right),
    ("\"'", "&ldquo;&lsquo;", Side::Left),
    ("'\"", "&rsquo;&rdquo;", Side::Right),
    ("'\"", "&lsquo;&ldquo;", Side::Left),
    ("'", "&rsquo;", Side::Right),
    ("'", "&lsquo;", Side::Left),
    ("\"", "&rdquo;", Side::Right),
    ("\"", "&ldquo;", Side::Left),
];

/// Replaces straight quotes with curly entities.
///
/// A quote touching a non-space on its left closes, one touching a
/// non-space on its right opens. Only the space character counts as space,
/// and both ends of the text behave as if padded with one.
pub fn smart_quotes(value: &str) -> String {
    let mut padded = format!(" {value} ");
    for (quote, entity, side) in QUOTE_PASSES {
        padded = replace_quote(&padded, quote, entity, side);
    }
    padded[1..padded.len() - 1].to_string()
}

fn replace_quote(s: &str, quote: &str, entity: &str, side: Side) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while let Some(c) = s[i..].chars().next() {
        if s[i..].starts_with(quote) {
            let touching = match side {
                Side::Right => !s[..i].ends_with(' '),
                Side::Left => !s[i + quote.len()..].starts_with(' '),
            };
            if touching {
                out.push_str(entity);
                i += quote.len();
                continue;
            }
        }
        out.push(c);
        i += c.len_utf8();
    }
    out
}

/// Expands tabs to `width` spaces.
pub fn expand_tabs(code: &str, width: usize) -> String {
    code.replace('\t', &" ".repeat(width))
}
