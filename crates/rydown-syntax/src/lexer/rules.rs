//! Individual token rules.
//!
//! Each rule looks at the input from the current scan position and either
//! declines or returns a [`Match`]. Rules never look at the mode stack; the
//! [`Lexer`](super::Lexer) picks which rules are active and applies the mode
//! transitions afterwards.

use super::cursor::Cursor;
use super::indent::LineIndent;
use crate::token::TokenKind;

/// Where a rule is being tried.
pub struct Scan<'a> {
    pub text: &'a str,
    pub pos: usize,
    /// Zero-based index of the line holding `pos`.
    pub line: usize,
    /// True when `pos` is the first byte of a line.
    pub line_start: bool,
    pub indent: LineIndent,
    /// Indented code is not recognised inside a list.
    pub in_list: bool,
    pub ahead: &'a Lookahead,
}

/// Closer positions found once per text.
///
/// Rules that search forward for a closer consult this first, so an opener
/// that can never close is rejected without rescanning the rest of the text.
#[derive(Debug)]
pub struct Lookahead {
    /// For each line opening a run of tab-indented lines, the newline that
    /// ends the run if it can form an indented code block.
    code_run_end: Vec<Option<usize>>,
    last_backtick: Option<usize>,
    last_comment_close: Option<usize>,
}

impl Lookahead {
    pub fn new(text: &str) -> Self {
        Self {
            code_run_end: code_run_ends(text),
            last_backtick: text.rfind('`'),
            last_comment_close: text.rfind("-->"),
        }
    }
}

/// Walks the lines backwards so each run of tab-indented lines is measured
/// once. A run ends at its last line's newline; it has none when that line
/// is unterminated or holds only the tab.
fn code_run_ends(text: &str) -> Vec<Option<usize>> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(at, _)| at + 1));
    let tabbed = |line: usize| starts.get(line).is_some_and(|&at| text[at..].starts_with('\t'));
    let mut ends = vec![None; starts.len()];
    for line in (0..starts.len()).rev() {
        if !tabbed(line) {
            continue;
        }
        ends[line] = if tabbed(line + 1) {
            ends[line + 1]
        } else {
            // the next line exists only if this one ends in a newline
            let newline = starts.get(line + 1).map(|next| next - 1);
            newline.filter(|&at| at > starts[line] + 1)
        };
    }
    ends
}

impl<'a> Scan<'a> {
    fn cursor(&self) -> Cursor<'a> {
        Cursor::new(self.text, self.pos)
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }
}

/// A successful rule match.
#[derive(Debug, PartialEq, Eq)]
pub struct Match {
    /// `None` for input that is consumed without producing a token.
    pub kind: Option<TokenKind>,
    /// Bytes consumed.
    pub len: usize,
    pub value: String,
    pub indent: usize,
}

impl Match {
    fn token(kind: TokenKind, len: usize, value: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            len,
            value: value.into(),
            indent: 0,
        }
    }

    /// A token whose value is the consumed source slice.
    fn verbatim(kind: TokenKind, scan: &Scan<'_>, len: usize) -> Self {
        Self::token(kind, len, &scan.text[scan.pos..scan.pos + len])
    }

    fn discard(len: usize) -> Self {
        Self {
            kind: None,
            len,
            value: String::new(),
            indent: 0,
        }
    }
}

pub type Rule = fn(&Scan<'_>) -> Option<Match>;

fn is_cell_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == ' '
}

fn is_text_byte(b: u8) -> bool {
    !matches!(b, b'`' | b'*' | b'\n' | b'\\' | b'[' | b']')
}

pub fn heading_start(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let mut cur = scan.cursor();
    let hashes = cur.eat_while(|b| b == b'#');
    if !(1..=6).contains(&hashes) || cur.peek() != Some(b' ') {
        return None;
    }
    Some(Match::verbatim(TokenKind::HeadingStart, scan, hashes + 1))
}

pub fn heading_end(scan: &Scan<'_>) -> Option<Match> {
    let mut cur = scan.cursor();
    if cur.bump() != Some(b' ') {
        return None;
    }
    let hashes = cur.eat_while(|b| b == b'#');
    if hashes == 0 {
        return None;
    }
    Some(Match::verbatim(TokenKind::HeadingEnd, scan, 1 + hashes.min(6)))
}

/// Heading text stops before `#` and never ends right in front of one, so a
/// closing ` ###` is left for [`heading_end`].
pub fn heading_text(scan: &Scan<'_>) -> Option<Match> {
    let mut cur = scan.cursor();
    let mut len = cur.eat_while(|b| is_text_byte(b) && b != b'#');
    if len == 0 {
        return None;
    }
    if cur.peek() == Some(b'#') {
        let last = scan.rest()[..len].chars().next_back()?;
        len -= last.len_utf8();
    }
    (len > 0).then(|| Match::verbatim(TokenKind::Text, scan, len))
}

pub fn horizontal_line(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let len = scan.cursor().eat_while(|b| b == b'-');
    (len >= 3).then(|| Match::token(TokenKind::HorizontalLine, len, "----"))
}

/// Matches `n` stars, content, `n` stars.
///
/// Content is either a single run free of spaces and stars, or a non-space
/// character, a star-free run, and a non-space character. A lone space
/// right inside a delimiter never matches.
fn starred(scan: &Scan<'_>, n: usize, kind: TokenKind) -> Option<Match> {
    let stars = &b"***"[..n];
    let mut cur = scan.cursor();
    if !cur.starts_with(stars) {
        return None;
    }
    cur.bump_n(n);
    let open = cur.i;

    // first non-space char, a star-free run, then a non-space char
    let mut alt = cur.clone();
    if alt.bump_char().is_some_and(|c| c != ' ') {
        let run_start = alt.i;
        if alt.eat_while(|b| b != b'*') > 0 {
            let run_end = alt.i;
            let tail = scan.text[run_end..].as_bytes();
            // the closing char is itself the first of n + 1 stars
            if tail.len() > n && tail[..=n].iter().all(|b| *b == b'*') {
                return Some(finish_starred(scan, kind, n, open, run_end + 1));
            }
            // the closing char is the last char of the run
            let last = scan.text[run_start..run_end].chars().next_back()?;
            if last != ' ' && run_end - last.len_utf8() > run_start && tail.starts_with(stars) {
                return Some(finish_starred(scan, kind, n, open, run_end));
            }
        }
    }

    // a single run without spaces or stars
    let mut alt = cur;
    let run = alt.eat_while(|b| b != b'*' && b != b' ');
    if run > 0 && alt.starts_with(stars) {
        return Some(finish_starred(scan, kind, n, open, alt.i));
    }
    None
}

fn finish_starred(scan: &Scan<'_>, kind: TokenKind, n: usize, open: usize, close: usize) -> Match {
    let value = &scan.text[open..close];
    Match::token(kind, close + n - scan.pos, value)
}

pub fn emphasis_strong(scan: &Scan<'_>) -> Option<Match> {
    starred(scan, 3, TokenKind::EmphasisStrong)
}

pub fn strong(scan: &Scan<'_>) -> Option<Match> {
    starred(scan, 2, TokenKind::Strong)
}

pub fn emphasis(scan: &Scan<'_>) -> Option<Match> {
    starred(scan, 1, TokenKind::Emphasis)
}

pub fn under_divider(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let len = scan.cursor().eat_while(|b| b == b'=' || b == b'-');
    (len >= 2).then(|| Match::verbatim(TokenKind::UnderDivider, scan, len))
}

pub fn blockquote(scan: &Scan<'_>) -> Option<Match> {
    (scan.line_start && scan.rest().starts_with('>'))
        .then(|| Match::verbatim(TokenKind::Blockquote, scan, 1))
}

const SEPARATOR_PIECES: [&[u8]; 4] = [b":-:", b":-", b"-:", b"-"];

/// A separator row. It has to fill the rest of its line.
pub fn table_marker(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let mut cur = scan.cursor();
    loop {
        let mut piece = cur.clone();
        if piece.peek() == Some(b'|') {
            piece.bump();
        }
        let Some(body) = SEPARATOR_PIECES.into_iter().find(|pat| piece.starts_with(pat)) else {
            break;
        };
        piece.bump_n(body.len());
        if piece.peek() == Some(b'|') {
            piece.bump();
        }
        cur = piece;
    }
    let len = cur.i - scan.pos;
    let ends_line = matches!(cur.peek(), None | Some(b'\n'));
    (len > 0 && ends_line).then(|| Match::verbatim(TokenKind::TableMarker, scan, len))
}

/// `cell|cell|...`: a run of word characters, `-`, spaces and pipes holding
/// at least two pipes, each preceded by a non-empty cell.
pub fn table_content(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let mut cur = scan.cursor();
    for _ in 0..2 {
        if cur.eat_chars_while(is_cell_char) == 0 || cur.bump() != Some(b'|') {
            return None;
        }
    }
    cur.eat_chars_while(|c| is_cell_char(c) || c == '|');
    Some(Match::verbatim(TokenKind::TableContent, scan, cur.i - scan.pos))
}

/// `digits. ` after `skip` bytes of indentation.
fn ordered_marker(scan: &Scan<'_>, skip: usize) -> Option<usize> {
    let mut cur = scan.cursor();
    cur.bump_n(skip);
    if cur.eat_while(|b| b.is_ascii_digit()) == 0 || cur.bump() != Some(b'.') {
        return None;
    }
    matches!(cur.bump(), Some(b' ' | b'\t')).then_some(cur.i - scan.pos)
}

pub fn ordered_item(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start || scan.indent.units != 0 {
        return None;
    }
    let len = ordered_marker(scan, 0)?;
    Some(Match::verbatim(TokenKind::OrderedItemStart, scan, len))
}

/// Ordered items led by one to three tabs; only tried inside a list.
///
/// Tiers count literal tabs. Space indentation never selects one.
pub fn nested_ordered_item(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let tabs = scan.rest().bytes().take_while(|b| *b == b'\t').count();
    let kind = TokenKind::ordered_item(tabs + 1).filter(|_| tabs > 0)?;
    let len = ordered_marker(scan, tabs)?;
    let mut m = Match::verbatim(kind, scan, len);
    m.indent = tabs;
    Some(m)
}

/// A bullet after any indentation. A single space left over from the units
/// is allowed, so `1. a` followed by `   * b` still nests the bullet.
pub fn unordered_item(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let mut cur = scan.cursor();
    cur.bump_n(scan.indent.width);
    if cur.peek() == Some(b' ') {
        cur.bump();
    }
    if !matches!(cur.bump(), Some(b'*' | b'+' | b'-')) {
        return None;
    }
    if cur.eat_while(|b| b == b' ' || b == b'\t') == 0 {
        return None;
    }
    let mut m = Match::verbatim(TokenKind::UnorderedItemStart, scan, cur.i - scan.pos);
    m.indent = scan.indent.units;
    Some(m)
}

/// Consecutive tab-indented lines, the last one non-empty and followed by a
/// blank line or the end of input.
pub fn block_code(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start || scan.in_list || !scan.rest().starts_with('\t') {
        return None;
    }
    let text = scan.text;
    let last_line_end = scan.ahead.code_run_end.get(scan.line).copied().flatten()?;
    let mut end = last_line_end + 1;
    end += text[end..].bytes().take_while(|b| *b == b'\n').count();
    if end == last_line_end + 1 && end != text.len() {
        return None;
    }
    let body = &text[scan.pos..last_line_end];
    let mut value = dedent(body);
    value.push('\n');
    Some(Match::token(TokenKind::BlockCode, end - scan.pos, value))
}

fn is_fence_byte(b: u8) -> bool {
    b == b'`' || b == b'~'
}

/// Finds where a fence body opened at `body` closes: the first "```", or
/// failing that the last run of three fence characters.
fn fence_close(text: &str, body: usize) -> Option<usize> {
    if let Some(at) = text[body..].find("```") {
        return Some(body + at);
    }
    let bytes = text.as_bytes();
    (body..=bytes.len().checked_sub(3)?)
        .rev()
        .find(|&at| bytes[at..at + 3].iter().all(|b| is_fence_byte(*b)))
}

fn fence(scan: &Scan<'_>, tagged: bool) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let mut cur = scan.cursor();
    for _ in 0..3 {
        if !cur.bump().is_some_and(is_fence_byte) {
            return None;
        }
    }
    if tagged {
        match cur.peek_char() {
            Some('\n' | '`') | None => return None,
            Some(_) => {
                cur.bump_char();
            }
        }
    }
    let close = fence_close(scan.text, cur.i)?;
    let len = close + 3 - scan.pos;
    let kind = if tagged {
        TokenKind::FencedCodeWithLanguage
    } else {
        TokenKind::FencedCode
    };
    Some(Match::token(kind, len, dedent(&scan.text[scan.pos..close + 3])))
}

pub fn fenced_code_with_language(scan: &Scan<'_>) -> Option<Match> {
    fence(scan, true)
}

pub fn fenced_code(scan: &Scan<'_>) -> Option<Match> {
    fence(scan, false)
}

/// Confirms that a bracket opened just before `from` is closed by `]`
/// followed by `open`, a non-space target and `close`.
///
/// The label may span lines but not contain another bracket, so the scan
/// stops at the first bracket it meets.
fn has_bracket_target(text: &str, from: usize, open: u8, close: u8) -> bool {
    let mut cur = Cursor::new(text, from);
    let label = cur.eat_while(|b| b != b'[' && b != b']');
    if label == 0 || cur.bump() != Some(b']') || cur.bump() != Some(open) {
        return false;
    }
    target_len(cur.rest(), close).is_some()
}

/// Length of a target ended by `close` at the start of `s`. The target is
/// the longest non-space run that ends in `close`, with at least one byte
/// before it.
fn target_len(s: &str, close: u8) -> Option<usize> {
    let run = s
        .find(|c: char| c.is_whitespace())
        .unwrap_or(s.len());
    let at = s.as_bytes()[..run].iter().rposition(|b| *b == close)?;
    (at > 0).then_some(at)
}

pub fn figure_start(scan: &Scan<'_>) -> Option<Match> {
    (scan.rest().starts_with("![") && has_bracket_target(scan.text, scan.pos + 2, b'(', b')'))
        .then(|| Match::verbatim(TokenKind::FigureStart, scan, 2))
}

pub fn link_start(scan: &Scan<'_>) -> Option<Match> {
    (scan.rest().starts_with('[') && has_bracket_target(scan.text, scan.pos + 1, b'(', b')'))
        .then(|| Match::verbatim(TokenKind::LinkStart, scan, 1))
}

pub fn ref_link_start(scan: &Scan<'_>) -> Option<Match> {
    (scan.rest().starts_with('[') && has_bracket_target(scan.text, scan.pos + 1, b'[', b']'))
        .then(|| Match::verbatim(TokenKind::RefLinkStart, scan, 1))
}

fn closing_target(scan: &Scan<'_>, opener: &str, close: u8, kind: TokenKind) -> Option<Match> {
    let after = scan.rest().strip_prefix(opener)?;
    let at = target_len(after, close)?;
    Some(Match::token(kind, opener.len() + at + 1, &after[..at]))
}

pub fn link_url(scan: &Scan<'_>) -> Option<Match> {
    closing_target(scan, "](", b')', TokenKind::LinkUrl)
}

pub fn figure_url(scan: &Scan<'_>) -> Option<Match> {
    closing_target(scan, "](", b')', TokenKind::FigureUrl)
}

pub fn ref_link_key(scan: &Scan<'_>) -> Option<Match> {
    closing_target(scan, "][", b']', TokenKind::RefLinkKey)
}

pub fn inline_code(scan: &Scan<'_>) -> Option<Match> {
    if scan.ahead.last_backtick.is_none_or(|at| at <= scan.pos) {
        return None;
    }
    let body = scan.rest().strip_prefix('`')?;
    let at = body.find('`')?;
    if at == 0 {
        return None;
    }
    let mut value = String::with_capacity(at);
    let mut in_newlines = false;
    for c in body[..at].chars() {
        if c == '\n' {
            if !in_newlines {
                value.push(' ');
            }
            in_newlines = true;
        } else {
            value.push(c);
            in_newlines = false;
        }
    }
    Some(Match::token(TokenKind::InlineCode, at + 2, value))
}

pub fn escape(scan: &Scan<'_>) -> Option<Match> {
    let mut cur = scan.cursor();
    if cur.bump() != Some(b'\\') {
        return None;
    }
    let c = cur.bump_char()?;
    if c.is_whitespace() {
        return None;
    }
    Some(Match::token(TokenKind::Escape, cur.i - scan.pos, c.to_string()))
}

/// `<!-- ... -->` or `<-- ... -->`, swallowing the newlines after it.
pub fn comment(scan: &Scan<'_>) -> Option<Match> {
    let rest = scan.rest();
    let body = rest
        .strip_prefix("<!--")
        .or_else(|| rest.strip_prefix("<--"))?;
    let body_start = scan.pos + rest.len() - body.len();
    if scan.ahead.last_comment_close.is_none_or(|at| at < body_start) {
        return None;
    }
    let close = body.find("-->")?;
    let mut len = rest.len() - body.len() + close + 3;
    len += rest[len..].bytes().take_while(|b| *b == b'\n').count();
    Some(Match::discard(len))
}

pub fn blank_lines(scan: &Scan<'_>) -> Option<Match> {
    let len = scan.cursor().eat_while(|b| b == b'\n');
    let at_end = scan.pos + len == scan.text.len();
    (len >= 2 || (len == 1 && at_end)).then(|| Match::verbatim(TokenKind::BlankLines, scan, len))
}

pub fn list_end(scan: &Scan<'_>) -> Option<Match> {
    let len = scan.cursor().eat_while(|b| b == b'\n');
    (len >= 2).then(|| Match::verbatim(TokenKind::ListEnd, scan, len))
}

pub fn newline(scan: &Scan<'_>) -> Option<Match> {
    scan.rest()
        .starts_with('\n')
        .then(|| Match::verbatim(TokenKind::Newline, scan, 1))
}

/// `[key]: url` up to the end of the line.
pub fn ref_link_def(scan: &Scan<'_>) -> Option<Match> {
    if !scan.line_start {
        return None;
    }
    let mut cur = scan.cursor();
    if cur.bump() != Some(b'[') {
        return None;
    }
    if cur.eat_chars_while(|c| c != ']' && !c.is_whitespace()) == 0 || cur.bump() != Some(b']') {
        return None;
    }
    cur.eat_while(|b| b == b' ' || b == b'\t');
    if cur.bump() != Some(b':') {
        return None;
    }
    cur.eat_while(|b| b == b' ' || b == b'\t');
    if cur.eat_while(|b| b != b'\n') == 0 {
        return None;
    }
    Some(Match::verbatim(TokenKind::RefLinkDef, scan, cur.i - scan.pos))
}

pub fn text(scan: &Scan<'_>) -> Option<Match> {
    let len = scan.cursor().eat_while(is_text_byte);
    (len > 0).then(|| Match::verbatim(TokenKind::Text, scan, len))
}

pub fn link_special_char(scan: &Scan<'_>) -> Option<Match> {
    matches!(scan.rest().as_bytes().first(), Some(b'[' | b']'))
        .then(|| Match::verbatim(TokenKind::LinkSpecialChar, scan, 1))
}

/// Removes the whitespace prefix shared by every non-blank line and empties
/// whitespace-only lines.
pub fn dedent(block: &str) -> String {
    let prefix = block
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start_matches([' ', '\t']).len()])
        .reduce(|common, next| {
            let shared = common
                .bytes()
                .zip(next.bytes())
                .take_while(|(a, b)| a == b)
                .count();
            &common[..shared]
        })
        .unwrap_or("");
    block
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.strip_prefix(prefix).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
