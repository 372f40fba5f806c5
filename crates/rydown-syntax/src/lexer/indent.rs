//! Per-line indentation, measured once before scanning.
//!
//! A tab or a pair of spaces is one indentation unit. List markers and
//! indented code read the unit count from this table instead of
//! re-scanning whitespace, and the text itself is never rewritten.

/// Leading indentation of one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineIndent {
    /// Number of whole units.
    pub units: usize,
    /// Bytes covered by those units. A trailing odd space is not included.
    pub width: usize,
}

/// Measures every line of `text`; index `n` is line `n + 1`.
pub fn measure(text: &str) -> Vec<LineIndent> {
    text.split('\n').map(measure_line).collect()
}

fn measure_line(line: &str) -> LineIndent {
    let bytes = line.as_bytes();
    let mut indent = LineIndent::default();
    loop {
        match bytes.get(indent.width) {
            Some(b'\t') => {
                indent.units += 1;
                indent.width += 1;
            }
            Some(b' ') if bytes.get(indent.width + 1) == Some(&b' ') => {
                indent.units += 1;
                indent.width += 2;
            }
            _ => return indent,
        }
    }
}
