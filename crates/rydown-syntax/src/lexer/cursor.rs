/// A byte cursor over the remaining input of one rule attempt.
///
/// Every delimiter the lexer cares about is ASCII, so scanning bytes is safe:
/// a multi-byte UTF-8 sequence never contains an ASCII byte. Methods that
/// step over arbitrary characters use [`Cursor::bump_char`].
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The whole input.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, i: usize) -> Self {
        Self { s, i }
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn rest(&self) -> &'a str {
        &self.s[self.i..]
    }

    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Steps over one whole character.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Consumes bytes while `pred` holds and returns how many were eaten.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.i;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.i += 1;
        }
        self.i - start
    }

    /// Consumes characters while `pred` holds and returns the byte count.
    pub fn eat_chars_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.i += c.len_utf8();
        }
        self.i - start
    }
}
