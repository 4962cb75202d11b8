// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::Error;

/// A cursor over an attribute or style sheet text.
///
/// All the lookahead is done on bytes, since every token the parsers
/// care about is ASCII. Multi-byte chars are only ever consumed whole.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Stream<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> From<&'a str> for Stream<'a> {
    #[inline]
    fn from(text: &'a str) -> Self {
        Stream { text, pos: 0 }
    }
}

impl<'a> Stream<'a> {
    /// Returns the current position in bytes.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of chars before the current position.
    pub fn char_offset(&self) -> usize {
        self.text[..self.pos].chars().count()
    }

    /// Checks that there is nothing left to read.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Returns the byte under the cursor.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    /// Returns the char under the cursor.
    #[inline]
    pub fn curr_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Checks that the byte under the cursor is `c`.
    #[inline]
    pub fn is_curr_byte_eq(&self, c: u8) -> bool {
        self.peek() == Some(c)
    }

    /// Moves the cursor by `n` bytes.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.text.len());
        self.pos += n;
    }

    /// Moves the cursor past the current char.
    #[inline]
    pub fn advance_char(&mut self) {
        if let Some(c) = self.curr_char() {
            self.pos += c.len_utf8();
        }
    }

    /// Skips ASCII whitespace.
    pub fn skip_spaces(&mut self) {
        self.skip_bytes(|c| c.is_ascii_whitespace());
    }

    /// Checks that the rest of the text begins with `prefix`.
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.text.as_bytes()[self.pos..].starts_with(prefix)
    }

    /// Consumes `prefix` if the rest of the text begins with it.
    pub fn try_consume(&mut self, prefix: &[u8]) -> bool {
        let found = self.starts_with(prefix);
        if found {
            self.pos += prefix.len();
        }

        found
    }

    /// Consumes `[A-Za-z0-9_-]*`.
    pub fn consume_ascii_ident(&mut self) -> &'a str {
        let start = self.pos;
        self.skip_bytes(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_');
        self.slice_back(start)
    }

    /// Skips bytes while `f` holds.
    pub fn skip_bytes<F: Fn(u8) -> bool>(&mut self, f: F) {
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }

            self.pos += 1;
        }
    }

    /// Consumes chars while `f` holds and returns them.
    pub fn consume_chars<F: Fn(char) -> bool>(&mut self, f: F) -> &'a str {
        let start = self.pos;
        let len = self.text[start..]
            .char_indices()
            .find(|&(_, c)| !f(c))
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len() - start);
        self.pos += len;
        self.slice_back(start)
    }

    /// Returns the text between `start` and the cursor.
    #[inline]
    pub fn slice_back(&self, start: usize) -> &'a str {
        &self.text[start..self.pos]
    }

    /// Parses a number, skipping leading whitespace.
    ///
    /// A trailing `e` is only taken as an exponent when digits follow,
    /// so `1em` leaves `em` in the stream. Infinities are rejected.
    ///
    /// On error, the cursor position is unspecified.
    pub fn parse_number(&mut self) -> Result<f64, Error> {
        self.skip_spaces();

        let start = self.pos;
        let err = |s: &Self| Error::InvalidNumber(s.text[..start].chars().count() + 1);

        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }

        let int_start = self.pos;
        self.skip_digits();
        let has_int = self.pos > int_start;

        let mut has_frac = false;
        if self.is_curr_byte_eq(b'.') {
            self.pos += 1;
            let frac_start = self.pos;
            self.skip_digits();
            has_frac = self.pos > frac_start;
        }

        if !has_int && !has_frac {
            return Err(err(self));
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut exp = *self;
            exp.pos += 1;
            if matches!(exp.peek(), Some(b'+' | b'-')) {
                exp.pos += 1;
            }

            let digits = exp.pos;
            exp.skip_digits();
            if exp.pos > digits {
                *self = exp;
            }
        }

        match self.slice_back(start).parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(err(self)),
        }
    }

    fn skip_digits(&mut self) {
        self.skip_bytes(|c| c.is_ascii_digit());
    }
}
