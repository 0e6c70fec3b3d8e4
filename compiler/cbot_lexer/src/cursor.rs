//! Byte cursor over the program text.
//!
//! Reading past the end yields `0`, so scanners can look ahead without
//! explicit bounds checks. Positions are byte offsets.

/// Whitespace that separates tokens.
#[inline]
pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Characters that can start an operator.
#[inline]
pub(crate) fn is_operator_char(byte: u8) -> bool {
    matches!(
        byte,
        b',' | b':'
            | b'('
            | b')'
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b'-'
            | b'+'
            | b'*'
            | b'/'
            | b'='
            | b';'
            | b'<'
            | b'>'
            | b'!'
            | b'~'
            | b'^'
            | b'|'
            | b'&'
            | b'%'
            | b'.'
            | b'?'
    )
}

/// Characters that end an identifier.
#[inline]
pub(crate) fn is_separator(byte: u8) -> bool {
    is_whitespace(byte) || is_operator_char(byte) || byte == b'"' || byte == b'\''
}

pub(crate) struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Cursor { source, pos: 0 }
    }

    /// Current byte, `0` at end of input.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    /// Byte after the current one.
    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        self.source.as_bytes().get(pos).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Advance one byte.
    #[inline]
    pub(crate) fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += 1;
        }
    }

    /// Advance over one whole UTF-8 character.
    pub(crate) fn advance_char(&mut self) {
        let width = match self.current() {
            b if b < 0x80 => 1,
            b if b >= 0xF0 => 4,
            b if b >= 0xE0 => 3,
            _ => 2,
        };
        self.pos = (self.pos + width).min(self.source.len());
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Text from the current position to the end.
    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or("")
    }

    /// Skip to the next newline (not consumed), or to end of input.
    pub(crate) fn eat_until_newline(&mut self) {
        let remaining = &self.source.as_bytes()[self.pos..];
        match memchr::memchr(b'\n', remaining) {
            Some(offset) => self.pos += offset,
            None => self.pos = self.source.len(),
        }
    }

    /// Skip past the next `*/`, or to end of input when unterminated.
    pub(crate) fn eat_block_comment_body(&mut self) {
        let remaining = &self.source.as_bytes()[self.pos..];
        match memchr::memmem::find(remaining, b"*/") {
            Some(offset) => self.pos += offset + 2,
            None => self.pos = self.source.len(),
        }
    }

    /// Move forward by `n` bytes (clamped to the end).
    pub(crate) fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }
}

#[cfg(test)]
mod tests;
