//! Source text to `TokenList`.

use cbot_ir::{TokenId, TokenKind};
use tracing::{debug, trace};

use crate::cursor::{is_operator_char, is_separator, is_whitespace, Cursor};
use crate::{Constants, TokenList};

/// Longest source whose byte offsets fit a token's `u32` positions.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// Tokenize a program text.
///
/// Never fails: malformed literals become best-effort tokens that the
/// compiler rejects when it decodes them. Identifiers registered in
/// `constants` come out as `TokenKind::Constant`. Offsets past
/// [`MAX_SOURCE_LEN`] saturate, so callers reject longer sources first.
pub fn tokenize(source: &str, constants: &Constants) -> TokenList {
    let mut cursor = Cursor::new(source);
    eat_separators(&mut cursor);
    let mut list = TokenList::new(source.to_owned(), offset(cursor.pos()));

    while !cursor.is_eof() {
        let start = cursor.pos();
        let kind = scan_token(&mut cursor, constants);
        let end = cursor.pos();
        eat_separators(&mut cursor);
        trace!(?kind, text = &source[start..end], "token");
        list.push(kind, offset(start), offset(end), offset(cursor.pos()));
    }

    let len = offset(source.len());
    list.push(TokenKind::End, len, len, len);
    debug!(tokens = list.len(), bytes = source.len(), "tokenized");
    list
}

#[inline]
fn offset(pos: usize) -> u32 {
    u32::try_from(pos).unwrap_or(u32::MAX)
}

/// Consume whitespace, `//` and `/* */` comments.
fn eat_separators(cursor: &mut Cursor<'_>) {
    loop {
        match (cursor.current(), cursor.peek()) {
            (b, _) if is_whitespace(b) => cursor.advance(),
            (b'/', b'/') => cursor.eat_until_newline(),
            (b'/', b'*') => {
                cursor.advance_n(2);
                cursor.eat_block_comment_body();
            }
            _ => break,
        }
    }
}

fn scan_token(cursor: &mut Cursor<'_>, constants: &Constants) -> TokenKind {
    match cursor.current() {
        b'"' => {
            scan_string(cursor);
            TokenKind::Str
        }
        b'\'' => {
            scan_char(cursor);
            TokenKind::Char
        }
        b'0'..=b'9' => {
            scan_number(cursor);
            TokenKind::Number
        }
        b if is_operator_char(b) => match TokenId::longest_operator(cursor.rest()) {
            Some(id) => {
                cursor.advance_n(id.text().len());
                TokenKind::Keyword(id)
            }
            None => {
                cursor.advance();
                TokenKind::Ident
            }
        },
        _ => scan_word(cursor, constants),
    }
}

/// `"..."` with backslash escapes; stops at the closing quote, a newline
/// or end of input.
fn scan_string(cursor: &mut Cursor<'_>) {
    cursor.advance();
    loop {
        match cursor.current() {
            b'"' => {
                cursor.advance();
                return;
            }
            b'\n' | b'\r' => return,
            b'\\' => {
                cursor.advance();
                if !matches!(cursor.current(), b'\n' | b'\r') {
                    cursor.advance_char();
                }
            }
            _ if cursor.is_eof() => return,
            _ => cursor.advance_char(),
        }
    }
}

/// `'c'`: exactly one logical character, where an escape sequence counts
/// as one.
fn scan_char(cursor: &mut Cursor<'_>) {
    cursor.advance();
    match cursor.current() {
        b'\'' | b'\n' | b'\r' => {}
        b'\\' => {
            cursor.advance();
            scan_escape_tail(cursor);
        }
        _ if cursor.is_eof() => return,
        _ => cursor.advance_char(),
    }
    if cursor.current() == b'\'' {
        cursor.advance();
    }
}

/// The part of an escape after the backslash.
fn scan_escape_tail(cursor: &mut Cursor<'_>) {
    match cursor.current() {
        b'u' => {
            cursor.advance();
            eat_up_to(cursor, 4, |b| b.is_ascii_hexdigit());
        }
        b'U' => {
            cursor.advance();
            eat_up_to(cursor, 8, |b| b.is_ascii_hexdigit());
        }
        b'x' => {
            cursor.advance();
            cursor.eat_while(|b| b.is_ascii_hexdigit());
        }
        b'0'..=b'7' => eat_up_to(cursor, 3, |b| (b'0'..=b'7').contains(&b)),
        b'\n' | b'\r' => {}
        _ if cursor.is_eof() => {}
        _ => cursor.advance_char(),
    }
}

fn eat_up_to(cursor: &mut Cursor<'_>, max: usize, pred: impl Fn(u8) -> bool) {
    for _ in 0..max {
        if cursor.is_eof() || !pred(cursor.current()) {
            break;
        }
        cursor.advance();
    }
}

/// Longest numeric run: `0x` hex, `0b` binary, or decimal with optional
/// fraction and exponent.
fn scan_number(cursor: &mut Cursor<'_>) {
    if cursor.current() == b'0' && matches!(cursor.peek(), b'x' | b'X') {
        cursor.advance_n(2);
        cursor.eat_while(|b| b.is_ascii_hexdigit());
        return;
    }
    if cursor.current() == b'0' && matches!(cursor.peek(), b'b' | b'B') {
        cursor.advance_n(2);
        cursor.eat_while(|b| b == b'0' || b == b'1');
        return;
    }

    cursor.eat_while(|b| b.is_ascii_digit());
    if cursor.current() == b'.' && cursor.peek().is_ascii_digit() {
        cursor.advance();
        cursor.eat_while(|b| b.is_ascii_digit());
    }
    if matches!(cursor.current(), b'e' | b'E') {
        let rest = cursor.rest().as_bytes();
        let digits_at = match rest.get(1) {
            Some(b'+' | b'-') => 2,
            _ => 1,
        };
        if rest.get(digits_at).is_some_and(u8::is_ascii_digit) {
            cursor.advance_n(digits_at);
            cursor.eat_while(|b| b.is_ascii_digit());
        }
    }
}

/// Identifier, keyword or named constant: everything up to the next
/// separator character.
fn scan_word(cursor: &mut Cursor<'_>, constants: &Constants) -> TokenKind {
    let start = cursor.rest();
    let before = cursor.pos();
    cursor.advance_char();
    while !cursor.is_eof() && !is_separator(cursor.current()) {
        cursor.advance_char();
    }
    let word = &start[..cursor.pos() - before];

    if let Some(id) = TokenId::keyword(word) {
        return TokenKind::Keyword(id);
    }
    match constants.get(word) {
        Some(value) => TokenKind::Constant(value),
        None => TokenKind::Ident,
    }
}
