//! Token cursor for navigating the token list.
//!
//! Wraps a `TokenList` position. The cursor never moves past the `End`
//! sentinel, so `current()` is always valid.

use cbot_diagnostic::{CompileError, CompileResult, ErrorCode};
use cbot_ir::{Span, TokenId, TokenKind};
use cbot_lexer::{Token, TokenIdx, TokenList};
use tracing::trace;

pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: TokenIdx,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor {
            tokens,
            pos: tokens.first(),
        }
    }

    pub fn tokens(&self) -> &'a TokenList {
        self.tokens
    }

    /// Current position, for backtracking and for recording item bodies
    /// that a later pass compiles.
    #[inline]
    pub fn position(&self) -> TokenIdx {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: TokenIdx) {
        debug_assert!(pos.index() < self.tokens.len(), "cursor position out of bounds");
        self.pos = pos;
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Keyword or operator id of the current token.
    #[inline]
    pub fn id(&self) -> Option<TokenId> {
        self.current().id()
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.current().span()
    }

    /// Text of the current token.
    #[inline]
    pub fn text(&self) -> &'a str {
        self.tokens.text(self.pos)
    }

    /// Span of the token before the current one.
    pub fn previous_span(&self) -> Span {
        self.tokens
            .prev(self.pos)
            .map_or(Span::DUMMY, |idx| self.tokens.get(idx).span())
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::End)
    }

    #[inline]
    pub fn is(&self, id: TokenId) -> bool {
        self.id() == Some(id)
    }

    /// Whether the current token is any of `ids`.
    pub fn is_any(&self, ids: &[TokenId]) -> bool {
        self.id().is_some_and(|id| ids.contains(&id))
    }

    #[inline]
    pub fn is_ident(&self) -> bool {
        matches!(self.kind(), TokenKind::Ident)
    }

    /// Kind of the token `n` positions ahead (`0` is the current one).
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        let mut idx = self.pos;
        for _ in 0..n {
            match self.tokens.next(idx) {
                Some(next) => idx = next,
                None => break,
            }
        }
        self.tokens.get(idx).kind
    }

    /// Whether the token `n` positions ahead is `id`.
    pub fn peek_is(&self, n: usize, id: TokenId) -> bool {
        self.peek_kind(n) == TokenKind::Keyword(id)
    }

    /// Move to the next token; stays on the `End` sentinel.
    pub fn advance(&mut self) {
        if let Some(next) = self.tokens.next(self.pos) {
            trace!(token = self.text(), "advance");
            self.pos = next;
        }
    }

    /// Consume `id` if it is the current token.
    pub fn eat(&mut self, id: TokenId) -> bool {
        if self.is(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume any of `ids`, returning the one matched.
    pub fn eat_any(&mut self, ids: &[TokenId]) -> Option<TokenId> {
        let id = self.id().filter(|id| ids.contains(id))?;
        self.advance();
        Some(id)
    }

    /// Consume `id` or fail with `code` at the current token.
    pub fn expect(&mut self, id: TokenId, code: ErrorCode) -> CompileResult<Span> {
        if self.is(id) {
            let span = self.span();
            self.advance();
            Ok(span)
        } else {
            Err(self.error(code))
        }
    }

    /// Consume an identifier or fail with `code`.
    pub fn expect_ident(&mut self, code: ErrorCode) -> CompileResult<(&'a str, Span)> {
        if self.is_ident() {
            let found = (self.text(), self.span());
            self.advance();
            Ok(found)
        } else {
            Err(self.error(code))
        }
    }

    /// An error anchored at the current token.
    #[cold]
    pub fn error(&self, code: ErrorCode) -> CompileError {
        CompileError::new(code, self.span())
    }

    /// Skip a balanced `{ ... }` group starting at the current `{`.
    ///
    /// Fails with `CloseBlock` when the input ends first.
    pub fn skip_block(&mut self) -> CompileResult<()> {
        let mut depth = 0u32;
        loop {
            match self.id() {
                Some(TokenId::OpenBlock) => depth += 1,
                Some(TokenId::CloseBlock) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                _ if self.is_at_end() => return Err(self.error(ErrorCode::CloseBlock)),
                _ => {}
            }
            self.advance();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
