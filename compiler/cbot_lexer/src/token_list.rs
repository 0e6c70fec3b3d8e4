//! Token arena.
//!
//! Tokens are stored contiguously and linked by index: each token knows
//! its successor and predecessor, so the compiler can walk in both
//! directions without owning pointers. The last token is always the
//! `End` sentinel with `start == end == source.len()`.

use cbot_ir::{Span, TokenId, TokenKind};
use std::fmt;

/// Index of a token inside its `TokenList`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TokenIdx(u32);

impl TokenIdx {
    #[inline]
    pub const fn new(index: u32) -> Self {
        TokenIdx(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TokenIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenIdx({})", self.0)
    }
}

/// One lexical unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Start of the token text.
    pub start: u32,
    /// End of the token text, start of its trailing separator.
    pub end: u32,
    /// End of the trailing whitespace and comments.
    pub sep_end: u32,
    pub(crate) prev: Option<TokenIdx>,
    pub(crate) next: Option<TokenIdx>,
}

impl Token {
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// The keyword or operator id, if this is one.
    #[inline]
    pub fn id(&self) -> Option<TokenId> {
        match self.kind {
            TokenKind::Keyword(id) => Some(id),
            _ => None,
        }
    }
}

/// The token sequence of one program text.
#[derive(Clone, Debug)]
pub struct TokenList {
    source: String,
    /// Separator text before the first token.
    leading_end: u32,
    tokens: Vec<Token>,
}

impl TokenList {
    pub(crate) fn new(source: String, leading_end: u32) -> Self {
        TokenList {
            source,
            leading_end,
            tokens: Vec::new(),
        }
    }

    /// Append a token, linking it after the current last one.
    pub(crate) fn push(&mut self, kind: TokenKind, start: u32, end: u32, sep_end: u32) {
        let idx = TokenIdx(self.tokens.len() as u32);
        let prev = self.tokens.last().map(|_| TokenIdx(idx.0 - 1));
        if let Some(last) = self.tokens.last_mut() {
            last.next = Some(idx);
        }
        self.tokens.push(Token {
            kind,
            start,
            end,
            sep_end,
            prev,
            next: None,
        });
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of tokens including the `End` sentinel.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token (the sentinel for empty programs).
    pub fn first(&self) -> TokenIdx {
        TokenIdx(0)
    }

    /// The `End` sentinel.
    pub fn end(&self) -> TokenIdx {
        TokenIdx(self.tokens.len().saturating_sub(1) as u32)
    }

    /// Look up a token.
    ///
    /// # Panics
    /// Panics if `idx` does not belong to this list.
    #[inline]
    pub fn get(&self, idx: TokenIdx) -> &Token {
        &self.tokens[idx.index()]
    }

    #[inline]
    pub fn next(&self, idx: TokenIdx) -> Option<TokenIdx> {
        self.tokens.get(idx.index()).and_then(|t| t.next)
    }

    #[inline]
    pub fn prev(&self, idx: TokenIdx) -> Option<TokenIdx> {
        self.tokens.get(idx.index()).and_then(|t| t.prev)
    }

    /// Token text.
    pub fn text(&self, idx: TokenIdx) -> &str {
        let token = self.get(idx);
        &self.source[token.start as usize..token.end as usize]
    }

    /// Whitespace and comments following the token.
    pub fn separator(&self, idx: TokenIdx) -> &str {
        let token = self.get(idx);
        &self.source[token.end as usize..token.sep_end as usize]
    }

    /// Whitespace and comments before the first token.
    pub fn leading(&self) -> &str {
        &self.source[..self.leading_end as usize]
    }

    /// Walk the list from first to last through the `next` links.
    pub fn iter(&self) -> impl Iterator<Item = (TokenIdx, &Token)> + '_ {
        std::iter::successors(
            (!self.tokens.is_empty()).then_some(TokenIdx(0)),
            move |&idx| self.next(idx),
        )
        .map(move |idx| (idx, self.get(idx)))
    }

    /// Rebuild the source from leading separator, token texts and
    /// trailing separators.
    pub fn reconstruct(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        out.push_str(self.leading());
        for (idx, _) in self.iter() {
            out.push_str(self.text(idx));
            out.push_str(self.separator(idx));
        }
        out
    }
}

#[cfg(test)]
mod tests;
