//! CBOT tokenizer.
//!
//! Turns program text into a `TokenList`: an arena of tokens linked by
//! index, each carrying its kind, its `[start, end)` offsets and the
//! whitespace/comment text that trails it. Concatenating the leading
//! separator with every token's text and trailing separator reproduces
//! the source exactly.
//!
//! # Sub-scanners
//!
//! The first character of a candidate token selects the scanner:
//! - `"` string literal, `'` character literal
//! - digit: decimal, `0x` hex or `0b` binary number
//! - operator character: longest match in the operator table
//! - anything else: identifier, keyword or named constant
//!
//! Malformed literals never stop tokenization; the compiler reports them
//! when it decodes the token (see `literal`).

mod constants;
mod cursor;
pub mod literal;
mod signature;
mod token_list;
mod tokenizer;

pub use constants::Constants;
pub use signature::{crc32, token_signature};
pub use token_list::{Token, TokenIdx, TokenList};
pub use tokenizer::{tokenize, MAX_SOURCE_LEN};
