//! The `lex` command: display the token stream.

use cbot_lexer::{token_signature, tokenize};
use cbot_registry::Registry;

use super::read_file;

pub fn lex_file(path: &str) {
    let content = read_file(path);
    let registry = Registry::new();
    let tokens = tokenize(&content, registry.constants());

    println!("Tokens for '{}' ({} tokens):", path, tokens.len());
    for (idx, token) in tokens.iter() {
        println!(
            "  {:?} {:?} @ {}",
            token.kind,
            tokens.text(idx),
            token.span()
        );
    }
    println!(
        "Signature: {:08x}",
        token_signature(&tokens, tokens.first(), tokens.end())
    );
}
