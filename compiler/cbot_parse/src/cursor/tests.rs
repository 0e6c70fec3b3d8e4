use super::*;
use cbot_lexer::{tokenize, Constants};
use pretty_assertions::assert_eq;

fn lex(source: &str) -> TokenList {
    tokenize(source, &Constants::new())
}

#[test]
fn walks_tokens_and_stops_at_end() {
    let list = lex("a + 1");
    let mut cursor = Cursor::new(&list);
    assert!(cursor.is_ident());
    assert_eq!(cursor.text(), "a");
    cursor.advance();
    assert!(cursor.is(TokenId::Add));
    cursor.advance();
    assert_eq!(cursor.kind(), TokenKind::Number);
    cursor.advance();
    assert!(cursor.is_at_end());
    cursor.advance();
    assert!(cursor.is_at_end());
}

#[test]
fn is_any_matches_a_set_of_ids() {
    let list = lex("while");
    let cursor = Cursor::new(&list);
    assert!(cursor.is_any(&[TokenId::For, TokenId::While, TokenId::Do]));
    assert!(!cursor.is_any(&[TokenId::For, TokenId::Do]));
}

#[test]
fn eat_any_advances_only_on_match() {
    let list = lex("* x");
    let mut cursor = Cursor::new(&list);
    assert_eq!(cursor.eat_any(&[TokenId::Add, TokenId::Sub]), None);
    assert_eq!(cursor.eat_any(&[TokenId::Mul, TokenId::Div]), Some(TokenId::Mul));
    assert_eq!(cursor.text(), "x");
}

#[test]
fn expect_reports_code_at_current_token() {
    let list = lex("foo )");
    let mut cursor = Cursor::new(&list);
    let err = cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar).unwrap_err();
    assert_eq!(err.code, ErrorCode::OpenPar);
    assert_eq!(err.span, Span::new(0, 3));
}

#[test]
fn peek_looks_ahead_without_moving() {
    let list = lex("label : while");
    let cursor = Cursor::new(&list);
    assert!(cursor.peek_is(1, TokenId::Colon));
    assert!(cursor.peek_is(2, TokenId::While));
    assert_eq!(cursor.peek_kind(10), TokenKind::End);
    assert_eq!(cursor.text(), "label");
}

#[test]
fn backtracking_restores_position() {
    let list = lex("a b c");
    let mut cursor = Cursor::new(&list);
    let mark = cursor.position();
    cursor.advance();
    cursor.advance();
    assert_eq!(cursor.text(), "c");
    cursor.set_position(mark);
    assert_eq!(cursor.text(), "a");
}

#[test]
fn skip_block_handles_nesting() {
    let list = lex("{ a { b } { } } next");
    let mut cursor = Cursor::new(&list);
    cursor.skip_block().unwrap();
    assert_eq!(cursor.text(), "next");
}

#[test]
fn skip_block_reports_unterminated_block() {
    let list = lex("{ a { b }");
    let mut cursor = Cursor::new(&list);
    let err = cursor.skip_block().unwrap_err();
    assert_eq!(err.code, ErrorCode::CloseBlock);
}
