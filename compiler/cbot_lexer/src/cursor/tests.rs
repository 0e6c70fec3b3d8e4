use super::*;

#[test]
fn current_and_peek() {
    let cursor = Cursor::new("ab");
    assert_eq!(cursor.current(), b'a');
    assert_eq!(cursor.peek(), b'b');
}

#[test]
fn reads_past_end_yield_zero() {
    let mut cursor = Cursor::new("a");
    cursor.advance();
    assert!(cursor.is_eof());
    assert_eq!(cursor.current(), 0);
    cursor.advance();
    assert_eq!(cursor.pos(), 1);
}

#[test]
fn advance_char_steps_over_multibyte() {
    let mut cursor = Cursor::new("éx");
    cursor.advance_char();
    assert_eq!(cursor.current(), b'x');
    assert_eq!(cursor.pos(), 2);
}

#[test]
fn line_comment_stops_before_newline() {
    let mut cursor = Cursor::new("// hi\nx");
    cursor.eat_until_newline();
    assert_eq!(cursor.current(), b'\n');
}

#[test]
fn block_comment_consumes_terminator() {
    let mut cursor = Cursor::new("/* a * b */x");
    cursor.advance_n(2);
    cursor.eat_block_comment_body();
    assert_eq!(cursor.current(), b'x');

    let mut open = Cursor::new("/* never closed");
    open.advance_n(2);
    open.eat_block_comment_body();
    assert!(open.is_eof());
}

#[test]
fn separator_classes() {
    assert!(is_separator(b' '));
    assert!(is_separator(b'"'));
    assert!(is_separator(b'?'));
    assert!(!is_separator(b'_'));
    assert!(!is_separator(b'#'));
    assert!(is_operator_char(b'%'));
    assert!(!is_operator_char(b'\''));
}
