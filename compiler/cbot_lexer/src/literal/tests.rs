use super::*;
use pretty_assertions::assert_eq;

#[test]
fn decimal_hex_binary_and_float() {
    assert_eq!(parse_number("42"), Ok(Number::Int(42)));
    assert_eq!(parse_number("0x1F"), Ok(Number::Int(31)));
    assert_eq!(parse_number("0b101"), Ok(Number::Int(5)));
    assert_eq!(parse_number("2.5"), Ok(Number::Float(2.5)));
    assert_eq!(parse_number("1e3"), Ok(Number::Float(1000.0)));
    assert_eq!(parse_number("0xFFFFFFFF"), Ok(Number::Int(-1)));
}

#[test]
fn malformed_numbers() {
    assert_eq!(parse_number("0x"), Err(ErrorCode::BadNum));
    assert_eq!(parse_number("0b"), Err(ErrorCode::BadNum));
    assert_eq!(
        parse_number("99999999999999999999"),
        Err(ErrorCode::BadNum)
    );
}

#[test]
fn string_escapes() {
    assert_eq!(decode_string(r#""a\tb""#), Ok("a\tb".to_owned()));
    assert_eq!(decode_string(r#""q\"q""#), Ok("q\"q".to_owned()));
    assert_eq!(decode_string(r#""\101\x42""#), Ok("AB".to_owned()));
    assert_eq!(decode_string(r#""é""#), Ok("é".to_owned()));
    assert_eq!(decode_string(r#""\U0001F600""#), Ok("\u{1F600}".to_owned()));
}

#[test]
fn string_errors() {
    assert_eq!(decode_string("\"open"), Err(ErrorCode::EndQuote));
    assert_eq!(decode_string("\""), Err(ErrorCode::EndQuote));
    assert_eq!(decode_string(r#""\q""#), Err(ErrorCode::BadEscape));
    assert_eq!(decode_string(r#""\777""#), Err(ErrorCode::OctalRange));
    assert_eq!(decode_string(r#""\xg""#), Err(ErrorCode::HexDigits));
    assert_eq!(decode_string(r#""\x110000""#), Err(ErrorCode::HexRange));
    assert_eq!(decode_string(r#""\u12""#), Err(ErrorCode::HexDigits));
    assert_eq!(decode_string(r#""\uD800""#), Err(ErrorCode::UnicodeName));
}

#[test]
fn char_literals() {
    assert_eq!(decode_char("'a'"), Ok('a'));
    assert_eq!(decode_char(r"'\n'"), Ok('\n'));
    assert_eq!(decode_char("''"), Err(ErrorCode::CharEmpty));
    assert_eq!(decode_char("'a"), Err(ErrorCode::EndQuote));
}
