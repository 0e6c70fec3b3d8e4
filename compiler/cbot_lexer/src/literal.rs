//! Decoding of literal tokens.
//!
//! The tokenizer keeps malformed literals as best-effort tokens; these
//! functions turn token text into values and report what is wrong with
//! it as an `ErrorCode` the compiler anchors to the token.

use cbot_diagnostic::ErrorCode;

/// Value of a numeric literal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Parse a number token (`12`, `1.5e3`, `0x1F`, `0b101`).
pub fn parse_number(text: &str) -> Result<Number, ErrorCode> {
    let radix_digits = |prefix: &[&str]| prefix.iter().find_map(|p| text.strip_prefix(*p));
    if let Some(hex) = radix_digits(&["0x", "0X"]) {
        return parse_radix(hex, 16);
    }
    if let Some(bin) = radix_digits(&["0b", "0B"]) {
        return parse_radix(bin, 2);
    }
    if text.contains(['.', 'e', 'E']) {
        return text
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ErrorCode::BadNum);
    }
    text.parse::<i64>()
        .map(Number::Int)
        .map_err(|_| ErrorCode::BadNum)
}

fn parse_radix(digits: &str, radix: u32) -> Result<Number, ErrorCode> {
    if digits.is_empty() {
        return Err(ErrorCode::BadNum);
    }
    // Hex literals up to 0xFFFFFFFF are 32-bit patterns (0xFFFFFFFF == -1).
    let value = u64::from_str_radix(digits, radix).map_err(|_| ErrorCode::BadNum)?;
    if let Ok(small) = u32::try_from(value) {
        return Ok(Number::Int(i64::from(small as i32)));
    }
    Ok(Number::Int(value as i64))
}

/// Decode a string token including its quotes.
pub fn decode_string(text: &str) -> Result<String, ErrorCode> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| text.len() >= 2)
        .ok_or(ErrorCode::EndQuote)?;
    decode_escapes(inner)
}

/// Decode a character token including its quotes.
pub fn decode_char(text: &str) -> Result<char, ErrorCode> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .filter(|_| text.len() >= 2)
        .ok_or(ErrorCode::EndQuote)?;
    let decoded = decode_escapes(inner)?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        (None, _) => Err(ErrorCode::CharEmpty),
        (Some(_), Some(_)) => Err(ErrorCode::EndQuote),
    }
}

fn decode_escapes(inner: &str) -> Result<String, ErrorCode> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(ErrorCode::BadEscape);
        };
        let decoded = match esc {
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            '?' => '?',
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if value > 0xFF {
                    return Err(ErrorCode::OctalRange);
                }
                char::from_u32(value).ok_or(ErrorCode::OctalRange)?
            }
            'x' => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().filter(|d| d.is_ascii_hexdigit()) {
                    digits.push(*d);
                    chars.next();
                }
                if digits.is_empty() {
                    return Err(ErrorCode::HexDigits);
                }
                let value = u32::from_str_radix(&digits, 16).map_err(|_| ErrorCode::HexRange)?;
                char::from_u32(value).ok_or(ErrorCode::HexRange)?
            }
            'u' | 'U' => {
                let count = if esc == 'u' { 4 } else { 8 };
                let mut value = 0u32;
                for _ in 0..count {
                    let digit = chars
                        .next()
                        .and_then(|d| d.to_digit(16))
                        .ok_or(ErrorCode::HexDigits)?;
                    value = value.wrapping_mul(16).wrapping_add(digit);
                }
                char::from_u32(value).ok_or(ErrorCode::UnicodeName)?
            }
            _ => return Err(ErrorCode::BadEscape),
        };
        out.push(decoded);
    }
    Ok(out)
}

#[cfg(test)]
mod tests;
