//! String functions.
//!
//! Positions and lengths count characters. Out-of-range counts are
//! clamped to the string, never an error.

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;
use cbot_value::Value;

use crate::{arg_count, expect_numeric, expect_string, Registry};

pub fn register_strings(registry: &mut Registry) {
    registry.add_function(
        "strlen",
        |args| {
            expect_string(args, 0)?;
            arg_count(args, 1, 1)?;
            Ok(TypeDesc::Int)
        },
        |call| {
            let s = call.string(0)?;
            Ok(Value::Int(s.chars().count() as i64))
        },
    );

    registry.add_function(
        "strleft",
        check_str_num,
        |call| {
            let s = call.string(0)?;
            let n = clamp(call.int(1)?, &s);
            Ok(Value::from(s.chars().take(n).collect::<String>()))
        },
    );

    registry.add_function(
        "strright",
        check_str_num,
        |call| {
            let s = call.string(0)?;
            let n = clamp(call.int(1)?, &s);
            let skip = s.chars().count() - n;
            Ok(Value::from(s.chars().skip(skip).collect::<String>()))
        },
    );

    registry.add_function(
        "strmid",
        |args| {
            expect_string(args, 0)?;
            expect_numeric(args, 1)?;
            if args.len() > 2 {
                expect_numeric(args, 2)?;
            }
            arg_count(args, 2, 3)?;
            Ok(TypeDesc::String)
        },
        |call| {
            let s = call.string(0)?;
            let start = clamp(call.int(1)?, &s);
            let rest = s.chars().skip(start);
            let mid: String = if call.args.len() > 2 {
                rest.take(clamp(call.int(2)?, &s)).collect()
            } else {
                rest.collect()
            };
            Ok(Value::from(mid))
        },
    );

    registry.add_function(
        "strval",
        |args| {
            expect_string(args, 0)?;
            arg_count(args, 1, 1)?;
            Ok(TypeDesc::Float)
        },
        |call| Ok(Value::Float(f64::from(leading_number(&call.string(0)?) as f32))),
    );

    registry.add_function(
        "strfind",
        |args| {
            expect_string(args, 0)?;
            expect_string(args, 1)?;
            arg_count(args, 2, 2)?;
            Ok(TypeDesc::Int)
        },
        |call| {
            let haystack = call.string(0)?;
            let needle = call.string(1)?;
            let pos = haystack
                .find(&needle)
                .map_or(-1, |byte| haystack[..byte].chars().count() as i64);
            Ok(Value::Int(pos))
        },
    );

    registry.add_function("strupper", check_str_str, |call| {
        Ok(Value::from(call.string(0)?.to_uppercase()))
    });

    registry.add_function("strlower", check_str_str, |call| {
        Ok(Value::from(call.string(0)?.to_lowercase()))
    });
}

fn check_str_num(args: &[TypeDesc]) -> Result<TypeDesc, ErrorCode> {
    expect_string(args, 0)?;
    expect_numeric(args, 1)?;
    arg_count(args, 2, 2)?;
    Ok(TypeDesc::String)
}

fn check_str_str(args: &[TypeDesc]) -> Result<TypeDesc, ErrorCode> {
    expect_string(args, 0)?;
    arg_count(args, 1, 1)?;
    Ok(TypeDesc::String)
}

/// Clamp a count to `0..=len(s)` in characters.
fn clamp(n: i64, s: &str) -> usize {
    let len = s.chars().count();
    usize::try_from(n.max(0)).map_or(len, |n| n.min(len))
}

/// The longest numeric prefix of `s` (after leading blanks), 0 when none.
fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}
