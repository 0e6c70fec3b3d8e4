//! Conversions between value types and their text forms.

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;

use crate::Value;

/// Wrap an integer to the width and signedness of an integer type.
///
/// Non-integer types pass the value through.
pub fn wrap_integer(n: i64, ty: &TypeDesc) -> i64 {
    match ty {
        TypeDesc::Byte => i64::from(n as i8),
        TypeDesc::Short => i64::from(n as i16),
        TypeDesc::Char => i64::from(n as u32),
        TypeDesc::Int => i64::from(n as i32),
        _ => n,
    }
}

/// The zero value a `Default` cell of type `ty` holds.
pub fn zero_value(ty: &TypeDesc) -> Value {
    match ty {
        TypeDesc::Boolean => Value::Bool(false),
        TypeDesc::Byte | TypeDesc::Short | TypeDesc::Char | TypeDesc::Int | TypeDesc::Long => {
            Value::Int(0)
        }
        TypeDesc::Float | TypeDesc::Double => Value::Float(0.0),
        TypeDesc::String => Value::string(""),
        TypeDesc::Void => Value::Void,
        TypeDesc::Null | TypeDesc::Array(_) | TypeDesc::Class(_) => Value::Null,
    }
}

/// Convert `value`, of static type `from`, for storage in a cell of type `to`.
///
/// Narrowing wraps, float to integer truncates, anything converts to string
/// through its text form. A downcast to a class the instance does not
/// belong to yields `null`. Conversions the compiler never emits report
/// `BadType1`.
pub fn convert(value: Value, from: &TypeDesc, to: &TypeDesc) -> Result<Value, ErrorCode> {
    if value.is_nan() {
        return match to {
            TypeDesc::Array(_) | TypeDesc::Class(_) | TypeDesc::Null => Err(ErrorCode::BadType1),
            TypeDesc::String => Ok(Value::string("nan")),
            _ => Ok(Value::Nan),
        };
    }
    match to {
        TypeDesc::Void => Ok(Value::Void),
        TypeDesc::Boolean => match value {
            Value::Bool(_) => Ok(value),
            _ => Err(ErrorCode::BadType1),
        },
        TypeDesc::Byte | TypeDesc::Short | TypeDesc::Char | TypeDesc::Int | TypeDesc::Long => {
            match value {
                Value::Int(n) => Ok(Value::Int(wrap_integer(n, to))),
                Value::Float(f) => Ok(Value::Int(wrap_integer(float_to_integer(f), to))),
                _ => Err(ErrorCode::BadType1),
            }
        }
        TypeDesc::Float => match value {
            Value::Int(n) => Ok(Value::Float(f64::from(n as f32))),
            Value::Float(f) => Ok(Value::Float(f64::from(f as f32))),
            _ => Err(ErrorCode::BadType1),
        },
        TypeDesc::Double => match value {
            Value::Int(n) => Ok(Value::Float(n as f64)),
            Value::Float(_) => Ok(value),
            _ => Err(ErrorCode::BadType1),
        },
        TypeDesc::String => match value {
            Value::Str(_) => Ok(value),
            Value::Void => Err(ErrorCode::BadType1),
            other => Ok(Value::string(other.to_text(from))),
        },
        TypeDesc::Null => match value {
            Value::Null => Ok(value),
            _ => Err(ErrorCode::BadType1),
        },
        TypeDesc::Array(_) => match value {
            Value::Null | Value::Array(_) => Ok(value),
            _ => Err(ErrorCode::BadType1),
        },
        TypeDesc::Class(name) => match value {
            Value::Null => Ok(value),
            Value::Object(obj) => {
                if obj.borrow().layout().is_a(name) {
                    Ok(Value::Object(obj))
                } else {
                    Ok(Value::Null)
                }
            }
            _ => Err(ErrorCode::BadType1),
        },
    }
}

/// Truncation toward zero, saturating at the `i64` range.
fn float_to_integer(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        f as i64
    }
}

/// Format a float like C's `%g`: six significant digits, trailing zeros
/// dropped, scientific notation below 1e-4 and from 1e6 up.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_owned();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    // Rounding to six digits first decides the exponent (9.999995 -> 10).
    let sci = format!("{f:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..6).contains(&exp) {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
    } else {
        let decimals = usize::try_from(5 - exp).unwrap_or(0);
        trim_fraction(&format!("{f:.decimals$}")).to_owned()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
