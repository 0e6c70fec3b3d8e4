//! Operator semantics.
//!
//! Operands arrive already converted to the operand type the compiler
//! chose for the node (`int`, `long`, `float`, `double`, `bool`, `string`
//! or a reference type). Integer results wrap at the operand width.

use std::cmp::Ordering;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{BinaryOp, IncDecOp, TypeDesc, UnaryOp};

use crate::convert::wrap_integer;
use crate::Value;

/// Evaluate a binary operator.
pub fn binary(op: BinaryOp, ty: &TypeDesc, left: &Value, right: &Value) -> Result<Value, ErrorCode> {
    if left.is_nan() || right.is_nan() {
        return match op {
            BinaryOp::Eq => Ok(Value::Bool(left.is_nan() == right.is_nan())),
            BinaryOp::Ne => Ok(Value::Bool(left.is_nan() != right.is_nan())),
            _ => Err(ErrorCode::Nan),
        };
    }
    match ty {
        TypeDesc::Byte | TypeDesc::Short | TypeDesc::Char | TypeDesc::Int | TypeDesc::Long => {
            let (Some(l), Some(r)) = (left.as_int(), right.as_int()) else {
                return Err(ErrorCode::BadType2);
            };
            integer_binary(op, ty, l, r)
        }
        TypeDesc::Float | TypeDesc::Double => {
            let (Some(l), Some(r)) = (left.as_float(), right.as_float()) else {
                return Err(ErrorCode::BadType2);
            };
            float_binary(op, ty, l, r)
        }
        TypeDesc::Boolean => {
            let (Some(l), Some(r)) = (left.as_bool(), right.as_bool()) else {
                return Err(ErrorCode::BadType2);
            };
            match op {
                BinaryOp::Eq => Ok(Value::Bool(l == r)),
                BinaryOp::Ne => Ok(Value::Bool(l != r)),
                BinaryOp::BitAnd => Ok(Value::Bool(l & r)),
                BinaryOp::BitOr => Ok(Value::Bool(l | r)),
                BinaryOp::BitXor => Ok(Value::Bool(l ^ r)),
                _ => Err(ErrorCode::BadType2),
            }
        }
        TypeDesc::String => {
            let (Some(l), Some(r)) = (left.as_str(), right.as_str()) else {
                return Err(ErrorCode::BadType2);
            };
            if op == BinaryOp::Add {
                let mut joined = String::with_capacity(l.len() + r.len());
                joined.push_str(l);
                joined.push_str(r);
                return Ok(Value::from(joined));
            }
            compare(op, l.cmp(r)).map(Value::Bool)
        }
        TypeDesc::Null | TypeDesc::Array(_) | TypeDesc::Class(_) => match op {
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::Ne => Ok(Value::Bool(left != right)),
            _ => Err(ErrorCode::BadType2),
        },
        TypeDesc::Void => Err(ErrorCode::BadType2),
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> Result<bool, ErrorCode> {
    Ok(match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => return Err(ErrorCode::BadType2),
    })
}

fn integer_binary(op: BinaryOp, ty: &TypeDesc, l: i64, r: i64) -> Result<Value, ErrorCode> {
    let bits = ty.integer_bits().unwrap_or(64);
    let wrap = |n: i64| Value::Int(wrap_integer(n, ty));
    // Shift counts are taken modulo the operand width.
    let shift = (r as u32) & (bits - 1);
    Ok(match op {
        BinaryOp::Add => wrap(l.wrapping_add(r)),
        BinaryOp::Sub => wrap(l.wrapping_sub(r)),
        BinaryOp::Mul => wrap(l.wrapping_mul(r)),
        BinaryOp::Div => {
            if r == 0 {
                return Err(ErrorCode::ZeroDiv);
            }
            wrap(l.wrapping_div(r))
        }
        BinaryOp::Mod => {
            if r == 0 {
                return Err(ErrorCode::ZeroDiv);
            }
            wrap(l.wrapping_rem(r))
        }
        BinaryOp::Pow => match u32::try_from(r) {
            Ok(exp) => wrap(l.wrapping_pow(exp)),
            Err(_) => wrap((l as f64).powf(r as f64) as i64),
        },
        BinaryOp::Shl => wrap(l.wrapping_shl(shift)),
        BinaryOp::Shr => wrap(l.wrapping_shr(shift)),
        BinaryOp::Ushr => {
            let unsigned = if bits == 64 {
                (l as u64) >> shift
            } else {
                u64::from(l as u32) >> shift
            };
            wrap(unsigned as i64)
        }
        BinaryOp::BitAnd => wrap(l & r),
        BinaryOp::BitOr => wrap(l | r),
        BinaryOp::BitXor => wrap(l ^ r),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Value::Bool(compare(op, l.cmp(&r))?)
        }
    })
}

fn float_binary(op: BinaryOp, ty: &TypeDesc, l: f64, r: f64) -> Result<Value, ErrorCode> {
    let round = |x: f64| {
        if *ty == TypeDesc::Float {
            Value::Float(f64::from(x as f32))
        } else {
            Value::Float(x)
        }
    };
    Ok(match op {
        BinaryOp::Add => round(l + r),
        BinaryOp::Sub => round(l - r),
        BinaryOp::Mul => round(l * r),
        BinaryOp::Div => {
            if r == 0.0 {
                return Err(ErrorCode::ZeroDiv);
            }
            round(l / r)
        }
        BinaryOp::Mod => {
            if r == 0.0 {
                return Err(ErrorCode::ZeroDiv);
            }
            round(l % r)
        }
        BinaryOp::Pow => round(l.powf(r)),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let Some(ordering) = l.partial_cmp(&r) else {
                return Ok(Value::Bool(op == BinaryOp::Ne));
            };
            Value::Bool(compare(op, ordering)?)
        }
        BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::Ushr
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor => return Err(ErrorCode::BadType2),
    })
}

/// Evaluate a prefix operator.
pub fn unary(op: UnaryOp, ty: &TypeDesc, value: &Value) -> Result<Value, ErrorCode> {
    if value.is_nan() {
        return Err(ErrorCode::Nan);
    }
    match (op, value) {
        (UnaryOp::Plus, Value::Int(_) | Value::Float(_)) => Ok(value.clone()),
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(wrap_integer(n.wrapping_neg(), ty))),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::BitNot, Value::Int(n)) => Ok(Value::Int(wrap_integer(!n, ty))),
        (UnaryOp::BitNot, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(ErrorCode::BadType1),
    }
}

/// The new value of a cell of type `ty` after `++`/`--`.
pub fn step(op: IncDecOp, ty: &TypeDesc, value: &Value) -> Result<Value, ErrorCode> {
    let delta = op.delta();
    match value {
        Value::Nan => Err(ErrorCode::Nan),
        Value::Int(n) => Ok(Value::Int(wrap_integer(n.wrapping_add(delta), ty))),
        Value::Float(x) => {
            let next = x + delta as f64;
            Ok(Value::Float(if *ty == TypeDesc::Float {
                f64::from(next as f32)
            } else {
                next
            }))
        }
        _ => Err(ErrorCode::BadType1),
    }
}

/// Truth value of a condition.
pub fn truthy(value: &Value) -> Result<bool, ErrorCode> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Nan => Err(ErrorCode::Nan),
        _ => Err(ErrorCode::NotBoolean),
    }
}

#[cfg(test)]
mod tests;
