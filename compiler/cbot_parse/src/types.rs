//! Type compatibility rules.
//!
//! Every implicit conversion has a cost; overload resolution sums the
//! costs of all arguments and picks the cheapest candidate. A conversion
//! without a cost is not allowed at all.
//!
//! | conversion                         | cost          |
//! |------------------------------------|---------------|
//! | identical types                    | 0             |
//! | `null` to a class or array         | 1             |
//! | widening numeric                   | 1             |
//! | upcast                             | 1 per level   |
//! | narrowing numeric                  | 2             |
//! | downcast (checked at run time)     | 2 + levels    |
//! | anything but `void` to `string`    | 3             |

use cbot_ir::{BinaryOp, Module, TypeDesc};

const COST_WIDEN: u32 = 1;
const COST_NARROW: u32 = 2;
const COST_TO_STRING: u32 = 3;

/// Cost of implicitly converting a `from` value for a `to` slot.
pub fn conversion_cost(module: &Module, from: &TypeDesc, to: &TypeDesc) -> Option<u32> {
    if from == to {
        return if from.is_void() { None } else { Some(0) };
    }
    match (from, to) {
        (TypeDesc::Void, _) | (_, TypeDesc::Void) => None,
        (_, TypeDesc::String) => Some(COST_TO_STRING),
        (TypeDesc::Null, TypeDesc::Class(_) | TypeDesc::Array(_)) => Some(COST_WIDEN),
        (TypeDesc::Class(sub), TypeDesc::Class(sup)) => class_cost(module, sub, sup),
        _ => {
            let (f, t) = (from.numeric_rank()?, to.numeric_rank()?);
            Some(if f <= t { COST_WIDEN } else { COST_NARROW })
        }
    }
}

fn class_cost(module: &Module, from: &str, to: &str) -> Option<u32> {
    let from_id = module.class_named(from)?;
    let to_id = module.class_named(to)?;
    if let Some(levels) = module.inheritance_distance(from_id, to_id) {
        return Some(levels);
    }
    module
        .inheritance_distance(to_id, from_id)
        .map(|levels| COST_NARROW + levels)
}

/// Whether a `from` value may be stored in a `to` cell.
pub fn is_assignable(module: &Module, from: &TypeDesc, to: &TypeDesc) -> bool {
    conversion_cost(module, from, to).is_some()
}

/// Operand and result type of `left op right`, or `None` when the
/// operator does not apply.
///
/// The operand type is what both sides are converted to before the
/// operation runs.
pub fn binary_types(op: BinaryOp, left: &TypeDesc, right: &TypeDesc) -> Option<(TypeDesc, TypeDesc)> {
    if left.is_void() || right.is_void() {
        return None;
    }
    let string = |t: &TypeDesc| matches!(t, TypeDesc::String);
    match op {
        BinaryOp::Add if string(left) || string(right) => Some((TypeDesc::String, TypeDesc::String)),
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Mod
        | BinaryOp::Pow => {
            let ty = left.arithmetic_result(right)?;
            Some((ty.clone(), ty))
        }
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr => {
            if !(left.is_integer() && right.is_integer()) {
                return None;
            }
            let ty = left.arithmetic_result(left)?;
            Some((ty.clone(), ty))
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => match (left, right) {
            (TypeDesc::Boolean, TypeDesc::Boolean) => Some((TypeDesc::Boolean, TypeDesc::Boolean)),
            _ if left.is_integer() && right.is_integer() => {
                let ty = left.arithmetic_result(right)?;
                Some((ty.clone(), ty))
            }
            _ => None,
        },
        BinaryOp::Eq | BinaryOp::Ne => {
            let operand = equality_operand(left, right)?;
            Some((operand, TypeDesc::Boolean))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            if string(left) && string(right) {
                return Some((TypeDesc::String, TypeDesc::Boolean));
            }
            Some((left.arithmetic_result(right)?, TypeDesc::Boolean))
        }
    }
}

fn equality_operand(left: &TypeDesc, right: &TypeDesc) -> Option<TypeDesc> {
    if let Some(numeric) = left.arithmetic_result(right) {
        return Some(numeric);
    }
    match (left, right) {
        (TypeDesc::Boolean, TypeDesc::Boolean) | (TypeDesc::String, TypeDesc::String) => {
            Some(left.clone())
        }
        (TypeDesc::Null, other) | (other, TypeDesc::Null) if other.is_reference() => {
            Some(other.clone())
        }
        (TypeDesc::Class(_), TypeDesc::Class(_)) | (TypeDesc::Array(_), TypeDesc::Array(_)) => {
            Some(left.clone())
        }
        _ => None,
    }
}

/// Operand type of `target op= value`.
pub fn compound_operand(op: BinaryOp, target: &TypeDesc, value: &TypeDesc) -> Option<TypeDesc> {
    if op == BinaryOp::Add && matches!(target, TypeDesc::String) && !value.is_void() {
        return Some(TypeDesc::String);
    }
    if op.is_comparison() || matches!(target, TypeDesc::String) {
        return None;
    }
    let (operand, result) = binary_types(op, target, value)?;
    let stores_back = result == *target || (result.is_numeric() && target.is_numeric());
    stores_back.then_some(operand)
}

/// Type of `cond ? a : b`.
pub fn common_type(module: &Module, a: &TypeDesc, b: &TypeDesc) -> Option<TypeDesc> {
    if a == b {
        return (!a.is_void()).then(|| a.clone());
    }
    if let (Some(ra), Some(rb)) = (a.numeric_rank(), b.numeric_rank()) {
        return Some(if ra >= rb { a.clone() } else { b.clone() });
    }
    match (a, b) {
        (TypeDesc::Null, other) | (other, TypeDesc::Null) if other.is_reference() => {
            Some(other.clone())
        }
        (TypeDesc::Class(x), TypeDesc::Class(y)) => {
            let (xi, yi) = (module.class_named(x)?, module.class_named(y)?);
            if module.is_subclass_of(xi, yi) {
                Some(b.clone())
            } else if module.is_subclass_of(yi, xi) {
                Some(a.clone())
            } else {
                None
            }
        }
        (TypeDesc::String, other) | (other, TypeDesc::String) if !other.is_void() => {
            Some(TypeDesc::String)
        }
        _ => None,
    }
}
