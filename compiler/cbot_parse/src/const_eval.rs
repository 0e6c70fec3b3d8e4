//! Compile-time evaluation of constant expressions.
//!
//! Used for `case` labels, array limits and parameter defaults. Only
//! literals and operators over literals are constant; anything that
//! reads a variable or calls a function is not.

use cbot_diagnostic::ErrorCode;
use cbot_ir::{ExprId, ExprKind, LogicalOp, Module, TypeDesc};
use cbot_value::{convert, ops, Value};

/// Value of a constant expression.
///
/// `Ok(None)` means the expression is not constant; `Err` carries the
/// error its evaluation raised (`1 / 0`).
pub fn eval_constant(module: &Module, id: ExprId) -> Result<Option<Value>, ErrorCode> {
    let expr = module.expr(id);
    let value = match &expr.kind {
        ExprKind::Literal(lit) => Value::from(lit),
        ExprKind::Unary { op, operand } => {
            let Some(inner) = operand_as(module, *operand, &expr.ty)? else {
                return Ok(None);
            };
            ops::unary(*op, &expr.ty, &inner)?
        }
        ExprKind::Binary {
            op,
            operand,
            left,
            right,
        } => {
            let l = operand_as(module, *left, operand)?;
            let r = operand_as(module, *right, operand)?;
            let (Some(l), Some(r)) = (l, r) else {
                return Ok(None);
            };
            ops::binary(*op, operand, &l, &r)?
        }
        ExprKind::Logical { op, left, right } => {
            let l = eval_constant(module, *left)?;
            let r = eval_constant(module, *right)?;
            let (Some(l), Some(r)) = (l, r) else {
                return Ok(None);
            };
            let (l, r) = (ops::truthy(&l)?, ops::truthy(&r)?);
            Value::Bool(match op {
                LogicalOp::And => l && r,
                LogicalOp::Or => l || r,
            })
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            let Some(c) = eval_constant(module, *cond)? else {
                return Ok(None);
            };
            let branch = if ops::truthy(&c)? { *then_expr } else { *else_expr };
            match operand_as(module, branch, &expr.ty)? {
                Some(v) => v,
                None => return Ok(None),
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Evaluate `id` and convert it to `ty`.
fn operand_as(module: &Module, id: ExprId, ty: &TypeDesc) -> Result<Option<Value>, ErrorCode> {
    let Some(value) = eval_constant(module, id)? else {
        return Ok(None);
    };
    convert(value, &module.expr(id).ty, ty).map(Some)
}
