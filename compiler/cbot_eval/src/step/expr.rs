//! Operators, places and literals.
//!
//! `Want::Place` asks for the cell an expression denotes instead of its
//! value. Places are what assignments, `++`/`--` and array writes work on;
//! an indexed write grows the array, and creates a missing nested array,
//! on its way to the element.

use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{ExprId, ExprKind, LogicalOp};
use cbot_value::{convert, ops, ArrayData, ArrayRef, Value, Var, VarCell};

use super::{deliver, operand, produce, push_expr, type_of, Action, StepResult};
use crate::completion::{place, value};
use crate::{Completion, Frame, Machine, Want};

const FIRST: u32 = 1;
const SECOND: u32 = 2;

pub(super) fn max_state(kind: &ExprKind) -> u32 {
    match kind {
        ExprKind::Literal(_)
        | ExprKind::Local(_)
        | ExprKind::This
        | ExprKind::StaticField { .. }
        | ExprKind::ArrayLit(_) => 0,
        ExprKind::Field { .. } | ExprKind::IncDec { .. } | ExprKind::Unary { .. } => FIRST,
        ExprKind::Index { .. }
        | ExprKind::Assign { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Logical { .. }
        | ExprKind::Conditional { .. } => SECOND,
        ExprKind::Call { .. } => super::call::CALL_MAX,
        ExprKind::NativeCall { .. } => super::call::NATIVE_CALL_MAX,
        ExprKind::MethodCall { .. } => super::call::METHOD_CALL_MAX,
        ExprKind::New { .. } => super::call::NEW_MAX,
    }
}

impl Machine {
    pub(super) fn step_expr(
        &mut self,
        frame: &mut Frame,
        id: ExprId,
        want: Want,
        incoming: Option<Completion>,
    ) -> StepResult {
        let module = Arc::clone(&self.module);
        let expr = module.expr(id);
        let ty = &expr.ty;
        match &expr.kind {
            ExprKind::Literal(literal) => produce(Value::from(literal), ty, want),
            ExprKind::Local(slot) => {
                let cell = self
                    .activation(frame)?
                    .locals
                    .get(slot.index())
                    .cloned()
                    .ok_or(ErrorCode::UndefVar)?;
                deliver(cell, want)
            }
            ExprKind::This => {
                let this = self.activation(frame)?.this.clone();
                produce(this.map_or(Value::Null, Value::Object), ty, want)
            }
            ExprKind::Field { object, index } => {
                if frame.state == 0 {
                    frame.state = FIRST;
                    return Ok(push_expr(frame, *object, Want::Value));
                }
                let object = match value(incoming)? {
                    Value::Object(object) => object,
                    Value::Null => return Err(ErrorCode::Null.into()),
                    _ => return Err(ErrorCode::NotClass.into()),
                };
                let cell = object
                    .borrow()
                    .field(*index as usize)
                    .cloned()
                    .ok_or(ErrorCode::UndefItem)?;
                deliver(cell, want)
            }
            ExprKind::StaticField { class, index } => {
                let cell = self
                    .statics
                    .get(class.index())
                    .and_then(|fields| fields.get(*index as usize))
                    .cloned()
                    .ok_or(ErrorCode::UndefItem)?;
                deliver(cell, want)
            }
            ExprKind::Index { array, index } => match frame.state {
                0 => {
                    frame.state = FIRST;
                    Ok(push_expr(frame, *array, want))
                }
                FIRST => {
                    match want {
                        Want::Place => frame.place = Some(place(incoming)?),
                        Want::Value => frame.values = vec![value(incoming)?],
                    }
                    frame.state = SECOND;
                    Ok(push_expr(frame, *index, Want::Value))
                }
                _ => {
                    let at = match value(incoming)? {
                        Value::Nan => return Err(ErrorCode::Nan.into()),
                        other => other.as_int().ok_or(ErrorCode::BadIndex)?,
                    };
                    match want {
                        Want::Place => {
                            let holder = frame.place.take().ok_or(ErrorCode::NoRun)?;
                            let array = array_for_write(&holder)?;
                            let cell = array.borrow_mut().get_or_grow(at)?;
                            Ok(Action::Complete(Completion::Place(cell)))
                        }
                        Want::Value => {
                            let array = match frame.values.pop() {
                                Some(Value::Array(array)) => array,
                                Some(Value::Null) => return Err(ErrorCode::Null.into()),
                                _ => return Err(ErrorCode::BadIndex.into()),
                            };
                            let cell = array.borrow().get(at)?;
                            deliver(cell, want)
                        }
                    }
                }
            },
            ExprKind::Assign {
                op,
                operand: common,
                target,
                value: source,
            } => match frame.state {
                0 => {
                    frame.state = FIRST;
                    Ok(push_expr(frame, *target, Want::Place))
                }
                FIRST => {
                    frame.place = Some(place(incoming)?);
                    frame.state = SECOND;
                    Ok(push_expr(frame, *source, Want::Value))
                }
                _ => {
                    let assigned = value(incoming)?;
                    let cell = frame.place.take().ok_or(ErrorCode::NoRun)?;
                    let from = type_of(&module, *source);
                    match op {
                        None => cell.borrow_mut().store(assigned, from)?,
                        Some(op) => {
                            let current = cell.borrow().get()?;
                            let left = operand(current, ty, common)?;
                            let right = operand(assigned, from, common)?;
                            let result = ops::binary(*op, common, &left, &right)?;
                            cell.borrow_mut().store(result, common)?;
                        }
                    }
                    let result = cell.borrow().peek().clone();
                    produce(result, ty, want)
                }
            },
            ExprKind::IncDec { op, target } => {
                if frame.state == 0 {
                    frame.state = FIRST;
                    return Ok(push_expr(frame, *target, Want::Place));
                }
                let cell = place(incoming)?;
                let before = cell.borrow().get()?;
                let after = ops::step(*op, ty, &before)?;
                cell.borrow_mut().set(after.clone())?;
                produce(if op.is_postfix() { before } else { after }, ty, want)
            }
            ExprKind::Binary {
                op,
                operand: common,
                left,
                right,
            } => match frame.state {
                0 => {
                    frame.state = FIRST;
                    Ok(push_expr(frame, *left, Want::Value))
                }
                FIRST => {
                    frame.values = vec![value(incoming)?];
                    frame.state = SECOND;
                    Ok(push_expr(frame, *right, Want::Value))
                }
                _ => {
                    let r = operand(value(incoming)?, type_of(&module, *right), common)?;
                    let l = frame.values.pop().ok_or(ErrorCode::NoRun)?;
                    let l = operand(l, type_of(&module, *left), common)?;
                    produce(ops::binary(*op, common, &l, &r)?, ty, want)
                }
            },
            ExprKind::Logical { op, left, right } => match frame.state {
                0 => {
                    frame.state = FIRST;
                    Ok(push_expr(frame, *left, Want::Value))
                }
                FIRST => {
                    let l = ops::truthy(&value(incoming)?)?;
                    match (op, l) {
                        (LogicalOp::And, false) | (LogicalOp::Or, true) => {
                            produce(Value::Bool(l), ty, want)
                        }
                        _ => {
                            frame.state = SECOND;
                            Ok(push_expr(frame, *right, Want::Value))
                        }
                    }
                }
                _ => {
                    let r = ops::truthy(&value(incoming)?)?;
                    produce(Value::Bool(r), ty, want)
                }
            },
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => match frame.state {
                0 => {
                    frame.state = FIRST;
                    Ok(push_expr(frame, *cond, Want::Value))
                }
                FIRST => {
                    let taken = ops::truthy(&value(incoming)?)?;
                    frame.aux = u32::from(!taken);
                    frame.state = SECOND;
                    let branch = if taken { *then_expr } else { *else_expr };
                    Ok(push_expr(frame, branch, Want::Value))
                }
                _ => {
                    let branch = if frame.aux == 0 { *then_expr } else { *else_expr };
                    let result = convert(value(incoming)?, type_of(&module, branch), ty)?;
                    produce(result, ty, want)
                }
            },
            ExprKind::Unary { op, operand: inner } => {
                if frame.state == 0 {
                    frame.state = FIRST;
                    return Ok(push_expr(frame, *inner, Want::Value));
                }
                produce(ops::unary(*op, ty, &value(incoming)?)?, ty, want)
            }
            ExprKind::ArrayLit(items) => {
                let elem = ty.element().ok_or(ErrorCode::BadType1)?;
                if let Some(done) = incoming {
                    let item = value(Some(done))?;
                    let index = frame.cursor.saturating_sub(1) as usize;
                    let from = items
                        .get(index)
                        .map(|item| type_of(&module, *item))
                        .ok_or(ErrorCode::NoRun)?;
                    frame.values.push(convert(item, from, elem)?);
                }
                if let Some(&next) = items.get(frame.cursor as usize) {
                    frame.cursor += 1;
                    return Ok(push_expr(frame, next, Want::Value));
                }
                let mut array = ArrayData::new(elem.clone(), Vec::new());
                for item in frame.values.drain(..) {
                    array.push(VarCell::new(Var::with_value(elem.clone(), item)))?;
                }
                produce(Value::Array(ArrayRef::new(array)), ty, want)
            }
            ExprKind::Call { func, args } => self.step_call(frame, *func, args, ty, want, incoming),
            ExprKind::NativeCall { native, args } => {
                self.step_native_call(frame, *native, args, ty, want, incoming)
            }
            ExprKind::MethodCall {
                object,
                slot,
                target,
                args,
            } => self.step_method_call(frame, *object, *slot, *target, args, ty, want, incoming),
            ExprKind::New { class, ctor, args } => {
                self.step_new(frame, *class, *ctor, args, ty, want, incoming)
            }
        }
    }
}

/// The array a write through `holder` goes to. A holder still `null`
/// gets a new empty array of its declared element type.
fn array_for_write(holder: &VarCell) -> Result<ArrayRef, ErrorCode> {
    let current = holder.borrow().peek().clone();
    match current {
        Value::Array(array) => Ok(array),
        Value::Null => {
            let ty = holder.borrow().ty().clone();
            let elem = ty.element().cloned().ok_or(ErrorCode::BadIndex)?;
            let array = ArrayRef::new(ArrayData::new(elem, Vec::new()));
            holder.borrow_mut().store(Value::Array(array.clone()), &ty)?;
            Ok(array)
        }
        _ => Err(ErrorCode::BadIndex),
    }
}
