//! The root frame, function bodies and field initializers.

use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{ClassId, FuncId};
use cbot_value::Value;

use super::{push_expr, push_stmt, store_declared, Action, StepResult};
use crate::completion::{settle, value};
use crate::machine::{fresh_var, Activation};
use crate::{Completion, Frame, Machine, Node, Want};

// Root frame: `cursor` is the class, `aux` the static field.
const STATICS: u32 = 0;
const STORE_STATIC: u32 = 1;
const CALL_ENTRY: u32 = 2;
const ENTRY_DONE: u32 = 3;
pub(super) const START_MAX: u32 = ENTRY_DONE;

const BODY: u32 = 0;
const BODY_DONE: u32 = 1;
pub(super) const FUNCTION_MAX: u32 = BODY_DONE;

// Field initializers: `cursor` is the instance field index.
const NEXT_FIELD: u32 = 0;
const STORE_FIELD: u32 = 1;
pub(super) const FIELD_INIT_MAX: u32 = STORE_FIELD;

impl Machine {
    pub(super) fn step_start(
        &mut self,
        frame: &mut Frame,
        entry: FuncId,
        mut incoming: Option<Completion>,
    ) -> StepResult {
        let module = Arc::clone(&self.module);
        loop {
            match frame.state {
                STATICS => {
                    let Some(class) = module.classes.get(frame.cursor as usize) else {
                        frame.state = CALL_ENTRY;
                        continue;
                    };
                    let Some(field) = class.statics.get(frame.aux as usize) else {
                        frame.cursor += 1;
                        frame.aux = 0;
                        continue;
                    };
                    if let Some(init) = field.init {
                        frame.state = STORE_STATIC;
                        return Ok(push_expr(frame, init, Want::Value));
                    }
                    frame.aux += 1;
                }
                STORE_STATIC => {
                    let value = value(incoming.take())?;
                    let field = module
                        .classes
                        .get(frame.cursor as usize)
                        .and_then(|class| class.statics.get(frame.aux as usize))
                        .ok_or(ErrorCode::NoRun)?;
                    let init = field.init.ok_or(ErrorCode::NoRun)?;
                    let from = &module.expr(init).ty;
                    let cell = self
                        .statics
                        .get(frame.cursor as usize)
                        .and_then(|s| s.get(frame.aux as usize))
                        .ok_or(ErrorCode::NoRun)?;
                    store_declared(cell, value, from, &field.limits)?;
                    frame.aux += 1;
                    frame.state = STATICS;
                }
                CALL_ENTRY => {
                    if module.get_function(entry).is_none() {
                        return Err(ErrorCode::UndefFunc.into());
                    }
                    let act = self.push_activation(Activation::for_function(&module, entry, None))?;
                    frame.state = ENTRY_DONE;
                    return Ok(Action::Push(Frame::new(Node::Function(entry), act)));
                }
                _ => {
                    let result = value(incoming.take())?;
                    return Ok(Action::Complete(Completion::Value(result)));
                }
            }
        }
    }

    pub(super) fn step_function(
        &mut self,
        frame: &mut Frame,
        func: FuncId,
        incoming: Option<Completion>,
    ) -> StepResult {
        let def = self.module.function(func);
        if frame.state == BODY {
            let body = def.body.ok_or(ErrorCode::UndefFunc)?;
            frame.state = BODY_DONE;
            return Ok(push_stmt(frame, body));
        }
        match incoming {
            Some(Completion::Return(value)) => Ok(Action::Complete(Completion::Value(value))),
            Some(Completion::Throw(error)) => Ok(Action::Complete(Completion::Throw(error))),
            _ if def.ret.is_void() => Ok(Action::Complete(Completion::Value(Value::Void))),
            _ => Err(ErrorCode::NoRetVal.into()),
        }
    }

    pub(super) fn step_field_init(
        &mut self,
        frame: &mut Frame,
        class: ClassId,
        mut incoming: Option<Completion>,
    ) -> StepResult {
        let module = Arc::clone(&self.module);
        let fields = module.instance_fields(class);
        let this = self
            .activation(frame)?
            .this
            .clone()
            .ok_or(ErrorCode::Null)?;
        loop {
            let index = frame.cursor as usize;
            if frame.state == STORE_FIELD {
                let value = value(incoming.take())?;
                let (_, field) = fields.get(index).ok_or(ErrorCode::NoRun)?;
                let init = field.init.ok_or(ErrorCode::NoRun)?;
                let from = &module.expr(init).ty;
                let cell = this.borrow().field(index).cloned().ok_or(ErrorCode::UndefItem)?;
                store_declared(&cell, value, from, &field.limits)?;
                frame.cursor += 1;
                frame.state = NEXT_FIELD;
                continue;
            }
            settle(incoming.take())?;
            let Some((_, field)) = fields.get(index) else {
                return Ok(Action::Complete(Completion::Normal));
            };
            if let Some(init) = field.init {
                frame.state = STORE_FIELD;
                return Ok(push_expr(frame, init, Want::Value));
            }
            if !field.limits.is_empty() {
                let cell = this.borrow().field(index).cloned().ok_or(ErrorCode::UndefItem)?;
                *cell.borrow_mut() = fresh_var(&field.ty, &field.limits);
            }
            frame.cursor += 1;
        }
    }
}

