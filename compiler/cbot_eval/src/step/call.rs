//! Calls and `new`.
//!
//! Arguments are evaluated left to right into `frame.values`, `cursor`
//! counting the ones pushed so far. A user call binds them to fresh
//! parameter cells in a new activation and runs the body as a child
//! frame; a native call runs to completion within the step.

use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{ClassId, ExprId, FuncId, MethodImpl, MethodSlot, NativeId, TypeDesc};
use cbot_registry::NativeCall;
use cbot_value::{Instance, ObjRef, Value, Var, VarCell};

use super::{produce, push_expr, type_of, Action, StepResult};
use crate::completion::{settle, value, Interrupt};
use crate::machine::Activation;
use crate::{Completion, Frame, Machine, Node, Want};

const ARGS: u32 = 0;
const RESULT: u32 = 1;
pub(super) const CALL_MAX: u32 = RESULT;
pub(super) const NATIVE_CALL_MAX: u32 = ARGS;

// Method calls: the receiver, then the arguments behind it in `values`.
const RECEIVER: u32 = 0;
const METHOD_ARGS: u32 = 1;
const METHOD_RESULT: u32 = 2;
pub(super) const METHOD_CALL_MAX: u32 = METHOD_RESULT;

// `new`: the instance goes last in `values`, after the arguments.
const NEW_ARGS: u32 = 0;
const CONSTRUCT: u32 = 1;
const CONSTRUCTED: u32 = 2;
pub(super) const NEW_MAX: u32 = CONSTRUCTED;

/// Take the value of the argument just evaluated and push the next one.
/// `None` once every argument is in `frame.values`.
fn collect_args(
    frame: &mut Frame,
    args: &[ExprId],
    incoming: Option<Completion>,
) -> Result<Option<Action>, Interrupt> {
    if incoming.is_some() {
        frame.values.push(value(incoming)?);
    }
    match args.get(frame.cursor as usize) {
        Some(&next) => {
            frame.cursor += 1;
            Ok(Some(push_expr(frame, next, Want::Value)))
        }
        None => Ok(None),
    }
}

fn receiver(value: Option<&Value>) -> Result<ObjRef, ErrorCode> {
    match value {
        Some(Value::Object(object)) => Ok(object.clone()),
        Some(Value::Null) => Err(ErrorCode::Null),
        _ => Err(ErrorCode::NotClass),
    }
}

impl Machine {
    pub(super) fn step_call(
        &mut self,
        frame: &mut Frame,
        func: FuncId,
        args: &[ExprId],
        ty: &TypeDesc,
        want: Want,
        incoming: Option<Completion>,
    ) -> StepResult {
        if frame.state == ARGS {
            if let Some(action) = collect_args(frame, args, incoming)? {
                return Ok(action);
            }
            let values = std::mem::take(&mut frame.values);
            let act = self.bind(func, None, args, &values)?;
            frame.state = RESULT;
            return Ok(Action::Push(Frame::new(Node::Function(func), act)));
        }
        produce(value(incoming)?, ty, want)
    }

    pub(super) fn step_native_call(
        &mut self,
        frame: &mut Frame,
        native: NativeId,
        args: &[ExprId],
        ty: &TypeDesc,
        want: Want,
        incoming: Option<Completion>,
    ) -> StepResult {
        if let Some(action) = collect_args(frame, args, incoming)? {
            return Ok(action);
        }
        let result = self.call_native(native, None, args, &frame.values)?;
        produce(result, ty, want)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn step_method_call(
        &mut self,
        frame: &mut Frame,
        object: ExprId,
        slot: Option<MethodSlot>,
        target: MethodImpl,
        args: &[ExprId],
        ty: &TypeDesc,
        want: Want,
        incoming: Option<Completion>,
    ) -> StepResult {
        match frame.state {
            RECEIVER => {
                frame.state = METHOD_ARGS;
                Ok(push_expr(frame, object, Want::Value))
            }
            METHOD_ARGS => {
                if let Some(action) = collect_args(frame, args, incoming)? {
                    return Ok(action);
                }
                let this = receiver(frame.values.first())?;
                let arg_values = frame.values.get(1..).unwrap_or_default();
                match target {
                    MethodImpl::User(func) => {
                        let func = self.dispatch(&this, slot).unwrap_or(func);
                        let act = self.bind(func, Some(this), args, arg_values)?;
                        frame.values.clear();
                        frame.state = METHOD_RESULT;
                        Ok(Action::Push(Frame::new(Node::Function(func), act)))
                    }
                    MethodImpl::Native(native) => {
                        let result = self.call_native(native, Some(&this), args, arg_values)?;
                        produce(result, ty, want)
                    }
                }
            }
            _ => produce(value(incoming)?, ty, want),
        }
    }

    /// Allocation, field initializers, then the constructor.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn step_new(
        &mut self,
        frame: &mut Frame,
        class: ClassId,
        ctor: Option<MethodImpl>,
        args: &[ExprId],
        ty: &TypeDesc,
        want: Want,
        incoming: Option<Completion>,
    ) -> StepResult {
        match frame.state {
            NEW_ARGS => {
                if let Some(action) = collect_args(frame, args, incoming)? {
                    return Ok(action);
                }
                let layout = self
                    .layouts
                    .get(class.index())
                    .cloned()
                    .ok_or(ErrorCode::NotClass)?;
                let object = ObjRef::new(Instance::new(layout));
                frame.values.push(Value::Object(object.clone()));
                let act = self.push_activation(Activation::bare(Some(object)))?;
                frame.state = CONSTRUCT;
                Ok(Action::Push(Frame::new(Node::FieldInit(class), act)))
            }
            CONSTRUCT => {
                settle(incoming)?;
                let (last, arg_values) = frame.values.split_last().ok_or(ErrorCode::NoRun)?;
                let this = receiver(Some(last))?;
                match ctor {
                    None => produce(Value::Object(this), ty, want),
                    Some(MethodImpl::User(func)) => {
                        let act = self.bind(func, Some(this.clone()), args, arg_values)?;
                        frame.values = vec![Value::Object(this)];
                        frame.state = CONSTRUCTED;
                        Ok(Action::Push(Frame::new(Node::Function(func), act)))
                    }
                    Some(MethodImpl::Native(native)) => {
                        self.call_native(native, Some(&this), args, arg_values)?;
                        produce(Value::Object(this), ty, want)
                    }
                }
            }
            _ => {
                value(incoming)?;
                let this = receiver(frame.values.last())?;
                produce(Value::Object(this), ty, want)
            }
        }
    }

    /// The override of `slot` in the receiver's runtime class.
    fn dispatch(&self, this: &ObjRef, slot: Option<MethodSlot>) -> Option<FuncId> {
        let class = this.borrow().class_id();
        let def = self.module.classes.get(class.index())?;
        def.vtable.get(&slot?).copied()
    }

    /// Activation of `func` with its parameters bound to `values`.
    fn bind(
        &mut self,
        func: FuncId,
        this: Option<ObjRef>,
        args: &[ExprId],
        values: &[Value],
    ) -> Result<u32, ErrorCode> {
        let module = Arc::clone(&self.module);
        let def = module.get_function(func).ok_or(ErrorCode::UndefFunc)?;
        let mut activation = Activation::for_function(&module, func, this);
        for ((param, arg), value) in def.params.iter().zip(args).zip(values) {
            let cell = VarCell::new(Var::new(param.ty.clone()));
            cell.borrow_mut().store(value.clone(), type_of(&module, *arg))?;
            if let Some(local) = activation.locals.get_mut(param.slot.index()) {
                *local = cell;
            }
        }
        self.push_activation(activation)
    }

    fn call_native(
        &self,
        native: NativeId,
        this: Option<&ObjRef>,
        args: &[ExprId],
        values: &[Value],
    ) -> Result<Value, ErrorCode> {
        let arg_types: Vec<TypeDesc> = args
            .iter()
            .map(|arg| type_of(&self.module, *arg).clone())
            .collect();
        self.registry
            .call(native, &mut NativeCall::new(this, values, &arg_types))
    }
}
