//! One state machine per node kind.
//!
//! A step runs a frame until it needs a child result, wants to count a
//! step, or is done. `frame.state` records where to pick up; the child's
//! completion arrives as `incoming` on the next call.
//!
//! - `init`: the root frame, function bodies and field initializers
//! - `stmt`: statements, loops and `switch`
//! - `handler`: `try`/`catch`/`finally`
//! - `expr`: operators, places and literals
//! - `call`: user calls, native calls, method calls and `new`

mod call;
mod expr;
mod handler;
mod init;
mod stmt;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{ExprId, Module, StmtId, TypeDesc};
use cbot_value::{convert, ArrayData, ArrayRef, Value, Var, VarCell};

use crate::completion::Interrupt;
use crate::{Completion, Frame, Machine, Node, Want};

/// What the driver does after a step.
#[derive(Debug)]
pub(crate) enum Action {
    /// Keep this frame and run the child on top of it.
    Push(Frame),
    /// Keep this frame and count one step; the slice may end here.
    Tick,
    /// Pop this frame and hand the completion to its parent.
    Complete(Completion),
}

pub(crate) type StepResult = Result<Action, Interrupt>;

impl Machine {
    pub(crate) fn step(&mut self, frame: &mut Frame, incoming: Option<Completion>) -> StepResult {
        match frame.node {
            Node::Start(entry) => self.step_start(frame, entry, incoming),
            Node::Function(func) => self.step_function(frame, func, incoming),
            Node::FieldInit(class) => self.step_field_init(frame, class, incoming),
            Node::Stmt(id) => self.step_stmt(frame, id, incoming),
            Node::Expr(id, want) => self.step_expr(frame, id, want, incoming),
        }
    }
}

/// Run `stmt` on top of `frame`.
fn push_stmt(frame: &Frame, stmt: StmtId) -> Action {
    Action::Push(Frame::new(Node::Stmt(stmt), frame.act))
}

/// Evaluate `expr` on top of `frame`.
fn push_expr(frame: &Frame, expr: ExprId, want: Want) -> Action {
    Action::Push(Frame::new(Node::Expr(expr, want), frame.act))
}

/// Hand a cell to the parent, as a place or by value.
fn deliver(cell: VarCell, want: Want) -> StepResult {
    Ok(Action::Complete(match want {
        Want::Place => Completion::Place(cell),
        Want::Value => Completion::Value(cell.borrow().get()?),
    }))
}

/// Hand a computed value to the parent. A parent asking for a place gets
/// a temporary cell.
fn produce(value: Value, ty: &TypeDesc, want: Want) -> StepResult {
    Ok(Action::Complete(match want {
        Want::Value => Completion::Value(value),
        Want::Place => Completion::Place(VarCell::new(Var::with_value(ty.clone(), value))),
    }))
}

/// Operand conversion for a binary operator. References compare by
/// identity and are never converted.
fn operand(value: Value, from: &TypeDesc, to: &TypeDesc) -> Result<Value, ErrorCode> {
    if to.is_reference() {
        Ok(value)
    } else {
        convert(value, from, to)
    }
}

/// Store an initializer into a declared variable. An array initializer
/// stored into a bounded declaration is copied into a bounded array, so
/// too many elements raise `OutArray`.
pub(crate) fn store_declared(
    cell: &VarCell,
    value: Value,
    from: &TypeDesc,
    limits: &[Option<u32>],
) -> Result<(), ErrorCode> {
    let bounded = match (&value, limits.first()) {
        (Value::Array(source), Some(Some(_))) => {
            let source = source.borrow();
            let mut array = ArrayData::new(source.elem().clone(), limits.to_vec());
            for item in source.items() {
                array.push(item.clone())?;
            }
            Some(Value::Array(ArrayRef::new(array)))
        }
        _ => None,
    };
    cell.borrow_mut().store(bounded.unwrap_or(value), from)
}

/// Static type of an expression.
fn type_of(module: &Module, expr: ExprId) -> &TypeDesc {
    &module.expr(expr).ty
}

/// Largest valid `state` for a node, for snapshot validation.
pub(crate) fn max_state(module: &Module, node: Node) -> Option<u32> {
    match node {
        Node::Start(_) => Some(init::START_MAX),
        Node::Function(_) => Some(init::FUNCTION_MAX),
        Node::FieldInit(_) => Some(init::FIELD_INIT_MAX),
        Node::Stmt(id) => module.get_stmt(id).map(|s| stmt::max_state(&s.kind)),
        Node::Expr(id, _) => module.get_expr(id).map(|e| expr::max_state(&e.kind)),
    }
}
