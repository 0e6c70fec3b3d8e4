//! How a frame finished.

use cbot_diagnostic::{ErrorCode, RuntimeError};
use cbot_value::{Value, VarCell};

/// The result a finished frame hands to its parent.
#[derive(Clone, Debug)]
pub enum Completion {
    /// A statement ran to its end.
    Normal,
    /// An expression produced a value.
    Value(Value),
    /// An expression evaluated as a storage location.
    Place(VarCell),
    Break(Option<String>),
    Continue(Option<String>),
    Return(Value),
    Throw(RuntimeError),
}

impl Completion {
    /// Whether this completion skips the rest of the enclosing statements.
    pub fn is_abrupt(&self) -> bool {
        matches!(
            self,
            Completion::Break(_)
                | Completion::Continue(_)
                | Completion::Return(_)
                | Completion::Throw(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Completion::Normal => "normal",
            Completion::Value(_) => "value",
            Completion::Place(_) => "place",
            Completion::Break(_) => "break",
            Completion::Continue(_) => "continue",
            Completion::Return(_) => "return",
            Completion::Throw(_) => "throw",
        }
    }
}

/// Why a step stopped short of its next action.
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// A runtime error raised by this frame; the driver adds the span.
    Raise(ErrorCode),
    /// An abrupt completion from a child that this frame does not handle.
    Propagate(Completion),
}

impl From<ErrorCode> for Interrupt {
    fn from(code: ErrorCode) -> Self {
        Interrupt::Raise(code)
    }
}

/// The value a child expression produced; abrupt completions propagate.
pub(crate) fn value(incoming: Option<Completion>) -> Result<Value, Interrupt> {
    match incoming {
        Some(Completion::Value(value)) => Ok(value),
        Some(Completion::Place(cell)) => Ok(cell.borrow().get()?),
        Some(abrupt) if abrupt.is_abrupt() => Err(Interrupt::Propagate(abrupt)),
        _ => Err(Interrupt::Raise(ErrorCode::NoRun)),
    }
}

/// The cell a child place expression produced.
pub(crate) fn place(incoming: Option<Completion>) -> Result<VarCell, Interrupt> {
    match incoming {
        Some(Completion::Place(cell)) => Ok(cell),
        Some(abrupt) if abrupt.is_abrupt() => Err(Interrupt::Propagate(abrupt)),
        _ => Err(Interrupt::Raise(ErrorCode::NoRun)),
    }
}

/// A child statement finished; anything abrupt propagates.
pub(crate) fn settle(incoming: Option<Completion>) -> Result<(), Interrupt> {
    match incoming {
        Some(abrupt) if abrupt.is_abrupt() => Err(Interrupt::Propagate(abrupt)),
        _ => Ok(()),
    }
}
