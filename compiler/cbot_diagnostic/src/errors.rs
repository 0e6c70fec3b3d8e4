//! Compile and runtime error values.

use cbot_ir::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ErrorCode;

/// Result of a compile operation.
pub type CompileResult<T> = Result<T, CompileError>;

/// The first error of a failed compilation, anchored to a token span.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub code: ErrorCode,
    pub span: Span,
}

impl CompileError {
    #[cold]
    pub fn new(code: ErrorCode, span: Span) -> Self {
        CompileError { code, span }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error {} ({}) at {}: {}",
            self.code.code(),
            self.code.name(),
            self.span,
            self.code.message()
        )
    }
}

impl std::error::Error for CompileError {}

/// An exception raised during execution.
///
/// `code` is an `i32` rather than an `ErrorCode`: scripts may `throw` any
/// positive integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeError {
    pub code: i32,
    pub span: Span,
}

impl RuntimeError {
    #[cold]
    pub fn new(code: ErrorCode, span: Span) -> Self {
        RuntimeError {
            code: code.code(),
            span,
        }
    }

    /// A user `throw` with an arbitrary code.
    #[cold]
    pub fn thrown(code: i32, span: Span) -> Self {
        RuntimeError { code, span }
    }

    /// The built-in error this code names, if any.
    pub fn known(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known() {
            Some(code) => write!(
                f,
                "runtime error {} ({}) at {}: {}",
                self.code,
                code.name(),
                self.span,
                code.message()
            ),
            None => write!(f, "uncaught exception {} at {}", self.code, self.span),
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests;
