//! Building blocks for native type checkers.
//!
//! Checkers walk the argument list in order, so the first problem found
//! decides the error, as a user reading the call left to right expects.

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;

/// Require between `min` and `max` arguments.
pub fn arg_count(args: &[TypeDesc], min: usize, max: usize) -> Result<(), ErrorCode> {
    if args.len() < min {
        Err(ErrorCode::LowParam)
    } else if args.len() > max {
        Err(ErrorCode::OverParam)
    } else {
        Ok(())
    }
}

/// Argument `index` must be a string; a missing argument is `LowParam`.
pub fn expect_string(args: &[TypeDesc], index: usize) -> Result<(), ErrorCode> {
    match args.get(index) {
        None => Err(ErrorCode::LowParam),
        Some(TypeDesc::String) => Ok(()),
        Some(_) => Err(ErrorCode::BadString),
    }
}

/// Argument `index` must be numeric.
pub fn expect_numeric(args: &[TypeDesc], index: usize) -> Result<(), ErrorCode> {
    match args.get(index) {
        None => Err(ErrorCode::LowParam),
        Some(ty) if ty.is_numeric() => Ok(()),
        Some(_) => Err(ErrorCode::BadNum),
    }
}

#[cfg(test)]
mod tests;
