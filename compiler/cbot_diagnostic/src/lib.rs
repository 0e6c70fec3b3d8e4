//! Diagnostics for the CBOT toolchain.
//!
//! - `ErrorCode`: every compile (5xxx) and runtime (6xxx) error code
//! - `CompileError`: the single error a failed compilation reports
//! - `RuntimeError`: an exception escaping the execution stack
//! - `emitter`: labelled terminal reports over the program source

mod error_code;
mod errors;
pub mod emitter;

pub use error_code::ErrorCode;
pub use errors::{CompileError, CompileResult, RuntimeError};
