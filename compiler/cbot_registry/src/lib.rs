//! Registry of host-provided functions and classes.
//!
//! The host builds one `Registry` at startup, registers its native
//! functions, classes and named constants, then shares it (`Arc`) with
//! every program it compiles. The compiler resolves call sites against it
//! and records `NativeId`s, so the execution machine never repeats a name
//! lookup.
//!
//! # Native ABI
//!
//! Each native has two halves:
//! - a **type checker** run at compile time with the argument types,
//!   returning the result type or an error code
//! - an **implementation** run by the execution machine with the argument
//!   values, returning the result or a runtime error code
//!
//! Natives complete synchronously inside one step; they never suspend.

mod check;
mod file_access;
mod registry;
pub mod stdlib;

pub use check::{arg_count, expect_numeric, expect_string};
pub use file_access::{FileAccess, FileHandle, FsFileAccess, MemoryFileAccess, OpenMode};
pub use registry::{
    ClassHandle, HostClass, HostField, HostMethod, NativeCall, NativeExec, NativeFn, Registry,
    TypeCheck,
};
