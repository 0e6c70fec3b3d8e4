//! Runtime values for the CBOT execution machine.
//!
//! # Ownership regimes
//!
//! - **Value copy**: scalars and strings are copied on assignment
//! - **Shared ownership**: arrays (`ArrayRef`) and class instances
//!   (`ObjRef`) are reference types; assignment aliases and the storage
//!   lives as long as its longest holder
//! - **Cells**: every variable, parameter, field and array element is a
//!   `VarCell` with a declared type and an initialization state; binding a
//!   cell elsewhere shares it without copying
//!
//! All three handles wrap `Rc<RefCell<_>>`: one program executes on one
//! thread, strictly sequentially.

mod array;
mod convert;
mod heap;
mod instance;
pub mod ops;
mod value;
mod var;

pub use array::{ArrayData, MAX_ARRAY_SIZE};
pub use convert::{convert, format_float, wrap_integer, zero_value};
pub use heap::{ArrayRef, ObjRef, VarCell};
pub use instance::{ClassLayout, FieldSlot, Instance};
pub use value::Value;
pub use var::{InitState, Var};
