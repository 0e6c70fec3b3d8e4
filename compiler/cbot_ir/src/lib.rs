//! CBOT IR - shared data structures for the CBOT toolchain.
//!
//! This crate holds everything the tokenizer, compiler and execution
//! machine agree on:
//! - Spans for source locations
//! - Token ids (keywords and operators) and token kinds
//! - Type descriptors with their compatibility rules
//! - The instruction tree: an arena of expressions and statements plus
//!   function and class definitions, addressed by `u32` ids
//!
//! # Design
//!
//! - **Flat arena**: nodes reference children by `ExprId`/`StmtId`, never by `Box`
//! - **Immutable after compile**: the execution machine only reads a `Module`
//! - **Stable ids**: call nodes carry a resolved `FuncId`/`NativeId`, so run
//!   time never repeats name lookup

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod ids;
mod modifiers;
mod span;
mod token;
mod types;

pub use ast::{
    BinaryOp, CatchClause, CatchKind, ClassDef, Expr, ExprKind, FieldDef, FunctionDef, IncDecOp,
    Literal, LocalDef, LogicalOp, MethodDef, MethodImpl, Module, Param, Stmt, StmtKind, SwitchCase,
    UnaryOp,
};
pub use ids::{ClassId, ExprId, FuncId, LocalSlot, MethodSlot, NativeId, StmtId};
pub use modifiers::{Modifiers, Visibility};
pub use span::Span;
pub use token::{TokenId, TokenKind};
pub use types::TypeDesc;
