//! Compiler from CBOT tokens to the typed instruction tree.
//!
//! Compilation runs in three passes over the token list:
//! 1. **Scan**: find every class and function, skipping bodies, so that
//!    declarations may appear in any order.
//! 2. **Declare**: resolve class parents, field types, function and method
//!    signatures (with their constant default values) and build vtables.
//! 3. **Bodies**: compile field initializers and function bodies into
//!    `Expr`/`Stmt` nodes. Every name is resolved here: calls carry the
//!    selected `FuncId` or `NativeId`, fields their instance index.
//!
//! The first error stops compilation; the result is either a complete
//! `Module` or a `CompileError` with the offending span.

mod call;
mod const_eval;
mod cursor;
mod decl;
mod expr;
mod parser;
mod returns;
mod scope;
mod stack;
mod stmt;
mod types;

pub use const_eval::eval_constant;
pub use cursor::Cursor;
pub use parser::Parser;
pub use returns::always_returns;
pub use scope::CompileStack;
pub use stack::ensure_sufficient_stack;
pub use types::{conversion_cost, is_assignable};

use cbot_diagnostic::CompileResult;
use cbot_ir::Module;
use cbot_lexer::TokenList;
use cbot_registry::Registry;
use tracing::debug;

/// Compile a tokenized program against the natives of `registry`.
pub fn compile(tokens: &TokenList, registry: &Registry) -> CompileResult<Module> {
    let module = Parser::new(tokens, registry).compile_program()?;
    debug!(
        functions = module.functions.len(),
        classes = module.classes.len(),
        exprs = module.exprs.len(),
        stmts = module.stmts.len(),
        "compiled program"
    );
    Ok(module)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
