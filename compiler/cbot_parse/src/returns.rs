//! Whether a statement always leaves its function.
//!
//! A non-void function whose body can run off its end is rejected with
//! `NoReturn`. `return` and `throw` leave; a block leaves when any of its
//! statements does; `if` only when both branches do; `try` when its body
//! and every handler do, or when its `finally` does. Loops never count,
//! whatever their condition.

use cbot_ir::{Module, StmtId, StmtKind};

use crate::stack::ensure_sufficient_stack;

pub fn always_returns(module: &Module, id: StmtId) -> bool {
    ensure_sufficient_stack(|| stmt_returns(module, id))
}

fn stmt_returns(module: &Module, id: StmtId) -> bool {
    match &module.stmt(id).kind {
        StmtKind::Return(_) | StmtKind::Throw(_) => true,
        StmtKind::Block(stmts) => stmts.iter().any(|&s| always_returns(module, s)),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => else_branch.is_some_and(|else_branch| {
            always_returns(module, *then_branch) && always_returns(module, else_branch)
        }),
        StmtKind::Try {
            body,
            catches,
            finally,
        } => {
            let guarded = body.iter().any(|&s| always_returns(module, s))
                && catches.iter().all(|c| always_returns(module, c.body));
            guarded || finally.is_some_and(|f| always_returns(module, f))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests;
