use super::*;
use cbot_ir::{CatchClause, CatchKind, Expr, ExprKind, Literal, Span, Stmt, TypeDesc};

struct Builder {
    module: Module,
}

impl Builder {
    fn new() -> Self {
        Builder {
            module: Module::new(),
        }
    }

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.module.alloc_stmt(Stmt::new(kind, Span::DUMMY))
    }

    fn ret(&mut self) -> StmtId {
        self.stmt(StmtKind::Return(None))
    }

    fn plain(&mut self) -> StmtId {
        let e = self.cond();
        self.stmt(StmtKind::Expr(e))
    }

    fn cond(&mut self) -> cbot_ir::ExprId {
        self.module.alloc_expr(Expr::new(
            ExprKind::Literal(Literal::Bool(true)),
            TypeDesc::Boolean,
            Span::DUMMY,
        ))
    }
}

#[test]
fn return_and_throw_leave() {
    let mut b = Builder::new();
    let r = b.ret();
    let e = b.cond();
    let t = b.stmt(StmtKind::Throw(e));
    assert!(always_returns(&b.module, r));
    assert!(always_returns(&b.module, t));
}

#[test]
fn block_leaves_when_any_statement_does() {
    let mut b = Builder::new();
    let p = b.plain();
    let r = b.ret();
    let block = b.stmt(StmtKind::Block(vec![p, r]));
    let open = b.stmt(StmtKind::Block(vec![p]));
    assert!(always_returns(&b.module, block));
    assert!(!always_returns(&b.module, open));
}

#[test]
fn if_needs_both_branches() {
    let mut b = Builder::new();
    let c = b.cond();
    let r1 = b.ret();
    let r2 = b.ret();
    let p = b.plain();
    let both = b.stmt(StmtKind::If {
        cond: c,
        then_branch: r1,
        else_branch: Some(r2),
    });
    let one = b.stmt(StmtKind::If {
        cond: c,
        then_branch: r1,
        else_branch: Some(p),
    });
    let no_else = b.stmt(StmtKind::If {
        cond: c,
        then_branch: r1,
        else_branch: None,
    });
    assert!(always_returns(&b.module, both));
    assert!(!always_returns(&b.module, one));
    assert!(!always_returns(&b.module, no_else));
}

#[test]
fn loops_never_count() {
    let mut b = Builder::new();
    let c = b.cond();
    let r = b.ret();
    let w = b.stmt(StmtKind::While {
        label: None,
        cond: c,
        body: r,
    });
    assert!(!always_returns(&b.module, w));
}

#[test]
fn try_needs_every_handler_or_a_returning_finally() {
    let mut b = Builder::new();
    let c = b.cond();
    let r = b.ret();
    let p = b.plain();
    let catch = |body| CatchClause {
        kind: CatchKind::Code,
        cond: c,
        body,
        span: Span::DUMMY,
    };
    let handled = b.stmt(StmtKind::Try {
        body: vec![r],
        catches: vec![catch(r)],
        finally: None,
    });
    let leaky = b.stmt(StmtKind::Try {
        body: vec![r],
        catches: vec![catch(p)],
        finally: None,
    });
    let by_finally = b.stmt(StmtKind::Try {
        body: vec![p],
        catches: vec![catch(p)],
        finally: Some(r),
    });
    assert!(always_returns(&b.module, handled));
    assert!(!always_returns(&b.module, leaky));
    assert!(always_returns(&b.module, by_finally));
}
