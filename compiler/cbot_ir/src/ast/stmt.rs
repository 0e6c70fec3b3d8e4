//! Statement nodes.

use smallvec::SmallVec;

use crate::{ExprId, LocalSlot, Span, StmtId};

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(ExprId),
    /// Local declaration. `limits` has one entry per array dimension,
    /// outermost first (`int a[5][]` is `[Some(5), None]`); an array
    /// without initializer starts empty.
    Decl {
        slot: LocalSlot,
        limits: Vec<Option<u32>>,
        init: Option<ExprId>,
    },
    Block(Vec<StmtId>),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        label: Option<String>,
        cond: ExprId,
        body: StmtId,
    },
    DoWhile {
        label: Option<String>,
        body: StmtId,
        cond: ExprId,
    },
    For {
        label: Option<String>,
        init: Vec<StmtId>,
        cond: Option<ExprId>,
        step: Vec<ExprId>,
        body: StmtId,
    },
    Repeat {
        label: Option<String>,
        count: ExprId,
        body: StmtId,
    },
    /// `cases[i].start` indexes into `body`; execution falls through.
    Switch {
        value: ExprId,
        cases: Vec<SwitchCase>,
        body: Vec<StmtId>,
    },
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<ExprId>),
    Throw(ExprId),
    Try {
        body: Vec<StmtId>,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
}

impl StmtKind {
    /// Loop label, for loop statements.
    pub fn label(&self) -> Option<&str> {
        match self {
            StmtKind::While { label, .. }
            | StmtKind::DoWhile { label, .. }
            | StmtKind::For { label, .. }
            | StmtKind::Repeat { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            StmtKind::While { .. }
                | StmtKind::DoWhile { .. }
                | StmtKind::For { .. }
                | StmtKind::Repeat { .. }
        )
    }

    /// Direct sub-expressions.
    pub fn child_exprs(&self) -> SmallVec<[ExprId; 4]> {
        let mut out = SmallVec::new();
        match self {
            StmtKind::Expr(e) | StmtKind::Throw(e) => out.push(*e),
            StmtKind::Decl { init, .. } | StmtKind::Return(init) => out.extend(init.iter().copied()),
            StmtKind::If { cond, .. }
            | StmtKind::While { cond, .. }
            | StmtKind::DoWhile { cond, .. } => out.push(*cond),
            StmtKind::For { cond, step, .. } => {
                out.extend(cond.iter().copied());
                out.extend(step.iter().copied());
            }
            StmtKind::Repeat { count, .. } => out.push(*count),
            StmtKind::Switch { value, .. } => out.push(*value),
            StmtKind::Try { catches, .. } => out.extend(catches.iter().map(|c| c.cond)),
            StmtKind::Block(_) | StmtKind::Break(_) | StmtKind::Continue(_) => {}
        }
        out
    }

    /// Direct sub-statements.
    pub fn child_stmts(&self) -> SmallVec<[StmtId; 4]> {
        let mut out = SmallVec::new();
        match self {
            StmtKind::Block(stmts) | StmtKind::Switch { body: stmts, .. } => {
                out.extend(stmts.iter().copied());
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                out.push(*then_branch);
                out.extend(else_branch.iter().copied());
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Repeat { body, .. } => out.push(*body),
            StmtKind::For { init, body, .. } => {
                out.extend(init.iter().copied());
                out.push(*body);
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                out.extend(body.iter().copied());
                out.extend(catches.iter().map(|c| c.body));
                out.extend(finally.iter().copied());
            }
            StmtKind::Expr(_)
            | StmtKind::Decl { .. }
            | StmtKind::Break(_)
            | StmtKind::Continue(_)
            | StmtKind::Return(_)
            | StmtKind::Throw(_) => {}
        }
        out
    }
}

/// One `case` label; `value` is `None` for `default`.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Option<i64>,
    pub start: u32,
}

/// How a `catch` clause decides whether it applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CatchKind {
    /// `catch (int)`: matches an exception with the same code.
    Code,
    /// `catch (bool)`: matches any exception while true, and is polled
    /// after each statement of the try body.
    Condition,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub kind: CatchKind,
    pub cond: ExprId,
    pub body: StmtId,
    pub span: Span,
}
