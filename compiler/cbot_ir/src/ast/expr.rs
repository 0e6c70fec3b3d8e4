//! Expression nodes.

use smallvec::SmallVec;
use std::fmt;

use crate::{ClassId, ExprId, FuncId, LocalSlot, MethodSlot, NativeId, Span, TypeDesc};

use super::MethodImpl;

/// An expression with its static type and source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeDesc,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeDesc, span: Span) -> Self {
        Expr { kind, ty, span }
    }
}

/// Literal constants.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    /// Integer, `char` and named constants; width comes from `Expr::ty`.
    Int(i64),
    Float(f64),
    Str(String),
    Null,
    Nan,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// Local variable or parameter of the enclosing function.
    Local(LocalSlot),
    /// The receiver inside a method.
    This,
    /// Instance field; `index` counts fields base class first.
    Field {
        object: ExprId,
        index: u32,
    },
    StaticField {
        class: ClassId,
        index: u32,
    },
    Index {
        array: ExprId,
        index: ExprId,
    },
    /// `target = value`, or `target op= value` when `op` is set.
    ///
    /// `operand` is the type the compound operation is computed in.
    Assign {
        op: Option<BinaryOp>,
        operand: TypeDesc,
        target: ExprId,
        value: ExprId,
    },
    IncDec {
        op: IncDecOp,
        target: ExprId,
    },
    /// `operand` is the common type both sides are converted to.
    Binary {
        op: BinaryOp,
        operand: TypeDesc,
        left: ExprId,
        right: ExprId,
    },
    /// Short-circuit `&&` / `||`.
    Logical {
        op: LogicalOp,
        left: ExprId,
        right: ExprId,
    },
    Conditional {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// Call of a user function.
    Call {
        func: FuncId,
        args: Vec<ExprId>,
    },
    /// Call of a host function.
    NativeCall {
        native: NativeId,
        args: Vec<ExprId>,
    },
    /// Method call. `target` is the statically resolved method; user
    /// methods are re-dispatched through the receiver's vtable by `slot`.
    MethodCall {
        object: ExprId,
        slot: Option<MethodSlot>,
        target: MethodImpl,
        args: Vec<ExprId>,
    },
    /// `new Class(args)`; `ctor` is `None` when the class has no constructor.
    New {
        class: ClassId,
        ctor: Option<MethodImpl>,
        args: Vec<ExprId>,
    },
    /// `{ a, b, c }` in an array initializer.
    ArrayLit(Vec<ExprId>),
}

impl ExprKind {
    /// Direct sub-expressions, in evaluation order.
    pub fn children(&self) -> SmallVec<[ExprId; 4]> {
        let mut out = SmallVec::new();
        match self {
            ExprKind::Literal(_)
            | ExprKind::Local(_)
            | ExprKind::This
            | ExprKind::StaticField { .. } => {}
            ExprKind::Field { object, .. } => out.push(*object),
            ExprKind::Index { array, index } => {
                out.push(*array);
                out.push(*index);
            }
            ExprKind::Assign { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
            ExprKind::IncDec { target, .. } => out.push(*target),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                out.push(*cond);
                out.push(*then_expr);
                out.push(*else_expr);
            }
            ExprKind::Unary { operand, .. } => out.push(*operand),
            ExprKind::Call { args, .. }
            | ExprKind::NativeCall { args, .. }
            | ExprKind::New { args, .. }
            | ExprKind::ArrayLit(args) => out.extend(args.iter().copied()),
            ExprKind::MethodCall { object, args, .. } => {
                out.push(*object);
                out.extend(args.iter().copied());
            }
        }
        out
    }

    /// Whether this expression denotes a storage location.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            ExprKind::Local(_)
                | ExprKind::Field { .. }
                | ExprKind::StaticField { .. }
                | ExprKind::Index { .. }
        )
    }
}

/// Binary operators, lowest precedence last in source order of the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Shl,
    /// Arithmetic shift right (`>>`).
    Shr,
    /// Logical shift right (`>>>`).
    Ushr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Ushr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    /// `!` and `not`.
    Not,
    /// `~`.
    BitNot,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IncDecOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl IncDecOp {
    pub fn delta(self) -> i64 {
        match self {
            IncDecOp::PreInc | IncDecOp::PostInc => 1,
            IncDecOp::PreDec | IncDecOp::PostDec => -1,
        }
    }

    /// Whether the expression yields the value before the update.
    pub fn is_postfix(self) -> bool {
        matches!(self, IncDecOp::PostInc | IncDecOp::PostDec)
    }
}
