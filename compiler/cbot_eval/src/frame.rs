//! Execution frames.

use serde::{Deserialize, Serialize};

use cbot_ir::{ClassId, ExprId, FuncId, Module, Span, StmtId};
use cbot_value::{Value, VarCell};

use crate::Completion;

/// The node a frame executes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Root of the chain: static initializers, then the entry function.
    Start(FuncId),
    /// A function activation running its body.
    Function(FuncId),
    /// Field initializers of a new instance of the class.
    FieldInit(ClassId),
    Stmt(StmtId),
    Expr(ExprId, Want),
}

/// What an expression frame delivers to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Want {
    Value,
    /// The storage cell, for a store. Arrays grow to the index.
    Place,
}

impl Node {
    /// Frames that own an activation record (locals and `this`).
    pub fn owns_activation(self) -> bool {
        matches!(self, Node::Start(_) | Node::Function(_) | Node::FieldInit(_))
    }

    /// Source span for errors raised by this frame.
    pub fn span(self, module: &Module) -> Span {
        match self {
            Node::Start(func) | Node::Function(func) => {
                module.get_function(func).map_or(Span::DUMMY, |f| f.span)
            }
            Node::FieldInit(class) => module
                .classes
                .get(class.index())
                .map_or(Span::DUMMY, |c| c.span),
            Node::Stmt(id) => module.get_stmt(id).map_or(Span::DUMMY, |s| s.span),
            Node::Expr(id, _) => module.get_expr(id).map_or(Span::DUMMY, |e| e.span),
        }
    }
}

/// One slot of the execution chain.
///
/// The parent of the frame at index `i` is the frame at `i - 1`.
#[derive(Debug)]
pub struct Frame {
    pub(crate) node: Node,
    /// Which sub-step of the node runs next.
    pub(crate) state: u32,
    /// Position in a statement list, argument list or loop count.
    pub(crate) cursor: u32,
    /// Second cursor: catch clause or static field index.
    pub(crate) aux: u32,
    /// Operands evaluated so far, in evaluation order.
    pub(crate) values: Vec<Value>,
    /// Target cell of an assignment in progress.
    pub(crate) place: Option<VarCell>,
    /// Completion held back while a `finally` block runs.
    pub(crate) pending: Option<Completion>,
    /// Index of the activation record this frame reads locals from.
    pub(crate) act: u32,
}

impl Frame {
    pub fn new(node: Node, act: u32) -> Self {
        Frame {
            node,
            state: 0,
            cursor: 0,
            aux: 0,
            values: Vec::new(),
            place: None,
            pending: None,
            act,
        }
    }

    #[inline]
    pub fn node(&self) -> Node {
        self.node
    }

    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }
}
