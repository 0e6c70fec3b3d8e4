//! The instruction tree.
//!
//! A compiled program is a `Module`: flat arenas of expressions and
//! statements, plus the function and class tables. Composite nodes own
//! their children by id; the tree is never mutated after compilation.
//!
//! # Layout
//!
//! - `expr`: expression nodes and operators
//! - `stmt`: statement nodes (control flow, declarations, try/catch)
//! - `items`: functions, parameters, classes, fields and methods

mod expr;
mod items;
mod stmt;

pub use expr::{BinaryOp, Expr, ExprKind, IncDecOp, Literal, LogicalOp, UnaryOp};
pub use items::{ClassDef, FieldDef, FunctionDef, LocalDef, MethodDef, MethodImpl, Param};
pub use stmt::{CatchClause, CatchKind, Stmt, StmtKind, SwitchCase};

use crate::{ClassId, ExprId, FuncId, MethodSlot, StmtId};

/// A compiled program: the instruction tree and its declarations.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub exprs: Vec<Expr>,
    pub stmts: Vec<Stmt>,
    /// User functions and methods, in declaration order.
    pub functions: Vec<FunctionDef>,
    /// User classes followed by imported host classes.
    pub classes: Vec<ClassDef>,
    /// Interned method signature keys, indexed by `MethodSlot`.
    pub method_slots: Vec<String>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression and return its id.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::from_index(self.exprs.len());
        self.exprs.push(expr);
        id
    }

    /// Append a statement and return its id.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::from_index(self.stmts.len());
        self.stmts.push(stmt);
        id
    }

    /// Look up an expression.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this module.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Look up a statement.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this module.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FuncId) -> &FunctionDef {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    /// Bounds-checked expression lookup, for validating untrusted ids.
    pub fn get_expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    /// Bounds-checked statement lookup.
    pub fn get_stmt(&self, id: StmtId) -> Option<&Stmt> {
        self.stmts.get(id.index())
    }

    /// Bounds-checked function lookup.
    pub fn get_function(&self, id: FuncId) -> Option<&FunctionDef> {
        self.functions.get(id.index())
    }

    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|class| class.name == name)
            .map(ClassId::from_index)
    }

    /// Free functions (not methods) with the given name, in declaration order.
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = FuncId> + 'a {
        self.functions
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.class.is_none() && f.name == name)
            .map(|(i, _)| FuncId::from_index(i))
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.class(id).parent;
        }
        false
    }

    /// Number of `extends` steps from `class` up to `ancestor`.
    pub fn inheritance_distance(&self, class: ClassId, ancestor: ClassId) -> Option<u32> {
        let mut current = Some(class);
        let mut distance = 0;
        while let Some(id) = current {
            if id == ancestor {
                return Some(distance);
            }
            distance += 1;
            current = self.class(id).parent;
        }
        None
    }

    /// The class followed by its ancestors, most derived first.
    pub fn class_chain(&self, class: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(id) = current {
            chain.push(id);
            current = self.class(id).parent;
        }
        chain
    }

    /// Every instance field of `class`, base class fields first.
    ///
    /// The position in this list is the field's index inside an instance.
    pub fn instance_fields(&self, class: ClassId) -> Vec<(ClassId, &FieldDef)> {
        let mut chain = self.class_chain(class);
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|id| self.class(id).fields.iter().map(move |f| (id, f)))
            .collect()
    }

    /// Text of an interned method slot.
    pub fn method_slot_name(&self, slot: MethodSlot) -> &str {
        self.method_slots
            .get(slot.index())
            .map_or("", String::as_str)
    }

    /// Intern a method signature key.
    pub fn intern_method_slot(&mut self, key: &str) -> MethodSlot {
        if let Some(pos) = self.method_slots.iter().position(|k| k == key) {
            return MethodSlot::from_index(pos);
        }
        self.method_slots.push(key.to_owned());
        MethodSlot::from_index(self.method_slots.len() - 1)
    }
}
