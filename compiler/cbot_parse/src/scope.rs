//! The compile stack.
//!
//! Tracks what is visible while compiling: the enclosing class, whether
//! `this` exists, and inside a function body its return type, local
//! slots, block scopes and the enclosing loops and switches that `break`
//! and `continue` may target. It exists only during compilation.

use cbot_diagnostic::ErrorCode;
use cbot_ir::{ClassId, LocalDef, LocalSlot, TypeDesc};

/// A statement `break` can leave.
#[derive(Clone, Debug)]
struct Breakable {
    label: Option<String>,
    is_loop: bool,
}

#[derive(Debug)]
struct FunctionScope {
    ret: TypeDesc,
    locals: Vec<LocalDef>,
    /// Innermost block last. Names declared in one block, by slot.
    blocks: Vec<Vec<(String, LocalSlot)>>,
    breakables: Vec<Breakable>,
}

#[derive(Debug, Default)]
pub struct CompileStack {
    class: Option<ClassId>,
    has_this: bool,
    function: Option<FunctionScope>,
}

impl CompileStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a function body. Parameters are declared afterwards, into the
    /// outermost block.
    pub fn enter_function(&mut self, ret: TypeDesc, class: Option<ClassId>, has_this: bool) {
        self.class = class;
        self.has_this = has_this;
        self.function = Some(FunctionScope {
            ret,
            locals: Vec::new(),
            blocks: vec![Vec::new()],
            breakables: Vec::new(),
        });
    }

    /// Finish a function body, returning its local slots.
    pub fn leave_function(&mut self) -> Vec<LocalDef> {
        self.class = None;
        self.has_this = false;
        self.function.take().map(|f| f.locals).unwrap_or_default()
    }

    /// Compile a field initializer or parameter default: no locals.
    pub fn enter_initializer(&mut self, class: Option<ClassId>, has_this: bool) {
        self.class = class;
        self.has_this = has_this;
        self.function = None;
    }

    pub fn leave_initializer(&mut self) {
        self.class = None;
        self.has_this = false;
    }

    pub fn class(&self) -> Option<ClassId> {
        self.class
    }

    pub fn has_this(&self) -> bool {
        self.has_this
    }

    /// Declared return type of the function being compiled.
    pub fn return_type(&self) -> Option<&TypeDesc> {
        self.function.as_ref().map(|f| &f.ret)
    }

    pub fn push_block(&mut self) {
        if let Some(f) = &mut self.function {
            f.blocks.push(Vec::new());
        }
    }

    pub fn pop_block(&mut self) {
        if let Some(f) = &mut self.function {
            f.blocks.pop();
        }
    }

    /// Declare a local in the innermost block.
    ///
    /// A name may shadow one from an enclosing block but not one from the
    /// same block.
    pub fn declare(&mut self, name: &str, ty: TypeDesc) -> Result<LocalSlot, ErrorCode> {
        let f = self.function.as_mut().ok_or(ErrorCode::NoVar)?;
        let block = f.blocks.last_mut().ok_or(ErrorCode::NoVar)?;
        if block.iter().any(|(n, _)| n == name) {
            return Err(ErrorCode::RedefVar);
        }
        let slot = LocalSlot::from_index(f.locals.len());
        f.locals.push(LocalDef {
            name: name.to_owned(),
            ty,
        });
        block.push((name.to_owned(), slot));
        Ok(slot)
    }

    /// Innermost visible local named `name`.
    pub fn lookup(&self, name: &str) -> Option<(LocalSlot, &TypeDesc)> {
        let f = self.function.as_ref()?;
        f.blocks
            .iter()
            .rev()
            .find_map(|block| block.iter().rev().find(|(n, _)| n == name))
            .map(|&(_, slot)| (slot, &f.locals[slot.index()].ty))
    }

    pub fn push_loop(&mut self, label: Option<String>) {
        self.push_breakable(label, true);
    }

    pub fn push_switch(&mut self) {
        self.push_breakable(None, false);
    }

    fn push_breakable(&mut self, label: Option<String>, is_loop: bool) {
        if let Some(f) = &mut self.function {
            f.breakables.push(Breakable { label, is_loop });
        }
    }

    pub fn pop_breakable(&mut self) {
        if let Some(f) = &mut self.function {
            f.breakables.pop();
        }
    }

    /// Check that `break`/`continue` with an optional label has a target.
    pub fn check_jump(&self, label: Option<&str>, is_continue: bool) -> Result<(), ErrorCode> {
        let breakables = self.function.as_ref().map_or(&[][..], |f| &f.breakables[..]);
        match label {
            Some(name) => {
                if breakables.iter().any(|b| b.label.as_deref() == Some(name)) {
                    Ok(())
                } else {
                    Err(ErrorCode::UndefLabel)
                }
            }
            None => {
                let found = breakables.iter().any(|b| b.is_loop || !is_continue);
                if found {
                    Ok(())
                } else {
                    Err(ErrorCode::BreakOutside)
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
