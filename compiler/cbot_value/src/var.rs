//! Variable cells.

use std::fmt;

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;

use crate::convert::{convert, zero_value};
use crate::Value;

/// How a cell got its current value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum InitState {
    /// Declared without initializer; reading raises `NotInit`.
    #[default]
    Undefined,
    /// Holds the type's default (null pointer, auto-grown array element).
    Default,
    /// Explicitly assigned.
    Defined,
}

/// A typed storage cell.
///
/// The declared type never changes; every store converts the incoming
/// value to it.
#[derive(Clone)]
pub struct Var {
    ty: TypeDesc,
    value: Value,
    state: InitState,
}

impl Var {
    /// A freshly declared variable: `Undefined`, except reference types
    /// which start as a `Default` null.
    pub fn new(ty: TypeDesc) -> Self {
        if ty.is_reference() {
            Var {
                ty,
                value: Value::Null,
                state: InitState::Default,
            }
        } else {
            Var {
                ty,
                value: Value::Void,
                state: InitState::Undefined,
            }
        }
    }

    /// A `Default` cell holding `value` as is.
    pub fn with_default(ty: TypeDesc, value: Value) -> Self {
        Var {
            ty,
            value,
            state: InitState::Default,
        }
    }

    /// A `Default` cell holding the zero value of `ty`.
    pub fn zeroed(ty: TypeDesc) -> Self {
        let value = zero_value(&ty);
        Var::with_default(ty, value)
    }

    /// A `Defined` cell; `value` must already have the cell's type.
    pub fn with_value(ty: TypeDesc, value: Value) -> Self {
        Var {
            ty,
            value,
            state: InitState::Defined,
        }
    }

    /// Rebuild a cell from its parts, for snapshot restore.
    pub fn from_parts(ty: TypeDesc, value: Value, state: InitState) -> Self {
        Var { ty, value, state }
    }

    #[inline]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    #[inline]
    pub fn state(&self) -> InitState {
        self.state
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.state == InitState::Undefined
    }

    /// Read the value; an `Undefined` cell raises `NotInit`.
    pub fn get(&self) -> Result<Value, ErrorCode> {
        if self.state == InitState::Undefined {
            return Err(ErrorCode::NotInit);
        }
        Ok(self.value.clone())
    }

    /// The stored value without the initialization check.
    #[inline]
    pub fn peek(&self) -> &Value {
        &self.value
    }

    /// Store a value already of this cell's type.
    pub fn set(&mut self, value: Value) -> Result<(), ErrorCode> {
        let ty = self.ty.clone();
        self.store(value, &ty)
    }

    /// Store a value of static type `from`, converting it.
    pub fn store(&mut self, value: Value, from: &TypeDesc) -> Result<(), ErrorCode> {
        self.value = convert(value, from, &self.ty)?;
        self.state = InitState::Defined;
        Ok(())
    }

    /// Text form, `undefined` for an `Undefined` cell.
    pub fn to_text(&self) -> String {
        match self.state {
            InitState::Undefined => "undefined".to_owned(),
            _ => self.value.to_text(&self.ty),
        }
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} = {:?}", self.ty, self.state, self.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
