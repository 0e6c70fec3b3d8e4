//! The runtime value type.

use std::fmt;
use std::rc::Rc;

use cbot_ir::{Literal, TypeDesc};

use crate::{convert::format_float, ArrayRef, ObjRef};

/// A runtime value.
///
/// Integer types share `Int` (normalized to the declared width on store,
/// `char` holds its scalar value) and floating types share `Float`
/// (`float` is rounded to single precision on store). `Nan` is the
/// language's "not a number" marker, storable in any scalar cell.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Nan,
    Null,
    Array(ArrayRef),
    Object(ObjRef),
}

impl Value {
    #[inline]
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::Str(text.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Nan)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Short name of the variant, for traces.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Nan => "nan",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Text form of this value read as type `ty`.
    ///
    /// `ty` only matters for scalars: a `char` prints as its character and
    /// a `float` keeps `%g` formatting even when it holds an integer value.
    pub fn to_text(&self, ty: &TypeDesc) -> String {
        match self {
            Value::Void => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => match ty {
                TypeDesc::Char => u32::try_from(*n)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
                    .to_string(),
                TypeDesc::Float | TypeDesc::Double => format_float(*n as f64),
                _ => n.to_string(),
            },
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.to_string(),
            Value::Nan => "nan".to_owned(),
            Value::Null => "null".to_owned(),
            Value::Array(a) => a.borrow().to_text(),
            Value::Object(o) => format!("Pointer to {}", o.borrow().to_text()),
        }
    }
}

/// Scalars compare by value, arrays and instances by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void)
            | (Value::Nan, Value::Nan)
            | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("Void"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Nan => f.write_str("Nan"),
            Value::Null => f.write_str("Null"),
            Value::Array(a) => write!(f, "{a:?}"),
            Value::Object(o) => write!(f, "{o:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(x) => Value::Float(*x),
            Literal::Str(s) => Value::string(s.as_str()),
            Literal::Null => Value::Null,
            Literal::Nan => Value::Nan,
        }
    }
}

#[cfg(test)]
mod tests;
