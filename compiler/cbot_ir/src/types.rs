//! Type descriptors.
//!
//! A `TypeDesc` is a small structural value: arrays own their element
//! descriptor and class types carry the class name. Class instances and
//! arrays are reference types; everything else is copied on assignment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The static type of an expression, variable, field or parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDesc {
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    String,
    /// Type of the `null` literal; assignable to every reference type.
    Null,
    /// Array of the element type.
    Array(Box<TypeDesc>),
    /// Pointer to an instance of the named class.
    Class(Box<str>),
}

impl TypeDesc {
    /// Build a class type from a name.
    pub fn class(name: &str) -> TypeDesc {
        TypeDesc::Class(name.into())
    }

    /// Build an array type from an element type.
    pub fn array_of(elem: TypeDesc) -> TypeDesc {
        TypeDesc::Array(Box::new(elem))
    }

    /// Position of a numeric type in the promotion order, `None` otherwise.
    ///
    /// byte < short < char < int < long < float < double
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            TypeDesc::Byte => Some(1),
            TypeDesc::Short => Some(2),
            TypeDesc::Char => Some(3),
            TypeDesc::Int => Some(4),
            TypeDesc::Long => Some(5),
            TypeDesc::Float => Some(6),
            TypeDesc::Double => Some(7),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Integer types, including `char`.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeDesc::Byte | TypeDesc::Short | TypeDesc::Char | TypeDesc::Int | TypeDesc::Long
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, TypeDesc::Float | TypeDesc::Double)
    }

    /// Arrays and class pointers alias on assignment.
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDesc::Array(_) | TypeDesc::Class(_) | TypeDesc::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDesc::Void)
    }

    /// Element type of an array type.
    pub fn element(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Class name of a class type.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeDesc::Class(name) => Some(name),
            _ => None,
        }
    }

    /// The wider of two numeric types, promoted to at least `int`.
    ///
    /// Returns `None` when either side is not numeric.
    pub fn arithmetic_result(&self, other: &TypeDesc) -> Option<TypeDesc> {
        let rank = self.numeric_rank()?.max(other.numeric_rank()?);
        Some(match rank {
            5 => TypeDesc::Long,
            6 => TypeDesc::Float,
            7 => TypeDesc::Double,
            _ => TypeDesc::Int,
        })
    }

    /// Bit width of an integer type. `char` holds an unsigned Unicode
    /// scalar value; the other integer types are signed.
    pub fn integer_bits(&self) -> Option<u32> {
        match self {
            TypeDesc::Byte => Some(8),
            TypeDesc::Short => Some(16),
            TypeDesc::Int | TypeDesc::Char => Some(32),
            TypeDesc::Long => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Void => f.write_str("void"),
            TypeDesc::Boolean => f.write_str("bool"),
            TypeDesc::Byte => f.write_str("byte"),
            TypeDesc::Short => f.write_str("short"),
            TypeDesc::Char => f.write_str("char"),
            TypeDesc::Int => f.write_str("int"),
            TypeDesc::Long => f.write_str("long"),
            TypeDesc::Float => f.write_str("float"),
            TypeDesc::Double => f.write_str("double"),
            TypeDesc::String => f.write_str("string"),
            TypeDesc::Null => f.write_str("null"),
            TypeDesc::Array(elem) => write!(f, "{elem}[]"),
            TypeDesc::Class(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests;
