//! Shared handles for cells, arrays and instances.
//!
//! Each handle is a transparent wrapper over `Rc<RefCell<T>>` so that
//! allocation only happens through the constructors here and identity
//! comparisons (`ptr_eq`, `addr`) have one implementation.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::{ArrayData, Instance, Var};

macro_rules! shared_handle {
    ($(#[$meta:meta])* $name:ident => $inner:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        #[repr(transparent)]
        pub struct $name(Rc<RefCell<$inner>>);

        impl $name {
            pub fn new(value: $inner) -> Self {
                $name(Rc::new(RefCell::new(value)))
            }

            /// Borrow the inner value immutably.
            ///
            /// # Panics
            /// Panics if the value is currently mutably borrowed.
            #[inline]
            pub fn borrow(&self) -> Ref<'_, $inner> {
                self.0.borrow()
            }

            /// Borrow the inner value mutably.
            ///
            /// # Panics
            /// Panics if the value is currently borrowed.
            #[inline]
            pub fn borrow_mut(&self) -> RefMut<'_, $inner> {
                self.0.borrow_mut()
            }

            /// Whether both handles point at the same storage.
            #[inline]
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Rc::ptr_eq(&self.0, &other.0)
            }

            /// Address of the shared storage, for identity maps.
            #[inline]
            pub fn addr(&self) -> usize {
                Rc::as_ptr(&self.0) as usize
            }

            /// Number of live handles to this storage.
            #[inline]
            pub fn holders(&self) -> usize {
                Rc::strong_count(&self.0)
            }
        }
    };
}

shared_handle!(
    /// A variable cell: local, parameter, field, static or array element.
    VarCell => Var
);
shared_handle!(
    /// An array; assignment aliases.
    ArrayRef => ArrayData
);
shared_handle!(
    /// A class instance; assignment aliases.
    ObjRef => Instance
);

impl fmt::Debug for VarCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(var) => write!(f, "VarCell({var:?})"),
            Err(_) => f.write_str("VarCell(<borrowed>)"),
        }
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(array) => write!(f, "Array[{}; {}]", array.elem(), array.len()),
            Err(_) => f.write_str("Array(<borrowed>)"),
        }
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) => write!(f, "Object({})", obj.layout().name),
            Err(_) => f.write_str("Object(<borrowed>)"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
