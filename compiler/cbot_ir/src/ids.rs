//! Arena indices for the instruction tree.
//!
//! Every id is a `u32` newtype with an `INVALID` sentinel. Ids are only
//! meaningful relative to the `Module` (or `Registry`, for `NativeId`)
//! that issued them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel value for "no id".
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Create from an arena length or position.
            #[inline]
            pub fn from_index(index: usize) -> Self {
                $name(u32::try_from(index).unwrap_or(u32::MAX))
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}::INVALID", stringify!($name))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_id!(
    /// Index into `Module::exprs`.
    ExprId
);
define_id!(
    /// Index into `Module::stmts`.
    StmtId
);
define_id!(
    /// Index into `Module::functions`. Stable across re-compiles of the same
    /// source, since functions are numbered in declaration order.
    FuncId
);
define_id!(
    /// Index into `Module::classes`.
    ClassId
);
define_id!(
    /// Index into the registry's native function table.
    NativeId
);
define_id!(
    /// Local variable slot inside one function frame.
    LocalSlot
);
define_id!(
    /// Interned method signature key used for virtual dispatch.
    MethodSlot
);
