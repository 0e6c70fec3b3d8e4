//! Declaration modifiers and member visibility.

use bitflags::bitflags;

bitflags! {
    /// Modifiers written in front of a class, field or function declaration.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        /// Entry point callable by the host through `Start`.
        const EXTERN = 1 << 4;
        /// Accepted for source compatibility; execution is single-threaded.
        const SYNCHRONIZED = 1 << 5;
    }
}

impl Modifiers {
    /// The visibility these modifiers select (public when none is written).
    pub fn visibility(self) -> Visibility {
        if self.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

/// Who may access a class member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Declaring class and its subclasses.
    Protected,
    /// Declaring class only.
    Private,
}
