//! Class layouts and instances.

use std::any::Any;
use std::rc::Rc;

use cbot_ir::{ClassId, TypeDesc};

use crate::{Var, VarCell};

/// One instance field as laid out at run time.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSlot {
    pub name: String,
    pub ty: TypeDesc,
}

/// Run-time shape of a class: its own fields plus a link to the parent.
///
/// An instance stores the fields of the whole chain, base class first.
#[derive(Debug)]
pub struct ClassLayout {
    pub id: ClassId,
    pub name: String,
    pub parent: Option<Rc<ClassLayout>>,
    pub fields: Vec<FieldSlot>,
}

impl ClassLayout {
    pub fn new(
        id: ClassId,
        name: &str,
        parent: Option<Rc<ClassLayout>>,
        fields: Vec<FieldSlot>,
    ) -> Self {
        ClassLayout {
            id,
            name: name.to_owned(),
            parent,
            fields,
        }
    }

    /// This layout followed by its ancestors.
    pub fn chain(&self) -> impl Iterator<Item = &ClassLayout> {
        std::iter::successors(Some(self), |layout| layout.parent.as_deref())
    }

    /// Whether this class is `name` or inherits from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.chain().any(|layout| layout.name == name)
    }

    /// Number of fields in an instance, inherited ones included.
    pub fn field_count(&self) -> usize {
        self.chain().map(|layout| layout.fields.len()).sum()
    }

    /// Index of the first field of this level inside an instance.
    fn base_offset(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.field_count())
    }

    /// Instance index of a field, searching the most derived class first.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.chain().find_map(|layout| {
            layout
                .fields
                .iter()
                .position(|f| f.name == name)
                .map(|pos| layout.base_offset() + pos)
        })
    }

    /// All instance fields, base class first.
    pub fn all_fields(&self) -> Vec<&FieldSlot> {
        let mut levels: Vec<&ClassLayout> = self.chain().collect();
        levels.reverse();
        levels.into_iter().flat_map(|l| l.fields.iter()).collect()
    }
}

/// A class instance.
///
/// Host classes may attach state that lives exactly as long as the
/// instance; it is dropped with it and never copied into a snapshot.
#[derive(Debug)]
pub struct Instance {
    layout: Rc<ClassLayout>,
    fields: Vec<VarCell>,
    attached: Option<Box<dyn Any>>,
}

impl Instance {
    /// An instance whose fields are freshly declared (scalars `Undefined`,
    /// pointers null). Field initializers run afterwards.
    pub fn new(layout: Rc<ClassLayout>) -> Self {
        let fields = layout
            .all_fields()
            .into_iter()
            .map(|f| VarCell::new(Var::new(f.ty.clone())))
            .collect();
        Instance {
            layout,
            fields,
            attached: None,
        }
    }

    /// Rebuild an instance from existing cells, for snapshot restore.
    pub fn from_parts(layout: Rc<ClassLayout>, fields: Vec<VarCell>) -> Self {
        Instance {
            layout,
            fields,
            attached: None,
        }
    }

    /// Attach host state, dropping whatever was attached before.
    pub fn attach(&mut self, state: Box<dyn Any>) {
        self.attached = Some(state);
    }

    pub fn detach(&mut self) -> Option<Box<dyn Any>> {
        self.attached.take()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    #[inline]
    pub fn layout(&self) -> &Rc<ClassLayout> {
        &self.layout
    }

    #[inline]
    pub fn class_id(&self) -> ClassId {
        self.layout.id
    }

    pub fn field(&self, index: usize) -> Option<&VarCell> {
        self.fields.get(index)
    }

    pub fn field_named(&self, name: &str) -> Option<&VarCell> {
        self.layout.field_index(name).and_then(|i| self.fields.get(i))
    }

    pub fn fields(&self) -> &[VarCell] {
        &self.fields
    }

    /// `Sub( c=7 ) extends Base( a=1 )`, most derived class first.
    pub fn to_text(&self) -> String {
        let mut levels = Vec::new();
        for layout in self.layout.chain() {
            let offset = layout.base_offset();
            let fields: Vec<String> = layout
                .fields
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    let text = self
                        .fields
                        .get(offset + i)
                        .map_or_else(|| "undefined".to_owned(), |c| c.borrow().to_text());
                    format!("{}={text}", f.name)
                })
                .collect();
            levels.push(format!("{}( {} )", layout.name, fields.join(", ")));
        }
        levels.join(" extends ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
