//! Run-time class layouts built from the module's class table.

use std::rc::Rc;

use cbot_ir::{ClassId, Module};
use cbot_value::{ClassLayout, FieldSlot};

/// One layout per class, indexed by `ClassId`. Parents are shared.
pub fn build_layouts(module: &Module) -> Vec<Rc<ClassLayout>> {
    let mut built: Vec<Option<Rc<ClassLayout>>> = vec![None; module.classes.len()];
    for index in 0..module.classes.len() {
        layout_of(module, ClassId::from_index(index), &mut built);
    }
    built.into_iter().flatten().collect()
}

fn layout_of(
    module: &Module,
    class: ClassId,
    built: &mut Vec<Option<Rc<ClassLayout>>>,
) -> Rc<ClassLayout> {
    if let Some(Some(layout)) = built.get(class.index()) {
        return Rc::clone(layout);
    }
    let def = module.class(class);
    // Classes form a forest; the compiler rejects inheritance cycles.
    let parent = def.parent.map(|parent| layout_of(module, parent, built));
    let fields = def
        .fields
        .iter()
        .map(|f| FieldSlot {
            name: f.name.clone(),
            ty: f.ty.clone(),
        })
        .collect();
    let layout = Rc::new(ClassLayout::new(class, &def.name, parent, fields));
    built[class.index()] = Some(Rc::clone(&layout));
    layout
}

#[cfg(test)]
mod tests;
