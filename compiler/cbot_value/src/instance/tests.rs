use super::*;
use crate::{ObjRef, Value};
use pretty_assertions::assert_eq;

fn slot(name: &str, ty: TypeDesc) -> FieldSlot {
    FieldSlot {
        name: name.to_owned(),
        ty,
    }
}

fn three_levels() -> Rc<ClassLayout> {
    let base = Rc::new(ClassLayout::new(
        ClassId::new(0),
        "BaseClass",
        None,
        vec![slot("a", TypeDesc::Int)],
    ));
    let mid = Rc::new(ClassLayout::new(ClassId::new(1), "MidClass", Some(base), vec![]));
    Rc::new(ClassLayout::new(
        ClassId::new(2),
        "Sub",
        Some(mid),
        vec![
            slot("c", TypeDesc::Int),
            slot("d", TypeDesc::Int),
            slot("e", TypeDesc::Int),
        ],
    ))
}

#[test]
fn fields_are_laid_out_base_first() {
    let layout = three_levels();
    assert_eq!(layout.field_count(), 4);
    assert_eq!(layout.field_index("a"), Some(0));
    assert_eq!(layout.field_index("e"), Some(3));
    assert_eq!(layout.field_index("zz"), None);
    let names: Vec<&str> = layout.all_fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c", "d", "e"]);
}

#[test]
fn is_a_walks_the_parent_chain() {
    let layout = three_levels();
    assert!(layout.is_a("Sub"));
    assert!(layout.is_a("MidClass"));
    assert!(layout.is_a("BaseClass"));
    assert!(!layout.is_a("Other"));
}

#[test]
fn text_form_lists_levels_most_derived_first() {
    let obj = Instance::new(three_levels());
    for (name, n) in [("a", 1), ("c", 7), ("d", 8), ("e", 9)] {
        obj.field_named(name)
            .unwrap()
            .borrow_mut()
            .set(Value::Int(n))
            .unwrap();
    }
    assert_eq!(
        obj.to_text(),
        "Sub( c=7, d=8, e=9 ) extends MidClass(  ) extends BaseClass( a=1 )"
    );
    let value = Value::Object(ObjRef::new(obj));
    assert_eq!(
        value.to_text(&TypeDesc::class("Sub")),
        "Pointer to Sub( c=7, d=8, e=9 ) extends MidClass(  ) extends BaseClass( a=1 )"
    );
}

#[test]
fn new_instance_fields_are_undefined() {
    let obj = Instance::new(three_levels());
    assert!(obj.field(0).unwrap().borrow().is_undefined());
    assert_eq!(obj.class_id(), ClassId::new(2));
}

#[test]
fn attached_state_lives_as_long_as_the_instance() {
    let marker = Rc::new(());
    let object = ObjRef::new(Instance::new(three_levels()));
    object.borrow_mut().attach(Box::new(Rc::clone(&marker)));
    let alias = object.clone();
    assert!(alias.borrow().is_attached());
    drop(object);
    assert_eq!(Rc::strong_count(&marker), 2);
    drop(alias);
    assert_eq!(Rc::strong_count(&marker), 1);

    let object = ObjRef::new(Instance::new(three_levels()));
    object.borrow_mut().attach(Box::new(Rc::clone(&marker)));
    let state = object.borrow_mut().detach().unwrap();
    assert!(!object.borrow().is_attached());
    assert!(state.downcast_ref::<Rc<()>>().is_some());
}
