use super::*;
use crate::{ArrayData, ClassLayout, Instance};
use pretty_assertions::assert_eq;

#[test]
fn scalar_text_forms() {
    assert_eq!(Value::Bool(true).to_text(&TypeDesc::Boolean), "true");
    assert_eq!(Value::Int(-42).to_text(&TypeDesc::Int), "-42");
    assert_eq!(Value::Int(90).to_text(&TypeDesc::Byte), "90");
    assert_eq!(Value::Int(90).to_text(&TypeDesc::Char), "Z");
    assert_eq!(Value::Float(2.5).to_text(&TypeDesc::Float), "2.5");
    assert_eq!(Value::Nan.to_text(&TypeDesc::Int), "nan");
    assert_eq!(Value::Null.to_text(&TypeDesc::class("Foo")), "null");
}

#[test]
fn references_compare_by_identity() {
    let a = ArrayRef::new(ArrayData::new(TypeDesc::Int, vec![None]));
    let b = ArrayRef::new(ArrayData::new(TypeDesc::Int, vec![None]));
    assert_eq!(Value::Array(a.clone()), Value::Array(a.clone()));
    assert_ne!(Value::Array(a), Value::Array(b));

    let layout = std::rc::Rc::new(ClassLayout::new(
        cbot_ir::ClassId::new(0),
        "Foo",
        None,
        vec![],
    ));
    let o1 = ObjRef::new(Instance::new(layout.clone()));
    let o2 = ObjRef::new(Instance::new(layout));
    assert_ne!(Value::Object(o1.clone()), Value::Object(o2));
    assert_eq!(Value::Object(o1.clone()), Value::Object(o1));
}

#[test]
fn accessors() {
    assert_eq!(Value::Int(3).as_float(), Some(3.0));
    assert_eq!(Value::Float(3.9).as_int(), Some(3));
    assert_eq!(Value::from("x").as_str(), Some("x"));
    assert_eq!(Value::Null.as_bool(), None);
    assert!(Value::Nan.is_nan());
    assert_eq!(Value::from(7).type_name(), "int");
}

#[test]
fn literals_become_values() {
    use cbot_ir::Literal;
    assert_eq!(Value::from(&Literal::Int(4)), Value::Int(4));
    assert_eq!(Value::from(&Literal::Str("hi".into())), Value::from("hi"));
    assert!(Value::from(&Literal::Nan).is_nan());
    assert!(Value::from(&Literal::Null).is_null());
}
