use super::*;
use pretty_assertions::assert_eq;

#[test]
fn scalars_start_undefined() {
    let var = Var::new(TypeDesc::Int);
    assert_eq!(var.state(), InitState::Undefined);
    assert_eq!(var.get(), Err(ErrorCode::NotInit));
    assert_eq!(var.to_text(), "undefined");
}

#[test]
fn references_start_null() {
    let var = Var::new(TypeDesc::class("Foo"));
    assert_eq!(var.state(), InitState::Default);
    assert_eq!(var.get(), Ok(Value::Null));
    assert_eq!(var.to_text(), "null");
}

#[test]
fn store_converts_to_declared_type() {
    let mut var = Var::new(TypeDesc::Byte);
    var.store(Value::Int(300), &TypeDesc::Int).unwrap();
    assert_eq!(var.get(), Ok(Value::Int(44)));
    assert_eq!(var.state(), InitState::Defined);

    let mut s = Var::new(TypeDesc::String);
    s.store(Value::Float(2.5), &TypeDesc::Float).unwrap();
    assert_eq!(s.get(), Ok(Value::string("2.5")));
}

#[test]
fn failed_store_keeps_previous_value() {
    let mut var = Var::new(TypeDesc::Boolean);
    var.set(Value::Bool(true)).unwrap();
    assert_eq!(var.set(Value::Int(1)), Err(ErrorCode::BadType1));
    assert_eq!(var.get(), Ok(Value::Bool(true)));
}

#[test]
fn zeroed_cells_read_back_zero() {
    let var = Var::zeroed(TypeDesc::Float);
    assert_eq!(var.get(), Ok(Value::Float(0.0)));
    assert_eq!(var.to_text(), "0");
}
