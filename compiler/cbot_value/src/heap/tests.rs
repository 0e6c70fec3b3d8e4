use super::*;
use crate::Value;
use cbot_ir::TypeDesc;
use pretty_assertions::assert_eq;

#[test]
fn clones_alias_the_same_cell() {
    let a = VarCell::new(Var::new(TypeDesc::Int));
    let b = a.clone();
    b.borrow_mut().set(Value::Int(3)).unwrap();
    assert_eq!(a.borrow().get(), Ok(Value::Int(3)));
    assert!(a.ptr_eq(&b));
    assert_eq!(a.addr(), b.addr());
    assert_eq!(a.holders(), 2);
}

#[test]
fn separate_cells_do_not_alias() {
    let a = VarCell::new(Var::zeroed(TypeDesc::Int));
    let b = VarCell::new(Var::zeroed(TypeDesc::Int));
    assert!(!a.ptr_eq(&b));
}

#[test]
fn debug_survives_active_borrow() {
    let arr = ArrayRef::new(ArrayData::new(TypeDesc::Int, vec![]));
    let _guard = arr.borrow_mut();
    assert_eq!(format!("{arr:?}"), "Array(<borrowed>)");
}
