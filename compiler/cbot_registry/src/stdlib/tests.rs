use super::*;
use crate::{MemoryFileAccess, NativeCall};
use cbot_value::{ArrayData, ArrayRef, Var, VarCell};
use pretty_assertions::assert_eq;

#[test]
fn sizeof_counts_elements() {
    let mut registry = Registry::new();
    register_sizeof(&mut registry);
    let id = registry.functions_named("sizeof")[0];

    let array = ArrayRef::new(ArrayData::new(TypeDesc::Int, vec![Some(5)]));
    for n in 0..3 {
        array
            .borrow_mut()
            .push(VarCell::new(Var::with_value(TypeDesc::Int, Value::Int(n))))
            .unwrap();
    }
    let args = [Value::Array(array)];
    let types = [TypeDesc::array_of(TypeDesc::Int)];
    let result = registry.call(id, &mut NativeCall::new(None, &args, &types));
    assert_eq!(result, Ok(Value::Int(3)));

    let check = &registry.native(id).unwrap().check;
    assert_eq!(check(&[TypeDesc::Int]), Err(ErrorCode::BadParam));
    assert_eq!(check(&[]), Err(ErrorCode::LowParam));
}

#[test]
fn install_registers_everything() {
    let mut registry = Registry::new();
    install(&mut registry, Arc::new(MemoryFileAccess::new()));
    for name in [
        "sizeof", "strlen", "strleft", "strright", "strmid", "strval", "strfind", "strupper",
        "strlower", "deletefile",
    ] {
        assert_eq!(registry.functions_named(name).len(), 1, "{name}");
    }
    assert!(registry.class(FILE_CLASS).is_some());
}
