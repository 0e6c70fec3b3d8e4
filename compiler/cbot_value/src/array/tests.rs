use super::*;
use pretty_assertions::assert_eq;

fn int_array(limit: Option<u32>) -> ArrayData {
    ArrayData::new(TypeDesc::Int, vec![limit])
}

#[test]
fn declared_array_starts_empty() {
    let a = int_array(Some(5));
    assert_eq!(a.len(), 0);
    assert_eq!(a.limit(), Some(5));
    assert_eq!(a.to_text(), "{  }");
}

#[test]
fn writes_grow_up_to_the_limit() {
    let mut a = int_array(Some(5));
    let cell = a.get_or_grow(2).unwrap();
    cell.borrow_mut().set(Value::Int(7)).unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(a.to_text(), "{ 0, 0, 7 }");
    assert_eq!(a.get_or_grow(5).unwrap_err(), ErrorCode::OutArray);
    assert_eq!(a.get_or_grow(-1).unwrap_err(), ErrorCode::OutArray);
}

#[test]
fn reads_past_the_end_fail() {
    let mut a = int_array(None);
    a.get_or_grow(0).unwrap();
    assert!(a.get(0).is_ok());
    assert_eq!(a.get(1).unwrap_err(), ErrorCode::OutArray);
}

#[test]
fn unbounded_arrays_grow_freely() {
    let mut a = int_array(None);
    a.get_or_grow(99).unwrap();
    assert_eq!(a.len(), 100);
}

#[test]
fn push_respects_limit() {
    let mut a = int_array(Some(2));
    for n in 1..=2 {
        a.push(VarCell::new(Var::with_value(TypeDesc::Int, Value::Int(n))))
            .unwrap();
    }
    let extra = VarCell::new(Var::with_value(TypeDesc::Int, Value::Int(3)));
    assert_eq!(a.push(extra), Err(ErrorCode::OutArray));
    assert_eq!(a.to_text(), "{ 1, 2 }");
}

#[test]
fn nested_rows_inherit_remaining_limits() {
    let mut grid = ArrayData::new(TypeDesc::array_of(TypeDesc::Int), vec![Some(4), Some(3)]);
    let row = grid.get_or_grow(1).unwrap();
    let row = row.borrow().get().unwrap();
    let row = row.as_array().unwrap();
    assert_eq!(row.borrow().limit(), Some(3));
    assert_eq!(
        row.borrow_mut().get_or_grow(3).unwrap_err(),
        ErrorCode::OutArray
    );
    assert_eq!(grid.to_text(), "{ {  }, {  } }");
}

#[test]
fn indexes_past_the_size_cap_fail_without_growing() {
    let mut a = int_array(None);
    let last = i64::from(MAX_ARRAY_SIZE);
    assert_eq!(a.get_or_grow(last + 1).unwrap_err(), ErrorCode::OutArray);
    assert_eq!(a.get_or_grow(2_000_000_000).unwrap_err(), ErrorCode::OutArray);
    assert!(a.is_empty());
    a.get_or_grow(last).unwrap();
    assert_eq!(a.len(), MAX_ARRAY_SIZE as usize + 1);
}

#[test]
fn the_size_cap_overrides_a_larger_limit() {
    let mut a = int_array(Some(u32::MAX));
    assert_eq!(
        a.get_or_grow(i64::from(MAX_ARRAY_SIZE) + 1).unwrap_err(),
        ErrorCode::OutArray
    );
    for n in 0..=MAX_ARRAY_SIZE {
        a.push(VarCell::new(Var::with_value(TypeDesc::Int, Value::Int(i64::from(n)))))
            .unwrap();
    }
    let extra = VarCell::new(Var::with_value(TypeDesc::Int, Value::Int(0)));
    assert_eq!(a.push(extra), Err(ErrorCode::OutArray));
}
