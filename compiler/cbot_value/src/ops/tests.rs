use super::*;
use pretty_assertions::assert_eq;

fn int(op: BinaryOp, l: i64, r: i64) -> Result<Value, ErrorCode> {
    binary(op, &TypeDesc::Int, &Value::Int(l), &Value::Int(r))
}

#[test]
fn integer_arithmetic() {
    assert_eq!(int(BinaryOp::Add, 2, 12), Ok(Value::Int(14)));
    assert_eq!(int(BinaryOp::Div, 7, 2), Ok(Value::Int(3)));
    assert_eq!(int(BinaryOp::Mod, -7, 2), Ok(Value::Int(-1)));
    assert_eq!(int(BinaryOp::Pow, 2, 10), Ok(Value::Int(1024)));
    assert_eq!(int(BinaryOp::Add, i64::from(i32::MAX), 1), Ok(Value::Int(i64::from(i32::MIN))));
}

#[test]
fn division_by_zero_raises() {
    assert_eq!(int(BinaryOp::Div, 5, 0), Err(ErrorCode::ZeroDiv));
    assert_eq!(int(BinaryOp::Mod, 5, 0), Err(ErrorCode::ZeroDiv));
    assert_eq!(
        binary(BinaryOp::Div, &TypeDesc::Float, &Value::Float(1.0), &Value::Float(0.0)),
        Err(ErrorCode::ZeroDiv)
    );
}

#[test]
fn shifts_respect_width() {
    assert_eq!(int(BinaryOp::Shl, 1, 31), Ok(Value::Int(i64::from(i32::MIN))));
    assert_eq!(int(BinaryOp::Shr, -8, 1), Ok(Value::Int(-4)));
    assert_eq!(int(BinaryOp::Ushr, -1, 28), Ok(Value::Int(15)));
    assert_eq!(
        binary(BinaryOp::Ushr, &TypeDesc::Long, &Value::Int(-1), &Value::Int(60)),
        Ok(Value::Int(15))
    );
}

#[test]
fn comparisons() {
    assert_eq!(int(BinaryOp::Lt, 1, 2), Ok(Value::Bool(true)));
    assert_eq!(int(BinaryOp::Ge, 1, 2), Ok(Value::Bool(false)));
    assert_eq!(
        binary(BinaryOp::Lt, &TypeDesc::String, &Value::from("abc"), &Value::from("abd")),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        binary(BinaryOp::Eq, &TypeDesc::Null, &Value::Null, &Value::Null),
        Ok(Value::Bool(true))
    );
}

#[test]
fn float_results_round_to_single_precision() {
    let Ok(Value::Float(x)) =
        binary(BinaryOp::Div, &TypeDesc::Float, &Value::Float(1.0), &Value::Float(3.0))
    else {
        panic!("expected a float");
    };
    assert_eq!(x, f64::from((1.0_f64 / 3.0) as f32));
    assert_ne!(x, 1.0 / 3.0);
}

#[test]
fn string_concatenation() {
    assert_eq!(
        binary(BinaryOp::Add, &TypeDesc::String, &Value::from("90"), &Value::from("")),
        Ok(Value::from("90"))
    );
    assert_eq!(
        binary(BinaryOp::Sub, &TypeDesc::String, &Value::from("a"), &Value::from("b")),
        Err(ErrorCode::BadType2)
    );
}

#[test]
fn nan_operands() {
    assert_eq!(int(BinaryOp::Add, 1, 1), Ok(Value::Int(2)));
    assert_eq!(
        binary(BinaryOp::Add, &TypeDesc::Int, &Value::Nan, &Value::Int(1)),
        Err(ErrorCode::Nan)
    );
    assert_eq!(
        binary(BinaryOp::Eq, &TypeDesc::Int, &Value::Nan, &Value::Nan),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        binary(BinaryOp::Ne, &TypeDesc::Int, &Value::Int(3), &Value::Nan),
        Ok(Value::Bool(true))
    );
}

#[test]
fn unary_and_step() {
    assert_eq!(unary(UnaryOp::Neg, &TypeDesc::Int, &Value::Int(5)), Ok(Value::Int(-5)));
    assert_eq!(unary(UnaryOp::BitNot, &TypeDesc::Int, &Value::Int(0)), Ok(Value::Int(-1)));
    assert_eq!(unary(UnaryOp::Not, &TypeDesc::Boolean, &Value::Bool(true)), Ok(Value::Bool(false)));
    assert_eq!(step(IncDecOp::PreInc, &TypeDesc::Byte, &Value::Int(127)), Ok(Value::Int(-128)));
    assert_eq!(step(IncDecOp::PostDec, &TypeDesc::Double, &Value::Float(1.5)), Ok(Value::Float(0.5)));
}

#[test]
fn conditions_must_be_bool() {
    assert_eq!(truthy(&Value::Bool(true)), Ok(true));
    assert_eq!(truthy(&Value::Int(1)), Err(ErrorCode::NotBoolean));
}
