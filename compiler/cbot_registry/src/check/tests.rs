use super::*;

#[test]
fn counts() {
    assert_eq!(arg_count(&[], 1, 1), Err(ErrorCode::LowParam));
    assert_eq!(arg_count(&[TypeDesc::Int, TypeDesc::Int], 1, 1), Err(ErrorCode::OverParam));
    assert_eq!(arg_count(&[TypeDesc::Int], 1, 2), Ok(()));
}

#[test]
fn argument_kinds() {
    let args = [TypeDesc::String, TypeDesc::Float, TypeDesc::Boolean];
    assert_eq!(expect_string(&args, 0), Ok(()));
    assert_eq!(expect_string(&args, 1), Err(ErrorCode::BadString));
    assert_eq!(expect_numeric(&args, 1), Ok(()));
    assert_eq!(expect_numeric(&args, 2), Err(ErrorCode::BadNum));
    assert_eq!(expect_numeric(&args, 3), Err(ErrorCode::LowParam));
}
