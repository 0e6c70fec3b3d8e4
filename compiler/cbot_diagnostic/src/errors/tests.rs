use super::*;
use pretty_assertions::assert_eq;

#[test]
fn compile_error_display() {
    let err = CompileError::new(ErrorCode::NoTerminator, Span::new(4, 9));
    assert_eq!(
        err.to_string(),
        "error 5005 (CBotErrNoTerminator) at 4..9: semicolon terminator missing"
    );
}

#[test]
fn runtime_error_known_and_user_codes() {
    let known = RuntimeError::new(ErrorCode::ZeroDiv, Span::new(1, 2));
    assert_eq!(known.known(), Some(ErrorCode::ZeroDiv));
    assert!(known.to_string().contains("CBotErrZeroDiv"));

    let user = RuntimeError::thrown(1234, Span::new(1, 2));
    assert_eq!(user.known(), None);
    assert_eq!(user.to_string(), "uncaught exception 1234 at 1..2");
}
