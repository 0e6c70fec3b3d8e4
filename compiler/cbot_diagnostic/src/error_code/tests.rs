use super::*;
use pretty_assertions::assert_eq;

#[test]
fn numeric_values_match_the_language() {
    assert_eq!(ErrorCode::OpenPar.code(), 5000);
    assert_eq!(ErrorCode::BadType1.code(), 5011);
    assert_eq!(ErrorCode::RedefCase.code(), 5055);
    assert_eq!(ErrorCode::ZeroDiv.code(), 6000);
    assert_eq!(ErrorCode::Write.code(), 6015);
}

#[test]
fn from_code_round_trips() {
    for &code in ErrorCode::ALL {
        assert_eq!(ErrorCode::from_code(code.code()), Some(code));
    }
    assert_eq!(ErrorCode::from_code(42), None);
    assert_eq!(ErrorCode::from_code(5056), None);
}

#[test]
fn names_are_constant_identifiers() {
    assert_eq!(ErrorCode::ZeroDiv.name(), "CBotErrZeroDiv");
    assert_eq!(ErrorCode::ElseWhitoutIf.name(), "CBotErrElseWhitoutIf");
}

#[test]
fn runtime_partition() {
    assert!(!ErrorCode::NoTerminator.is_runtime());
    assert!(ErrorCode::OutArray.is_runtime());
    let runtime = ErrorCode::ALL.iter().filter(|c| c.is_runtime()).count();
    assert_eq!(runtime, 16);
    assert_eq!(ErrorCode::ALL.len(), 56 + 16);
}

#[test]
fn display_is_the_message() {
    assert_eq!(ErrorCode::ZeroDiv.to_string(), "dividing by zero");
}
