use super::*;

#[test]
fn arithmetic_promotes_to_int() {
    assert_eq!(
        TypeDesc::Byte.arithmetic_result(&TypeDesc::Short),
        Some(TypeDesc::Int)
    );
    assert_eq!(
        TypeDesc::Int.arithmetic_result(&TypeDesc::Long),
        Some(TypeDesc::Long)
    );
    assert_eq!(
        TypeDesc::Int.arithmetic_result(&TypeDesc::Float),
        Some(TypeDesc::Float)
    );
    assert_eq!(
        TypeDesc::Double.arithmetic_result(&TypeDesc::Char),
        Some(TypeDesc::Double)
    );
    assert_eq!(TypeDesc::Boolean.arithmetic_result(&TypeDesc::Int), None);
    assert_eq!(TypeDesc::String.arithmetic_result(&TypeDesc::Int), None);
}

#[test]
fn reference_types() {
    assert!(TypeDesc::array_of(TypeDesc::Int).is_reference());
    assert!(TypeDesc::class("Robot").is_reference());
    assert!(!TypeDesc::String.is_reference());
    assert!(!TypeDesc::Int.is_reference());
}

#[test]
fn structural_equality() {
    let a = TypeDesc::array_of(TypeDesc::array_of(TypeDesc::Int));
    let b = TypeDesc::array_of(TypeDesc::array_of(TypeDesc::Int));
    let c = TypeDesc::array_of(TypeDesc::array_of(TypeDesc::Float));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(TypeDesc::class("A"), TypeDesc::class("A"));
    assert_ne!(TypeDesc::class("A"), TypeDesc::class("B"));
}

#[test]
fn display_forms() {
    assert_eq!(
        TypeDesc::array_of(TypeDesc::array_of(TypeDesc::Int)).to_string(),
        "int[][]"
    );
    assert_eq!(TypeDesc::class("file").to_string(), "file");
    assert_eq!(TypeDesc::Boolean.to_string(), "bool");
}
