use super::*;

#[test]
fn span_basic() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(span.contains(15));
    assert!(!span.contains(20));
}

#[test]
fn span_merge_covers_both() {
    let merged = Span::new(10, 20).merge(Span::new(15, 30));
    assert_eq!(merged, Span::new(10, 30));
}

#[test]
fn point_span_is_empty() {
    let span = Span::point(42);
    assert!(span.is_empty());
    assert_eq!(span.to_range(), 42..42);
}

#[test]
fn from_range_round_trips() {
    assert_eq!(Span::from_range(3..9), Span::new(3, 9));
    assert_eq!(format!("{}", Span::new(3, 9)), "3..9");
}
