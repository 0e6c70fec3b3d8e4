use super::*;
use crate::{tokenize, Constants};
use pretty_assertions::assert_eq;

#[test]
fn links_are_bidirectional() {
    let list = tokenize("a + b", &Constants::new());
    let first = list.first();
    let second = list.next(first).unwrap_or(first);
    assert_eq!(list.text(second), "+");
    assert_eq!(list.prev(second), Some(first));
    assert_eq!(list.prev(first), None);
    assert_eq!(list.next(list.end()), None);
}

#[test]
fn end_sentinel_sits_at_source_length() {
    let source = "int x = 1; // done\n";
    let list = tokenize(source, &Constants::new());
    let end = list.get(list.end());
    assert_eq!(end.kind, TokenKind::End);
    assert_eq!(end.start as usize, source.len());
    assert_eq!(end.end as usize, source.len());
}

#[test]
fn separators_belong_to_preceding_token() {
    let list = tokenize("  x /* c */ = 2;\n", &Constants::new());
    assert_eq!(list.leading(), "  ");
    let x = list.first();
    assert_eq!(list.text(x), "x");
    assert_eq!(list.separator(x), " /* c */ ");
    assert_eq!(list.reconstruct(), "  x /* c */ = 2;\n");
}

#[test]
fn iter_visits_every_token_once() {
    let list = tokenize("a b c", &Constants::new());
    let texts: Vec<&str> = list.iter().map(|(idx, _)| list.text(idx)).collect();
    assert_eq!(texts, vec!["a", "b", "c", ""]);
    assert_eq!(list.len(), 4);
}
