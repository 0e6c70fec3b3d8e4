use super::*;
use crate::{tokenize, Constants};

#[test]
fn crc32_check_value() {
    assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    assert_eq!(crc32(b""), 0);
}

#[test]
fn signature_ignores_whitespace_and_comments() {
    let a = tokenize("int x = 1;", &Constants::new());
    let b = tokenize("int   x=1 ; // note", &Constants::new());
    assert_eq!(
        token_signature(&a, a.first(), a.end()),
        token_signature(&b, b.first(), b.end())
    );
}

#[test]
fn signature_changes_with_text() {
    let a = tokenize("int x = 1;", &Constants::new());
    let b = tokenize("int x = 2;", &Constants::new());
    assert_ne!(
        token_signature(&a, a.first(), a.end()),
        token_signature(&b, b.first(), b.end())
    );
}

#[test]
fn signature_over_a_sub_range() {
    let a = tokenize("f(); int x = 1;", &Constants::new());
    let b = tokenize("g(); int x = 1;", &Constants::new());
    let tail = |list: &TokenList| {
        let mut idx = list.first();
        for _ in 0..4 {
            idx = list.next(idx).unwrap_or(idx);
        }
        token_signature(list, idx, list.end())
    };
    assert_eq!(tail(&a), tail(&b));
    assert_ne!(
        token_signature(&a, a.first(), a.end()),
        token_signature(&b, b.first(), b.end())
    );
}

mod proptest_signature {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn stable_across_tokenizations(source in "[a-z0-9 (){};=+]{0,120}") {
            let a = tokenize(&source, &Constants::new());
            let b = tokenize(&source, &Constants::new());
            prop_assert_eq!(
                token_signature(&a, a.first(), a.end()),
                token_signature(&b, b.first(), b.end())
            );
        }
    }
}
