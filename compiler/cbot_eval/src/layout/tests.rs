use super::*;
use crate::test_util::{compile_with, registry};

#[test]
fn layouts_share_their_parents() {
    let registry = registry();
    let (module, _) = compile_with(
        "class A { int a; int b; }
         class B extends A { string c; }
         class C extends B { }",
        &registry,
    );
    let layouts = build_layouts(&module);
    assert_eq!(layouts.len(), module.classes.len());

    let a = module.class_named("A").map(ClassId::index);
    let b = module.class_named("B").map(ClassId::index);
    let c = module.class_named("C").map(ClassId::index);
    let (Some(a), Some(b), Some(c)) = (a, b, c) else {
        panic!("classes missing");
    };
    assert_eq!(layouts[b].field_count(), 3);
    assert_eq!(layouts[c].field_count(), 3);
    assert_eq!(layouts[c].field_index("c"), Some(2));
    let parent = layouts[b].parent.as_ref().map(Rc::as_ptr);
    assert_eq!(parent, Some(Rc::as_ptr(&layouts[a])));
    assert!(layouts[c].is_a("A"));
    assert!(!layouts[a].is_a("B"));
}
