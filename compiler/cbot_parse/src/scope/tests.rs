use super::*;
use pretty_assertions::assert_eq;

fn in_function() -> CompileStack {
    let mut stack = CompileStack::new();
    stack.enter_function(TypeDesc::Void, None, false);
    stack
}

#[test]
fn slots_are_numbered_in_declaration_order() {
    let mut stack = in_function();
    let a = stack.declare("a", TypeDesc::Int).unwrap();
    let b = stack.declare("b", TypeDesc::String).unwrap();
    assert_eq!((a.index(), b.index()), (0, 1));
    assert_eq!(stack.lookup("b"), Some((b, &TypeDesc::String)));
    let locals = stack.leave_function();
    assert_eq!(locals.len(), 2);
    assert_eq!(locals[1].name, "b");
}

#[test]
fn redeclaring_in_the_same_block_fails() {
    let mut stack = in_function();
    stack.declare("a", TypeDesc::Int).unwrap();
    assert_eq!(stack.declare("a", TypeDesc::Int), Err(ErrorCode::RedefVar));
}

#[test]
fn inner_blocks_shadow_and_expire() {
    let mut stack = in_function();
    let outer = stack.declare("a", TypeDesc::Int).unwrap();
    stack.push_block();
    let inner = stack.declare("a", TypeDesc::Float).unwrap();
    assert_eq!(stack.lookup("a"), Some((inner, &TypeDesc::Float)));
    stack.pop_block();
    assert_eq!(stack.lookup("a"), Some((outer, &TypeDesc::Int)));
    assert_eq!(stack.lookup("missing"), None);
}

#[test]
fn initializers_have_no_locals() {
    let mut stack = CompileStack::new();
    stack.enter_initializer(Some(ClassId::new(0)), true);
    assert_eq!(stack.declare("a", TypeDesc::Int), Err(ErrorCode::NoVar));
    assert!(stack.has_this());
    assert_eq!(stack.return_type(), None);
}

#[test]
fn break_needs_an_enclosing_loop_or_switch() {
    let mut stack = in_function();
    assert_eq!(stack.check_jump(None, false), Err(ErrorCode::BreakOutside));
    stack.push_switch();
    assert_eq!(stack.check_jump(None, false), Ok(()));
    assert_eq!(stack.check_jump(None, true), Err(ErrorCode::BreakOutside));
    stack.pop_breakable();
    stack.push_loop(Some("outer".into()));
    assert_eq!(stack.check_jump(None, true), Ok(()));
    assert_eq!(stack.check_jump(Some("outer"), true), Ok(()));
    assert_eq!(stack.check_jump(Some("inner"), false), Err(ErrorCode::UndefLabel));
}
