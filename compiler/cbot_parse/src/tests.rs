use super::*;
use cbot_diagnostic::ErrorCode;
use cbot_ir::{ExprKind, FuncId, Literal, MethodImpl, StmtKind, TypeDesc};
use cbot_lexer::tokenize;
use cbot_registry::{MemoryFileAccess, Registry};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn registry() -> Registry {
    Registry::with_stdlib(Arc::new(MemoryFileAccess::new()))
}

fn compile_src(source: &str) -> CompileResult<Module> {
    let registry = registry();
    let tokens = tokenize(source, registry.constants());
    compile(&tokens, &registry)
}

fn compile_ok(source: &str) -> Module {
    match compile_src(source) {
        Ok(module) => module,
        Err(err) => panic!("unexpected {err:?} compiling:\n{source}"),
    }
}

fn error_code(source: &str) -> ErrorCode {
    match compile_src(source) {
        Ok(_) => panic!("expected an error compiling:\n{source}"),
        Err(err) => err.code,
    }
}

fn calls(module: &Module) -> Vec<(FuncId, usize)> {
    module
        .exprs
        .iter()
        .filter_map(|e| match &e.kind {
            ExprKind::Call { func, args } => Some((*func, args.len())),
            _ => None,
        })
        .collect()
}

fn func_named(module: &Module, name: &str) -> FuncId {
    let index = module.functions.iter().position(|f| f.name == name).unwrap();
    FuncId::from_index(index)
}

#[test]
fn compiles_functions_in_any_order() {
    let module = compile_ok(
        "extern void main() { int x = twice(21); }
         int twice(int a) { return a * 2; }",
    );
    assert_eq!(module.functions.len(), 2);
    assert!(module.functions[0].is_extern());
    assert_eq!(module.functions[0].locals.len(), 1);
    assert_eq!(calls(&module), vec![(func_named(&module, "twice"), 1)]);
}

#[test]
fn every_body_is_compiled() {
    let module = compile_ok(
        "class A { int f() { return 1; } }
         void g() {}",
    );
    assert!(module.functions.iter().all(|f| f.body.is_some()));
}

#[test]
fn integer_literals_widen_to_long() {
    let module = compile_ok("void f() { long a = 3000000000; int b = 7; }");
    let types: Vec<&TypeDesc> = module
        .exprs
        .iter()
        .filter(|e| matches!(e.kind, ExprKind::Literal(Literal::Int(_))))
        .map(|e| &e.ty)
        .collect();
    assert_eq!(types, vec![&TypeDesc::Long, &TypeDesc::Int]);
}

#[test]
fn overloads_pick_the_cheapest_conversion() {
    let module = compile_ok(
        "void f(float a) {}
         void f(int a) {}
         void g() { f(1); f(1.5); }",
    );
    let float_version = FuncId::new(0);
    let int_version = FuncId::new(1);
    assert_eq!(
        calls(&module),
        vec![(int_version, 1), (float_version, 1)]
    );
}

#[test]
fn equal_cost_overloads_use_the_first_declared() {
    let module = compile_ok(
        "void f(int a, float b) {}
         void f(float a, int b) {}
         void g() { f(1, 1); }",
    );
    assert_eq!(calls(&module), vec![(FuncId::new(0), 2)]);
}

#[test]
fn defaults_are_appended_to_short_calls() {
    let module = compile_ok(
        "int f(int a, int b = 2, float c = 3) { return a; }
         void g() { f(1); f(1, 5); }",
    );
    assert_eq!(calls(&module), vec![(FuncId::new(0), 3), (FuncId::new(0), 3)]);
    let defaults: Vec<_> = module.functions[0]
        .params
        .iter()
        .filter_map(|p| p.default)
        .map(|d| module.expr(d).kind.clone())
        .collect();
    assert_eq!(
        defaults,
        vec![
            ExprKind::Literal(Literal::Int(2)),
            ExprKind::Literal(Literal::Float(3.0)),
        ]
    );
}

#[test]
fn natives_resolve_to_native_calls() {
    let module = compile_ok("void f() { int n = strlen(\"abc\"); }");
    assert!(module
        .exprs
        .iter()
        .any(|e| matches!(e.kind, ExprKind::NativeCall { .. }) && e.ty == TypeDesc::Int));
}

#[test]
fn host_classes_are_imported_on_use() {
    let module = compile_ok("void f() { file h(); h.open(\"x\", \"r\"); }");
    let file = module.class_named("file").unwrap();
    assert!(module.class(file).host);
    assert!(module.exprs.iter().any(|e| matches!(
        e.kind,
        ExprKind::MethodCall {
            target: MethodImpl::Native(_),
            ..
        }
    )));
}

#[test]
fn overrides_replace_vtable_entries() {
    let module = compile_ok(
        "class A { int m() { return 1; } int n() { return 2; } }
         class B extends A { int m() { return 3; } }",
    );
    let a = module.class_named("A").unwrap();
    let b = module.class_named("B").unwrap();
    let slot = module.class(a).methods[0].slot.unwrap();
    let other = module.class(a).methods[1].slot.unwrap();
    assert_eq!(module.class(a).vtable[&slot], FuncId::new(0));
    assert_eq!(module.class(b).vtable[&slot], FuncId::new(2));
    assert_eq!(module.class(b).vtable[&other], FuncId::new(1));
}

#[test]
fn inherited_fields_are_indexed_base_first() {
    let module = compile_ok(
        "class A { int x; }
         class B extends A { int y; }
         void f() { B b = new B(); b.y = 1; b.x = 2; }",
    );
    let indices: Vec<u32> = module
        .exprs
        .iter()
        .filter_map(|e| match e.kind {
            ExprKind::Field { index, .. } => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![1, 0]);
}

#[test]
fn fields_are_reachable_without_this() {
    let module = compile_ok(
        "class A {
             int count = 0;
             static int total;
             void bump() { count++; total += count; }
         }",
    );
    let a = module.class_named("A").unwrap();
    assert!(module.class(a).fields[0].init.is_some());
    assert!(module
        .exprs
        .iter()
        .any(|e| matches!(e.kind, ExprKind::StaticField { .. })));
}

#[test]
fn out_of_class_definitions_become_methods() {
    let module = compile_ok(
        "class A { }
         int A::get() { return 4; }
         void f() { A a = new A(); int x = a.get(); }",
    );
    let a = module.class_named("A").unwrap();
    assert_eq!(module.class(a).methods.len(), 1);
    assert_eq!(module.functions[0].class, Some(a));
}

#[test]
fn constructors_are_selected_by_arguments() {
    let module = compile_ok(
        "class P {
             int v;
             void P() { v = 0; }
             void P(int x) { v = x; }
         }
         void f() { P a(); P b(3); P c = new P; }",
    );
    let ctors: Vec<Option<MethodImpl>> = module
        .exprs
        .iter()
        .filter_map(|e| match e.kind {
            ExprKind::New { ctor, .. } => Some(ctor),
            _ => None,
        })
        .collect();
    assert_eq!(
        ctors,
        vec![
            Some(MethodImpl::User(FuncId::new(0))),
            Some(MethodImpl::User(FuncId::new(1))),
            Some(MethodImpl::User(FuncId::new(0))),
        ]
    );
}

#[test]
fn array_declarations_record_limits() {
    let module = compile_ok("void f() { int a[5][], b; int[] c = {1, 2}; int d[9999]; }");
    let decls: Vec<Vec<Option<u32>>> = module
        .stmts
        .iter()
        .filter_map(|s| match &s.kind {
            StmtKind::Decl { limits, .. } => Some(limits.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(decls, vec![vec![Some(5), None], vec![], vec![None], vec![Some(9999)]]);
}

#[test]
fn switch_cases_index_into_the_body() {
    let module = compile_ok(
        "int f(int x) {
             switch (x) {
                 case 1: x = 2;
                 case 2 + 1: x = 4; break;
                 default: x = 0;
             }
             return x;
         }",
    );
    let cases = module
        .stmts
        .iter()
        .find_map(|s| match &s.kind {
            StmtKind::Switch { cases, .. } => Some(cases.clone()),
            _ => None,
        })
        .unwrap();
    let starts: Vec<(Option<i64>, u32)> = cases.iter().map(|c| (c.value, c.start)).collect();
    assert_eq!(starts, vec![(Some(1), 0), (Some(3), 1), (None, 3)]);
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5000;
    let source = format!(
        "int f() {{ return {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    compile_ok(&source);
}

#[test]
fn reports_syntax_errors() {
    let cases = [
        ("void f() { if 1 == 1) {} }", ErrorCode::OpenPar),
        ("void f() { if (true {} }", ErrorCode::ClosePar),
        ("void f() { if (1) {} }", ErrorCode::NotBoolean),
        ("void f() { int a = 1 }", ErrorCode::NoTerminator),
        ("void f() { else {} }", ErrorCode::ElseWhitoutIf),
        ("void f() { case 1: }", ErrorCode::CaseOut),
        ("void f() { } }", ErrorCode::NoEnd),
        ("void f() { int a;", ErrorCode::CloseBlock),
        ("void f() int a;", ErrorCode::OpenBlock),
        ("void f() { do {} ; }", ErrorCode::NoWhile),
        ("void f() { x: int a; }", ErrorCode::Label),
        ("void f() { switch (1) { int a; } }", ErrorCode::NoCase),
        ("void f() { switch (1) { case 1 a = 1; } }", ErrorCode::NoDoubleDots),
        ("void f() { repeat () {} }", ErrorCode::BadNum),
        ("void f() { int[5] a; }", ErrorCode::CloseIndex),
        ("void f() { int; }", ErrorCode::NoVar),
        ("void () {}", ErrorCode::NoFunc),
        ("int a = 1;", ErrorCode::OpenPar),
        ("void f(void a) {}", ErrorCode::Void),
        ("void f() { int CBotErrZeroDiv; }", ErrorCode::Reserved),
        ("void f() { new; }", ErrorCode::NoClassName),
        ("void f() { new 3; }", ErrorCode::NoClassName),
        ("void f() { int a; a = ; }", ErrorCode::NoExpression),
    ];
    for (source, code) in cases {
        assert_eq!(error_code(source), code, "{source}");
    }
}

#[test]
fn reports_semantic_errors() {
    let cases = [
        ("void f() { x = 1; }", ErrorCode::UndefVar),
        ("void f() { 1 = 2; }", ErrorCode::BadLeft),
        ("void f() { int a = \"s\"; }", ErrorCode::BadType1),
        ("void f() { bool b = 1 + true; }", ErrorCode::BadType2),
        ("void f() { int a; int a; }", ErrorCode::RedefVar),
        ("void f(int a) { int a; }", ErrorCode::RedefVar),
        ("void f() { g(); }", ErrorCode::UndefCall),
        ("void f() { break; }", ErrorCode::BreakOutside),
        ("void f() { while (true) { continue x; } }", ErrorCode::UndefLabel),
        ("void g(int a) {} void f() { g(1, 2); }", ErrorCode::OverParam),
        ("void g(int a) {} void f() { g(); }", ErrorCode::LowParam),
        ("void g(int a) {} void f() { g(\"s\"); }", ErrorCode::BadParam),
        (
            "void g(int a) {} void g(int a, int b) {} void f() { g(); }",
            ErrorCode::NbParam,
        ),
        ("void g(int a) {} void g(int b) {}", ErrorCode::RedefFunc),
        ("class A {} class A {}", ErrorCode::RedefClass),
        ("class B extends Missing {}", ErrorCode::UndefClass),
        ("class A extends B {} class B extends A {}", ErrorCode::UndefClass),
        ("void f() { int a; a.x = 1; }", ErrorCode::UndefClass),
        ("class A {} void f() { A a; a.x = 1; }", ErrorCode::UndefItem),
        (
            "class A { private int x; } void f() { A a = new A(); a.x = 1; }",
            ErrorCode::Private,
        ),
        ("class A {} void f() { A a = new A(1); }", ErrorCode::NoConstruct),
        ("void f() { Foo a = new Foo(); }", ErrorCode::UndefVar),
        ("void f() { int b = new Foo(); }", ErrorCode::BadNew),
        ("int f() { }", ErrorCode::NoReturn),
        ("int f() { if (true) return 1; }", ErrorCode::NoReturn),
        ("void f(int a = 1, int b) {}", ErrorCode::DefaultValue),
        ("void f(int a = ) {}", ErrorCode::NoExpression),
        ("void f() { switch (1) { case 1: case 1: } }", ErrorCode::RedefCase),
        ("void f() { int a[\"x\"]; }", ErrorCode::BadIndex),
        ("void f() { int a[10000]; }", ErrorCode::OutArray),
        ("class C { int grid[2][99999]; }", ErrorCode::OutArray),
        ("void f() { int a = 1 / 0 + 0; int b[1 / 0]; }", ErrorCode::ZeroDiv),
        ("void f() { this; }", ErrorCode::UndefVar),
        ("void f() { throw \"x\"; }", ErrorCode::BadType1),
        ("int f() { return; }", ErrorCode::BadType1),
    ];
    for (source, code) in cases {
        assert_eq!(error_code(source), code, "{source}");
    }
}

#[test]
fn protected_members_are_visible_to_subclasses() {
    compile_ok(
        "class A { protected int x; }
         class B extends A { void set() { x = 1; } }",
    );
    assert_eq!(
        error_code(
            "class A { protected int x; }
             void f() { A a = new A(); a.x = 1; }"
        ),
        ErrorCode::Private
    );
}

#[test]
fn errors_carry_the_offending_span() {
    let source = "void f() { int a = b; }";
    let err = compile_src(source).unwrap_err();
    assert_eq!(&source[err.span.to_range()], "b");
}
