use super::*;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;
use cbot_registry::{arg_count, expect_numeric, MemoryFileAccess, Registry};
use pretty_assertions::assert_eq;

fn compiled(source: &str) -> Program {
    let mut program = Program::new(ProgramConfig::default());
    program.compile(source).unwrap();
    program
}

/// A host exposing `tick()`, which counts its calls, and `observe(n)`,
/// which records the last integer it was given.
struct Witness {
    ticks: Arc<AtomicUsize>,
    observed: Arc<AtomicI64>,
    registry: Arc<Registry>,
}

impl Witness {
    fn new() -> Self {
        let ticks = Arc::new(AtomicUsize::new(0));
        let observed = Arc::new(AtomicI64::new(i64::MIN));
        let mut registry = Registry::with_stdlib(Arc::new(MemoryFileAccess::new()));
        let counter = Arc::clone(&ticks);
        registry.add_function(
            "tick",
            |args| {
                arg_count(args, 0, 0)?;
                Ok(TypeDesc::Void)
            },
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Void)
            },
        );
        let last = Arc::clone(&observed);
        registry.add_function(
            "observe",
            |args| {
                expect_numeric(args, 0)?;
                arg_count(args, 1, 1)?;
                Ok(TypeDesc::Void)
            },
            move |call| {
                last.store(call.int(0)?, Ordering::SeqCst);
                Ok(Value::Void)
            },
        );
        Witness {
            ticks,
            observed,
            registry: Arc::new(registry),
        }
    }

    fn program(&self, source: &str) -> Program {
        let mut program = Program::new(ProgramConfig::new(Arc::clone(&self.registry)));
        program.compile(source).unwrap();
        program.start("main").unwrap();
        program
    }

    fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    fn observed(&self) -> i64 {
        self.observed.load(Ordering::SeqCst)
    }
}

#[test]
fn lists_free_functions() {
    let program = compiled(
        "extern void go() { }
         int helper(int x) { return x; }
         class C { void method() { } }
         extern void other() { }",
    );
    assert_eq!(
        program.functions().collect::<Vec<_>>(),
        vec!["go", "helper", "other"]
    );
    assert_eq!(
        program.extern_functions().collect::<Vec<_>>(),
        vec!["go", "other"]
    );
}

#[test]
fn failed_compile_keeps_nothing() {
    let mut program = compiled("void main() { }");
    let source = "void main() { int x = ; }";
    let err = program.compile(source).unwrap_err();
    assert!(matches!(err, ProgramError::Compile(_)));
    assert!(!program.is_compiled());
    assert_eq!(program.functions().count(), 0);
    let (code, span) = program.error().unwrap();
    assert!(ErrorCode::from_code(code).is_some_and(|c| !c.is_runtime()));
    assert!(span.end as usize <= source.len());
    assert_eq!(program.start("main"), Err(ProgramError::NotCompiled));
}

#[test]
fn start_checks_the_entry_point() {
    let mut program = compiled("int twice(int x) { return 2 * x; } void main() { }");
    assert_eq!(
        program.start("missing"),
        Err(ProgramError::UnknownEntry("missing".into()))
    );
    assert_eq!(
        program.start("twice"),
        Err(ProgramError::EntryParams("twice".into()))
    );
    assert_eq!(program.run(), Err(ProgramError::NotRunning));
    program.start("main").unwrap();
    assert!(program.is_running());
    assert_eq!(program.run(), Ok(RunStatus::Finished));
    assert!(!program.is_running());
}

#[test]
fn an_extern_entry_computes_its_locals() {
    let mut program = compiled("extern void main() { int x = 2 + 3 * 4; }");
    program.start("main").unwrap();
    assert_eq!(program.run(), Ok(RunStatus::Finished));
    assert_eq!(program.error(), None);

    let witness = Witness::new();
    let mut program = witness.program("extern void main() { int x = 2 + 3 * 4; observe(x); }");
    // Body block, the declaration, then the call statement.
    assert_eq!(program.run_steps(3), Ok(RunStatus::Continue));
    let vars = program.stack_vars(0).unwrap();
    assert_eq!(vars.function, "main");
    assert_eq!(vars.vars[0].name, "x");
    assert_eq!(vars.vars[0].value, Some(Value::Int(14)));
    assert_eq!(witness.observed(), i64::MIN);

    assert_eq!(program.run(), Ok(RunStatus::Finished));
    assert_eq!(witness.observed(), 14);
    assert_eq!(program.stack_vars(0), None);
}

#[test]
fn single_steps_never_finish_an_endless_loop() {
    let witness = Witness::new();
    let mut program = witness.program("extern void main() { while (true) { tick(); } }");
    for _ in 0..300 {
        assert_eq!(program.run_steps(1), Ok(RunStatus::Continue));
    }
    let ticks = witness.ticks();
    assert!(ticks > 50, "only {ticks} loop bodies ran");
    assert!(program.is_running());

    program.stop_handle().stop();
    assert_eq!(program.run_steps(1), Ok(RunStatus::Error));
    assert_eq!(witness.ticks(), ticks);
    assert_eq!(
        program.error().map(|(code, _)| code),
        Some(ErrorCode::NoRun.code())
    );
    assert_eq!(program.run(), Ok(RunStatus::Error));
    assert_eq!(witness.ticks(), ticks);
}

#[test]
fn recompiling_drops_the_chain() {
    let mut program = compiled("void main() { while (true) { } }");
    program.start("main").unwrap();
    assert_eq!(program.run_steps(10), Ok(RunStatus::Continue));
    program.compile("int main() { return 4; }").unwrap();
    assert!(!program.is_running());
    assert_eq!(program.run_steps(10), Err(ProgramError::NotRunning));
    program.start("main").unwrap();
    assert_eq!(program.run(), Ok(RunStatus::Finished));
    assert_eq!(program.result(), Some(&Value::Int(4)));
}

#[test]
fn start_clears_the_previous_error() {
    let mut program = compiled("int main() { int z = 0; return 5 / z; }");
    program.start("main").unwrap();
    assert_eq!(program.run(), Ok(RunStatus::Error));
    assert_eq!(
        program.error().map(|(code, _)| code),
        Some(ErrorCode::ZeroDiv.code())
    );
    program.start("main").unwrap();
    assert_eq!(program.error(), None);
}

#[test]
fn configured_budget_slices_run() {
    let config = ProgramConfig::default().with_step_budget(Some(5));
    let mut program = Program::new(config);
    program
        .compile("int main() { int s = 0; for (int i = 0; i < 10; i++) { s += i; } return s; }")
        .unwrap();
    program.start("main").unwrap();
    let mut slices = 1;
    while program.run() == Ok(RunStatus::Continue) {
        slices += 1;
    }
    assert!(slices > 2);
    assert_eq!(program.result(), Some(&Value::Int(45)));
}

#[test]
fn stop_handle_survives_restarts() {
    let mut program = compiled("void main() { while (true) { } }");
    let stop = program.stop_handle();
    program.start("main").unwrap();
    assert_eq!(program.run_steps(5), Ok(RunStatus::Continue));
    stop.stop();
    assert_eq!(program.run_steps(5), Ok(RunStatus::Error));
    assert_eq!(
        program.error().map(|(code, _)| code),
        Some(ErrorCode::NoRun.code())
    );
    program.start("main").unwrap();
    assert_eq!(program.run_steps(5), Ok(RunStatus::Continue));
}

#[test]
fn signatures_follow_the_tokens() {
    let a = compiled("int main() { return 1; }");
    let b = compiled("int   main()\n{ return 1; } // same tokens");
    let c = compiled("int main() { return 2; }");
    assert_eq!(a.program_signature(), b.program_signature());
    assert_ne!(a.program_signature(), c.program_signature());

    let tokens = a.tokens().unwrap();
    let first = tokens.first();
    assert_eq!(
        a.signature(first, first),
        Some(cbot_lexer::crc32(b"int"))
    );
}

#[test]
fn errors_render_over_the_source() {
    let mut program = compiled("int main() { int z = 0; return 1 / z; }");
    program.start("main").unwrap();
    program.run().unwrap();
    let report = program.render_error("div.cbot", ColorMode::Never).unwrap();
    assert!(report.contains("div.cbot"));
    assert!(report.contains("CBotErrZeroDiv"));
}

#[test]
fn sources_beyond_u32_offsets_are_refused() {
    assert_eq!(check_size(MAX_SOURCE_LEN), Ok(()));
    assert_eq!(
        check_size(MAX_SOURCE_LEN + 1),
        Err(ProgramError::SourceTooLarge(MAX_SOURCE_LEN + 1))
    );
}
