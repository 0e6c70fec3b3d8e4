//! Host setup shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cbot_diagnostic::emitter::ColorMode;
use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;
use cbot_registry::{arg_count, MemoryFileAccess, Registry};
use cbot_value::Value;
use cbotc::{Program, ProgramConfig, RunStatus};

/// Code `ASSERT(false)` raises.
pub const ASSERT_FAILED: ErrorCode = ErrorCode::BadParam;

/// A host with the standard library over in-memory files and an
/// `ASSERT(bool)` native that counts the checks it performs.
pub struct Host {
    pub files: MemoryFileAccess,
    pub checks: Arc<AtomicUsize>,
    pub registry: Arc<Registry>,
}

impl Host {
    pub fn new() -> Self {
        let files = MemoryFileAccess::new();
        let checks = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::with_stdlib(Arc::new(files.clone()));
        let counter = Arc::clone(&checks);
        registry.add_function(
            "ASSERT",
            |args| {
                arg_count(args, 1, 1)?;
                match args[0] {
                    TypeDesc::Boolean => Ok(TypeDesc::Boolean),
                    _ => Err(ErrorCode::BadType1),
                }
            },
            move |call| {
                counter.fetch_add(1, Ordering::Relaxed);
                match call.args.first() {
                    Some(Value::Bool(true)) => Ok(Value::Bool(true)),
                    _ => Err(ASSERT_FAILED),
                }
            },
        );
        Host {
            files,
            checks,
            registry: Arc::new(registry),
        }
    }

    pub fn program(&self) -> Program {
        Program::new(ProgramConfig::new(Arc::clone(&self.registry)))
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }

    /// Compile `source`, run `main` to its end and return the program.
    pub fn run(&self, source: &str) -> Program {
        let mut program = self.program();
        if let Err(err) = program.compile(source) {
            let report = program.render_error("test.cbot", ColorMode::Never);
            panic!("{err}\n{}", report.unwrap_or_default());
        }
        program.start("main").unwrap();
        let status = program.run().unwrap();
        assert_eq!(
            status,
            RunStatus::Finished,
            "{:?}",
            program.render_error("test.cbot", ColorMode::Never)
        );
        program
    }
}

/// Run `source` on a fresh host and return `main`'s result.
pub fn eval(source: &str) -> Value {
    Host::new().run(source).result().cloned().unwrap()
}
