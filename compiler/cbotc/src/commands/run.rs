//! The `run` command: compile a file and run one of its functions.

use std::path::Path;
use std::sync::Arc;

use cbot_ir::TypeDesc;
use cbot_registry::{arg_count, FsFileAccess, Registry};
use cbot_value::Value;
use cbotc::{Program, ProgramConfig, RunStatus};

use super::{color_mode, read_file};

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub entry: String,
    /// Steps per slice; `None` runs in one go.
    pub steps: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            entry: "main".to_owned(),
            steps: None,
        }
    }
}

/// Standard library with files next to the script, plus `print`.
fn host_registry(path: &str) -> Arc<Registry> {
    let root = Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut registry = Registry::with_stdlib(Arc::new(FsFileAccess::new(root)));
    registry.add_function(
        "print",
        |args| {
            arg_count(args, 1, 1)?;
            match args[0] {
                TypeDesc::Void => Err(cbot_diagnostic::ErrorCode::Void),
                _ => Ok(TypeDesc::Void),
            }
        },
        |call| {
            let text = match call.args.first() {
                Some(value) => value.to_text(call.arg_types.first().unwrap_or(&TypeDesc::String)),
                None => String::new(),
            };
            println!("{text}");
            Ok(Value::Void)
        },
    );
    Arc::new(registry)
}

pub fn run_file(path: &str, options: &RunOptions) {
    let content = read_file(path);
    let config = ProgramConfig::new(host_registry(path)).with_step_budget(options.steps);
    let mut program = Program::new(config);

    if program.compile(&content).is_err() {
        report(&program, path);
    }
    if let Err(err) = program.start(&options.entry) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let mut slices = 0u64;
    let status = loop {
        slices += 1;
        match program.run() {
            Ok(RunStatus::Continue) => {}
            Ok(status) => break status,
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    };
    tracing::debug!(slices, steps = program.steps(), "run complete");

    match status {
        RunStatus::Error => report(&program, path),
        _ => {
            let ret = program.module().and_then(|module| {
                module
                    .functions_named(&options.entry)
                    .next()
                    .map(|id| module.function(id).ret.clone())
            });
            if let (Some(value), Some(ty)) = (program.result(), ret) {
                if !value.is_void() {
                    println!("{}", value.to_text(&ty));
                }
            }
        }
    }
}

fn report(program: &Program, path: &str) -> ! {
    if let Some(report) = program.render_error(path, color_mode()) {
        eprint!("{report}");
    }
    std::process::exit(1);
}
