//! The `check` command: compile a file without running it.

use cbotc::{Program, ProgramConfig};

use super::{color_mode, read_file};

pub fn check_file(path: &str) {
    let content = read_file(path);
    let mut program = Program::new(ProgramConfig::default());
    if program.compile(&content).is_err() {
        if let Some(report) = program.render_error(path, color_mode()) {
            eprint!("{report}");
        }
        std::process::exit(1);
    }

    let Some(module) = program.module() else {
        return;
    };
    let externs: Vec<&str> = program.extern_functions().collect();
    println!(
        "OK: {path} ({} functions, {} classes)",
        module.functions.len(),
        module.classes.len()
    );
    if !externs.is_empty() {
        println!("  entry points: {}", externs.join(", "));
    }
}
