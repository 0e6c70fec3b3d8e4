//! Command handlers for the `cbot` binary.

use std::io::IsTerminal;

use cbot_diagnostic::emitter::ColorMode;

mod check;
mod lex;
mod run;

pub use check::check_file;
pub use lex::lex_file;
pub use run::{run_file, RunOptions};

/// Read a source file or exit with a message.
fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

fn color_mode() -> ColorMode {
    if std::io::stderr().is_terminal() {
        ColorMode::Always
    } else {
        ColorMode::Never
    }
}
