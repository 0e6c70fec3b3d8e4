//! Host-facing errors.

use cbot_diagnostic::CompileError;
use cbot_eval::SnapshotError;

/// Why a `Program` operation failed.
///
/// Runtime exceptions are not errors of the facade: `run` reports them as
/// `RunStatus::Error` and `Program::error` describes them.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("source of {0} bytes is too large to compile")]
    SourceTooLarge(usize),

    #[error("no compiled program")]
    NotCompiled,

    #[error("no function `{0}` to start")]
    UnknownEntry(String),

    #[error("entry point `{0}` takes parameters")]
    EntryParams(String),

    #[error("no running program")]
    NotRunning,

    #[error("{0}")]
    Snapshot(#[from] SnapshotError),
}
