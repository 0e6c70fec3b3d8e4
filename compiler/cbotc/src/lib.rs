//! CBOT program facade.
//!
//! `Program` ties the pipeline together for a host application:
//!
//! ```text
//! source ──tokenize──► TokenList ──compile──► Module
//!                                               │
//!                       start(entry) ──────────►│ Machine (frame chain)
//!                                               │
//!                run / run_steps ◄──────────────┘  save_state / restore_state
//! ```
//!
//! One registry of host natives is shared by every program; each program
//! owns its compiled module and at most one execution chain. Compiling
//! again drops the chain.
//!
//! # Tracing
//!
//! Library crates only emit events. Call [`init_tracing`] once to print
//! them:
//! - `RUST_LOG=cbot_eval=debug`: one line per run slice, save and restore
//! - `RUST_LOG=cbot_parse=trace`: the parser cursor, token by token
//! - `CBOT_LOG_TREE=1`: nested span output instead of flat lines

mod config;
mod error;
mod program;

pub use cbot_eval::{RunStatus, StackVar, StackVars, StopHandle};
pub use config::ProgramConfig;
pub use error::ProgramError;
pub use program::Program;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var("CBOT_LOG_TREE").is_ok() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
