//! CBOT execution machine.
//!
//! Runs a compiled `Module` on an explicit, heap-allocated chain of frames
//! instead of the native call stack, so that execution can stop after any
//! number of steps and pick up exactly where it left off.
//!
//! # Architecture
//!
//! - `Frame`: one slot of the chain: the node being executed, a small
//!   resumption state, an iteration cursor and the operands collected so far
//! - `step`: one state machine per node kind; a step either pushes a child
//!   frame, counts a step (`Tick`), or completes the frame
//! - `Completion`: how a frame finished; abrupt completions (`break`,
//!   `continue`, `return`, exceptions) travel up one frame per iteration
//!   until a loop, switch, function or `try` intercepts them
//! - `Snapshot`: the frame chain and every reachable cell, serialized with
//!   `bincode` and rebuilt against a fresh compile of the same source
//!
//! Nothing here recurses natively while running a program: deep script
//! recursion grows `Vec<Frame>` and is bounded by the call-depth limit.

mod completion;
mod frame;
mod layout;
mod machine;
mod snapshot;
mod step;

pub use completion::Completion;
pub use frame::{Frame, Node, Want};
pub use layout::build_layouts;
pub use machine::{
    Activation, Machine, MachineConfig, RunStatus, StackVar, StackVars, StopHandle,
};
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod test_util;
