//! Compile-and-run helpers shared by the unit tests.

use std::sync::Arc;

use cbot_ir::{FuncId, Module};
use cbot_lexer::{token_signature, tokenize};
use cbot_parse::compile;
use cbot_registry::{MemoryFileAccess, Registry};
use cbot_value::Value;

use crate::{Machine, MachineConfig, RunStatus};

pub(crate) fn registry() -> Arc<Registry> {
    Arc::new(Registry::with_stdlib(Arc::new(MemoryFileAccess::new())))
}

/// Compile `source`, returning the module and its token signature.
pub(crate) fn compile_with(source: &str, registry: &Registry) -> (Arc<Module>, u32) {
    let tokens = tokenize(source, registry.constants());
    let signature = token_signature(&tokens, tokens.first(), tokens.end());
    match compile(&tokens, registry) {
        Ok(module) => (Arc::new(module), signature),
        Err(err) => panic!("unexpected {err} compiling:\n{source}"),
    }
}

pub(crate) fn entry(module: &Module, name: &str) -> FuncId {
    module
        .functions_named(name)
        .next()
        .unwrap_or_else(|| panic!("no function `{name}`"))
}

/// A machine positioned at the start of `main`.
pub(crate) fn start(source: &str) -> Machine {
    start_with(source, MachineConfig::default())
}

pub(crate) fn start_with(source: &str, config: MachineConfig) -> Machine {
    let registry = registry();
    let (module, _) = compile_with(source, &registry);
    let main = entry(&module, "main");
    Machine::start(module, registry, main, config)
}

/// Run `main` to completion and return its result.
pub(crate) fn eval(source: &str) -> Value {
    let mut machine = start(source);
    match machine.run(None) {
        RunStatus::Finished => machine.result().cloned().unwrap_or(Value::Void),
        status => panic!("{status:?}: {:?}", machine.error()),
    }
}

/// Run `main` and return the code of the exception that escaped it.
pub(crate) fn uncaught(source: &str) -> i32 {
    let mut machine = start(source);
    assert_eq!(machine.run(None), RunStatus::Error);
    machine.error().map(|e| e.code).expect("an error")
}
