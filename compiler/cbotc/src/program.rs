//! The `Program` facade.

use std::sync::Arc;

use cbot_diagnostic::emitter::{ColorMode, TerminalEmitter};
use cbot_diagnostic::CompileError;
use cbot_eval::{Machine, RunStatus, Snapshot, StackVars, StopHandle};
use cbot_ir::{FuncId, Module, Span};
use cbot_lexer::{token_signature, tokenize, TokenIdx, TokenList, MAX_SOURCE_LEN};
use cbot_value::Value;
use tracing::{debug, debug_span};

use crate::{ProgramConfig, ProgramError};

/// A successful compile.
struct Compiled {
    tokens: TokenList,
    module: Arc<Module>,
    /// Signature of the whole token list.
    signature: u32,
}

/// One CBOT program: its source, the compiled module and at most one
/// execution chain.
///
/// ```text
/// new ─► compile ─► start(entry) ─► run ... run ─► Finished | Error
///            ▲            ▲              │
///            │            └── restore_state
///            └── recompiling drops the chain
/// ```
pub struct Program {
    config: ProgramConfig,
    source: String,
    compiled: Option<Compiled>,
    compile_error: Option<CompileError>,
    machine: Option<Machine>,
    stop: StopHandle,
}

impl Program {
    pub fn new(config: ProgramConfig) -> Self {
        Program {
            config,
            source: String::new(),
            compiled: None,
            compile_error: None,
            machine: None,
            stop: StopHandle::new(),
        }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Tokenize and compile `source`, replacing any previous program.
    ///
    /// All or nothing: on failure no module is kept and [`Program::error`]
    /// reports the first error.
    pub fn compile(&mut self, source: &str) -> Result<(), ProgramError> {
        let _span = debug_span!("compile", bytes = source.len()).entered();
        self.machine = None;
        self.compiled = None;
        self.compile_error = None;
        self.source.clear();
        check_size(source.len())?;
        source.clone_into(&mut self.source);

        let registry = self.config.registry();
        let tokens = tokenize(source, registry.constants());
        let signature = token_signature(&tokens, tokens.first(), tokens.end());
        match cbot_parse::compile(&tokens, registry) {
            Ok(module) => {
                debug!(signature, tokens = tokens.len(), "program ready");
                self.compiled = Some(Compiled {
                    tokens,
                    module: Arc::new(module),
                    signature,
                });
                Ok(())
            }
            Err(err) => {
                debug!(%err, "compile failed");
                self.compile_error = Some(err);
                Err(err.into())
            }
        }
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn module(&self) -> Option<&Arc<Module>> {
        self.compiled.as_ref().map(|c| &c.module)
    }

    /// The token list of the compiled source.
    pub fn tokens(&self) -> Option<&TokenList> {
        self.compiled.as_ref().map(|c| &c.tokens)
    }

    /// Names of the free functions, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &str> + '_ {
        self.module()
            .into_iter()
            .flat_map(|module| module.functions.iter())
            .filter(|f| f.class.is_none())
            .map(|f| f.name.as_str())
    }

    /// Names of the free functions declared `extern`, the ones a host
    /// offers as entry points.
    pub fn extern_functions(&self) -> impl Iterator<Item = &str> + '_ {
        self.module()
            .into_iter()
            .flat_map(|module| module.functions.iter())
            .filter(|f| f.class.is_none() && f.is_extern())
            .map(|f| f.name.as_str())
    }

    /// Signature of the tokens from `first` to `last`; see
    /// [`cbot_lexer::token_signature`].
    pub fn signature(&self, first: TokenIdx, last: TokenIdx) -> Option<u32> {
        self.tokens()
            .map(|tokens| token_signature(tokens, first, last))
    }

    /// Signature of the whole program, the identity snapshots are tied to.
    pub fn program_signature(&self) -> Option<u32> {
        self.compiled.as_ref().map(|c| c.signature)
    }

    /// A fresh chain rooted at the parameterless function `name`. Any
    /// previous run and its error are discarded.
    pub fn start(&mut self, name: &str) -> Result<(), ProgramError> {
        let compiled = self.compiled.as_ref().ok_or(ProgramError::NotCompiled)?;
        let entry = entry_point(&compiled.module, name)?;
        let mut machine = Machine::start(
            Arc::clone(&compiled.module),
            Arc::clone(self.config.registry()),
            entry,
            self.config.machine_config(),
        );
        self.stop.reset();
        machine.set_stop_handle(self.stop.clone());
        self.machine = Some(machine);
        Ok(())
    }

    /// Run one slice of the configured step budget.
    pub fn run(&mut self) -> Result<RunStatus, ProgramError> {
        let budget = self.config.step_budget();
        self.run_budget(budget)
    }

    /// Run at most `steps` steps.
    pub fn run_steps(&mut self, steps: u64) -> Result<RunStatus, ProgramError> {
        self.run_budget(Some(steps))
    }

    fn run_budget(&mut self, budget: Option<u64>) -> Result<RunStatus, ProgramError> {
        let machine = self.machine.as_mut().ok_or(ProgramError::NotRunning)?;
        Ok(machine.run(budget))
    }

    /// Whether a chain exists and has neither finished nor failed.
    pub fn is_running(&self) -> bool {
        self.machine
            .as_ref()
            .is_some_and(|m| !m.is_finished() && m.error().is_none())
    }

    /// Code and span of the last compile error, or of the exception that
    /// ended the current run.
    pub fn error(&self) -> Option<(i32, Span)> {
        if let Some(err) = self.compile_error {
            return Some((err.code.code(), err.span));
        }
        let error = self.machine.as_ref()?.error()?;
        Some((error.code, error.span))
    }

    /// [`Program::error`] as a labelled report over the source.
    pub fn render_error(&self, path: &str, color: ColorMode) -> Option<String> {
        let emitter = TerminalEmitter::new(&self.source, path).with_color(color);
        if let Some(err) = &self.compile_error {
            return Some(emitter.render_compile_error(err));
        }
        let error = self.machine.as_ref()?.error()?;
        Some(emitter.render_runtime_error(&error))
    }

    /// Flag the host may set from anywhere to stop the running chain at
    /// its next step.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Return value of the entry function once the run finished.
    pub fn result(&self) -> Option<&Value> {
        self.machine.as_ref()?.result()
    }

    /// Steps counted since `start`.
    pub fn steps(&self) -> u64 {
        self.machine.as_ref().map_or(0, Machine::steps)
    }

    /// Current value of a static field.
    pub fn static_field(&self, class: &str, field: &str) -> Option<Value> {
        self.machine.as_ref()?.static_field(class, field)
    }

    /// Locals of a suspended run, `level` calls below the innermost one.
    pub fn stack_vars(&self, level: usize) -> Option<StackVars> {
        self.machine.as_ref()?.stack_vars(level)
    }

    /// Serialize the suspended chain.
    pub fn save_state(&self) -> Result<Vec<u8>, ProgramError> {
        let compiled = self.compiled.as_ref().ok_or(ProgramError::NotCompiled)?;
        let machine = self.machine.as_ref().ok_or(ProgramError::NotRunning)?;
        let bytes = machine.save(compiled.signature)?.to_bytes()?;
        debug!(bytes = bytes.len(), "state saved");
        Ok(bytes)
    }

    /// Replace the current chain with one saved by [`Program::save_state`]
    /// from the same source text.
    pub fn restore_state(&mut self, bytes: &[u8]) -> Result<(), ProgramError> {
        let compiled = self.compiled.as_ref().ok_or(ProgramError::NotCompiled)?;
        let snapshot = Snapshot::from_bytes(bytes)?;
        let mut machine = Machine::restore(
            Arc::clone(&compiled.module),
            Arc::clone(self.config.registry()),
            &snapshot,
            compiled.signature,
            self.config.machine_config(),
        )?;
        debug!(entry = snapshot.entry(), depth = snapshot.depth(), "state restored");
        self.stop.reset();
        machine.set_stop_handle(self.stop.clone());
        self.machine = Some(machine);
        Ok(())
    }
}

/// Token positions are `u32` byte offsets.
fn check_size(len: usize) -> Result<(), ProgramError> {
    if len > MAX_SOURCE_LEN {
        debug!(bytes = len, "source too large");
        return Err(ProgramError::SourceTooLarge(len));
    }
    Ok(())
}

fn entry_point(module: &Module, name: &str) -> Result<FuncId, ProgramError> {
    let mut found = false;
    for id in module.functions_named(name) {
        if module.function(id).params.is_empty() {
            return Ok(id);
        }
        found = true;
    }
    if found {
        Err(ProgramError::EntryParams(name.to_owned()))
    } else {
        Err(ProgramError::UnknownEntry(name.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
