//! The driver: owns the frame chain and runs it in bounded slices.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cbot_diagnostic::{ErrorCode, RuntimeError};
use cbot_ir::{FuncId, Module, Span, TypeDesc};
use cbot_registry::Registry;
use cbot_value::{ArrayData, ArrayRef, ClassLayout, ObjRef, Value, Var, VarCell};
use tracing::{debug, debug_span, trace};

use crate::completion::Interrupt;
use crate::step::Action;
use crate::{build_layouts, Completion, Frame, Node};

/// Limits applied while running.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Nested function activations allowed before `StackOver` is thrown.
    pub max_call_depth: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            max_call_depth: 1000,
        }
    }
}

/// Outcome of one `run` slice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The entry function returned.
    Finished,
    /// The step budget ran out; call `run` again to go on.
    Continue,
    /// An exception escaped, or the program was stopped.
    Error,
}

/// Cancellation flag shared with the host.
///
/// Checked when a slice starts and at every step; once set, the next check
/// drops the chain and the run reports `Error` with `NoRun`.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag, for a fresh start.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Locals and receiver of one function activation.
#[derive(Debug)]
pub struct Activation {
    pub func: Option<FuncId>,
    pub this: Option<ObjRef>,
    /// One cell per local slot; a declaration replaces its slot's cell.
    pub locals: Vec<VarCell>,
}

impl Activation {
    /// Activation of `func` with every local freshly declared.
    pub fn for_function(module: &Module, func: FuncId, this: Option<ObjRef>) -> Self {
        let locals = module
            .function(func)
            .locals
            .iter()
            .map(|local| VarCell::new(Var::new(local.ty.clone())))
            .collect();
        Activation {
            func: Some(func),
            this,
            locals,
        }
    }

    /// Activation without locals, for initializers.
    pub fn bare(this: Option<ObjRef>) -> Self {
        Activation {
            func: None,
            this,
            locals: Vec::new(),
        }
    }
}

/// A local variable seen between steps.
#[derive(Clone, Debug, PartialEq)]
pub struct StackVar {
    pub name: String,
    pub ty: TypeDesc,
    /// `None` while the variable is undefined.
    pub value: Option<Value>,
}

/// Locals of one function activation, for debugger-style inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct StackVars {
    pub function: String,
    pub vars: Vec<StackVar>,
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Running,
    Finished(Value),
    Failed(RuntimeError),
}

/// A running program: the frame chain over one compiled module.
pub struct Machine {
    pub(crate) module: Arc<Module>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) config: MachineConfig,
    pub(crate) layouts: Vec<Rc<ClassLayout>>,
    /// Static fields, per class.
    pub(crate) statics: Vec<Vec<VarCell>>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) activations: Vec<Activation>,
    /// Completion of the frame popped last, for the new top frame.
    pub(crate) incoming: Option<Completion>,
    pub(crate) outcome: Outcome,
    pub(crate) stop: StopHandle,
    pub(crate) steps: u64,
}

impl Machine {
    /// A fresh chain rooted at `entry`. Static fields are reset; their
    /// initializers run as the first steps.
    pub fn start(
        module: Arc<Module>,
        registry: Arc<Registry>,
        entry: FuncId,
        config: MachineConfig,
    ) -> Self {
        let statics = module
            .classes
            .iter()
            .map(|class| {
                class
                    .statics
                    .iter()
                    .map(|f| fresh_cell(&f.ty, &f.limits))
                    .collect()
            })
            .collect();
        let layouts = build_layouts(&module);
        debug!(
            entry = module.get_function(entry).map_or("?", |f| f.name.as_str()),
            "execution started"
        );
        Machine {
            module,
            registry,
            config,
            layouts,
            statics,
            frames: vec![Frame::new(Node::Start(entry), 0)],
            activations: vec![Activation::bare(None)],
            incoming: None,
            outcome: Outcome::Running,
            stop: StopHandle::new(),
            steps: 0,
        }
    }

    /// Run until the program finishes, fails, or `budget` steps were
    /// counted. `None` runs to completion.
    pub fn run(&mut self, budget: Option<u64>) -> RunStatus {
        let _span = debug_span!("run", ?budget).entered();
        match self.outcome {
            Outcome::Finished(_) => return RunStatus::Finished,
            Outcome::Failed(_) => return RunStatus::Error,
            Outcome::Running => {}
        }
        if self.stop.is_stopped() {
            return self.abort();
        }
        if budget == Some(0) {
            return RunStatus::Continue;
        }

        let mut slice = 0u64;
        loop {
            let Some(mut frame) = self.frames.pop() else {
                let completion = self.incoming.take().unwrap_or(Completion::Normal);
                return self.finish(completion, slice);
            };
            let incoming = self.incoming.take();
            let action = match self.step(&mut frame, incoming) {
                Ok(action) => action,
                Err(Interrupt::Raise(code)) => {
                    let error = RuntimeError::new(code, frame.node.span(&self.module));
                    trace!(%error, "raised");
                    Action::Complete(Completion::Throw(error))
                }
                Err(Interrupt::Propagate(completion)) => Action::Complete(completion),
            };
            match action {
                Action::Push(child) => {
                    trace!(node = ?child.node, depth = self.frames.len() + 1, "push");
                    self.frames.push(frame);
                    self.frames.push(child);
                }
                Action::Tick => {
                    self.frames.push(frame);
                    self.steps += 1;
                    slice += 1;
                    if self.stop.is_stopped() {
                        return self.abort();
                    }
                    if budget.is_some_and(|budget| slice >= budget) {
                        debug!(steps = slice, "slice suspended");
                        return RunStatus::Continue;
                    }
                }
                Action::Complete(completion) => {
                    trace!(node = ?frame.node, completion = completion.label(), "complete");
                    self.release(&frame);
                    self.incoming = Some(completion);
                }
            }
        }
    }

    /// Drop what a finished frame owned.
    fn release(&mut self, frame: &Frame) {
        if frame.node.owns_activation() {
            self.activations.truncate(frame.act as usize);
        }
    }

    fn finish(&mut self, completion: Completion, slice: u64) -> RunStatus {
        match completion {
            Completion::Throw(error) => {
                debug!(%error, steps = slice, "uncaught exception");
                self.outcome = Outcome::Failed(error);
                RunStatus::Error
            }
            Completion::Value(value) | Completion::Return(value) => {
                debug!(steps = slice, total = self.steps, "execution finished");
                self.outcome = Outcome::Finished(value);
                RunStatus::Finished
            }
            _ => {
                debug!(steps = slice, total = self.steps, "execution finished");
                self.outcome = Outcome::Finished(Value::Void);
                RunStatus::Finished
            }
        }
    }

    /// Drop the chain after a stop request.
    fn abort(&mut self) -> RunStatus {
        debug!(frames = self.frames.len(), "execution stopped");
        let span = self
            .frames
            .last()
            .map_or(Span::DUMMY, |f| f.node.span(&self.module));
        self.frames.clear();
        self.activations.clear();
        self.incoming = None;
        self.outcome = Outcome::Failed(RuntimeError::new(ErrorCode::NoRun, span));
        RunStatus::Error
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Share a host-owned stop flag.
    pub fn set_stop_handle(&mut self, stop: StopHandle) {
        self.stop = stop;
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.outcome, Outcome::Finished(_))
    }

    /// Return value of the entry function, once finished.
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Finished(value) => Some(value),
            _ => None,
        }
    }

    /// The exception that ended the run.
    pub fn error(&self) -> Option<RuntimeError> {
        match &self.outcome {
            Outcome::Failed(error) => Some(*error),
            _ => None,
        }
    }

    /// Steps counted since the start.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Frames currently on the chain, root first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    /// Current value of a static field.
    pub fn static_field(&self, class: &str, name: &str) -> Option<Value> {
        let id = self.module.class_named(class)?;
        let (index, _) = self.module.class(id).static_named(name)?;
        let cell = self.statics.get(id.index())?.get(index as usize)?;
        Some(cell.borrow().peek().clone())
    }

    /// Locals of the function `level` calls below the innermost one;
    /// level 0 is the function currently executing. Initializer
    /// activations are skipped.
    pub fn stack_vars(&self, level: usize) -> Option<StackVars> {
        let activation = self
            .activations
            .iter()
            .rev()
            .filter(|act| act.func.is_some())
            .nth(level)?;
        let def = self.module.get_function(activation.func?)?;
        let vars = def
            .locals
            .iter()
            .zip(&activation.locals)
            .map(|(local, cell)| {
                let var = cell.borrow();
                StackVar {
                    name: local.name.clone(),
                    ty: var.ty().clone(),
                    value: var.get().ok(),
                }
            })
            .collect();
        Some(StackVars {
            function: def.name.clone(),
            vars,
        })
    }

    /// The activation frame `frame` reads locals from.
    pub(crate) fn activation(&self, frame: &Frame) -> Result<&Activation, ErrorCode> {
        self.activations
            .get(frame.act as usize)
            .ok_or(ErrorCode::NoRun)
    }

    pub(crate) fn activation_mut(&mut self, frame: &Frame) -> Result<&mut Activation, ErrorCode> {
        self.activations
            .get_mut(frame.act as usize)
            .ok_or(ErrorCode::NoRun)
    }

    /// Push an activation record; returns its index for the owning frame.
    pub(crate) fn push_activation(&mut self, activation: Activation) -> Result<u32, ErrorCode> {
        if self.activations.len() >= self.config.max_call_depth as usize {
            return Err(ErrorCode::StackOver);
        }
        self.activations.push(activation);
        Ok((self.activations.len() - 1) as u32)
    }
}

/// A declared variable without initializer. Arrays start empty, bounded
/// by their declared limits.
pub(crate) fn fresh_var(ty: &TypeDesc, limits: &[Option<u32>]) -> Var {
    match ty.element() {
        Some(elem) if !limits.is_empty() => {
            let array = ArrayRef::new(ArrayData::new(elem.clone(), limits.to_vec()));
            Var::with_default(ty.clone(), Value::Array(array))
        }
        _ => Var::new(ty.clone()),
    }
}

pub(crate) fn fresh_cell(ty: &TypeDesc, limits: &[Option<u32>]) -> VarCell {
    VarCell::new(fresh_var(ty, limits))
}
