//! Program configuration.

use std::fmt;
use std::sync::Arc;

use cbot_eval::MachineConfig;
use cbot_registry::{MemoryFileAccess, Registry};

/// Settings shared by the programs a host creates.
///
/// The default registry holds the standard library with file access
/// confined to memory; hosts that want real files or their own natives
/// pass a registry with [`ProgramConfig::with_registry`].
#[derive(Clone)]
pub struct ProgramConfig {
    registry: Arc<Registry>,
    max_call_depth: u32,
    step_budget: Option<u64>,
}

impl ProgramConfig {
    pub fn new(registry: Arc<Registry>) -> Self {
        ProgramConfig {
            registry,
            max_call_depth: MachineConfig::default().max_call_depth,
            step_budget: None,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Nested calls allowed before `StackOver` is thrown.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: u32) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Steps one `Program::run` performs; `None` runs to completion.
    #[must_use]
    pub fn with_step_budget(mut self, budget: Option<u64>) -> Self {
        self.step_budget = budget;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn max_call_depth(&self) -> u32 {
        self.max_call_depth
    }

    pub fn step_budget(&self) -> Option<u64> {
        self.step_budget
    }

    pub(crate) fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            max_call_depth: self.max_call_depth,
        }
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        ProgramConfig::new(Arc::new(Registry::with_stdlib(Arc::new(
            MemoryFileAccess::new(),
        ))))
    }
}

impl fmt::Debug for ProgramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramConfig")
            .field("natives", &self.registry.natives_len())
            .field("max_call_depth", &self.max_call_depth)
            .field("step_budget", &self.step_budget)
            .finish_non_exhaustive()
    }
}
