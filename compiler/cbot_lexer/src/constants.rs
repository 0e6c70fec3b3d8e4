//! Named numeric constants.
//!
//! The tokenizer tags identifiers found here as constant tokens. The table
//! is append-only: defining a name twice keeps the first value and is
//! reported as a warning, never an error.

use rustc_hash::FxHashMap;
use tracing::warn;

#[derive(Clone, Debug, Default)]
pub struct Constants {
    values: FxHashMap<String, i64>,
}

impl Constants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Returns `false` if it was already defined.
    pub fn define(&mut self, name: &str, value: i64) -> bool {
        if let Some(&existing) = self.values.get(name) {
            warn!(name, existing, ignored = value, "named constant redefined");
            return false;
        }
        self.values.insert(name.to_owned(), value);
        true
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
