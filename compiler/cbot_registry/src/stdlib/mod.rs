//! The standard library: string functions, `sizeof` and the `file` class.

mod file;
mod strings;

use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;
use cbot_value::Value;
use tracing::debug;

use crate::{arg_count, FileAccess, Registry};

pub use file::{register_file, FILE_CLASS};
pub use strings::register_strings;

/// Install the whole standard library.
pub fn install(registry: &mut Registry, files: Arc<dyn FileAccess>) {
    register_sizeof(registry);
    register_strings(registry);
    register_file(registry, files);
    debug!(natives = registry.natives_len(), "standard library installed");
}

/// `int sizeof(array)`: number of elements.
pub fn register_sizeof(registry: &mut Registry) {
    registry.add_function(
        "sizeof",
        |args| {
            arg_count(args, 1, 1)?;
            match &args[0] {
                TypeDesc::Array(_) | TypeDesc::Null => Ok(TypeDesc::Int),
                _ => Err(ErrorCode::BadParam),
            }
        },
        |call| match call.args.first() {
            Some(Value::Array(array)) => Ok(Value::Int(array.borrow().len() as i64)),
            Some(Value::Null) => Ok(Value::Int(0)),
            _ => Err(ErrorCode::BadParam),
        },
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
