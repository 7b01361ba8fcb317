// ABOUTME: Tool module - defines tools, the registry, and the schema validator.
// ABOUTME: Core abstraction for every capability the planner can invoke.

mod registry;
mod result;
mod traits;
mod validate;

pub use registry::*;
pub use result::*;
pub use traits::*;
pub use validate::*;

#[cfg(test)]
mod validate_test;
