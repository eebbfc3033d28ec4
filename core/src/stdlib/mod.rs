//! Standard library functions seeded into every default registry.

use crate::registry::Registry;

pub mod math;

pub use math::register_math;

/// Register all standard library functions in `registry`.
pub fn register_stdlib(registry: &Registry) {
    register_math(registry);
}
