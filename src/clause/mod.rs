//! Built-in clause types
//!
//! Each module exposes `process`, `summarize`, `documentation` and a `register`
//! function that adds the clause to a [`ClauseRegistry`].

pub mod date;
pub mod label;
pub mod metadata;
pub mod owner;
pub mod path;
pub mod permissions;
pub mod size;
pub mod tag;
pub mod utils;

use crate::dsl::ClauseRegistry;

pub use permissions::Permission;
pub use utils::decode_args;

/// Register every built-in clause type
pub fn register_all(registry: &mut ClauseRegistry) {
    label::register(registry);
    path::register(registry);
    owner::register(registry);
    permissions::register(registry);
    metadata::register(registry);
    tag::register(registry);
    size::register(registry);
    date::register(registry);
}
