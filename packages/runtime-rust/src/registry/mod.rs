//! Name-keyed registries bound to an executable at construction time.
//!
//! - [`errors`]: error name -> recipe that builds the declared error
//! - [`dependencies`]: dependency name -> shared value
//!
//! Both are built once, then shared read-only by every invocation.

pub mod dependencies;
pub mod errors;

pub use dependencies::{DependencyRegistry, DependencyRegistryBuilder};
pub use errors::{ErrorRegistry, ErrorRegistryBuilder};

/// Errors from assembling a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("error \"{0}\" is already registered")]
    DuplicateError(String),
    #[error("dependency \"{0}\" is already registered")]
    DuplicateDependency(String),
}
