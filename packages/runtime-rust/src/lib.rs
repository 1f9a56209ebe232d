//! Railguard Runtime: executables with declared errors, dependencies, and middleware.
//!
//! An [`Executable`] binds an operation body to an [`ErrorRegistry`], a
//! [`DependencyRegistry`], and before/after middleware chains. Invoking it
//! always yields an [`Outcome`]: success, a declared error, or a defect.

pub mod config;
pub mod context;
pub mod executable;
pub mod middleware;
pub mod operation;
pub mod registry;
pub mod service;

pub use config::ExecutableConfig;
pub use context::ExecutionContext;
pub use executable::{Executable, ExecutableBuilder, ExecutionOutcome, OutcomeFuture, Stage};
pub use middleware::{AfterMiddleware, BeforeMiddleware, Pipeline};
pub use operation::Operation;
pub use registry::{
    DependencyRegistry, DependencyRegistryBuilder, ErrorRegistry, ErrorRegistryBuilder,
    RegistryError,
};

pub use railguard_core::{
    Defect, DefectKind, DependencyKey, ErrorKind, Failure, Outcome, OutcomeKind, Raised,
};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
