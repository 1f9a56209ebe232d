use std::fmt;
use std::sync::Arc;

use crate::middleware::{AfterMiddleware, BeforeMiddleware};
use crate::registry::{DependencyRegistry, ErrorRegistry};

/// Label used in tracing spans when none is configured.
pub const DEFAULT_LABEL: &str = "executable";

/// Everything an executable binds besides its operation body.
///
/// Every field defaults to empty: no declared errors, no dependencies, no
/// middlewares.
pub struct ExecutableConfig<I, O, E> {
    /// Name recorded on every invocation span.
    pub label: String,
    /// Declared errors the operation may raise.
    pub errors: ErrorRegistry<E>,
    /// Dependencies the operation may look up.
    pub dependencies: DependencyRegistry,
    /// Input-shaping steps, run in order before the operation.
    pub before_middlewares: Vec<Arc<dyn BeforeMiddleware<I, E>>>,
    /// Output-shaping steps, run in order after a successful operation.
    pub after_middlewares: Vec<Arc<dyn AfterMiddleware<O, E>>>,
}

impl<I, O, E: 'static> Default for ExecutableConfig<I, O, E> {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            errors: ErrorRegistry::empty(),
            dependencies: DependencyRegistry::empty(),
            before_middlewares: Vec::new(),
            after_middlewares: Vec::new(),
        }
    }
}

impl<I, O, E> fmt::Debug for ExecutableConfig<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableConfig")
            .field("label", &self.label)
            .field("errors", &self.errors)
            .field("dependencies", &self.dependencies)
            .field("before_middlewares", &self.before_middlewares.len())
            .field("after_middlewares", &self.after_middlewares.len())
            .finish()
    }
}
