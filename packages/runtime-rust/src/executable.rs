//! The composite unit: an operation bound to its registries and middlewares.
//!
//! Every invocation walks the same stages:
//!
//! 1. **Before middlewares**: shape the input
//! 2. **Operation**: run the body
//! 3. **After middlewares**: shape the result
//!
//! The first failure, whether raised, propagated, or a panic, skips the
//! remaining stages. The stage results are folded into an [`Outcome`] in one
//! place, at the end of [`Executable::invoke`].

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use railguard_core::{Defect, Failure, Outcome};
use tracing::Instrument;

use crate::config::ExecutableConfig;
use crate::context::ExecutionContext;
use crate::middleware::{AfterMiddleware, BeforeMiddleware, Pipeline};
use crate::operation::Operation;
use crate::registry::{DependencyRegistry, ErrorRegistry};

/// Result of one invocation.
pub type ExecutionOutcome<O, E> = Outcome<O, Failure<E>>;

/// Boxed invocation future, as returned by [`Executable::callable`].
pub type OutcomeFuture<O, E> = Pin<Box<dyn Future<Output = ExecutionOutcome<O, E>> + Send>>;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage an invocation is in. Used to locate panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BeforeMiddlewares,
    Operation,
    AfterMiddlewares,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeMiddlewares => "before-middleware",
            Self::Operation => "operation",
            Self::AfterMiddlewares => "after-middleware",
        })
    }
}

// ---------------------------------------------------------------------------
// Executable
// ---------------------------------------------------------------------------

struct Inner<I, O, E> {
    label: String,
    operation: Arc<dyn Operation<I, O, E>>,
    errors: Arc<ErrorRegistry<E>>,
    dependencies: Arc<DependencyRegistry>,
    pipeline: Pipeline<I, O, E>,
}

/// An operation bound to one error registry, one dependency registry, and
/// two middleware chains.
///
/// Immutable after construction. Cloning yields another handle to the same
/// executable; concurrent invocations share only the read-only registries
/// and whatever the registered dependency values share themselves.
///
/// ```ignore
/// let find_user = Executable::builder(|ctx: ExecutionContext<UserError>, id: String| async move {
///     if id == "bad-id" {
///         return Err(ctx.raise::<UserNotFound>(id));
///     }
///     Ok(User { id, name: "alice".into() })
/// })
/// .errors(errors)
/// .build();
///
/// match find_user.invoke("7".to_string()).await {
///     Outcome::Success(user) => { /* ... */ }
///     Outcome::Failure(failure) => { /* ... */ }
/// }
/// ```
pub struct Executable<I, O, E> {
    inner: Arc<Inner<I, O, E>>,
}

impl<I, O, E> Executable<I, O, E>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    /// Bind `operation` to the registries and middlewares in `config`.
    pub fn new(
        operation: impl Operation<I, O, E> + 'static,
        config: ExecutableConfig<I, O, E>,
    ) -> Self {
        let ExecutableConfig {
            label,
            errors,
            dependencies,
            before_middlewares,
            after_middlewares,
        } = config;
        Self {
            inner: Arc::new(Inner {
                label,
                operation: Arc::new(operation),
                errors: Arc::new(errors),
                dependencies: Arc::new(dependencies),
                pipeline: Pipeline::new(before_middlewares, after_middlewares),
            }),
        }
    }

    /// Start a fluent builder with an empty configuration.
    pub fn builder(operation: impl Operation<I, O, E> + 'static) -> ExecutableBuilder<I, O, E> {
        ExecutableBuilder {
            operation: Arc::new(operation),
            config: ExecutableConfig::default(),
        }
    }

    /// Name recorded on every invocation span.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The declared errors this executable may raise.
    #[must_use]
    pub fn errors(&self) -> &ErrorRegistry<E> {
        &self.inner.errors
    }

    /// The dependencies this executable may look up.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyRegistry {
        &self.inner.dependencies
    }

    /// Run one invocation to completion.
    ///
    /// Never panics and never returns an error: every path ends in an
    /// [`Outcome`].
    pub async fn invoke(&self, input: I) -> ExecutionOutcome<O, E> {
        let ctx = ExecutionContext::new(
            Arc::clone(&self.inner.errors),
            Arc::clone(&self.inner.dependencies),
        );
        let span = tracing::info_span!(
            "invoke",
            executable = %self.inner.label,
            invocation_id = %ctx.invocation_id(),
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let outcome = Outcome::from(self.drive(&ctx, input).await);

            #[allow(clippy::cast_possible_truncation)]
            let duration_ms = start.elapsed().as_millis() as u64;
            let span = tracing::Span::current();
            span.record("duration_ms", duration_ms);
            span.record("outcome", outcome.kind().as_str());

            match &outcome {
                Outcome::Success(_) => {
                    tracing::debug!(duration_ms, "invocation succeeded");
                }
                Outcome::Failure(Failure::Declared(raised)) => {
                    tracing::debug!(duration_ms, error = raised.name(), "invocation failed");
                }
                Outcome::Failure(Failure::Defect(defect)) => {
                    tracing::warn!(
                        duration_ms,
                        kind = ?defect.kind(),
                        "invocation defect: {defect}"
                    );
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// A plain function bound to this executable, for call sites that want a
    /// callable rather than a handle. Produces the same outcomes as
    /// [`invoke`](Self::invoke).
    pub fn callable(
        &self,
    ) -> impl Fn(I) -> OutcomeFuture<O, E> + Clone + Send + Sync + 'static {
        let executable = self.clone();
        move |input: I| {
            let executable = executable.clone();
            let fut: OutcomeFuture<O, E> =
                Box::pin(async move { executable.invoke(input).await });
            fut
        }
    }

    async fn drive(&self, ctx: &ExecutionContext<E>, input: I) -> Result<O, Failure<E>> {
        let inner = &self.inner;
        let input =
            guarded(Stage::BeforeMiddlewares, inner.pipeline.run_before(ctx, input)).await?;
        // The call itself goes inside the guarded future: a hand-written
        // `run` may panic before it returns its future.
        let output = guarded(Stage::Operation, async {
            inner.operation.run(ctx.clone(), input).await
        })
        .await?;
        guarded(Stage::AfterMiddlewares, inner.pipeline.run_after(ctx, output)).await
    }
}

impl<I, O, E> Clone for Executable<I, O, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, O, E> fmt::Debug for Executable<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("label", &self.inner.label)
            .field("errors", &self.inner.errors)
            .field("dependencies", &self.inner.dependencies)
            .field("pipeline", &self.inner.pipeline)
            .finish_non_exhaustive()
    }
}

/// Run one stage, turning a panic inside it into a defect.
async fn guarded<T, E>(
    stage: Stage,
    step: impl Future<Output = Result<T, Failure<E>>>,
) -> Result<T, Failure<E>> {
    tracing::trace!(%stage, "stage started");
    match AssertUnwindSafe(step).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Failure::Defect(Defect::panicked(
            stage,
            &panic_message(payload.as_ref()),
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// ExecutableBuilder
// ---------------------------------------------------------------------------

/// Fluent construction of an [`Executable`]. Anything not set stays empty.
pub struct ExecutableBuilder<I, O, E> {
    operation: Arc<dyn Operation<I, O, E>>,
    config: ExecutableConfig<I, O, E>,
}

impl<I, O, E> ExecutableBuilder<I, O, E>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    /// Name recorded on invocation spans. Defaults to `executable`.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Replace the declared error registry.
    #[must_use]
    pub fn errors(mut self, errors: ErrorRegistry<E>) -> Self {
        self.config.errors = errors;
        self
    }

    /// Replace the dependency registry.
    #[must_use]
    pub fn dependencies(mut self, dependencies: DependencyRegistry) -> Self {
        self.config.dependencies = dependencies;
        self
    }

    /// Append a before-middleware. Steps run in the order they are added.
    #[must_use]
    pub fn before(mut self, middleware: impl BeforeMiddleware<I, E> + 'static) -> Self {
        self.config.before_middlewares.push(Arc::new(middleware));
        self
    }

    /// Append an after-middleware. Steps run in the order they are added.
    #[must_use]
    pub fn after(mut self, middleware: impl AfterMiddleware<O, E> + 'static) -> Self {
        self.config.after_middlewares.push(Arc::new(middleware));
        self
    }

    /// Freeze the configuration into an [`Executable`].
    #[must_use]
    pub fn build(self) -> Executable<I, O, E> {
        let ExecutableConfig {
            label,
            errors,
            dependencies,
            before_middlewares,
            after_middlewares,
        } = self.config;
        Executable {
            inner: Arc::new(Inner {
                label,
                operation: self.operation,
                errors: Arc::new(errors),
                dependencies: Arc::new(dependencies),
                pipeline: Pipeline::new(before_middlewares, after_middlewares),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
