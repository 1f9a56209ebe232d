//! The operation body an executable wraps.

use std::future::Future;

use async_trait::async_trait;
use railguard_core::Failure;

use crate::context::ExecutionContext;

/// An asynchronous, fallible unit of work.
///
/// Declared failures are produced with `ctx.raise(..)` and returned as
/// `Err`. Any closure `Fn(ExecutionContext<E>, I) -> impl Future<Output =
/// Result<O, Failure<E>>>` is an operation.
#[async_trait]
pub trait Operation<I, O, E>: Send + Sync {
    async fn run(&self, ctx: ExecutionContext<E>, input: I) -> Result<O, Failure<E>>;
}

#[async_trait]
impl<I, O, E, F, Fut> Operation<I, O, E> for F
where
    F: Fn(ExecutionContext<E>, I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, Failure<E>>> + Send + 'static,
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    async fn run(&self, ctx: ExecutionContext<E>, input: I) -> Result<O, Failure<E>> {
        (self)(ctx, input).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
