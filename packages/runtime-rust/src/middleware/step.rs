//! Single middleware steps: input shaping before the operation, output
//! shaping after it.

use std::future::Future;

use async_trait::async_trait;
use railguard_core::Failure;

use crate::context::ExecutionContext;

/// Transforms the operation's input before it runs.
///
/// Returning `Err` (usually `Err(ctx.raise(..))`) aborts the invocation
/// before the operation starts. Closures of the shape
/// `Fn(ExecutionContext<E>, I) -> impl Future<Output = Result<I, Failure<E>>>`
/// implement this trait.
#[async_trait]
pub trait BeforeMiddleware<I, E>: Send + Sync {
    async fn before(&self, ctx: ExecutionContext<E>, input: I) -> Result<I, Failure<E>>;
}

/// Transforms the operation's successful result.
///
/// Returning `Err` turns what would have been a success into a failure.
#[async_trait]
pub trait AfterMiddleware<O, E>: Send + Sync {
    async fn after(&self, ctx: ExecutionContext<E>, output: O) -> Result<O, Failure<E>>;
}

#[async_trait]
impl<I, E, F, Fut> BeforeMiddleware<I, E> for F
where
    F: Fn(ExecutionContext<E>, I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<I, Failure<E>>> + Send + 'static,
    I: Send + 'static,
    E: Send + 'static,
{
    async fn before(&self, ctx: ExecutionContext<E>, input: I) -> Result<I, Failure<E>> {
        (self)(ctx, input).await
    }
}

#[async_trait]
impl<O, E, F, Fut> AfterMiddleware<O, E> for F
where
    F: Fn(ExecutionContext<E>, O) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, Failure<E>>> + Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    async fn after(&self, ctx: ExecutionContext<E>, output: O) -> Result<O, Failure<E>> {
        (self)(ctx, output).await
    }
}
