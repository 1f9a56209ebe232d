//! `tower::Service` adapter so an executable can sit behind tower layers.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;

use crate::executable::{Executable, ExecutionOutcome};

/// The service is always ready and never errors: failures travel inside
/// the `Outcome`, so the service error type is `Infallible`.
impl<I, O, E> Service<I> for Executable<I, O, E>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    type Response = ExecutionOutcome<O, E>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, input: I) -> Self::Future {
        let executable = self.clone();
        Box::pin(async move { Ok(executable.invoke(input).await) })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
