//! Ordered before/after middleware chains around an operation.

use std::fmt;
use std::sync::Arc;

use railguard_core::Failure;

use super::step::{AfterMiddleware, BeforeMiddleware};
use crate::context::ExecutionContext;

/// Two independent, strictly sequential middleware chains.
///
/// Steps run in declaration order, each receiving the previous step's
/// output. The first `Err` stops the chain; later steps never run.
pub struct Pipeline<I, O, E> {
    before: Vec<Arc<dyn BeforeMiddleware<I, E>>>,
    after: Vec<Arc<dyn AfterMiddleware<O, E>>>,
}

impl<I, O, E> Pipeline<I, O, E>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    /// Chains run in the order given.
    #[must_use]
    pub fn new(
        before: Vec<Arc<dyn BeforeMiddleware<I, E>>>,
        after: Vec<Arc<dyn AfterMiddleware<O, E>>>,
    ) -> Self {
        Self { before, after }
    }

    /// Number of before-middlewares.
    #[must_use]
    pub fn before_len(&self) -> usize {
        self.before.len()
    }

    /// Number of after-middlewares.
    #[must_use]
    pub fn after_len(&self) -> usize {
        self.after.len()
    }

    /// Thread `input` through every before-middleware in order.
    ///
    /// # Errors
    ///
    /// Returns the first failure produced by a step.
    pub async fn run_before(&self, ctx: &ExecutionContext<E>, input: I) -> Result<I, Failure<E>> {
        let mut input = input;
        for (step, middleware) in self.before.iter().enumerate() {
            tracing::trace!(step, "before middleware");
            input = middleware.before(ctx.clone(), input).await?;
        }
        Ok(input)
    }

    /// Thread `output` through every after-middleware in order.
    ///
    /// # Errors
    ///
    /// Returns the first failure produced by a step.
    pub async fn run_after(&self, ctx: &ExecutionContext<E>, output: O) -> Result<O, Failure<E>> {
        let mut output = output;
        for (step, middleware) in self.after.iter().enumerate() {
            tracing::trace!(step, "after middleware");
            output = middleware.after(ctx.clone(), output).await?;
        }
        Ok(output)
    }
}

impl<I, O, E> Default for Pipeline<I, O, E> {
    fn default() -> Self {
        Self {
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

impl<I, O, E> fmt::Debug for Pipeline<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use railguard_core::ErrorKind;

    use super::*;
    use crate::registry::{DependencyRegistry, ErrorRegistry};

    #[derive(Debug, PartialEq, Eq)]
    struct Rejected(String);

    struct RejectedInput;

    impl ErrorKind for RejectedInput {
        const NAME: &'static str = "RejectedInputError";
        type Error = Rejected;
        type Params = String;

        fn build(reason: String) -> Rejected {
            Rejected(reason)
        }
    }

    /// Appends a tag to the value and records that it ran.
    struct Tag {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl BeforeMiddleware<String, Rejected> for Tag {
        async fn before(
            &self,
            _ctx: ExecutionContext<Rejected>,
            input: String,
        ) -> Result<String, Failure<Rejected>> {
            self.log.lock().push(format!("before:{}", self.tag));
            Ok(format!("{input}{}", self.tag))
        }
    }

    #[async_trait]
    impl AfterMiddleware<String, Rejected> for Tag {
        async fn after(
            &self,
            _ctx: ExecutionContext<Rejected>,
            output: String,
        ) -> Result<String, Failure<Rejected>> {
            self.log.lock().push(format!("after:{}", self.tag));
            Ok(format!("{output}{}", self.tag))
        }
    }

    fn make_ctx() -> ExecutionContext<Rejected> {
        let errors = ErrorRegistry::builder()
            .register::<RejectedInput>()
            .unwrap()
            .build();
        ExecutionContext::new(Arc::new(errors), Arc::new(DependencyRegistry::empty()))
    }

    fn tag(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Tag> {
        Arc::new(Tag {
            tag,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn before_steps_run_in_declared_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let before: Vec<Arc<dyn BeforeMiddleware<String, Rejected>>> =
            vec![tag("a", &log), tag("b", &log), tag("c", &log)];
        let pipeline: Pipeline<String, String, Rejected> = Pipeline::new(before, Vec::new());
        assert_eq!((pipeline.before_len(), pipeline.after_len()), (3, 0));

        let input = pipeline.run_before(&make_ctx(), String::new()).await.unwrap();
        assert_eq!(input, "abc");
        assert_eq!(*log.lock(), vec!["before:a", "before:b", "before:c"]);
    }

    #[tokio::test]
    async fn after_steps_run_in_declared_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let after: Vec<Arc<dyn AfterMiddleware<String, Rejected>>> =
            vec![tag("x", &log), tag("y", &log)];
        let pipeline: Pipeline<String, String, Rejected> = Pipeline::new(Vec::new(), after);
        assert_eq!((pipeline.before_len(), pipeline.after_len()), (0, 2));

        let output = pipeline.run_after(&make_ctx(), "r:".to_string()).await.unwrap();
        assert_eq!(output, "r:xy");
        assert_eq!(*log.lock(), vec!["after:x", "after:y"]);
    }

    #[tokio::test]
    async fn failing_step_stops_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reject = |ctx: ExecutionContext<Rejected>, input: String| async move {
            Err::<String, _>(ctx.raise::<RejectedInput>(format!("no: {input}")))
        };
        let before: Vec<Arc<dyn BeforeMiddleware<String, Rejected>>> =
            vec![tag("a", &log), Arc::new(reject), tag("c", &log)];
        let pipeline: Pipeline<String, String, Rejected> = Pipeline::new(before, Vec::new());

        let failure = pipeline
            .run_before(&make_ctx(), String::new())
            .await
            .unwrap_err();
        assert_eq!(failure.declared(), Some(&Rejected("no: a".to_string())));
        assert_eq!(*log.lock(), vec!["before:a"]);
    }

    #[tokio::test]
    async fn empty_pipeline_is_identity() {
        let pipeline: Pipeline<String, String, Rejected> = Pipeline::default();
        let ctx = make_ctx();
        assert_eq!(
            pipeline.run_before(&ctx, "in".to_string()).await.unwrap(),
            "in"
        );
        assert_eq!(
            pipeline.run_after(&ctx, "out".to_string()).await.unwrap(),
            "out"
        );
    }
}
