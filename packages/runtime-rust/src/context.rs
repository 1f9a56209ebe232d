//! Per-invocation capability object handed to operations and middlewares.

use std::fmt;
use std::sync::Arc;

use railguard_core::{DependencyKey, ErrorKind, Failure};
use uuid::Uuid;

use crate::registry::{DependencyRegistry, ErrorRegistry};

/// Gives a running step access to the executable's declared errors and
/// dependencies, and nothing else.
///
/// A fresh context is built for every invocation. Cloning is cheap (two
/// `Arc`s and an id) and clones share no mutable state.
pub struct ExecutionContext<E> {
    invocation_id: Uuid,
    errors: Arc<ErrorRegistry<E>>,
    dependencies: Arc<DependencyRegistry>,
}

impl<E: 'static> ExecutionContext<E> {
    pub(crate) fn new(
        errors: Arc<ErrorRegistry<E>>,
        dependencies: Arc<DependencyRegistry>,
    ) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            errors,
            dependencies,
        }
    }

    /// Unique id of the invocation this context belongs to.
    #[must_use]
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Build the declared error `K` from `params`.
    ///
    /// The returned failure is meant to be returned immediately:
    /// `return Err(ctx.raise::<UserNotFound>(id))`. If `K::NAME` is not in
    /// this executable's registry the failure is a defect instead.
    #[must_use]
    pub fn raise<K>(&self, params: K::Params) -> Failure<E>
    where
        K: ErrorKind<Error = E>,
    {
        self.raise_named(K::NAME, params)
    }

    /// Dynamic form of [`raise`](Self::raise): `params` is checked against
    /// the recipe registered under `name` at runtime.
    #[must_use]
    pub fn raise_named<P: Send + 'static>(&self, name: &str, params: P) -> Failure<E> {
        let failure = self.errors.construct(name, params);
        match &failure {
            Failure::Declared(_) => {
                tracing::debug!(
                    invocation_id = %self.invocation_id,
                    error = name,
                    "declared error raised"
                );
            }
            Failure::Defect(defect) => {
                tracing::debug!(
                    invocation_id = %self.invocation_id,
                    kind = ?defect.kind(),
                    "{defect}"
                );
            }
        }
        failure
    }

    /// Fetch the dependency registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns a defect failure if the name is not registered, is bound to
    /// no value, or holds something other than a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Failure<E>> {
        self.dependencies.get::<T>(name).map_err(|defect| {
            tracing::debug!(
                invocation_id = %self.invocation_id,
                kind = ?defect.kind(),
                "{defect}"
            );
            Failure::Defect(defect)
        })
    }

    /// Typed form of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn resolve<K: DependencyKey>(&self) -> Result<Arc<K::Value>, Failure<E>> {
        self.get::<K::Value>(K::NAME)
    }
}

impl<E> Clone for ExecutionContext<E> {
    fn clone(&self) -> Self {
        Self {
            invocation_id: self.invocation_id,
            errors: Arc::clone(&self.errors),
            dependencies: Arc::clone(&self.dependencies),
        }
    }
}

impl<E> fmt::Debug for ExecutionContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("invocation_id", &self.invocation_id)
            .field("errors", &self.errors)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use railguard_core::DefectKind;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum OrderError {
        OutOfStock { sku: String },
    }

    struct OutOfStock;

    impl ErrorKind for OutOfStock {
        const NAME: &'static str = "OutOfStockError";
        type Error = OrderError;
        type Params = String;

        fn build(sku: String) -> OrderError {
            OrderError::OutOfStock { sku }
        }
    }

    struct Warehouse;

    impl DependencyKey for Warehouse {
        const NAME: &'static str = "Warehouse";
        type Value = Vec<String>;
    }

    fn make_ctx() -> ExecutionContext<OrderError> {
        let errors = ErrorRegistry::builder()
            .register::<OutOfStock>()
            .unwrap()
            .build();
        let dependencies = DependencyRegistry::builder()
            .provide_key::<Warehouse>(vec!["sku-1".to_string()])
            .unwrap()
            .build();
        ExecutionContext::new(Arc::new(errors), Arc::new(dependencies))
    }

    #[test]
    fn raise_builds_declared_error() {
        let ctx = make_ctx();
        let failure = ctx.raise::<OutOfStock>("sku-9".to_string());
        assert_eq!(failure.name(), Some("OutOfStockError"));
        assert_eq!(
            failure.declared(),
            Some(&OrderError::OutOfStock {
                sku: "sku-9".to_string()
            })
        );
    }

    #[test]
    fn raise_named_with_unknown_name_is_defect() {
        let ctx = make_ctx();
        let failure = ctx.raise_named("TypoError", 1_i32);
        assert_eq!(
            failure.defect().map(railguard_core::Defect::kind),
            Some(DefectKind::UnregisteredError)
        );
    }

    #[test]
    fn resolve_and_get_agree() {
        let ctx = make_ctx();
        let typed = ctx.resolve::<Warehouse>().unwrap();
        let named = ctx.get::<Vec<String>>("Warehouse").unwrap();
        assert!(Arc::ptr_eq(&typed, &named));
    }

    #[test]
    fn get_unknown_dependency_is_defect() {
        let ctx = make_ctx();
        let failure = ctx.get::<String>("Logger").unwrap_err();
        assert_eq!(
            failure.defect().map(railguard_core::Defect::message),
            Some("Dependency \"Logger\" is not registered.")
        );
    }

    #[test]
    fn clones_share_invocation_id() {
        let ctx = make_ctx();
        let other = make_ctx();
        assert_eq!(ctx.clone().invocation_id(), ctx.invocation_id());
        assert_ne!(ctx.invocation_id(), other.invocation_id());
    }
}
