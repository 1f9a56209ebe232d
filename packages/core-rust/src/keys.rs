//! Typed registry keys.
//!
//! Registries are keyed by strings at runtime. These traits attach a static
//! shape to a key so call sites get compile-time checking of error
//! parameters and dependency types.

/// A declared error kind: a registry name plus the recipe that builds it.
///
/// ```ignore
/// struct UserNotFound;
///
/// impl ErrorKind for UserNotFound {
///     const NAME: &'static str = "UserNotFoundError";
///     type Error = UserError;
///     type Params = String;
///
///     fn build(user_id: String) -> UserError {
///         UserError::NotFound { user_id }
///     }
/// }
/// ```
pub trait ErrorKind: 'static {
    /// Registry key, also used as the diagnostic name of raised values.
    const NAME: &'static str;

    /// The declared error type of the executables this kind belongs to.
    type Error: Send + 'static;

    /// Exact parameter shape `raise` must be given.
    type Params: Send + 'static;

    fn build(params: Self::Params) -> Self::Error;
}

/// A named dependency with a fixed value type.
pub trait DependencyKey: 'static {
    const NAME: &'static str;

    type Value: Send + Sync + 'static;
}
