//! Engine-detected misuse, kept apart from declared business errors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// What kind of mistake a [`Defect`] reports. Callers branch on this tag,
/// never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// `raise` was called with a name the error registry does not know.
    UnregisteredError,
    /// `get` was called with a name that is missing or bound to no value.
    UnregisteredDependency,
    /// `raise_named` was given parameters the registered recipe cannot accept.
    ErrorParamsMismatch,
    /// A dependency exists under the name but holds a different type.
    DependencyTypeMismatch,
    /// A step propagated an error that did not come from `raise`.
    Unexpected,
    /// A step panicked.
    Panicked,
}

/// A programming or wiring mistake surfaced as a failure value.
///
/// A defect means "fix the configuration or the code", not "retry".
#[derive(Debug, Clone)]
pub struct Defect {
    kind: DefectKind,
    message: String,
    cause: Option<Arc<anyhow::Error>>,
}

impl Defect {
    /// A defect with no underlying cause.
    #[must_use]
    pub fn new(kind: DefectKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying error that led to this defect.
    #[must_use]
    pub fn with_cause(mut self, cause: anyhow::Error) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// `raise` named an error the registry does not hold.
    #[must_use]
    pub fn unregistered_error(name: &str) -> Self {
        Self::new(
            DefectKind::UnregisteredError,
            format!("Error \"{name}\" is not registered."),
        )
    }

    /// `get` named a dependency that is missing or has no value.
    #[must_use]
    pub fn unregistered_dependency(name: &str) -> Self {
        Self::new(
            DefectKind::UnregisteredDependency,
            format!("Dependency \"{name}\" is not registered."),
        )
    }

    /// `raise_named` params are not the type registered for `name`.
    #[must_use]
    pub fn error_params_mismatch(name: &str, expected: &str) -> Self {
        Self::new(
            DefectKind::ErrorParamsMismatch,
            format!("Error \"{name}\" was raised with parameters other than `{expected}`."),
        )
    }

    /// The value under `name` is not an `expected`.
    #[must_use]
    pub fn dependency_type_mismatch(name: &str, expected: &str) -> Self {
        Self::new(
            DefectKind::DependencyTypeMismatch,
            format!("Dependency \"{name}\" is not of type `{expected}`."),
        )
    }

    /// Wrap an error that escaped a step without going through `raise`.
    #[must_use]
    pub fn unexpected(cause: anyhow::Error) -> Self {
        Self::new(DefectKind::Unexpected, format!("Unexpected error: {cause:#}")).with_cause(cause)
    }

    /// A step panicked; `stage` names where in the pipeline it happened.
    #[must_use]
    pub fn panicked(stage: impl fmt::Display, detail: &str) -> Self {
        Self::new(
            DefectKind::Panicked,
            format!("Panicked during {stage}: {detail}"),
        )
    }

    /// Tag to branch on.
    #[must_use]
    pub fn kind(&self) -> DefectKind {
        self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped error, for `Unexpected` defects.
    #[must_use]
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_deref()
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Defect {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| &**cause as &(dyn std::error::Error + 'static))
    }
}

/// Two defects are equal when kind and message match; causes are not compared.
impl PartialEq for Defect {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl Eq for Defect {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
