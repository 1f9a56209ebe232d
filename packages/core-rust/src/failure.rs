//! Failure payload of an invocation: a declared error or a defect.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::defect::Defect;

/// A declared error value together with the registry name it was raised under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Raised<E> {
    name: String,
    error: E,
}

impl<E> Raised<E> {
    /// Tag `error` with the registry name it was built under.
    pub fn new(name: impl Into<String>, error: E) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    /// Diagnostic name, equal to the registry key the error was raised with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The constructed error value.
    #[must_use]
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Drop the name and keep the error value.
    #[must_use]
    pub fn into_error(self) -> E {
        self.error
    }
}

/// Why an invocation failed.
///
/// `E` is the executable's declared error type. Anything that is not one of
/// its declared errors arrives as a [`Defect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum Failure<E> {
    /// An error from the executable's registry, raised on purpose.
    Declared(Raised<E>),
    /// Misuse or an unexpected error caught at the invocation boundary.
    Defect(Defect),
}

impl<E> Failure<E> {
    /// `true` when the failure came from `raise`.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        matches!(self, Self::Declared(_))
    }

    /// `true` when the failure is a defect.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::Defect(_))
    }

    /// The declared error value, if this failure came from `raise`.
    #[must_use]
    pub fn declared(&self) -> Option<&E> {
        match self {
            Self::Declared(raised) => Some(raised.error()),
            Self::Defect(_) => None,
        }
    }

    /// The declared error together with its registry name.
    #[must_use]
    pub fn raised(&self) -> Option<&Raised<E>> {
        match self {
            Self::Declared(raised) => Some(raised),
            Self::Defect(_) => None,
        }
    }

    #[must_use]
    pub fn defect(&self) -> Option<&Defect> {
        match self {
            Self::Declared(_) => None,
            Self::Defect(defect) => Some(defect),
        }
    }

    /// Registry name of a declared failure.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.raised().map(Raised::name)
    }
}

impl<E> From<Defect> for Failure<E> {
    fn from(defect: Defect) -> Self {
        Self::Defect(defect)
    }
}

/// Any error propagated with `?` that did not come from `raise` is a defect.
impl<E> From<anyhow::Error> for Failure<E> {
    fn from(err: anyhow::Error) -> Self {
        Self::Defect(Defect::unexpected(err))
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared(raised) => write!(f, "{}: {}", raised.name(), raised.error()),
            Self::Defect(defect) => write!(f, "defect: {defect}"),
        }
    }
}

impl<E> std::error::Error for Failure<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Declared(raised) => Some(raised.error()),
            Self::Defect(defect) => Some(defect),
        }
    }
}

impl Serialize for Defect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Defect", 2)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
