use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use railguard_core::{Defect, ErrorKind, Failure, Raised};

use super::RegistryError;

// ---------------------------------------------------------------------------
// Recipe (type-erased constructor)
// ---------------------------------------------------------------------------

/// Builds a declared error from boxed params, or hands the params back if
/// they are not the type the recipe was registered with.
type Recipe<E> = Arc<dyn Fn(Box<dyn Any + Send>) -> Result<E, Box<dyn Any + Send>> + Send + Sync>;

struct ErrorEntry<E> {
    recipe: Recipe<E>,
    params_type: &'static str,
}

// ---------------------------------------------------------------------------
// ErrorRegistry
// ---------------------------------------------------------------------------

/// Fixed mapping from error names to the recipes that construct them.
///
/// The set of values its recipes can produce is the declared failure surface
/// of an executable. Built once through [`ErrorRegistryBuilder`] and never
/// modified afterwards.
pub struct ErrorRegistry<E> {
    entries: HashMap<String, ErrorEntry<E>>,
}

impl<E: 'static> ErrorRegistry<E> {
    /// Start collecting recipes.
    #[must_use]
    pub fn builder() -> ErrorRegistryBuilder<E> {
        ErrorRegistryBuilder {
            entries: HashMap::new(),
        }
    }

    /// A registry with no declared errors. Every `raise` against it is a defect.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Whether a recipe is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of declared errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct the error registered under `name` from `params`.
    ///
    /// Always yields a failure: the declared error tagged with `name`, or a
    /// defect when the name is unknown or `params` has the wrong type.
    pub fn construct<P: Send + 'static>(&self, name: &str, params: P) -> Failure<E> {
        let Some(entry) = self.entries.get(name) else {
            return Defect::unregistered_error(name).into();
        };
        match (entry.recipe)(Box::new(params)) {
            Ok(error) => Failure::Declared(Raised::new(name, error)),
            Err(_) => Defect::error_params_mismatch(name, entry.params_type).into(),
        }
    }
}

impl<E: 'static> Default for ErrorRegistry<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E> fmt::Debug for ErrorRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.params_type))
            .collect();
        names.sort_unstable();
        f.debug_struct("ErrorRegistry").field("errors", &names).finish()
    }
}

// ---------------------------------------------------------------------------
// ErrorRegistryBuilder
// ---------------------------------------------------------------------------

/// Collects recipes for an [`ErrorRegistry`]. Names must be unique.
pub struct ErrorRegistryBuilder<E> {
    entries: HashMap<String, ErrorEntry<E>>,
}

impl<E: 'static> ErrorRegistryBuilder<E> {
    /// Register a typed error kind under `K::NAME`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateError` if the name is taken.
    pub fn register<K>(self) -> Result<Self, RegistryError>
    where
        K: ErrorKind<Error = E>,
    {
        self.register_fn(K::NAME, K::build)
    }

    /// Register an ad-hoc recipe taking params of type `P`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateError` if the name is taken.
    pub fn register_fn<P, F>(mut self, name: impl Into<String>, recipe: F) -> Result<Self, RegistryError>
    where
        P: Send + 'static,
        F: Fn(P) -> E + Send + Sync + 'static,
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateError(name));
        }
        let recipe: Recipe<E> = Arc::new(move |params: Box<dyn Any + Send>| {
            params.downcast::<P>().map(|params| recipe(*params))
        });
        self.entries.insert(
            name,
            ErrorEntry {
                recipe,
                params_type: type_name::<P>(),
            },
        );
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> ErrorRegistry<E> {
        ErrorRegistry {
            entries: self.entries,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
