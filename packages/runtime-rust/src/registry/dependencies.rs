use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use railguard_core::{Defect, DependencyKey};

use super::RegistryError;

/// A registry entry. `Declared` marks a name that is known but bound to no value.
enum Slot {
    Bound {
        value: Arc<dyn Any + Send + Sync>,
        type_name: &'static str,
    },
    Declared,
}

// ---------------------------------------------------------------------------
// DependencyRegistry
// ---------------------------------------------------------------------------

/// Fixed mapping from dependency names to shared values.
///
/// Values are handed out as `Arc` clones of what was registered: no copying
/// and no lifecycle management. Any interior mutability belongs to the value
/// itself.
#[derive(Default)]
pub struct DependencyRegistry {
    slots: HashMap<String, Slot>,
}

impl DependencyRegistry {
    /// Start collecting values.
    #[must_use]
    pub fn builder() -> DependencyRegistryBuilder {
        DependencyRegistryBuilder {
            slots: HashMap::new(),
        }
    }

    /// A registry where every lookup is a defect.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `name` resolves to a value. Declared-but-empty names do not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::Bound { .. }))
    }

    /// All known names, bound or not, in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of known names, bound or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up the value registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns a defect if `name` is missing, declared without a value, or
    /// bound to a value that is not a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Defect> {
        match self.slots.get(name) {
            None | Some(Slot::Declared) => Err(Defect::unregistered_dependency(name)),
            Some(Slot::Bound { value, .. }) => Arc::clone(value)
                .downcast::<T>()
                .map_err(|_| Defect::dependency_type_mismatch(name, type_name::<T>())),
        }
    }

    /// Typed lookup through a [`DependencyKey`].
    ///
    /// # Errors
    ///
    /// Same as [`DependencyRegistry::get`].
    pub fn resolve<K: DependencyKey>(&self) -> Result<Arc<K::Value>, Defect> {
        self.get::<K::Value>(K::NAME)
    }
}

impl fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&str, &str)> = self
            .slots
            .iter()
            .map(|(name, slot)| match slot {
                Slot::Bound { type_name, .. } => (name.as_str(), *type_name),
                Slot::Declared => (name.as_str(), "<unbound>"),
            })
            .collect();
        entries.sort_unstable();
        f.debug_struct("DependencyRegistry")
            .field("dependencies", &entries)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DependencyRegistryBuilder
// ---------------------------------------------------------------------------

/// Collects values for a [`DependencyRegistry`]. Names must be unique.
pub struct DependencyRegistryBuilder {
    slots: HashMap<String, Slot>,
}

impl DependencyRegistryBuilder {
    /// Register an owned value. Trait objects are registered as the `Arc<dyn Trait>`
    /// itself and looked up with that same type.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateDependency` if the name is taken.
    pub fn provide<T: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        value: T,
    ) -> Result<Self, RegistryError> {
        self.provide_arc(name, Arc::new(value))
    }

    /// Register an already shared value without re-wrapping it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateDependency` if the name is taken.
    pub fn provide_arc<T: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        value: Arc<T>,
    ) -> Result<Self, RegistryError> {
        self.insert(
            name.into(),
            Slot::Bound {
                value,
                type_name: type_name::<T>(),
            },
        )
    }

    /// Register a value under a typed key.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateDependency` if `K::NAME` is taken.
    pub fn provide_key<K: DependencyKey>(self, value: K::Value) -> Result<Self, RegistryError> {
        self.provide(K::NAME, value)
    }

    /// Reserve a name without binding a value. Lookups of it are defects.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateDependency` if the name is taken.
    pub fn declare(self, name: impl Into<String>) -> Result<Self, RegistryError> {
        self.insert(name.into(), Slot::Declared)
    }

    fn insert(mut self, name: String, slot: Slot) -> Result<Self, RegistryError> {
        if self.slots.contains_key(&name) {
            return Err(RegistryError::DuplicateDependency(name));
        }
        self.slots.insert(name, slot);
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> DependencyRegistry {
        DependencyRegistry { slots: self.slots }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use railguard_core::DefectKind;

    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self, name: &str) -> String;
    }

    struct Polite;

    impl Greeter for Polite {
        fn greet(&self, name: &str) -> String {
            format!("Good day, {name}")
        }
    }

    struct Clock;

    impl DependencyKey for Clock {
        const NAME: &'static str = "Clock";
        type Value = u64;
    }

    #[test]
    fn get_returns_registered_value() {
        let reg = DependencyRegistry::builder()
            .provide("BaseUrl", "https://api.local".to_string())
            .unwrap()
            .build();
        let url = reg.get::<String>("BaseUrl").unwrap();
        assert_eq!(url.as_str(), "https://api.local");
    }

    #[test]
    fn get_shares_the_same_instance() {
        let counter = Arc::new(AtomicU32::new(0));
        let reg = DependencyRegistry::builder()
            .provide_arc("Counter", Arc::clone(&counter))
            .unwrap()
            .build();

        reg.get::<AtomicU32>("Counter")
            .unwrap()
            .fetch_add(1, Ordering::SeqCst);
        reg.get::<AtomicU32>("Counter")
            .unwrap()
            .fetch_add(1, Ordering::SeqCst);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn trait_objects_resolve_by_their_arc_type() {
        let greeter: Arc<dyn Greeter> = Arc::new(Polite);
        let reg = DependencyRegistry::builder()
            .provide("Greeter", greeter)
            .unwrap()
            .build();
        let greeter = reg.get::<Arc<dyn Greeter>>("Greeter").unwrap();
        assert_eq!(greeter.greet("Ada"), "Good day, Ada");
    }

    #[test]
    fn missing_name_is_defect() {
        let reg = DependencyRegistry::empty();
        let defect = reg.get::<String>("Logger").unwrap_err();
        assert_eq!(defect.kind(), DefectKind::UnregisteredDependency);
        assert_eq!(defect.message(), "Dependency \"Logger\" is not registered.");
    }

    #[test]
    fn declared_without_value_is_defect() {
        let reg = DependencyRegistry::builder().declare("Mailer").unwrap().build();
        assert!(!reg.contains("Mailer"));
        assert_eq!(reg.names(), vec!["Mailer"]);
        let defect = reg.get::<String>("Mailer").unwrap_err();
        assert_eq!(defect.message(), "Dependency \"Mailer\" is not registered.");
    }

    #[test]
    fn wrong_type_is_defect() {
        let reg = DependencyRegistry::builder()
            .provide("Port", 8080_u16)
            .unwrap()
            .build();
        let defect = reg.get::<String>("Port").unwrap_err();
        assert_eq!(defect.kind(), DefectKind::DependencyTypeMismatch);
    }

    #[test]
    fn typed_key_lookup() {
        let reg = DependencyRegistry::builder()
            .provide_key::<Clock>(1_700_000_000)
            .unwrap()
            .build();
        assert_eq!(*reg.resolve::<Clock>().unwrap(), 1_700_000_000);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let result = DependencyRegistry::builder()
            .provide("Port", 1_u16)
            .unwrap()
            .declare("Port");
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateDependency(name)) if name == "Port"
        ));
    }
}
