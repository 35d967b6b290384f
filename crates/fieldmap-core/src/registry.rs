//! Ordered, first-match registry of value converters.
//!
//! The registry is an explicit value owned by the caller. Registration takes
//! `&mut self` and conversion only borrows `&self`, so all converters must be
//! registered before conversions start, or the registry must be guarded by a
//! lock (e.g. `Arc<RwLock<ConverterRegistry>>`) when it is shared.
//!
//! No two entries ever claim the same type: registering a converter for a
//! type that is already covered is rejected and leaves the registry as it was.

use std::sync::Arc;

use crate::converter::{AnyConverter, Probe, ValueConverter};
use crate::converters::{DateTimeConverter, DurationConverter, UuidConverter};
use crate::types::TypeKey;
use crate::values::Value;

/// Selector for [`ConverterRegistry::unregister`].
#[derive(Clone, Copy)]
pub enum Lookup<'a> {
    /// A converter instance; removed by identity, else by its target type
    Instance(&'a dyn AnyConverter),
    /// A type token
    Type(TypeKey),
    /// A live value, matched by runtime type
    Value(&'a Value),
}

impl<'a> From<&'a Arc<dyn AnyConverter>> for Lookup<'a> {
    fn from(converter: &'a Arc<dyn AnyConverter>) -> Self {
        Self::Instance(converter.as_ref())
    }
}

impl From<TypeKey> for Lookup<'_> {
    fn from(key: TypeKey) -> Self {
        Self::Type(key)
    }
}

impl<'a> From<&'a Value> for Lookup<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Value(value)
    }
}

/// Ordered collection of converters; lookups return the first match.
#[derive(Debug, Default, Clone)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn AnyConverter>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the builtin converters
    /// (`Uuid`, `DateTime<Utc>`, `Duration`, in that order).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(UuidConverter);
        registry.register(DateTimeConverter);
        registry.register(DurationConverter);
        registry
    }

    /// Register a converter instance.
    ///
    /// Returns `false`, without changing the registry, if a registered
    /// converter already handles the same target type.
    pub fn register<C: ValueConverter>(&mut self, converter: C) -> bool {
        self.register_shared(Arc::new(converter))
    }

    /// Instantiate and register a converter type.
    pub fn register_default<C: ValueConverter + Default>(&mut self) -> bool {
        self.register(C::default())
    }

    /// Register an already shared converter.
    pub fn register_shared(&mut self, converter: Arc<dyn AnyConverter>) -> bool {
        let target = converter.target();
        if let Some(existing) = self.get(Probe::Type(target)) {
            tracing::warn!(
                "Rejected converter {} for {}: already handled by {}",
                converter.name(),
                target,
                existing.name()
            );
            return false;
        }

        tracing::debug!("Registered converter {} for {}", converter.name(), target);
        self.converters.push(converter);
        true
    }

    /// Remove a converter.
    ///
    /// An [`Lookup::Instance`] is first removed by identity; if that exact
    /// instance is not registered, the first converter handling the same
    /// type is removed instead. Types and values remove the first converter
    /// whose capability matches. Returns whether anything was removed.
    pub fn unregister<'a>(&mut self, lookup: impl Into<Lookup<'a>>) -> bool {
        let lookup = lookup.into();

        let position = match lookup {
            Lookup::Instance(instance) => self
                .position_of_instance(instance)
                .or_else(|| self.position(Probe::Type(instance.target()))),
            Lookup::Type(key) => self.position(Probe::Type(key)),
            Lookup::Value(value) => self.position(Probe::Value(value)),
        };

        match position {
            Some(idx) => {
                let removed = self.converters.remove(idx);
                tracing::debug!(
                    "Unregistered converter {} for {}",
                    removed.name(),
                    removed.target()
                );
                true
            }
            None => false,
        }
    }

    /// Remove the converter handling `T`, if any.
    pub fn unregister_type<T: 'static>(&mut self) -> bool {
        self.unregister(TypeKey::of::<T>())
    }

    /// First converter whose capability test passes for the probe.
    pub fn get<'a>(&self, probe: impl Into<Probe<'a>>) -> Option<&Arc<dyn AnyConverter>> {
        let probe = probe.into();
        self.converters.iter().find(|c| c.can_handle(probe))
    }

    /// Converter handling `T`, if any.
    pub fn get_for<T: 'static>(&self) -> Option<&Arc<dyn AnyConverter>> {
        self.get(TypeKey::of::<T>())
    }

    /// True iff [`ConverterRegistry::get`] would return a converter.
    pub fn contains<'a>(&self, probe: impl Into<Probe<'a>>) -> bool {
        self.get(probe).is_some()
    }

    /// Remove every converter.
    pub fn clear(&mut self) {
        tracing::debug!("Cleared {} converters", self.converters.len());
        self.converters.clear();
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check whether no converter is registered.
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Registered converters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AnyConverter>> {
        self.converters.iter()
    }

    fn position(&self, probe: Probe<'_>) -> Option<usize> {
        self.converters.iter().position(|c| c.can_handle(probe))
    }

    fn position_of_instance(&self, instance: &dyn AnyConverter) -> Option<usize> {
        let wanted = instance as *const dyn AnyConverter as *const ();
        self.converters
            .iter()
            .position(|c| Arc::as_ptr(c) as *const () == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConverterError;
    use uuid::Uuid;

    /// Second converter for `Uuid`, rendering the simple (unhyphenated) form.
    #[derive(Default)]
    struct SimpleUuidConverter;

    impl ValueConverter for SimpleUuidConverter {
        type Target = Uuid;

        fn serialize(&self, value: &Uuid) -> Result<String, ConverterError> {
            Ok(value.simple().to_string())
        }

        fn deserialize(&self, text: &str) -> Result<Uuid, ConverterError> {
            Uuid::parse_str(text).map_err(|e| ConverterError::malformed::<Uuid>(text, e))
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = ConverterRegistry::new();
        assert!(registry.register(UuidConverter));
        assert!(!registry.register(SimpleUuidConverter));
        assert_eq!(registry.len(), 1);

        let value = Value::object(Uuid::nil());
        let found = registry.get(&value).unwrap();
        assert!(found.as_any().is::<UuidConverter>());
    }

    #[test]
    fn test_register_default_instantiates_type() {
        let mut registry = ConverterRegistry::new();
        assert!(registry.register_default::<SimpleUuidConverter>());
        assert!(registry.get_for::<Uuid>().unwrap().as_any().is::<SimpleUuidConverter>());
    }

    #[test]
    fn test_lookup_by_type_and_value() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.contains(TypeKey::of::<Uuid>()));
        assert!(registry.contains(&Value::object(Uuid::nil())));
        assert!(!registry.contains(TypeKey::of::<String>()));
        assert!(!registry.contains(&Value::from("text")));
        assert!(!registry.contains(&Value::Null));
    }

    #[test]
    fn test_unregister_by_value_removes_capability() {
        let mut registry = ConverterRegistry::with_defaults();
        let value = Value::object(Uuid::new_v4());
        assert!(registry.unregister(&value));
        assert!(!registry.contains(&value));
        assert!(!registry.unregister(&value));
    }

    #[test]
    fn test_unregister_instance_by_identity() {
        let mut registry = ConverterRegistry::new();
        let shared: Arc<dyn AnyConverter> = Arc::new(UuidConverter);
        assert!(registry.register_shared(shared.clone()));
        assert!(registry.unregister(&shared));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_foreign_instance_falls_back_to_capability() {
        let mut registry = ConverterRegistry::new();
        registry.register(UuidConverter);

        let other: Arc<dyn AnyConverter> = Arc::new(SimpleUuidConverter);
        assert!(registry.unregister(&other));
        assert!(!registry.contains(TypeKey::of::<Uuid>()));
    }

    #[test]
    fn test_unregister_type_and_clear() {
        let mut registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert!(registry.unregister_type::<std::time::Duration>());
        assert!(!registry.unregister_type::<std::time::Duration>());
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get_for::<Uuid>().is_none());
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = ConverterRegistry::with_defaults();
        let targets: Vec<_> = registry.iter().map(|c| c.target()).collect();
        assert_eq!(
            targets,
            vec![
                TypeKey::of::<Uuid>(),
                TypeKey::of::<chrono::DateTime<chrono::Utc>>(),
                TypeKey::of::<std::time::Duration>(),
            ]
        );
    }
}
