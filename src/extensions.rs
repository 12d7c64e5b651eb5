//! Named extensions attached to a client.
//!
//! An extension is any value a caller wants to travel with the client, for
//! example a domain helper built on top of the raw resources. Each name can
//! be bound once. Names already used by the client itself are reserved.
//!
//! # Example
//!
//! ```rust
//! use odss_client::extensions::{Extension, ExtensionError, ExtensionRegistry};
//!
//! struct Geocoder {
//!     region: &'static str,
//! }
//!
//! let mut registry = ExtensionRegistry::new().with_reserved(&["incidents"]);
//! registry
//!     .register("geocoder", Extension::value(Geocoder { region: "west" }))
//!     .unwrap();
//!
//! assert_eq!(registry.get::<Geocoder>("geocoder").unwrap().region, "west");
//! assert!(matches!(
//!     registry.register("incidents", Extension::value(1_u8)),
//!     Err(ExtensionError::AlreadyExists { .. })
//! ));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A type-erased, shareable extension value.
pub type ExtensionValue = Arc<dyn Any + Send + Sync>;

/// Errors raised while registering extensions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// The name is already bound on the client.
    #[error("Extension '{name}' conflicts with an existing client property.")]
    AlreadyExists {
        /// The conflicting name.
        name: String,
    },

    /// The extension could not be bound.
    #[error("Invalid extension: {reason}")]
    InvalidExtension {
        /// Why the extension was rejected.
        reason: String,
    },
}

/// How an extension value is obtained.
pub enum Extension {
    /// A ready value, bound as is.
    Value(ExtensionValue),
    /// A constructor, called once with no arguments at registration.
    Factory(Box<dyn FnOnce() -> ExtensionValue + Send>),
    /// A key resolved through the registry's [`ExtensionResolver`].
    Lookup(String),
}

impl Extension {
    /// Wraps a ready value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// Wraps a constructor.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T + Send + 'static,
    {
        Self::Factory(Box::new(move || Arc::new(factory()) as ExtensionValue))
    }

    /// Refers to an extension by lookup key.
    pub fn lookup(key: impl Into<String>) -> Self {
        Self::Lookup(key.into())
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Extension::Value"),
            Self::Factory(_) => f.write_str("Extension::Factory"),
            Self::Lookup(key) => f.debug_tuple("Extension::Lookup").field(key).finish(),
        }
    }
}

/// Resolves [`Extension::Lookup`] keys to values.
pub trait ExtensionResolver: Send + Sync {
    /// Returns the value known under `key`, if any.
    fn resolve(&self, key: &str) -> Option<ExtensionValue>;
}

impl<F> ExtensionResolver for F
where
    F: Fn(&str) -> Option<ExtensionValue> + Send + Sync,
{
    fn resolve(&self, key: &str) -> Option<ExtensionValue> {
        self(key)
    }
}

/// A resolver backed by a fixed table of values.
#[derive(Clone, Default)]
pub struct ExtensionCatalog {
    entries: HashMap<String, ExtensionValue>,
}

impl ExtensionCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under `key`.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.entries.insert(key.into(), Arc::new(value));
        self
    }
}

impl ExtensionResolver for ExtensionCatalog {
    fn resolve(&self, key: &str) -> Option<ExtensionValue> {
        self.entries.get(key).cloned()
    }
}

impl fmt::Debug for ExtensionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// The extensions bound on a client.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: HashMap<String, ExtensionValue>,
    reserved: &'static [&'static str],
    resolver: Option<Arc<dyn ExtensionResolver>>,
}

// Verify ExtensionRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ExtensionRegistry>();
};

impl ExtensionRegistry {
    /// Creates an empty registry without reserved names or resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `names`; registering any of them fails.
    #[must_use]
    pub const fn with_reserved(mut self, names: &'static [&'static str]) -> Self {
        self.reserved = names;
        self
    }

    /// Sets the resolver used for [`Extension::Lookup`].
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ExtensionResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replaces the resolver used for [`Extension::Lookup`].
    pub fn set_resolver(&mut self, resolver: Arc<dyn ExtensionResolver>) {
        self.resolver = Some(resolver);
    }

    /// Binds `extension` under `name`.
    ///
    /// Nothing is bound, and no factory is called, if the name is taken.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::AlreadyExists`] if `name` is reserved or
    /// already bound, and [`ExtensionError::InvalidExtension`] if `name` is
    /// empty or a lookup key cannot be resolved.
    pub fn register(&mut self, name: &str, extension: Extension) -> Result<(), ExtensionError> {
        if name.is_empty() {
            return Err(ExtensionError::InvalidExtension {
                reason: "extension name cannot be empty".to_string(),
            });
        }
        if self.contains(name) {
            return Err(ExtensionError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let value = match extension {
            Extension::Value(value) => value,
            Extension::Factory(factory) => factory(),
            Extension::Lookup(key) => self.resolve(&key)?,
        };

        tracing::debug!("Registered extension '{}'", name);
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds the value the resolver knows under `name` to the same name.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn register_by_name(&mut self, name: &str) -> Result<(), ExtensionError> {
        self.register(name, Extension::lookup(name))
    }

    /// Returns the extension bound under `name`, if it has type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()?.downcast::<T>().ok()
    }

    /// Returns the extension bound under `name`, whatever its type.
    #[must_use]
    pub fn get_any(&self, name: &str) -> Option<&ExtensionValue> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is reserved or bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.reserved.contains(&name) || self.entries.contains_key(name)
    }

    /// Returns the names of the bound extensions.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of bound extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no extension is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(&self, key: &str) -> Result<ExtensionValue, ExtensionError> {
        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| ExtensionError::InvalidExtension {
                reason: format!("cannot resolve '{key}': no resolver configured"),
            })?;
        resolver
            .resolve(key)
            .ok_or_else(|| ExtensionError::InvalidExtension {
                reason: format!("no extension known as '{key}'"),
            })
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("reserved", &self.reserved)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_register_value() {
        let mut registry = ExtensionRegistry::new();
        registry.register("counter", Extension::value(Counter(3))).unwrap();

        assert!(registry.contains("counter"));
        assert_eq!(*registry.get::<Counter>("counter").unwrap(), Counter(3));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_with_wrong_type() {
        let mut registry = ExtensionRegistry::new();
        registry.register("counter", Extension::value(Counter(3))).unwrap();
        assert!(registry.get::<String>("counter").is_none());
        assert!(registry.get_any("counter").is_some());
    }

    #[test]
    fn test_factory_is_called_once() {
        let mut registry = ExtensionRegistry::new();
        registry
            .register("counter", Extension::factory(|| Counter(7)))
            .unwrap();
        assert_eq!(*registry.get::<Counter>("counter").unwrap(), Counter(7));
    }

    #[test]
    fn test_conflict_leaves_existing_entry() {
        let mut registry = ExtensionRegistry::new();
        registry.register("counter", Extension::value(Counter(1))).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let result = registry.register(
            "counter",
            Extension::factory(move || {
                seen.fetch_add(1, Ordering::SeqCst);
                Counter(2)
            }),
        );

        assert_eq!(
            result,
            Err(ExtensionError::AlreadyExists {
                name: "counter".to_string()
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*registry.get::<Counter>("counter").unwrap(), Counter(1));
    }

    #[test]
    fn test_reserved_names_conflict() {
        let mut registry = ExtensionRegistry::new().with_reserved(&["logs", "form"]);
        let result = registry.register("logs", Extension::value(1_u8));
        assert!(matches!(result, Err(ExtensionError::AlreadyExists { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let mut registry = ExtensionRegistry::new();
        let result = registry.register("", Extension::value(1_u8));
        assert!(matches!(result, Err(ExtensionError::InvalidExtension { .. })));
    }

    #[test]
    fn test_lookup_through_catalog() {
        let catalog = ExtensionCatalog::new().with("geo", Counter(9));
        let mut registry = ExtensionRegistry::new().with_resolver(Arc::new(catalog));

        registry.register("maps", Extension::lookup("geo")).unwrap();
        registry.register_by_name("geo").unwrap();

        assert_eq!(*registry.get::<Counter>("maps").unwrap(), Counter(9));
        assert_eq!(*registry.get::<Counter>("geo").unwrap(), Counter(9));
    }

    #[test]
    fn test_lookup_through_closure() {
        let resolver = |key: &str| -> Option<ExtensionValue> {
            (key == "answer").then(|| Arc::new(42_u32) as ExtensionValue)
        };
        let mut registry = ExtensionRegistry::new().with_resolver(Arc::new(resolver));

        registry.register_by_name("answer").unwrap();
        assert_eq!(*registry.get::<u32>("answer").unwrap(), 42);

        let result = registry.register_by_name("question");
        assert!(matches!(result, Err(ExtensionError::InvalidExtension { .. })));
    }

    #[test]
    fn test_lookup_without_resolver() {
        let mut registry = ExtensionRegistry::new();
        let result = registry.register_by_name("geo");
        match result {
            Err(ExtensionError::InvalidExtension { reason }) => {
                assert!(reason.contains("no resolver"));
            }
            other => panic!("Expected InvalidExtension, got {other:?}"),
        }
    }

    #[test]
    fn test_names() {
        let mut registry = ExtensionRegistry::new();
        registry.register("a", Extension::value(1_u8)).unwrap();
        registry.register("b", Extension::value(2_u8)).unwrap();

        let mut names: Vec<&str> = registry.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "b"]);
    }
}
