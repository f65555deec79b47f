//! Provider registry.
//!
//! Maps a provider type name (the `type` key of a provider config) to a
//! factory. One registry holds sources and another holds targets. Backend
//! crates expose a `register` function which the composing binary calls
//! before assembling a pipe, so the set of available backends is explicit.

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::source::SourceProvider;
use crate::target::TargetProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Constructor for a provider of type `P`.
pub type Factory<P> = Arc<dyn Fn(&ProviderConfig) -> Result<Arc<P>> + Send + Sync>;

/// Registry of source providers.
pub type SourceRegistry = ProviderRegistry<dyn SourceProvider>;

/// Registry of target providers.
pub type TargetRegistry = ProviderRegistry<dyn TargetProvider>;

/// Registry of provider factories indexed by type name.
pub struct ProviderRegistry<P: ?Sized> {
    role: &'static str,
    factories: HashMap<String, Factory<P>>,
}

impl<P: ?Sized> ProviderRegistry<P> {
    /// Create an empty registry for the given role ("source", "target").
    #[must_use]
    pub fn new(role: &'static str) -> Self {
        Self {
            role,
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `kind`.
    ///
    /// If a factory with the same name already exists, it is replaced.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ProviderConfig) -> Result<Arc<P>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.insert(kind.clone(), Arc::new(factory)).is_some() {
            debug!(role = self.role, kind = %kind, "Replaced provider factory");
        }
    }

    /// Construct a provider of type `kind` from `config`.
    ///
    /// The factory's result is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownProviderKind` if nothing is registered under
    /// `kind`, or whatever the factory fails with.
    pub fn build(&self, kind: &str, config: &ProviderConfig) -> Result<Arc<P>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| Error::unknown_provider(kind, self.kinds()))?;

        debug!(role = self.role, kind, "Constructing provider");
        factory(config)
    }

    /// Which role this registry serves.
    #[must_use]
    pub const fn role(&self) -> &'static str {
        self.role
    }

    /// Check if a factory is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// All registered type names, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<_> = self.factories.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Get the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl SourceRegistry {
    /// Create an empty source registry.
    #[must_use]
    pub fn sources() -> Self {
        Self::new("source")
    }
}

impl TargetRegistry {
    /// Create an empty target registry.
    #[must_use]
    pub fn targets() -> Self {
        Self::new("target")
    }
}

impl<P: ?Sized> std::fmt::Debug for ProviderRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("role", &self.role)
            .field("kinds", &self.kinds())
            .finish()
    }
}
