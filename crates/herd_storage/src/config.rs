//! Store configuration.

use crate::state::Metadata;

/// Name used when none is configured.
pub const DEFAULT_STORE_NAME: &str = "entities";

/// Configuration for an [`EntityStore`](crate::EntityStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store name, used in logs, error context and the `name` metadata entry.
    pub name: String,
    /// Loading flag of a fresh store, and of a store after `remove_all`.
    pub loading_on_init: bool,
    /// Initial metadata.
    pub metadata: Metadata,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STORE_NAME.to_string(),
            loading_on_init: true,
            metadata: Metadata::new(),
        }
    }
}

impl StoreConfig {
    /// Creates a default configuration with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::default().with_name(name)
    }

    /// Creates a configuration for a store that starts out not loading.
    #[must_use]
    pub fn preloaded() -> Self {
        Self::default().with_loading_on_init(false)
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the initial loading flag.
    #[must_use]
    pub fn with_loading_on_init(mut self, loading: bool) -> Self {
        self.loading_on_init = loading;
        self
    }

    /// Adds an initial metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Metadata a fresh store starts with: the configured entries plus `name`.
    #[must_use]
    pub fn initial_metadata(&self) -> Metadata {
        self.metadata.clone().with("name", self.name.clone())
    }
}
