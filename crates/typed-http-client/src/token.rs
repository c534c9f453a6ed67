//! Ambient token stores consulted before each request.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Default prefix for [`EnvTokenStore`] variables.
pub const DEFAULT_ENV_PREFIX: &str = "TYPED_HTTP_";

/// Read-only key-value lookup for credentials.
///
/// Implementations must be cheap to call; the client reads from the store
/// once per request.
pub trait TokenStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a single entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(key, value);
        store
    }

    /// Inserts or replaces an entry.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Removes an entry, returning the previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}

/// Store backed by process environment variables.
///
/// `get("token")` reads `TYPED_HTTP_TOKEN` with the default prefix.
#[derive(Debug, Clone)]
pub struct EnvTokenStore {
    prefix: String,
}

impl EnvTokenStore {
    /// Creates a store using `prefix` for variable names.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable consulted for `key`.
    #[must_use]
    pub fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_uppercase())
    }
}

impl Default for EnvTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl TokenStore for EnvTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.var_name(key))
            .ok()
            .filter(|value| !value.is_empty())
    }
}
