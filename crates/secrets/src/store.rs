use crate::{SecretBytes, SecretError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Thread-safe, in-memory map of secret name to bytes.
///
/// Clones share the same storage. Writes overwrite unconditionally and
/// nothing expires.
#[derive(Clone, Default)]
pub struct SecretStore {
    secrets: Arc<RwLock<HashMap<String, SecretBytes>>>,
}

impl SecretStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn put(&self, name: impl Into<String>, value: impl Into<SecretBytes>) {
        let name = name.into();
        let value = value.into();
        debug!(secret = %name, len = value.len(), "Storing secret");
        // A panicking writer cannot leave the map half-updated
        self.secrets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    /// Get the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SecretBytes> {
        self.secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Check if a value is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names of all stored secrets, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Get the number of stored secrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the file at `path` and store its contents under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Read` if the file cannot be read.
    pub fn load_file(&self, name: &str, path: impl AsRef<Path>) -> Result<(), SecretError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| SecretError::Read {
            name: name.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        self.put(name, data);
        Ok(())
    }

    /// Store the value of environment variable `var` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::NotFound` if `var` is unset or empty.
    pub fn load_env(&self, name: &str, var: &str) -> Result<(), SecretError> {
        match std::env::var_os(var) {
            Some(value) if !value.is_empty() => {
                self.put(name, value.into_encoded_bytes());
                Ok(())
            }
            _ => Err(SecretError::NotFound {
                name: name.to_string(),
                secret_source: var.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("names", &self.names())
            .finish()
    }
}
