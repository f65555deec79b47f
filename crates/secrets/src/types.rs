//! Secret value type with automatic memory zeroing
//!
//! [`SecretBytes`] wraps `secrecy::SecretSlice<u8>` so stored values:
//! - are zeroed from memory when the last handle drops
//! - print as `[REDACTED]` in `Debug` and `Display`
//! - need an explicit `.expose()` call to read

use secrecy::{ExposeSecret, SecretSlice};
use std::sync::Arc;

/// A named secret's bytes.
///
/// Cloning shares the underlying allocation, so handing a value out of the
/// store never copies the secret.
#[derive(Clone)]
pub struct SecretBytes {
    inner: Arc<SecretSlice<u8>>,
}

impl SecretBytes {
    /// Move `value` into secure storage.
    #[must_use]
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(SecretSlice::from(value)),
        }
    }

    /// Expose the secret bytes for use.
    ///
    /// The caller must not log or persist the returned slice.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Get the length of the secret value without exposing it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Check if the secret value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(value: &[u8]) -> Self {
        Self::new(value.to_vec())
    }
}

impl From<String> for SecretBytes {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&str> for SecretBytes {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}
