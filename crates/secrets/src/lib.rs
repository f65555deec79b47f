//! Secret storage for appcast
//!
//! A [`SecretStore`] holds named byte blobs (signing keys, tokens) in memory
//! for the lifetime of a run. It is created by the entry point, filled from
//! files or environment variables, and handed to the pipe assembler.
//!
//! ```ignore
//! use appcast_secrets::SecretStore;
//!
//! let store = SecretStore::new();
//! store.load_file("rsa_key", "keys/signing.pem")?;
//!
//! if let Some(key) = store.get("rsa_key") {
//!     parse_key(key.expose());
//! }
//! ```

mod store;
mod types;

pub use store::SecretStore;
pub use types::SecretBytes;

use std::path::PathBuf;
use thiserror::Error;

/// Error types for loading secrets
#[derive(Debug, Error)]
pub enum SecretError {
    /// Secret not found
    #[error("Secret '{name}' not found from source '{secret_source}'")]
    NotFound {
        /// Secret name
        name: String,
        /// Source that was searched (e.g., env var name)
        secret_source: String,
    },

    /// Secret file could not be read
    #[error("Failed to read secret '{name}' from {}", path.display())]
    Read {
        /// Secret name
        name: String,
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
