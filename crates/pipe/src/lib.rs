//! Pipe assembly for appcast.
//!
//! Turns a parsed configuration tree into a [`Pipe`]: the source and target
//! providers built through their registries, plus the settings of every
//! enabled integration with secrets resolved into typed credentials.
//!
//! ```yaml
//! version: latest
//! prerelease: false
//! source:
//!   type: gitlab
//!   repo: group/project
//! target:
//!   type: file
//!   path: ./public
//! apk:
//!   folder: alpine
//!   key-name: packager@example.com.rsa.pub
//! ```

pub mod apk;
mod assembler;
pub mod crypto;
mod error;

pub use apk::ApkConfig;
pub use assembler::{Assembler, Pipe};
pub use crypto::{KeyError, parse_rsa_private_key};
pub use error::{PipeError, Result};

/// Parse YAML configuration text into the tree [`Assembler::assemble`] reads.
///
/// # Errors
///
/// Returns `PipeError::Config` when the text is not valid YAML.
pub fn load_config(text: &str) -> Result<serde_yaml::Value> {
    serde_yaml::from_str(text).map_err(|e| PipeError::config(format!("invalid YAML: {e}")))
}
