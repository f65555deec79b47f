//! Provider configuration records.
//!
//! A [`ProviderConfig`] is handed opaquely to the factory registered for its
//! `type`. Well-known fields are typed; anything else lands in `extra` for
//! backends that need more.

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one source or target provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
    /// Registry key selecting the backend (e.g. "gitlab", "file")
    #[serde(rename = "type")]
    pub kind: String,

    /// API token
    #[serde(default, deserialize_with = "deserialize_token")]
    pub token: Option<SecretString>,

    /// Repository or project identifier (e.g. "group/project")
    pub repo: Option<String>,

    /// Filesystem path for local backends
    pub path: Option<PathBuf>,

    /// Base URL for self-hosted instances
    pub url: Option<String>,

    /// Version label for backends that host a single release
    pub version: Option<String>,

    /// Retry policy override for network backends
    pub retry: Option<RetryConfig>,

    /// Backend-specific keys not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ProviderConfig {
    /// Create a config selecting the given backend.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Decode a config record from a parsed YAML node.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when the node is not a mapping with a
    /// string `type` or a known field has the wrong shape.
    pub fn from_value(value: &serde_yaml::Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or("<unset>")
            .to_string();
        serde_yaml::from_value(value.clone()).map_err(|e| Error::invalid_config(kind, e.to_string()))
    }

    /// Sets the repository.
    #[must_use]
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Sets the filesystem path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// The token, if configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    /// The repository, or an `InvalidConfig` error naming it as required.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when `repo` is unset or empty.
    pub fn require_repo(&self) -> Result<&str> {
        match self.repo.as_deref() {
            Some(repo) if !repo.is_empty() => Ok(repo),
            _ => Err(Error::invalid_config(&self.kind, "`repo` is required")),
        }
    }

    /// The path, or an `InvalidConfig` error naming it as required.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when `path` is unset or empty.
    pub fn require_path(&self) -> Result<&std::path::Path> {
        match self.path.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(Error::invalid_config(&self.kind, "`path` is required")),
        }
    }
}

/// Retry configuration with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Initial backoff duration in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Initial backoff as a duration.
    #[must_use]
    pub const fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Maximum backoff as a duration.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

fn deserialize_token<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(token.filter(|t| !t.is_empty()).map(SecretString::from))
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    10000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}
