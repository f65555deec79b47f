//! Alpine (`apk`) integration settings.

use crate::crypto::parse_rsa_private_key;
use crate::error::{PipeError, Result};
use appcast_core::{SourceProvider, TargetProvider};
use appcast_secrets::SecretStore;
use rsa::RsaPrivateKey;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Config key and default target folder of the integration.
pub const NAME: &str = "apk";

/// Secret holding the repository signing key.
pub const RSA_KEY_SECRET: &str = "rsa_key";

/// Fully resolved settings for publishing an Alpine repository.
#[derive(Clone)]
pub struct ApkConfig {
    /// Where releases are read from
    pub source: Arc<dyn SourceProvider>,
    /// Where the repository is written, already scoped to its folder
    pub target: Arc<dyn TargetProvider>,
    /// Version selector; `None` means every release
    pub version: Option<String>,
    /// Include prereleases
    pub prerelease: bool,
    /// Index signing key
    pub rsa_key: RsaPrivateKey,
    /// File name of the public key as installed on clients
    pub key_name: String,
}

impl std::fmt::Debug for ApkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApkConfig")
            .field("source", &self.source.location())
            .field("target", &self.target.location())
            .field("version", &self.version)
            .field("prerelease", &self.prerelease)
            .field("rsa_key", &"[REDACTED]")
            .field("key_name", &self.key_name)
            .finish()
    }
}

/// The `apk:` block as written.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ApkBlock {
    folder: Option<String>,
    key_name: Option<String>,
    version: Option<String>,
    prerelease: Option<bool>,
}

/// Values shared by every integration.
pub(crate) struct Shared<'a> {
    pub source: &'a Arc<dyn SourceProvider>,
    pub target: &'a Arc<dyn TargetProvider>,
    pub version: Option<&'a str>,
    pub prerelease: bool,
    pub secrets: &'a SecretStore,
}

/// Decode an enabled `apk:` block.
///
/// `value` is `Null` for a bare `apk:` key.
pub(crate) fn decode(value: &serde_yaml::Value, shared: &Shared<'_>) -> Result<ApkConfig> {
    let block: ApkBlock = if value.is_null() {
        ApkBlock::default()
    } else {
        serde_yaml::from_value(value.clone())
            .map_err(|e| PipeError::config(format!("{NAME}: {e}")))?
    };

    let folder = block
        .folder
        .as_deref()
        .filter(|f| !f.is_empty())
        .unwrap_or(NAME);
    let target = shared.target.sub(folder);

    let version = block
        .version
        .filter(|v| !v.is_empty())
        .or_else(|| shared.version.map(ToString::to_string));
    let prerelease = block.prerelease.unwrap_or(shared.prerelease);

    let secret = shared
        .secrets
        .get(RSA_KEY_SECRET)
        .ok_or(PipeError::MissingSecret {
            integration: NAME,
            secret: RSA_KEY_SECRET,
        })?;
    let rsa_key = parse_rsa_private_key(secret.expose()).map_err(|source| PipeError::InvalidKey {
        integration: NAME,
        source,
    })?;

    let key_name = block
        .key_name
        .filter(|k| !k.is_empty())
        .ok_or(PipeError::MissingRequiredField {
            integration: NAME,
            field: "key-name",
        })?;

    debug!(folder, target = %target.location(), ?version, prerelease, "Decoded apk integration");

    Ok(ApkConfig {
        source: Arc::clone(shared.source),
        target,
        version,
        prerelease,
        rsa_key,
        key_name,
    })
}
