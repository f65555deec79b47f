//! Configuration tree to [`Pipe`].
//!
//! Assembly runs in a fixed order and stops at the first error:
//! 1. top-level `version` / `prerelease`
//! 2. `source` then `target` through their registries
//! 3. each known integration block, in declaration order below
//!
//! A block with `disabled: true` is skipped before anything else in it is
//! read, so it triggers no secret lookups and no validation.

use crate::apk::{self, ApkConfig, Shared};
use crate::error::{PipeError, Result};
use appcast_core::{
    ProviderConfig, ProviderRegistry, SourceProvider, SourceRegistry, TargetRegistry,
};
use appcast_secrets::SecretStore;
use serde::Deserialize;
use serde_yaml::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// An assembled pipeline: one field per integration, `None` when disabled
/// or not configured.
#[derive(Debug, Clone, Default)]
pub struct Pipe {
    /// Alpine repository publishing
    pub apk: Option<ApkConfig>,
}

impl Pipe {
    /// Names of the enabled integrations, in processing order.
    #[must_use]
    pub fn integrations(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.apk.is_some() {
            names.push(apk::NAME);
        }
        names
    }

    /// True when no integration is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.integrations().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct Defaults {
    version: Option<String>,
    #[serde(default)]
    prerelease: bool,
}

/// Builds a [`Pipe`] from a parsed configuration tree.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    sources: &'a SourceRegistry,
    targets: &'a TargetRegistry,
    secrets: &'a SecretStore,
}

impl<'a> Assembler<'a> {
    /// Create an assembler over the given registries and secret store.
    #[must_use]
    pub const fn new(
        sources: &'a SourceRegistry,
        targets: &'a TargetRegistry,
        secrets: &'a SecretStore,
    ) -> Self {
        Self {
            sources,
            targets,
            secrets,
        }
    }

    /// Assemble `config` into a [`Pipe`].
    ///
    /// Performs no network I/O. Either every enabled integration is wired or
    /// nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipeError`] in processing order.
    pub fn assemble(&self, config: &Value) -> Result<Pipe> {
        let empty = Value::Mapping(serde_yaml::Mapping::new());
        let root = match config {
            Value::Null => &empty,
            Value::Mapping(_) => config,
            _ => return Err(PipeError::config("top level must be a mapping")),
        };

        let defaults: Defaults =
            serde_yaml::from_value(root.clone()).map_err(|e| PipeError::config(e.to_string()))?;

        let source = build_provider(self.sources, root, "source")?;
        let target = build_provider(self.targets, root, "target")?;
        debug!(source = %source.location(), target = %target.location(), "Resolved providers");

        let shared = Shared {
            source: &source,
            target: &target,
            version: defaults.version.as_deref().filter(|v| !v.is_empty()),
            prerelease: defaults.prerelease,
            secrets: self.secrets,
        };

        let mut pipe = Pipe::default();

        if let Some(block) = enabled_block(root, apk::NAME) {
            pipe.apk = Some(apk::decode(block, &shared)?);
        }

        info!(integrations = ?pipe.integrations(), "Assembled pipe");
        Ok(pipe)
    }

    /// Build only the configured source provider.
    ///
    /// # Errors
    ///
    /// As the provider resolution step of [`assemble`](Self::assemble).
    pub fn source(&self, config: &Value) -> Result<Arc<dyn SourceProvider>> {
        if !config.is_mapping() {
            return Err(PipeError::config("top level must be a mapping"));
        }
        build_provider(self.sources, config, "source")
    }
}

/// Resolve the provider described by `root[role]`.
fn build_provider<P: ?Sized>(
    registry: &ProviderRegistry<P>,
    root: &Value,
    role: &'static str,
) -> Result<Arc<P>> {
    let block = root
        .get(role)
        .filter(|b| !b.is_null())
        .ok_or_else(|| PipeError::config(format!("`{role}` is required")))?;

    let kind = block
        .get("type")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| PipeError::config(format!("`{role}.type` is required")))?;

    let config = ProviderConfig::from_value(block)
        .map_err(|e| PipeError::config(format!("{role}: {e}")))?;

    registry
        .build(kind, &config)
        .map_err(|e| PipeError::from_registry(role, kind, e))
}

/// The block under `name` unless it is absent or marked `disabled: true`.
fn enabled_block<'v>(root: &'v Value, name: &str) -> Option<&'v Value> {
    let block = root.get(name)?;
    let disabled = block
        .get("disabled")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if disabled {
        debug!(integration = name, "Integration disabled");
        None
    } else {
        Some(block)
    }
}
