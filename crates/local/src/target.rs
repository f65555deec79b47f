//! Directory-backed publish target.

use crate::source::root_from_config;
use appcast_core::{CancellationToken, Error, ProviderConfig, Result, TargetProvider};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Target that writes objects below a root directory.
#[derive(Debug, Clone)]
pub struct FileTarget {
    root: PathBuf,
}

impl FileTarget {
    /// Create a target rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build from a provider config (`path`, falling back to `repo`).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when neither is set.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        root_from_config(config).map(Self::new)
    }

    /// The directory objects are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && !path.is_empty()
        {
            Ok(self.root.join(relative))
        } else {
            Err(Error::invalid_config(
                "file",
                format!("object path must be relative: {path:?}"),
            ))
        }
    }
}

#[async_trait]
impl TargetProvider for FileTarget {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn sub(&self, folder: &str) -> Arc<dyn TargetProvider> {
        Arc::new(Self::new(self.root.join(folder)))
    }

    async fn read(&self, cancel: &CancellationToken, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::object_not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, cancel: &CancellationToken, path: &str, data: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, data).await?;
        debug!(path = %full.display(), size = data.len(), "Wrote object");
        Ok(())
    }
}
