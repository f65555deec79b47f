//! Target provider contract.
//!
//! Targets are where integrations publish generated repositories. A target
//! can be narrowed to a subfolder with [`TargetProvider::sub`], which is how
//! each integration gets its own directory under a shared root.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Publishing destination for generated files.
#[async_trait]
pub trait TargetProvider: Send + Sync {
    /// Registry name of the backend (e.g. "file").
    fn kind(&self) -> &'static str;

    /// Human-readable identity of the scoped root (path, bucket prefix, ...).
    fn location(&self) -> String;

    /// A provider scoped to `folder` below this one.
    fn sub(&self, folder: &str) -> Arc<dyn TargetProvider>;

    /// Read an object relative to the scoped root.
    ///
    /// # Errors
    ///
    /// Returns `Error::ObjectNotFound` when nothing exists at `path`.
    async fn read(&self, cancel: &CancellationToken, path: &str) -> Result<Vec<u8>>;

    /// Create or replace an object relative to the scoped root.
    async fn write(&self, cancel: &CancellationToken, path: &str, data: &[u8]) -> Result<()>;
}

impl std::fmt::Debug for dyn TargetProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetProvider")
            .field("kind", &self.kind())
            .field("location", &self.location())
            .finish()
    }
}
