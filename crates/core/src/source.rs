//! Source provider contract.
//!
//! Every backend that can serve releases (GitLab, local directories, ...)
//! implements [`SourceProvider`]. The assembler and the integrations only
//! ever see `Arc<dyn SourceProvider>`.
//!
//! All methods take a [`CancellationToken`]. Implementations must stop
//! promptly once it fires, including in the middle of a retry backoff; the
//! [`HttpClient`](crate::http::HttpClient) does this for network backends.

use crate::error::Result;
use crate::release::{Release, ReleaseListing};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Uniform release retrieval and publishing interface.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Registry name of the backend (e.g. "gitlab").
    fn kind(&self) -> &'static str;

    /// Human-readable identity of the repository this provider serves.
    fn location(&self) -> String;

    /// List every release known to the backend, assets included.
    ///
    /// Asset sizes that cannot be determined are reported as `0` and
    /// described in [`ReleaseListing::warnings`]; they never fail the call.
    async fn list_releases(&self, cancel: &CancellationToken) -> Result<ReleaseListing>;

    /// Fetch the release with the given version.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when no release has that version.
    async fn get_release(&self, cancel: &CancellationToken, version: &str) -> Result<Release>;

    /// Attach a named blob to an existing release.
    ///
    /// Uploading a name that already exists is backend-defined: it may
    /// overwrite or create a duplicate.
    async fn upload_asset(
        &self,
        cancel: &CancellationToken,
        version: &str,
        name: &str,
        data: &[u8],
    ) -> Result<()>;

    /// Download the asset with the given name.
    ///
    /// # Errors
    ///
    /// Returns `Error::AssetNotFound` when the release has no such asset.
    async fn download_asset(
        &self,
        cancel: &CancellationToken,
        version: &str,
        name: &str,
    ) -> Result<Vec<u8>>;
}

impl std::fmt::Debug for dyn SourceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceProvider")
            .field("kind", &self.kind())
            .field("location", &self.location())
            .finish()
    }
}
