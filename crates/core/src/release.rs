//! Release and asset value objects shared by every provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published version of a product.
///
/// Releases are snapshots: they are built by a source provider and never
/// mutated afterwards. Query the provider again for fresh data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Display label
    pub name: String,
    /// Free text, may be empty
    pub description: String,
    /// Canonical identifier, unique per source repository
    pub version: String,
    /// Publish timestamp
    pub date: DateTime<Utc>,
    /// Assets in the order the backend returned them
    pub assets: Vec<Asset>,
}

impl Release {
    /// Find an asset by exact name.
    #[must_use]
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// One downloadable artifact attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name, unique within a release
    pub name: String,
    /// Absolute locator (`https://`, `file://`, ...)
    pub url: String,
    /// Byte length, `0` when the backend could not determine it
    pub size: u64,
}

impl Asset {
    /// Create a new asset.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            size,
        }
    }
}

/// A size lookup that failed while listing releases.
///
/// The affected asset is still present in the listing with `size == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWarning {
    /// Version of the release owning the asset
    pub version: String,
    /// Asset name
    pub asset: String,
    /// Why the size is unknown
    pub message: String,
}

impl std::fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): size unknown: {}",
            self.asset, self.version, self.message
        )
    }
}

/// Result of [`SourceProvider::list_releases`](crate::SourceProvider::list_releases).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseListing {
    /// All releases known to the backend
    pub releases: Vec<Release>,
    /// Non-fatal degradations encountered while building `releases`
    pub warnings: Vec<AssetWarning>,
}

impl ReleaseListing {
    /// Create a listing without warnings.
    #[must_use]
    pub fn new(releases: Vec<Release>) -> Self {
        Self {
            releases,
            warnings: Vec::new(),
        }
    }

    /// Find a release by version.
    #[must_use]
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.version == version)
    }
}
