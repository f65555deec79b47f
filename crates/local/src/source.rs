//! Directory-backed release source.

use appcast_core::{
    Asset, CancellationToken, Error, ProviderConfig, Release, ReleaseListing, Result,
    SourceProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};
use url::Url;

/// Version reported when the provider config does not set one.
pub const DEFAULT_VERSION: &str = "v0.0.0";

/// Source that treats one directory as a single release.
///
/// Every regular file in the directory is an asset. Subdirectories are
/// ignored.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    version: String,
}

impl FileSource {
    /// Create a source over `root` reporting `version`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if `root` cannot be made absolute.
    pub fn new(root: impl AsRef<Path>, version: impl Into<String>) -> Result<Self> {
        Ok(Self {
            root: std::path::absolute(root)?,
            version: version.into(),
        })
    }

    /// Build from a provider config.
    ///
    /// The directory comes from `path`, falling back to `repo`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when neither is set.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let root = root_from_config(config)?;
        let version = config
            .version
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        Self::new(root, version)
    }

    /// The directory being served.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_version(&self, version: &str) -> Result<()> {
        if version == self.version {
            Ok(())
        } else {
            Err(Error::not_found(version))
        }
    }

    async fn scan(&self, cancel: &CancellationToken) -> Result<Release> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut files = Vec::new();
        let mut newest: Option<SystemTime> = None;

        while let Some(entry) = entries.next_entry().await? {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                debug!(path = %entry.path().display(), "Skipping file with non UTF-8 name");
                continue;
            };
            if let Ok(modified) = metadata.modified() {
                newest = newest.max(Some(modified));
            }
            files.push((name, entry.path(), metadata.len()));
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));

        let assets = files
            .into_iter()
            .map(|(name, path, size)| Ok(Asset::new(name, file_url(&path)?, size)))
            .collect::<Result<Vec<_>>>()?;

        let date = match newest {
            Some(modified) => modified,
            None => tokio::fs::metadata(&self.root).await?.modified()?,
        };

        Ok(Release {
            name: self.version.clone(),
            description: String::new(),
            version: self.version.clone(),
            date: DateTime::<Utc>::from(date),
            assets,
        })
    }
}

#[async_trait]
impl SourceProvider for FileSource {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    async fn list_releases(&self, cancel: &CancellationToken) -> Result<ReleaseListing> {
        let release = self.scan(cancel).await?;
        Ok(ReleaseListing::new(vec![release]))
    }

    async fn get_release(&self, cancel: &CancellationToken, version: &str) -> Result<Release> {
        self.ensure_version(version)?;
        self.scan(cancel).await
    }

    async fn upload_asset(
        &self,
        cancel: &CancellationToken,
        version: &str,
        name: &str,
        data: &[u8],
    ) -> Result<()> {
        self.ensure_version(version)?;
        let path = self.root.join(checked_name(name)?);
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::fs::write(&path, data).await?;
        info!(asset = name, version, path = %path.display(), size = data.len(), "Uploaded asset");
        Ok(())
    }

    async fn download_asset(
        &self,
        cancel: &CancellationToken,
        version: &str,
        name: &str,
    ) -> Result<Vec<u8>> {
        self.ensure_version(version)?;
        let Ok(name) = checked_name(name) else {
            return Err(Error::asset_not_found(version, name));
        };
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match tokio::fs::read(self.root.join(name)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::asset_not_found(version, name))
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn root_from_config(config: &ProviderConfig) -> Result<PathBuf> {
    match (&config.path, config.repo.as_deref()) {
        (Some(path), _) if !path.as_os_str().is_empty() => Ok(path.clone()),
        (_, Some(repo)) if !repo.is_empty() => Ok(PathBuf::from(repo)),
        _ => Err(Error::invalid_config(&config.kind, "`path` is required")),
    }
}

/// Reject names that would escape the directory.
pub(crate) fn checked_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(name),
        _ => Err(Error::invalid_config(
            "file",
            format!("invalid asset name: {name:?}"),
        )),
    }
}

fn file_url(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| Error::invalid_config("file", format!("not an absolute path: {}", path.display())))
}
