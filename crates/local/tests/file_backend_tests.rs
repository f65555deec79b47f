//! Tests for the `file` source and target against real temp directories.

use appcast_core::{
    Asset, CancellationToken, Error, ProviderConfig, Release, SourceProvider, SourceRegistry,
    TargetProvider, TargetRegistry,
};
use appcast_local::{DEFAULT_VERSION, FileSource};
use chrono::{DateTime, Utc};
use std::path::Path;
use tempfile::TempDir;

const ASSETS: [&str; 3] = ["test_64-bit.msi", "test.dmg", "test_32-bit.msi"];

fn url_for(dir: &Path, name: &str) -> String {
    url::Url::from_file_path(dir.join(name)).unwrap().to_string()
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ASSETS {
        std::fs::write(dir.path().join(name), b"test\n").unwrap();
    }
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    dir
}

fn expected(dir: &Path) -> Release {
    Release {
        name: DEFAULT_VERSION.to_string(),
        description: String::new(),
        version: DEFAULT_VERSION.to_string(),
        date: DateTime::<Utc>::UNIX_EPOCH,
        assets: ["test.dmg", "test_32-bit.msi", "test_64-bit.msi"]
            .into_iter()
            .map(|name| Asset::new(name, url_for(dir, name), 5))
            .collect(),
    }
}

fn without_date(mut release: Release) -> Release {
    release.date = DateTime::<Utc>::UNIX_EPOCH;
    release
}

fn registries() -> (SourceRegistry, TargetRegistry) {
    let mut sources = SourceRegistry::sources();
    let mut targets = TargetRegistry::targets();
    appcast_local::register(&mut sources, &mut targets);
    (sources, targets)
}

#[tokio::test]
async fn list_releases_returns_directory_as_single_release() {
    let dir = fixture();
    let source = FileSource::from_config(&ProviderConfig::new("file").with_path(dir.path())).unwrap();

    let listing = source.list_releases(&CancellationToken::new()).await.unwrap();

    assert!(listing.warnings.is_empty());
    assert_eq!(listing.releases.len(), 1);
    assert_eq!(without_date(listing.releases[0].clone()), expected(dir.path()));
}

#[tokio::test]
async fn get_release_matches_listing_entry() {
    let dir = fixture();
    let source = FileSource::new(dir.path(), DEFAULT_VERSION).unwrap();
    let cancel = CancellationToken::new();

    let listed = source.list_releases(&cancel).await.unwrap().releases;
    let got = source.get_release(&cancel, DEFAULT_VERSION).await.unwrap();

    assert_eq!(without_date(got), without_date(listed[0].clone()));
}

#[tokio::test]
async fn get_release_unknown_version_is_not_found() {
    let dir = fixture();
    let source = FileSource::new(dir.path(), DEFAULT_VERSION).unwrap();

    let err = source
        .get_release(&CancellationToken::new(), "v9.9.9")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { ref version } if version == "v9.9.9"));
}

#[tokio::test]
async fn upload_then_download_round_trips() {
    let dir = fixture();
    let source = FileSource::new(dir.path(), DEFAULT_VERSION).unwrap();
    let cancel = CancellationToken::new();

    source
        .upload_asset(&cancel, DEFAULT_VERSION, "test.txt", b"foo")
        .await
        .unwrap();
    let data = source
        .download_asset(&cancel, DEFAULT_VERSION, "test.txt")
        .await
        .unwrap();
    assert_eq!(data, b"foo");

    let release = source.get_release(&cancel, DEFAULT_VERSION).await.unwrap();
    let uploaded = release.asset("test.txt").unwrap();
    assert_eq!(uploaded.size, 3);
}

#[tokio::test]
async fn download_missing_asset_is_asset_not_found() {
    let dir = fixture();
    let source = FileSource::new(dir.path(), DEFAULT_VERSION).unwrap();

    let err = source
        .download_asset(&CancellationToken::new(), DEFAULT_VERSION, "missing.apk")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AssetNotFound { ref name, .. } if name == "missing.apk"));
}

#[tokio::test]
async fn cancelled_listing_fails() {
    let dir = fixture();
    let source = FileSource::new(dir.path(), DEFAULT_VERSION).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = source.list_releases(&cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn registered_source_uses_configured_version() {
    let dir = fixture();
    let (sources, _) = registries();
    let mut config = ProviderConfig::new("file").with_path(dir.path());
    config.version = Some("v1.0.0".into());

    let source = sources.build("file", &config).unwrap();
    assert_eq!(source.kind(), "file");

    let release = source
        .get_release(&CancellationToken::new(), "v1.0.0")
        .await
        .unwrap();
    assert_eq!(release.name, "v1.0.0");
    assert_eq!(release.assets.len(), 3);
}

#[tokio::test]
async fn target_sub_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let (_, targets) = registries();
    let target = targets
        .build("file", &ProviderConfig::new("file").with_path(dir.path()))
        .unwrap();
    let apk = target.sub("apk");
    let cancel = CancellationToken::new();

    apk.write(&cancel, "x86_64/APKINDEX.tar.gz", b"index")
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("apk/x86_64/APKINDEX.tar.gz")).unwrap(),
        b"index"
    );
    assert_eq!(
        apk.read(&cancel, "x86_64/APKINDEX.tar.gz").await.unwrap(),
        b"index"
    );
}

#[tokio::test]
async fn target_read_missing_is_object_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (_, targets) = registries();
    let target = targets
        .build("file", &ProviderConfig::new("file").with_path(dir.path()))
        .unwrap();

    let err = target
        .read(&CancellationToken::new(), "missing.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound { ref path } if path == "missing.txt"));
}
