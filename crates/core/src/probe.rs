//! Best-effort asset size probing.
//!
//! Backends whose list API omits sizes probe each asset separately. Probes
//! run with bounded concurrency, results keep the original asset order, and
//! a failed probe degrades that one asset to `size == 0`.

use crate::error::{Error, Result};
use crate::release::{Asset, AssetWarning};
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::warn;

/// Maximum number of size probes in flight per release.
pub const PROBE_CONCURRENCY: usize = 4;

/// Fill in `size` for every asset using `probe`.
///
/// `probe` receives the asset URL. Failures are logged and returned as
/// warnings; only cancellation aborts the whole operation.
///
/// # Errors
///
/// Returns `Error::Cancelled` if any probe observed cancellation.
pub async fn probe_sizes<F, Fut>(
    version: &str,
    mut assets: Vec<Asset>,
    probe: F,
) -> Result<(Vec<Asset>, Vec<AssetWarning>)>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    let urls: Vec<String> = assets.iter().map(|a| a.url.clone()).collect();
    let results: Vec<Result<u64>> = stream::iter(urls)
        .map(probe)
        .buffered(PROBE_CONCURRENCY)
        .collect()
        .await;

    let mut warnings = Vec::new();
    for (asset, result) in assets.iter_mut().zip(results) {
        match result {
            Ok(size) => asset.size = size,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(err) => {
                warn!(asset = %asset.name, version, error = %err, "Failed to get asset size");
                asset.size = 0;
                warnings.push(AssetWarning {
                    version: version.to_string(),
                    asset: asset.name.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    Ok((assets, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn assets(names: &[&str]) -> Vec<Asset> {
        names
            .iter()
            .map(|n| Asset::new(*n, format!("https://example.com/{n}"), 0))
            .collect()
    }

    #[tokio::test]
    async fn test_probe_sizes_preserves_order() {
        let input = assets(&["slow.apk", "fast.apk", "medium.apk"]);

        let (out, warnings) = probe_sizes("v1.0.0", input, |url| async move {
            let (delay, size) = if url.ends_with("slow.apk") {
                (30, 1)
            } else if url.ends_with("fast.apk") {
                (0, 2)
            } else {
                (10, 3)
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(size)
        })
        .await
        .unwrap();

        let names: Vec<_> = out.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["slow.apk", "fast.apk", "medium.apk"]);
        let sizes: Vec<_> = out.iter().map(|a| a.size).collect();
        assert_eq!(sizes, vec![1, 2, 3]);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_degrades_single_asset() {
        let input = assets(&["a.apk", "broken.apk", "c.apk"]);

        let (out, warnings) = probe_sizes("v2.0.0", input, |url| async move {
            if url.ends_with("broken.apk") {
                Err(Error::http(404, url))
            } else {
                Ok(42)
            }
        })
        .await
        .unwrap();

        let sizes: Vec<_> = out.iter().map(|a| a.size).collect();
        assert_eq!(sizes, vec![42, 0, 42]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].asset, "broken.apk");
        assert_eq!(warnings[0].version, "v2.0.0");
        assert!(warnings[0].message.contains("404"));
    }

    #[tokio::test]
    async fn test_probe_cancellation_aborts() {
        let input = assets(&["a.apk", "b.apk"]);
        let result = probe_sizes("v1", input, |_url| async { Err(Error::Cancelled) }).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_probe_no_assets() {
        let (out, warnings) = probe_sizes("v1", Vec::new(), |_url| async { Ok(1) })
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(warnings.is_empty());
    }
}
