//! GitLab releases source.

use crate::api::{ApiLink, ApiRelease, ApiUpload, NewLink};
use appcast_core::http::HttpClient;
use appcast_core::probe::probe_sizes;
use appcast_core::{
    Asset, AssetWarning, CancellationToken, Error, ProviderConfig, Release, ReleaseListing, Result,
    SourceProvider,
};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use tracing::{debug, error, info};
use url::Url;

/// Host used when the provider config has no `url`.
pub const DEFAULT_URL: &str = "https://gitlab.com";

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const PER_PAGE: &str = "100";

/// Source backed by a GitLab project's releases.
pub struct GitLabSource {
    http: HttpClient,
    base_url: String,
    origin: Url,
    repo: String,
    project: String,
    token: Option<SecretString>,
}

impl GitLabSource {
    /// Build from a provider config.
    ///
    /// Uses `repo` (required), `token`, `url` and `retry`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when `repo` is missing or `url` is not
    /// an http(s) URL.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let repo = config.require_repo()?.trim_matches('/').to_string();
        let base_url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_URL)
            .trim_end_matches('/')
            .to_string();

        let origin = Url::parse(&base_url)
            .map_err(|e| Error::invalid_config(&config.kind, format!("invalid url {base_url:?}: {e}")))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(Error::invalid_config(
                &config.kind,
                format!("unsupported url scheme: {}", origin.scheme()),
            ));
        }

        let http = HttpClient::new(config.retry.clone().unwrap_or_default())?;
        Ok(Self {
            http,
            project: encode(&repo),
            base_url,
            origin,
            repo,
            token: config.token.clone(),
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v4/projects/{}{path}", self.base_url, self.project)
    }

    fn release_api(&self, version: &str, path: &str) -> String {
        self.api(&format!("/releases/{}{path}", encode(version)))
    }

    /// Attach the token, but only to requests for the configured host.
    fn authorize(&self, request: RequestBuilder, url: &str) -> RequestBuilder {
        match &self.token {
            Some(token) if self.is_same_origin(url) => {
                request.header(TOKEN_HEADER, token.expose_secret())
            }
            _ => request,
        }
    }

    /// Whether `url` has the configured scheme, host and port and no userinfo.
    fn is_same_origin(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };
        url.username().is_empty()
            && url.password().is_none()
            && url.scheme() == self.origin.scheme()
            && url.host_str() == self.origin.host_str()
            && url.port_or_known_default() == self.origin.port_or_known_default()
    }

    async fn parse_release(
        &self,
        cancel: &CancellationToken,
        release: ApiRelease,
    ) -> Result<(Release, Vec<AssetWarning>)> {
        let assets = release
            .assets
            .links
            .into_iter()
            .map(|link| Asset::new(link.name, link.url, 0))
            .collect();

        let (assets, warnings) = probe_sizes(&release.tag_name, assets, move |url| async move {
            self.http
                .content_length(cancel, &url, |request| self.authorize(request, &url))
                .await
        })
        .await?;

        let release = Release {
            name: release.name.unwrap_or_default(),
            description: release.description.unwrap_or_default(),
            version: release.tag_name,
            date: release.created_at,
            assets,
        };
        Ok((release, warnings))
    }

    async fn list_links(&self, cancel: &CancellationToken, version: &str) -> Result<Vec<ApiLink>> {
        let url = self.release_api(version, "/assets/links");
        self.http
            .json(cancel, "list_release_links", |c| {
                self.authorize(c.get(&url), &url)
            })
            .await
            .map_err(|e| not_found_on_404(e, version))
    }
}

#[async_trait]
impl SourceProvider for GitLabSource {
    fn kind(&self) -> &'static str {
        "gitlab"
    }

    fn location(&self) -> String {
        format!("{}/{}", self.base_url, self.repo)
    }

    async fn list_releases(&self, cancel: &CancellationToken) -> Result<ReleaseListing> {
        let url = self.api("/releases");
        let mut raw = Vec::new();
        let mut page = String::from("1");
        let mut visited = HashSet::new();

        loop {
            let response = self
                .http
                .send(cancel, "list_releases", |c| {
                    let request = c
                        .get(&url)
                        .query(&[("per_page", PER_PAGE), ("page", page.as_str())]);
                    self.authorize(request, &url)
                })
                .await?;

            let next = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string);

            let releases: Vec<ApiRelease> = HttpClient::decode_json(cancel, response).await?;
            debug!(page = %page, count = releases.len(), "Fetched releases page");
            raw.extend(releases);
            visited.insert(page);

            match next {
                Some(next) if !visited.contains(&next) => page = next,
                _ => break,
            }
        }

        let mut listing = ReleaseListing::default();
        for release in raw {
            let (release, warnings) = self.parse_release(cancel, release).await?;
            listing.releases.push(release);
            listing.warnings.extend(warnings);
        }
        Ok(listing)
    }

    async fn get_release(&self, cancel: &CancellationToken, version: &str) -> Result<Release> {
        let url = self.release_api(version, "");
        let release: ApiRelease = self
            .http
            .json(cancel, "get_release", |c| self.authorize(c.get(&url), &url))
            .await
            .map_err(|e| not_found_on_404(e, version))?;

        let (release, _warnings) = self.parse_release(cancel, release).await?;
        Ok(release)
    }

    async fn upload_asset(
        &self,
        cancel: &CancellationToken,
        version: &str,
        name: &str,
        data: &[u8],
    ) -> Result<()> {
        let upload_url = self.api("/uploads");
        let upload: ApiUpload = self
            .http
            .json(cancel, "upload_file", |c| {
                let part = Part::bytes(data.to_vec()).file_name(name.to_string());
                self.authorize(c.post(&upload_url).multipart(Form::new().part("file", part)), &upload_url)
            })
            .await?;

        let asset_url = format!(
            "{}/{}/{}",
            self.base_url,
            self.repo,
            upload.url.trim_start_matches('/')
        );

        let links_url = self.release_api(version, "/assets/links");
        let link = NewLink {
            name,
            url: &asset_url,
        };
        let created = self
            .http
            .send(cancel, "create_release_link", |c| {
                self.authorize(c.post(&links_url).json(&link), &links_url)
            })
            .await;

        if let Err(err) = created {
            // The file stays uploaded to the project with no release link
            error!(
                asset = name,
                version,
                orphaned_url = %asset_url,
                error = %err,
                "Uploaded asset but failed to link it to the release"
            );
            return Err(not_found_on_404(err, version));
        }

        info!(asset = name, version, url = %asset_url, size = data.len(), "Uploaded asset");
        Ok(())
    }

    async fn download_asset(
        &self,
        cancel: &CancellationToken,
        version: &str,
        name: &str,
    ) -> Result<Vec<u8>> {
        let links = self.list_links(cancel, version).await?;
        let link = links
            .into_iter()
            .find(|link| link.name == name)
            .ok_or_else(|| Error::asset_not_found(version, name))?;

        debug!(asset = name, version, url = %link.url, "Downloading asset");
        self.http
            .bytes(cancel, "download_asset", |c| {
                self.authorize(c.get(&link.url), &link.url)
            })
            .await
    }
}

impl std::fmt::Debug for GitLabSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabSource")
            .field("base_url", &self.base_url)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

fn not_found_on_404(err: Error, version: &str) -> Error {
    if err.status() == Some(404) {
        Error::not_found(version)
    } else {
        err
    }
}

/// Percent-encode a project path or tag as a single URL path segment.
fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_project_path() {
        assert_eq!(encode("group/project"), "group%2Fproject");
        assert_eq!(encode("group/sub group/project"), "group%2Fsub%20group%2Fproject");
        assert_eq!(encode("v1.0.0"), "v1.0.0");
    }

    #[test]
    fn test_from_config_defaults() {
        let config = ProviderConfig::new("gitlab").with_repo("/group/project/");
        let source = GitLabSource::from_config(&config).unwrap();
        assert_eq!(source.location(), "https://gitlab.com/group/project");
        assert_eq!(
            source.release_api("v1.0.0", "/assets/links"),
            "https://gitlab.com/api/v4/projects/group%2Fproject/releases/v1.0.0/assets/links"
        );
    }

    #[test]
    fn test_from_config_requires_repo() {
        let err = GitLabSource::from_config(&ProviderConfig::new("gitlab")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let config = ProviderConfig::new("gitlab")
            .with_repo("group/project")
            .with_url("ftp://gitlab.example.com");
        assert!(GitLabSource::from_config(&config).is_err());

        let config = ProviderConfig::new("gitlab")
            .with_repo("group/project")
            .with_url("not a url");
        assert!(GitLabSource::from_config(&config).is_err());
    }

    #[test]
    fn test_token_only_for_configured_origin() {
        let config = ProviderConfig::new("gitlab")
            .with_repo("group/project")
            .with_url("https://gitlab.example.com");
        let source = GitLabSource::from_config(&config).unwrap();

        assert!(source.is_same_origin("https://gitlab.example.com/group/project/uploads/1/a.apk"));
        assert!(source.is_same_origin("https://gitlab.example.com:443/api/v4/projects"));
        assert!(!source.is_same_origin("https://gitlab.example.com.evil.net/a.apk"));
        assert!(!source.is_same_origin("https://gitlab.example.com@evil.net/a.apk"));
        assert!(!source.is_same_origin("https://user:pw@gitlab.example.com/a.apk"));
        assert!(!source.is_same_origin("http://gitlab.example.com/a.apk"));
        assert!(!source.is_same_origin("https://gitlab.example.com:8443/a.apk"));
        assert!(!source.is_same_origin("not a url"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig::new("gitlab")
            .with_repo("group/project")
            .with_token("glpat-secret");
        let source = GitLabSource::from_config(&config).unwrap();
        let debug = format!("{source:?}");
        assert!(!debug.contains("glpat-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_not_found_on_404() {
        assert!(matches!(
            not_found_on_404(Error::http(404, "u"), "v1"),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            not_found_on_404(Error::http(500, "u"), "v1"),
            Error::Http { status: 500, .. }
        ));
    }
}
