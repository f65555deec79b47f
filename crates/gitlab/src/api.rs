//! GitLab REST v4 payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A release as returned by `/projects/:id/releases`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRelease {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub assets: ApiAssets,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiAssets {
    #[serde(default)]
    pub links: Vec<ApiLink>,
}

/// A release link (an asset hosted anywhere, usually a project upload).
#[derive(Debug, Deserialize)]
pub(crate) struct ApiLink {
    pub name: String,
    pub url: String,
}

/// Response of `POST /projects/:id/uploads`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiUpload {
    /// Project-relative path, e.g. `/uploads/<secret>/app.apk`
    pub url: String,
}

/// Body of `POST /projects/:id/releases/:tag/assets/links`.
#[derive(Debug, Serialize)]
pub(crate) struct NewLink<'a> {
    pub name: &'a str,
    pub url: &'a str,
}
