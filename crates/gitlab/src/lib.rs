//! GitLab releases backend for appcast.
//!
//! Talks to the GitLab REST v4 API through the retrying
//! [`HttpClient`](appcast_core::http::HttpClient). Assets are release links;
//! uploads go to the project's uploads area and are then linked to the
//! release.

mod api;
mod source;

pub use source::{DEFAULT_URL, GitLabSource};

use appcast_core::{SourceProvider, SourceRegistry};
use std::sync::Arc;

/// Registry name of the backend.
pub const KIND: &str = "gitlab";

/// Register the `gitlab` source.
pub fn register(sources: &mut SourceRegistry) {
    sources.register(KIND, |config| {
        Ok(Arc::new(GitLabSource::from_config(config)?) as Arc<dyn SourceProvider>)
    });
}
