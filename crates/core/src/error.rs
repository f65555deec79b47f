//! Error types shared by providers, the registry and the HTTP transport.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the provider contract and its supporting pieces.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No factory is registered under the requested provider type.
    #[error("Unknown provider type: {kind}")]
    #[diagnostic(
        code(appcast::unknown_provider),
        help("Registered provider types: {}", .available.join(", "))
    )]
    UnknownProviderKind {
        /// The requested type name
        kind: String,
        /// Type names that are registered
        available: Vec<String>,
    },

    /// A provider config record is missing or has a malformed field.
    #[error("Invalid {kind} provider configuration: {message}")]
    #[diagnostic(code(appcast::invalid_config))]
    InvalidConfig {
        /// Provider type the config was meant for
        kind: String,
        /// What is wrong with it
        message: String,
    },

    /// No release with the requested version exists.
    #[error("Release not found: {version}")]
    #[diagnostic(code(appcast::release_not_found))]
    NotFound {
        /// The requested version
        version: String,
    },

    /// The release exists but has no asset with the requested name.
    #[error("Asset '{name}' not found in release {version}")]
    #[diagnostic(code(appcast::asset_not_found))]
    AssetNotFound {
        /// The release version
        version: String,
        /// The requested asset name
        name: String,
    },

    /// A target has no object at the requested path.
    #[error("Object not found: {path}")]
    #[diagnostic(code(appcast::object_not_found))]
    ObjectNotFound {
        /// Path relative to the target root
        path: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(appcast::http))]
    Http {
        /// Response status code
        status: u16,
        /// Request URL
        url: String,
    },

    /// The request never produced a response.
    #[error("Request to {url} failed: {source}")]
    #[diagnostic(
        code(appcast::network),
        help("Check your internet connection or try again later")
    )]
    Network {
        /// Request URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived but could not be understood.
    #[error("Invalid response from {url}: {message}")]
    #[diagnostic(code(appcast::invalid_response))]
    InvalidResponse {
        /// Request URL
        url: String,
        /// Decoding failure
        message: String,
    },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    #[diagnostic(code(appcast::cancelled))]
    Cancelled,

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(appcast::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an unknown provider error.
    #[must_use]
    pub fn unknown_provider(kind: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownProviderKind {
            kind: kind.into(),
            available,
        }
    }

    /// Create an invalid provider config error.
    #[must_use]
    pub fn invalid_config(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a release not found error.
    #[must_use]
    pub fn not_found(version: impl Into<String>) -> Self {
        Self::NotFound {
            version: version.into(),
        }
    }

    /// Create an asset not found error.
    #[must_use]
    pub fn asset_not_found(version: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AssetNotFound {
            version: version.into(),
            name: name.into(),
        }
    }

    /// Create a target object not found error.
    #[must_use]
    pub fn object_not_found(path: impl Into<String>) -> Self {
        Self::ObjectNotFound { path: path.into() }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
