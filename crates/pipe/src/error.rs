//! Assembly errors.

use crate::crypto::KeyError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for pipe assembly.
pub type Result<T> = std::result::Result<T, PipeError>;

/// Why a configuration could not be turned into a [`Pipe`](crate::Pipe).
#[derive(Error, Debug, Diagnostic)]
pub enum PipeError {
    /// The configured provider type has no registered factory.
    #[error("Unknown {role} type: {kind}")]
    #[diagnostic(
        code(appcast::pipe::unknown_provider),
        help("Available {role} types: {}", .available.join(", "))
    )]
    UnknownProviderKind {
        /// "source" or "target"
        role: &'static str,
        /// The requested type name
        kind: String,
        /// Type names that are registered
        available: Vec<String>,
    },

    /// The provider factory rejected its configuration.
    #[error("Failed to create {role} '{kind}': {source}")]
    #[diagnostic(code(appcast::pipe::provider_construction))]
    ProviderConstruction {
        /// "source" or "target"
        role: &'static str,
        /// The provider type name
        kind: String,
        /// What the factory failed with
        #[source]
        source: appcast_core::Error,
    },

    /// An enabled integration needs a secret that was never stored.
    #[error("{integration}: secret '{secret}' is not set")]
    #[diagnostic(
        code(appcast::pipe::missing_secret),
        help("Pass the key with --rsa-key or the APPCAST_RSA_KEY environment variable")
    )]
    MissingSecret {
        /// Integration name
        integration: &'static str,
        /// Secret name looked up in the store
        secret: &'static str,
    },

    /// The stored key material is not a usable private key.
    #[error("{integration}: invalid key: {source}")]
    #[diagnostic(code(appcast::pipe::invalid_key))]
    InvalidKey {
        /// Integration name
        integration: &'static str,
        /// Parse failure
        #[source]
        source: KeyError,
    },

    /// A field the integration cannot work without is unset or empty.
    #[error("{integration}: missing required field '{field}'")]
    #[diagnostic(code(appcast::pipe::missing_field))]
    MissingRequiredField {
        /// Integration name
        integration: &'static str,
        /// Config key, as written in YAML
        field: &'static str,
    },

    /// The configuration tree has the wrong shape.
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(appcast::pipe::config))]
    Config {
        /// What is wrong
        message: String,
    },
}

impl PipeError {
    /// Create a configuration shape error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify a registry failure for `role`.
    #[must_use]
    pub fn from_registry(role: &'static str, kind: &str, err: appcast_core::Error) -> Self {
        match err {
            appcast_core::Error::UnknownProviderKind { kind, available } => {
                Self::UnknownProviderKind {
                    role,
                    kind,
                    available,
                }
            }
            source => Self::ProviderConstruction {
                role,
                kind: kind.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_registry_unknown_kind() {
        let err = PipeError::from_registry(
            "source",
            "s3",
            appcast_core::Error::unknown_provider("s3", vec!["file".into()]),
        );
        assert!(matches!(
            err,
            PipeError::UnknownProviderKind { role: "source", ref kind, .. } if kind == "s3"
        ));
        assert_eq!(err.to_string(), "Unknown source type: s3");
    }

    #[test]
    fn test_from_registry_wraps_factory_error() {
        let err = PipeError::from_registry(
            "target",
            "file",
            appcast_core::Error::invalid_config("file", "`path` is required"),
        );
        assert!(matches!(err, PipeError::ProviderConstruction { role: "target", .. }));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_missing_field_message() {
        let err = PipeError::MissingRequiredField {
            integration: "apk",
            field: "key-name",
        };
        assert_eq!(err.to_string(), "apk: missing required field 'key-name'");
    }
}
