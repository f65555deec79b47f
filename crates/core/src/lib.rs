//! Core building blocks for appcast.
//!
//! - [`Release`] / [`Asset`]: the data every provider speaks
//! - [`SourceProvider`] / [`TargetProvider`]: backend contracts
//! - [`ProviderRegistry`]: type name -> factory lookup
//! - [`http::HttpClient`]: retrying, cancellable transport for network backends
//!
//! Concrete backends live in their own crates (`appcast-local`,
//! `appcast-gitlab`) and plug in through the registries.

pub mod config;
pub mod error;
pub mod http;
pub mod probe;
pub mod registry;
pub mod release;
pub mod source;
pub mod target;

pub use config::{ProviderConfig, RetryConfig};
pub use error::{Error, Result};
pub use registry::{Factory, ProviderRegistry, SourceRegistry, TargetRegistry};
pub use release::{Asset, AssetWarning, Release, ReleaseListing};
pub use source::SourceProvider;
pub use target::TargetProvider;

pub use tokio_util::sync::CancellationToken;
