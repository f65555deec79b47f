//! Local filesystem backends for appcast.
//!
//! Registers the `file` type for both roles: [`FileSource`] serves one
//! directory as a single release and [`FileTarget`] publishes below a root
//! directory.

mod source;
mod target;

pub use source::{DEFAULT_VERSION, FileSource};
pub use target::FileTarget;

use appcast_core::{SourceProvider, SourceRegistry, TargetProvider, TargetRegistry};
use std::sync::Arc;

/// Registry name of both backends.
pub const KIND: &str = "file";

/// Register the `file` source and target.
pub fn register(sources: &mut SourceRegistry, targets: &mut TargetRegistry) {
    sources.register(KIND, |config| {
        Ok(Arc::new(FileSource::from_config(config)?) as Arc<dyn SourceProvider>)
    });
    targets.register(KIND, |config| {
        Ok(Arc::new(FileTarget::from_config(config)?) as Arc<dyn TargetProvider>)
    });
}
