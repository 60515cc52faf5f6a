//! # ailib Core Plugin System Errors
//!
//! [`PluginSystemError`] covers everything that can go wrong while reading a
//! descriptor or loading a native module. Catalog lookups never produce one:
//! a miss is an unspecified key or `None`.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Library loading failed for '{plugin_id}': {source}")]
    LoadingError {
        plugin_id: String,
        path: Option<PathBuf>,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("FFI error in library '{plugin_id}' during operation '{operation}': {message}")]
    FfiError {
        plugin_id: String,
        operation: String,
        message: String,
    },

    #[error("Descriptor error for '{}': {message}", path.display())]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Library initialization error for '{plugin_id}': {message}")]
    InitializationError {
        plugin_id: String,
        message: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemErrorSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Library(#[from] libloading::Error),
    #[error("Other: {0}")]
    Other(String),
}
