//! # ailib Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] type and the [`Result`] alias.
//!
//! Subsystem errors ([`PluginSystemError`], [`ConfigError`]) convert into
//! [`Error`] through `#[from]`, so `?` works across module boundaries.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::PluginSystemError;
use crate::storage::config::ConfigError;

/// Top-level error for the ailib core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Configuration loading or parsing failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
