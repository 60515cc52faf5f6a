//! # ailib Core Storage
//!
//! Configuration for discovery and loading: [`ManagerConfig`] and the file
//! formats it can be read from.
pub mod config;

pub use config::{ConfigError, ConfigFormat, ManagerConfig};

// Test module declaration
#[cfg(test)]
mod tests;
