//! # ailib Core Kernel
//!
//! Crate-wide building blocks shared by every subsystem:
//!
//! - **Constants**: well-known data directory layout and file names, in the
//!   `constants` submodule.
//! - **Error Handling**: the crate-level [`Error`](error::Error) and its
//!   `Result` alias, in the `error` submodule.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
