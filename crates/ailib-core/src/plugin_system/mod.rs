//! # ailib Core Plugin System
//!
//! Discovery, cataloguing and lifecycle of the two AI plugin families: AI
//! interfaces (native libraries) and the skirmish AIs hosted by them.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`version`]**: Segment-wise comparison of free-form version strings.
//! - **[`key`]**: The identities [`InterfaceKey`] and [`SkirmishAiKey`] that
//!   catalogs and loaded tables are keyed by.
//! - **[`manifest`]**: Descriptor parsing ([`RawInfo`]) and the typed
//!   [`InterfaceInfo`] and [`SkirmishAiInfo`] built from it.
//! - **[`registry`]**: First-seen-wins [`Catalog`]s with duplicate tracking.
//! - **[`discovery`]**: Walks the data directories (or lists AIs through a
//!   loaded interface) and fills the catalogs.
//! - **[`dependency`]**: Picks the interface a skirmish AI runs on and resolves
//!   loose AI requests to full keys.
//! - **[`traits`]**: The seams between the manager and native code:
//!   [`ModuleLoader`], [`InterfaceBinding`] and [`SkirmishAiBinding`].
//! - **[`loader`]**: [`NativeModuleLoader`], the `libloading` implementation
//!   of those seams.
//! - **[`library`]**: Loaded interface and skirmish AI handles, with per-AI
//!   load counts.
//! - **[`manager`]**: [`AiLibraryManager`], the owner of catalogs and loaded
//!   libraries.
//! - **[`error`]**: [`PluginSystemError`] and its sources.
pub mod dependency;
pub mod discovery;
pub mod error;
pub mod key;
pub mod library;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod traits;
pub mod version;

pub use discovery::{DescriptorSource, FsDescriptorSource, InterfaceCatalog, SkirmishAiCatalog};
pub use error::PluginSystemError;
pub use key::{InterfaceKey, SkirmishAiKey};
pub use library::{InterfaceLibrary, SkirmishAiLibrary};
pub use loader::NativeModuleLoader;
pub use manager::{AiLibraryManager, LoadedInterfaces};
pub use manifest::{InfoError, InterfaceInfo, RawInfo, SkirmishAiInfo};
pub use registry::{Catalog, CatalogBuilder};
pub use traits::{InterfaceBinding, ModuleLoader, SkirmishAiBinding};
pub use version::{compare_versions, version_compare};
// Test module declaration
#[cfg(test)]
mod tests;
