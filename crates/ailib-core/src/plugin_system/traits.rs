//! Seams between the manager and whatever actually loads native code.
//!
//! [`ModuleLoader`] opens an interface library and hands back its
//! [`InterfaceBinding`]; the interface in turn loads skirmish AIs and hands
//! back a [`SkirmishAiBinding`] per AI. The libloading-backed implementation
//! lives in [`loader`](crate::plugin_system::loader); tests substitute their own.
use std::fmt::Debug;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{InterfaceInfo, RawInfo};

/// Result of a call into a native module
pub type BindingResult<T> = std::result::Result<T, PluginSystemError>;

/// Entry points of one loaded skirmish AI
pub trait SkirmishAiBinding: Debug {
    /// Names of the entry points the module actually exports
    fn entry_points(&self) -> Vec<&'static str>;

    fn init(&self, skirmish_ai_id: i32) -> BindingResult<()>;

    fn release(&self, skirmish_ai_id: i32) -> BindingResult<()>;

    /// Forwards an event; the module's return code is passed back as-is.
    fn handle_event(&self, skirmish_ai_id: i32, topic: i32, data: &[u8]) -> BindingResult<i32>;
}

/// Entry points of one loaded AI interface library
pub trait InterfaceBinding: Debug {
    /// Per-library setup, called once right after loading
    fn init_static(&mut self) -> BindingResult<()>;

    /// Per-library teardown, called once before unloading
    fn release_static(&mut self) -> BindingResult<()>;

    /// Number of skirmish AIs the interface bundles (lookup support)
    fn skirmish_ai_count(&self) -> usize;

    /// Raw descriptor of bundled AI `index`
    fn skirmish_ai_info(&self, index: usize) -> RawInfo;

    /// Raw options blob of bundled AI `index`
    fn skirmish_ai_options(&self, index: usize) -> Option<String>;

    fn load_skirmish_ai(&mut self, short_name: &str, version: &str) -> BindingResult<Box<dyn SkirmishAiBinding>>;

    fn unload_skirmish_ai(&mut self, short_name: &str, version: &str) -> BindingResult<()>;

    fn unload_all_skirmish_ais(&mut self) -> BindingResult<()>;
}

/// Opens interface libraries
pub trait ModuleLoader: Debug {
    fn load_interface(&mut self, info: &InterfaceInfo) -> BindingResult<Box<dyn InterfaceBinding>>;
}
