pub mod kernel;
pub mod plugin_system;
pub mod storage;

// Re-export key public types for the binary and embedders
pub use kernel::error::Error as KernelError;
pub use plugin_system::{AiLibraryManager, InterfaceKey, PluginSystemError, SkirmishAiKey};
pub use storage::ManagerConfig;
