/// Application name
pub const APP_NAME: &str = "ailib";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// AI interfaces root, relative to each data directory
pub const AI_INTERFACES_DATA_DIR: &str = "AI/Interfaces";

/// Skirmish AIs root, relative to each data directory
pub const SKIRMISH_AI_DATA_DIR: &str = "AI/Skirmish";

/// Name of the shared-resource sibling of every versioned plugin directory
pub const COMMON_DIR_NAME: &str = "common";

/// Interface descriptor file, looked up in `{AI_INTERFACES_DATA_DIR}/{*}/{*}/`
pub const INTERFACE_INFO_FILE: &str = "InterfaceInfo.json";

/// Skirmish AI descriptor file, looked up in `{SKIRMISH_AI_DATA_DIR}/{*}/{*}/`
pub const SKIRMISH_AI_INFO_FILE: &str = "AIInfo.json";

/// Optional companion options file next to the skirmish AI descriptor
pub const SKIRMISH_AI_OPTIONS_FILE: &str = "AIOptions.json";

/// Stem of the native interface library; the platform prefix/suffix is added at load time
pub const INTERFACE_LIBRARY_NAME: &str = "AIInterface";
