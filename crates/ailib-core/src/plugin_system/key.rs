//! Identity values for catalog entries.
//!
//! A key with an empty short name is *unspecified*; [`Default`] produces one
//! and it is used wherever a lookup finds nothing. Unspecified keys never
//! appear in a catalog.
use std::fmt;

use serde::Serialize;

/// Identifies one installed version of an AI interface library
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InterfaceKey {
    short_name: String,
    version: String,
}

impl InterfaceKey {
    pub fn new(short_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            version: version.into(),
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True for the not-found sentinel
    pub fn is_unspecified(&self) -> bool {
        self.short_name.is_empty()
    }
}

impl fmt::Display for InterfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.short_name, self.version)
    }
}

/// Identifies one installed version of a skirmish AI, hosted by a specific interface.
///
/// The same AI name and version can be installed for two different interfaces;
/// those are distinct keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SkirmishAiKey {
    short_name: String,
    version: String,
    interface: InterfaceKey,
}

impl SkirmishAiKey {
    pub fn new(short_name: impl Into<String>, version: impl Into<String>, interface: InterfaceKey) -> Self {
        Self {
            short_name: short_name.into(),
            version: version.into(),
            interface,
        }
    }

    /// A request key with no interface; an empty `version` means "any version".
    pub fn loose(short_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(short_name, version, InterfaceKey::default())
    }

    /// Same AI name and version, hosted by `interface`
    pub fn with_interface(&self, interface: InterfaceKey) -> Self {
        Self {
            short_name: self.short_name.clone(),
            version: self.version.clone(),
            interface,
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn interface(&self) -> &InterfaceKey {
        &self.interface
    }

    /// True for the not-found sentinel
    pub fn is_unspecified(&self) -> bool {
        self.short_name.is_empty()
    }
}

impl fmt::Display for SkirmishAiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.short_name, self.version)?;
        if !self.interface.is_unspecified() {
            write!(f, " ({})", self.interface)?;
        }
        Ok(())
    }
}
