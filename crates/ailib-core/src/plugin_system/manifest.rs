//! Descriptor records for discovered plugins.
//!
//! A descriptor starts life as a [`RawInfo`] table (read from a JSON
//! descriptor file or handed over by an interface library) and is turned into
//! an [`InterfaceInfo`] or [`SkirmishAiInfo`]. Descriptors are plain values;
//! cloning one never shares state.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::plugin_system::key::{InterfaceKey, SkirmishAiKey};

pub const KEY_SHORT_NAME: &str = "shortname";
pub const KEY_VERSION: &str = "version";
pub const KEY_INTERFACE_SHORT_NAME: &str = "interfaceshortname";
pub const KEY_INTERFACE_VERSION: &str = "interfaceversion";
pub const KEY_SUPPORTS_LOOKUP: &str = "supportslookup";

/// A descriptor could not be turned into an info record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InfoError {
    #[error("descriptor has no '{0}' entry")]
    MissingField(&'static str),
    #[error("descriptor is not valid JSON: {0}")]
    Malformed(String),
}

// --- Intermediate structs for deserialization ---

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawDescriptor {
    /// `[{ "key": "shortName", "value": "RAI", "desc": "..." }, ...]`
    Entries(Vec<RawEntry>),
    /// `{ "shortName": "RAI", ... }`
    Table(BTreeMap<String, serde_json::Value>),
}

#[derive(Deserialize, Debug)]
struct RawEntry {
    key: String,
    #[serde(default)]
    value: serde_json::Value,
}

fn value_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// --- End Intermediate structs ---

/// Key/value table of one descriptor. Keys are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInfo {
    values: BTreeMap<String, String>,
}

impl RawInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut info = Self::new();
        for (key, value) in pairs {
            info.insert(key.as_ref(), value);
        }
        info
    }

    /// Parses the JSON descriptor format, either shape.
    pub fn from_json(content: &str) -> Result<Self, InfoError> {
        let raw: RawDescriptor = serde_json::from_str(content)
            .map_err(|e| InfoError::Malformed(e.to_string()))?;
        let info = match raw {
            RawDescriptor::Entries(entries) => {
                Self::from_pairs(entries.into_iter().map(|e| (e.key, value_to_string(e.value))))
            }
            RawDescriptor::Table(table) => {
                Self::from_pairs(table.into_iter().map(|(k, v)| (k, value_to_string(v))))
            }
        };
        Ok(info)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Value for `key`, or `""`
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|v| v.trim().to_lowercase()).as_deref(),
            Some("true" | "1" | "yes")
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn required(&self, key: &'static str) -> Result<&str, InfoError> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(InfoError::MissingField(key)),
        }
    }
}

/// Metadata of one discovered AI interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceInfo {
    key: InterfaceKey,
    data_dir: Option<PathBuf>,
    data_dir_common: Option<PathBuf>,
    lookup_supported: bool,
    info: RawInfo,
}

impl InterfaceInfo {
    /// Builds the record; `shortName` is mandatory, `version` defaults to `""`.
    pub fn from_raw(info: RawInfo) -> Result<Self, InfoError> {
        let key = InterfaceKey::new(info.required(KEY_SHORT_NAME)?, info.get_or_empty(KEY_VERSION));
        Ok(Self {
            key,
            data_dir: None,
            data_dir_common: None,
            lookup_supported: info.flag(KEY_SUPPORTS_LOOKUP),
            info,
        })
    }

    pub fn key(&self) -> &InterfaceKey {
        &self.key
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn data_dir_common(&self) -> Option<&Path> {
        self.data_dir_common.as_deref()
    }

    pub fn set_data_dir(&mut self, dir: impl Into<PathBuf>) {
        self.data_dir = Some(dir.into());
    }

    pub fn set_data_dir_common(&mut self, dir: impl Into<PathBuf>) {
        self.data_dir_common = Some(dir.into());
    }

    /// Whether the interface library can list skirmish AIs it bundles
    pub fn is_lookup_supported(&self) -> bool {
        self.lookup_supported
    }

    pub fn info(&self) -> &RawInfo {
        &self.info
    }
}

/// Metadata of one discovered skirmish AI.
///
/// The full [`SkirmishAiKey`] needs the hosting interface, which is only known
/// once discovery has resolved the declared interface name and minimum version.
#[derive(Debug, Clone, PartialEq)]
pub struct SkirmishAiInfo {
    short_name: String,
    version: String,
    interface_short_name: String,
    interface_version: String,
    interface: Option<InterfaceKey>,
    data_dir: Option<PathBuf>,
    data_dir_common: Option<PathBuf>,
    lua_ai: bool,
    info: RawInfo,
    options: Option<String>,
}

impl SkirmishAiInfo {
    /// Builds the record; `shortName` and `interfaceShortName` are mandatory.
    pub fn from_raw(info: RawInfo, options: Option<String>) -> Result<Self, InfoError> {
        Ok(Self {
            short_name: info.required(KEY_SHORT_NAME)?.to_string(),
            version: info.get_or_empty(KEY_VERSION).to_string(),
            interface_short_name: info.required(KEY_INTERFACE_SHORT_NAME)?.to_string(),
            interface_version: info.get_or_empty(KEY_INTERFACE_VERSION).to_string(),
            interface: None,
            data_dir: None,
            data_dir_common: None,
            lua_ai: false,
            info,
            options,
        })
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Interface name this AI declares it needs
    pub fn interface_short_name(&self) -> &str {
        &self.interface_short_name
    }

    /// Minimum interface version this AI declares it needs
    pub fn interface_version(&self) -> &str {
        &self.interface_version
    }

    /// The resolved hosting interface, once known
    pub fn interface(&self) -> Option<&InterfaceKey> {
        self.interface.as_ref()
    }

    pub fn set_interface(&mut self, interface: InterfaceKey) {
        self.interface = Some(interface);
    }

    /// Full key if the interface is resolved, otherwise a key with an unspecified interface
    pub fn key(&self) -> SkirmishAiKey {
        SkirmishAiKey::new(
            self.short_name.clone(),
            self.version.clone(),
            self.interface.clone().unwrap_or_default(),
        )
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn data_dir_common(&self) -> Option<&Path> {
        self.data_dir_common.as_deref()
    }

    pub fn set_data_dir(&mut self, dir: impl Into<PathBuf>) {
        self.data_dir = Some(dir.into());
    }

    pub fn set_data_dir_common(&mut self, dir: impl Into<PathBuf>) {
        self.data_dir_common = Some(dir.into());
    }

    /// Script-driven AIs are hosted by the simulation itself, never by an interface
    pub fn is_lua_ai(&self) -> bool {
        self.lua_ai
    }

    pub fn set_lua_ai(&mut self, lua_ai: bool) {
        self.lua_ai = lua_ai;
    }

    pub fn info(&self) -> &RawInfo {
        &self.info
    }

    /// Raw options blob, passed through untouched
    pub fn options(&self) -> Option<&str> {
        self.options.as_deref()
    }
}
