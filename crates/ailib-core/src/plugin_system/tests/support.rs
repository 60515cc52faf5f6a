//! Mock bindings and on-disk fixtures shared by the plugin system tests.
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource};
use crate::plugin_system::key::InterfaceKey;
use crate::plugin_system::manifest::{InterfaceInfo, RawInfo};
use crate::plugin_system::traits::{BindingResult, InterfaceBinding, ModuleLoader, SkirmishAiBinding};

/// Records every call made into mock native code
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }
}

/// How one mock interface behaves
#[derive(Debug, Clone, Default)]
pub struct MockInterface {
    pub fail_load: bool,
    pub fail_init: bool,
    /// Descriptors of the AIs listed through lookup
    pub bundled: Vec<RawInfo>,
    /// AI short names whose load fails
    pub broken_ais: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    log: CallLog,
    interfaces: BTreeMap<InterfaceKey, MockInterface>,
}

impl MockLoader {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            interfaces: BTreeMap::new(),
        }
    }

    pub fn with_interface(mut self, key: InterfaceKey, behaviour: MockInterface) -> Self {
        self.interfaces.insert(key, behaviour);
        self
    }
}

impl ModuleLoader for MockLoader {
    fn load_interface(&mut self, info: &InterfaceInfo) -> BindingResult<Box<dyn InterfaceBinding>> {
        let key = info.key().clone();
        self.log.push(format!("load_interface {}", key));
        let behaviour = self.interfaces.get(&key).cloned().unwrap_or_default();
        if behaviour.fail_load {
            return Err(PluginSystemError::LoadingError {
                plugin_id: key.to_string(),
                path: None,
                source: Box::new(PluginSystemErrorSource::Other("mock load failure".to_string())),
            });
        }
        Ok(Box::new(MockInterfaceBinding::new(key, behaviour, self.log.clone())))
    }
}

#[derive(Debug)]
pub struct MockInterfaceBinding {
    key: InterfaceKey,
    behaviour: MockInterface,
    log: CallLog,
}

impl MockInterfaceBinding {
    pub fn new(key: InterfaceKey, behaviour: MockInterface, log: CallLog) -> Self {
        Self { key, behaviour, log }
    }
}

impl InterfaceBinding for MockInterfaceBinding {
    fn init_static(&mut self) -> BindingResult<()> {
        self.log.push(format!("init_static {}", self.key));
        if self.behaviour.fail_init {
            return Err(PluginSystemError::InitializationError {
                plugin_id: self.key.to_string(),
                message: "mock init failure".to_string(),
            });
        }
        Ok(())
    }

    fn release_static(&mut self) -> BindingResult<()> {
        self.log.push(format!("release_static {}", self.key));
        Ok(())
    }

    fn skirmish_ai_count(&self) -> usize {
        self.behaviour.bundled.len()
    }

    fn skirmish_ai_info(&self, index: usize) -> RawInfo {
        self.behaviour.bundled.get(index).cloned().unwrap_or_default()
    }

    fn skirmish_ai_options(&self, index: usize) -> Option<String> {
        self.behaviour.bundled.get(index).map(|_| format!("options of AI {}", index))
    }

    fn load_skirmish_ai(&mut self, short_name: &str, version: &str) -> BindingResult<Box<dyn SkirmishAiBinding>> {
        self.log.push(format!("load_ai {} {}", short_name, version));
        if self.behaviour.broken_ais.iter().any(|name| name == short_name) {
            return Err(PluginSystemError::FfiError {
                plugin_id: self.key.to_string(),
                operation: "loadSkirmishAILibrary".to_string(),
                message: "mock AI load failure".to_string(),
            });
        }
        Ok(Box::new(MockSkirmishAi {
            name: format!("{} {}", short_name, version),
            log: self.log.clone(),
        }))
    }

    fn unload_skirmish_ai(&mut self, short_name: &str, version: &str) -> BindingResult<()> {
        self.log.push(format!("unload_ai {} {}", short_name, version));
        Ok(())
    }

    fn unload_all_skirmish_ais(&mut self) -> BindingResult<()> {
        self.log.push(format!("unload_all {}", self.key));
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockSkirmishAi {
    name: String,
    log: CallLog,
}

impl SkirmishAiBinding for MockSkirmishAi {
    fn entry_points(&self) -> Vec<&'static str> {
        vec!["init", "release", "handleEvent"]
    }

    fn init(&self, skirmish_ai_id: i32) -> BindingResult<()> {
        self.log.push(format!("ai_init {} #{}", self.name, skirmish_ai_id));
        Ok(())
    }

    fn release(&self, skirmish_ai_id: i32) -> BindingResult<()> {
        self.log.push(format!("ai_release {} #{}", self.name, skirmish_ai_id));
        Ok(())
    }

    fn handle_event(&self, _skirmish_ai_id: i32, topic: i32, data: &[u8]) -> BindingResult<i32> {
        Ok(topic + data.len() as i32)
    }
}

pub fn raw(pairs: &[(&str, &str)]) -> RawInfo {
    RawInfo::from_pairs(pairs.iter().copied())
}

pub fn interface_info(short_name: &str, version: &str) -> InterfaceInfo {
    InterfaceInfo::from_raw(raw(&[("shortName", short_name), ("version", version)])).unwrap()
}

/// Bundled AI descriptor as an interface would list it
pub fn bundled_ai(short_name: &str, version: &str, interface: &str, interface_version: &str) -> RawInfo {
    raw(&[
        ("shortName", short_name),
        ("version", version),
        ("interfaceShortName", interface),
        ("interfaceVersion", interface_version),
    ])
}

/// Writes `{data_dir}/AI/Interfaces/{name}/{version}/InterfaceInfo.json`
pub fn write_interface(data_dir: &Path, short_name: &str, version: &str, supports_lookup: bool) {
    let dir = data_dir.join("AI/Interfaces").join(short_name).join(version);
    std::fs::create_dir_all(&dir).unwrap();
    let descriptor = serde_json::json!({
        "shortName": short_name,
        "version": version,
        "name": format!("{} interface", short_name),
        "supportsLookup": supports_lookup,
    });
    std::fs::write(dir.join("InterfaceInfo.json"), descriptor.to_string()).unwrap();
}

/// Writes `{data_dir}/AI/Skirmish/{name}/{version}/AIInfo.json` in the
/// key/value list form, plus `AIOptions.json` if `options` is given
pub fn write_skirmish_ai(
    data_dir: &Path,
    short_name: &str,
    version: &str,
    interface: &str,
    interface_version: &str,
    options: Option<&str>,
) {
    let dir = data_dir.join("AI/Skirmish").join(short_name).join(version);
    std::fs::create_dir_all(&dir).unwrap();
    let descriptor = serde_json::json!([
        { "key": "shortName", "value": short_name, "desc": "machine conform name" },
        { "key": "version", "value": version },
        { "key": "interfaceShortName", "value": interface },
        { "key": "interfaceVersion", "value": interface_version },
    ]);
    std::fs::write(dir.join("AIInfo.json"), descriptor.to_string()).unwrap();
    if let Some(options) = options {
        std::fs::write(dir.join("AIOptions.json"), options).unwrap();
    }
}
