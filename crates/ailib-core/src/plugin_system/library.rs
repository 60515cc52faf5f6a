//! Loaded interface and skirmish AI libraries.
//!
//! An [`InterfaceLibrary`] owns every [`SkirmishAiLibrary`] it has loaded and
//! counts how often each was fetched. An AI is unloaded when its count drops
//! to zero; the interface itself may only be unloaded once the sum over all
//! its AIs is zero.
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, error, info};

use crate::plugin_system::key::{InterfaceKey, SkirmishAiKey};
use crate::plugin_system::manifest::{InterfaceInfo, RawInfo, SkirmishAiInfo};
use crate::plugin_system::traits::{BindingResult, InterfaceBinding, SkirmishAiBinding};

/// A loaded skirmish AI
pub struct SkirmishAiLibrary {
    key: SkirmishAiKey,
    binding: Box<dyn SkirmishAiBinding>,
}

impl SkirmishAiLibrary {
    pub fn new(key: SkirmishAiKey, binding: Box<dyn SkirmishAiBinding>) -> Self {
        Self { key, binding }
    }

    pub fn key(&self) -> &SkirmishAiKey {
        &self.key
    }

    pub fn entry_points(&self) -> Vec<&'static str> {
        self.binding.entry_points()
    }

    /// Starts one AI instance
    pub fn init(&self, skirmish_ai_id: i32) -> BindingResult<()> {
        self.binding.init(skirmish_ai_id)
    }

    /// Stops one AI instance
    pub fn release(&self, skirmish_ai_id: i32) -> BindingResult<()> {
        self.binding.release(skirmish_ai_id)
    }

    pub fn handle_event(&self, skirmish_ai_id: i32, topic: i32, data: &[u8]) -> BindingResult<i32> {
        self.binding.handle_event(skirmish_ai_id, topic, data)
    }
}

impl fmt::Debug for SkirmishAiLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkirmishAiLibrary")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A loaded AI interface and the skirmish AIs it currently hosts
pub struct InterfaceLibrary {
    info: InterfaceInfo,
    // Declared before `binding`: AI entry points live inside the interface's code.
    skirmish_ais: BTreeMap<SkirmishAiKey, SkirmishAiLibrary>,
    load_counts: BTreeMap<SkirmishAiKey, usize>,
    binding: Box<dyn InterfaceBinding>,
    initialized: bool,
}

impl InterfaceLibrary {
    /// Wraps a freshly loaded binding and runs its static initialization.
    ///
    /// A failed initialization is logged and leaves the library uninitialized.
    pub fn new(info: InterfaceInfo, mut binding: Box<dyn InterfaceBinding>) -> Self {
        let initialized = match binding.init_static() {
            Ok(()) => {
                info!("Loaded AI interface {}", info.key());
                true
            }
            Err(e) => {
                error!("Failed to initialize AI interface {}: {}", info.key(), e);
                false
            }
        };
        Self {
            info,
            skirmish_ais: BTreeMap::new(),
            load_counts: BTreeMap::new(),
            binding,
            initialized,
        }
    }

    pub fn key(&self) -> &InterfaceKey {
        self.info.key()
    }

    pub fn info(&self) -> &InterfaceInfo {
        &self.info
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Outstanding fetches summed over every hosted AI
    pub fn load_count(&self) -> usize {
        self.load_counts.values().sum()
    }

    /// Outstanding fetches of one AI
    pub fn skirmish_ai_load_count(&self, key: &SkirmishAiKey) -> usize {
        self.load_counts.get(key).copied().unwrap_or(0)
    }

    pub fn loaded_skirmish_ais(&self) -> impl Iterator<Item = &SkirmishAiKey> {
        self.skirmish_ais.keys()
    }

    /// Number of AIs bundled with this interface; zero without lookup support
    pub fn skirmish_ai_count(&self) -> usize {
        if !self.initialized || !self.info.is_lookup_supported() {
            return 0;
        }
        self.binding.skirmish_ai_count()
    }

    pub fn skirmish_ai_info(&self, index: usize) -> RawInfo {
        self.binding.skirmish_ai_info(index)
    }

    pub fn skirmish_ai_options(&self, index: usize) -> Option<String> {
        self.binding.skirmish_ai_options(index)
    }

    /// Loads the AI described by `info`, or reuses it if already loaded, and
    /// counts the fetch. Returns `None` if the interface fails to load it.
    pub fn fetch_skirmish_ai_library(&mut self, info: &SkirmishAiInfo) -> Option<&SkirmishAiLibrary> {
        if !self.initialized {
            return None;
        }
        let key = info.key();

        if !self.skirmish_ais.contains_key(&key) {
            match self.binding.load_skirmish_ai(info.short_name(), info.version()) {
                Ok(binding) => {
                    info!("Loaded skirmish AI {}", key);
                    self.skirmish_ais.insert(key.clone(), SkirmishAiLibrary::new(key.clone(), binding));
                }
                Err(e) => {
                    error!("AI interface {} failed to load skirmish AI {}: {}", self.key(), key, e);
                    return None;
                }
            }
        }

        *self.load_counts.entry(key.clone()).or_insert(0) += 1;
        self.skirmish_ais.get(&key)
    }

    /// Drops one fetch of `key`; the AI is unloaded once none are left.
    pub fn release_skirmish_ai_library(&mut self, key: &SkirmishAiKey) {
        let Some(count) = self.load_counts.get_mut(key) else {
            debug!("Skirmish AI {} is not loaded by interface {}", key, self.info.key());
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.load_counts.remove(key);
            self.unload_skirmish_ai(key);
        }
    }

    /// Unloads every hosted AI regardless of outstanding fetches.
    pub fn release_all_skirmish_ai_libraries(&mut self) {
        self.load_counts.clear();
        if self.skirmish_ais.is_empty() {
            return;
        }
        let count = self.skirmish_ais.len();
        self.skirmish_ais.clear();
        match self.binding.unload_all_skirmish_ais() {
            Ok(()) => info!("Unloaded {} skirmish AI(s) of interface {}", count, self.info.key()),
            Err(e) => error!("AI interface {} failed to unload its skirmish AIs: {}", self.info.key(), e),
        }
    }

    fn unload_skirmish_ai(&mut self, key: &SkirmishAiKey) {
        // Drop our handle before the interface frees the code behind it.
        if self.skirmish_ais.remove(key).is_none() {
            return;
        }
        match self.binding.unload_skirmish_ai(key.short_name(), key.version()) {
            Ok(()) => info!("Unloaded skirmish AI {}", key),
            Err(e) => error!("AI interface {} failed to unload skirmish AI {}: {}", self.info.key(), key, e),
        }
    }
}

impl Drop for InterfaceLibrary {
    fn drop(&mut self) {
        if !self.initialized {
            return;
        }
        self.release_all_skirmish_ai_libraries();
        match self.binding.release_static() {
            Ok(()) => info!("Unloaded AI interface {}", self.info.key()),
            Err(e) => error!("Failed to release AI interface {}: {}", self.info.key(), e),
        }
    }
}

impl fmt::Debug for InterfaceLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceLibrary")
            .field("key", self.info.key())
            .field("initialized", &self.initialized)
            .field("load_counts", &self.load_counts)
            .finish_non_exhaustive()
    }
}
