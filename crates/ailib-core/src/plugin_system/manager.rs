use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug, Write as _};

use log::{debug, error, info, warn};

use crate::plugin_system::dependency::{fitting_skirmish_ai_keys, resolve_skirmish_ai};
use crate::plugin_system::discovery::{
    DescriptorSource, FsDescriptorSource, InterfaceCatalog, SkirmishAiCatalog, discover_interfaces,
    discover_skirmish_ais,
};
use crate::plugin_system::key::{InterfaceKey, SkirmishAiKey};
use crate::plugin_system::library::{InterfaceLibrary, SkirmishAiLibrary};
use crate::plugin_system::loader::NativeModuleLoader;
use crate::plugin_system::manifest::{InterfaceInfo, SkirmishAiInfo};
use crate::plugin_system::traits::ModuleLoader;
use crate::storage::config::ManagerConfig;

/// Interface libraries currently loaded, at most one per key.
///
/// A key whose load failed maps to `None` (a tombstone) and is not retried
/// until the table is cleared.
pub struct LoadedInterfaces {
    loader: Box<dyn ModuleLoader>,
    libraries: BTreeMap<InterfaceKey, Option<InterfaceLibrary>>,
}

impl LoadedInterfaces {
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            libraries: BTreeMap::new(),
        }
    }

    /// Returns the loaded library for `key`, loading it first if the catalog
    /// knows it. Unknown keys and tombstoned keys yield `None`.
    pub fn fetch(&mut self, key: &InterfaceKey, catalog: &InterfaceCatalog) -> Option<&mut InterfaceLibrary> {
        if !self.libraries.contains_key(key) {
            let info = catalog.get(key)?;
            let library = self.load(info);
            if library.is_none() {
                error!("AI interface {} failed to load; it will not be retried", key);
            }
            // Stored even on failure, so a broken library is not reloaded on every call.
            self.libraries.insert(key.clone(), library);
        }
        self.libraries.get_mut(key).and_then(Option::as_mut)
    }

    fn load(&mut self, info: &InterfaceInfo) -> Option<InterfaceLibrary> {
        match self.loader.load_interface(info) {
            Ok(binding) => {
                let library = InterfaceLibrary::new(info.clone(), binding);
                library.is_initialized().then_some(library)
            }
            Err(e) => {
                error!("Could not load AI interface {}: {}", info.key(), e);
                None
            }
        }
    }

    /// The library for `key` if it is loaded; never loads.
    pub fn get(&self, key: &InterfaceKey) -> Option<&InterfaceLibrary> {
        self.libraries.get(key).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, key: &InterfaceKey) -> Option<&mut InterfaceLibrary> {
        self.libraries.get_mut(key).and_then(Option::as_mut)
    }

    /// Unloads the library for `key` if none of its AIs are still fetched.
    /// Anything else is a no-op.
    pub fn release(&mut self, key: &InterfaceKey) {
        let Some(Some(library)) = self.libraries.get(key) else {
            return;
        };
        if library.load_count() != 0 {
            debug!("AI interface {} still hosts {} skirmish AI fetches", key, library.load_count());
            return;
        }
        self.libraries.remove(key);
    }

    /// Unloads every AI and every interface. Failed loads stay tombstoned.
    pub fn release_everything(&mut self) {
        let keys: Vec<InterfaceKey> = self.libraries.keys().cloned().collect();
        for key in &keys {
            let Some(library) = self.get_mut(key) else {
                continue;
            };
            if !library.is_initialized() {
                continue;
            }
            library.release_all_skirmish_ai_libraries();
            self.release(key);
        }

        self.libraries.retain(|_, library| library.is_none());
    }

    /// Releases everything and forgets failed loads.
    pub fn clear(&mut self) {
        self.release_everything();
        self.libraries.clear();
    }

    /// Keys of the successfully loaded interfaces
    pub fn loaded_keys(&self) -> Vec<InterfaceKey> {
        self.libraries
            .iter()
            .filter(|(_, library)| library.is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Whether a load of `key` was attempted and failed
    pub fn is_tombstoned(&self, key: &InterfaceKey) -> bool {
        matches!(self.libraries.get(key), Some(None))
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl Debug for LoadedInterfaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedInterfaces")
            .field("loader", &self.loader)
            .field("libraries", &self.libraries)
            .finish()
    }
}

/// Catalog of installed AI interfaces and skirmish AIs, plus the libraries
/// currently loaded from them.
///
/// Constructed explicitly and owned by whoever needs it. Dropping the manager
/// unloads everything it loaded.
pub struct AiLibraryManager {
    config: ManagerConfig,
    source: Box<dyn DescriptorSource>,
    interfaces: InterfaceCatalog,
    skirmish_ais: SkirmishAiCatalog,
    loaded: LoadedInterfaces,
}

impl AiLibraryManager {
    /// An empty manager; call [`discover`](Self::discover) to fill it.
    pub fn new(config: ManagerConfig, source: Box<dyn DescriptorSource>, loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            config,
            source,
            interfaces: InterfaceCatalog::new(),
            skirmish_ais: SkirmishAiCatalog::new(),
            loaded: LoadedInterfaces::new(loader),
        }
    }

    /// An empty manager reading descriptors from the configured data
    /// directories and loading native libraries.
    pub fn from_config(config: ManagerConfig) -> Self {
        let source = FsDescriptorSource::new(config.data_dirs.clone());
        let loader = NativeModuleLoader::new(config.interface_library_name.clone());
        Self::new(config, Box::new(source), Box::new(loader))
    }

    /// [`from_config`](Self::from_config) followed by discovery
    pub async fn open(config: ManagerConfig) -> Self {
        let mut manager = Self::from_config(config);
        manager.discover().await;
        manager
    }

    /// Rebuilds both catalogs from scratch.
    ///
    /// Everything loaded is released first, failed loads included, so every
    /// interface gets a fresh chance. Interfaces supporting AI lookup are
    /// loaded during discovery and stay loaded until released.
    pub async fn discover(&mut self) {
        self.clear();

        let interfaces = discover_interfaces(self.source.as_ref(), &self.config).await;
        let skirmish_ais =
            discover_skirmish_ais(self.source.as_ref(), &self.config, &interfaces, &mut self.loaded).await;

        info!(
            "Discovered {} AI interface(s) and {} skirmish AI(s)",
            interfaces.len(),
            skirmish_ais.len()
        );
        self.interfaces = interfaces;
        self.skirmish_ais = skirmish_ais;
    }

    /// Releases everything and empties both catalogs.
    pub fn close(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        if !self.loaded.loaded_keys().is_empty() {
            warn!("Releasing all loaded AI libraries");
        }
        self.loaded.clear();
        self.interfaces = InterfaceCatalog::new();
        self.skirmish_ais = SkirmishAiCatalog::new();
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn interface_keys(&self) -> &BTreeSet<InterfaceKey> {
        self.interfaces.keys()
    }

    pub fn skirmish_ai_keys(&self) -> &BTreeSet<SkirmishAiKey> {
        self.skirmish_ais.keys()
    }

    pub fn interface_infos(&self) -> &BTreeMap<InterfaceKey, InterfaceInfo> {
        self.interfaces.infos()
    }

    pub fn skirmish_ai_infos(&self) -> &BTreeMap<SkirmishAiKey, SkirmishAiInfo> {
        self.skirmish_ais.infos()
    }

    pub fn duplicate_interface_infos(&self) -> &BTreeMap<InterfaceKey, BTreeSet<String>> {
        self.interfaces.duplicates()
    }

    pub fn duplicate_skirmish_ai_infos(&self) -> &BTreeMap<SkirmishAiKey, BTreeSet<String>> {
        self.skirmish_ais.duplicates()
    }

    /// Every installed AI matching a loose request
    pub fn fitting_skirmish_ai_keys(&self, request: &SkirmishAiKey) -> Vec<SkirmishAiKey> {
        fitting_skirmish_ai_keys(request, self.skirmish_ais.keys())
    }

    /// The newest installed AI matching a loose request, or an unspecified key
    pub fn resolve_skirmish_ai_key(&self, request: &SkirmishAiKey) -> SkirmishAiKey {
        resolve_skirmish_ai(request, self.skirmish_ais.keys())
    }

    /// Loads the interface if needed; `None` for unknown or failed interfaces.
    pub fn fetch_interface(&mut self, key: &InterfaceKey) -> Option<&InterfaceLibrary> {
        self.loaded.fetch(key, &self.interfaces).map(|library| &*library)
    }

    /// Unloads the interface if it hosts no fetched AI.
    pub fn release_interface(&mut self, key: &InterfaceKey) {
        self.loaded.release(key);
    }

    /// Loads the AI (and its interface) if needed and counts the fetch.
    pub fn fetch_skirmish_ai_library(&mut self, key: &SkirmishAiKey) -> Option<&SkirmishAiLibrary> {
        let Some(info) = self.skirmish_ais.get(key) else {
            error!("Unknown skirmish AI {} specified", key);
            return None;
        };

        let library = self.loaded.fetch(key.interface(), &self.interfaces)?;
        if !library.is_initialized() {
            return None;
        }
        library.fetch_skirmish_ai_library(info)
    }

    /// Drops one fetch of the AI, then unloads its interface if that was the
    /// last AI fetch it hosted.
    pub fn release_skirmish_ai_library(&mut self, key: &SkirmishAiKey) {
        // Release never loads: an interface that is not loaded hosts nothing.
        let Some(library) = self.loaded.get_mut(key.interface()) else {
            return;
        };
        if !library.is_initialized() {
            return;
        }
        library.release_skirmish_ai_library(key);
        self.loaded.release(key.interface());
    }

    /// Unloads every AI and interface regardless of outstanding fetches.
    pub fn release_everything(&mut self) {
        if !self.loaded.loaded_keys().is_empty() {
            warn!("Releasing all loaded AI libraries");
        }
        self.loaded.release_everything();
    }

    /// Keys of the interfaces currently loaded
    pub fn loaded_interfaces(&self) -> Vec<InterfaceKey> {
        self.loaded.loaded_keys()
    }

    pub fn loaded_interface(&self, key: &InterfaceKey) -> Option<&InterfaceLibrary> {
        self.loaded.get(key)
    }

    /// Name/version table of the installed interfaces
    pub fn interfaces_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#");
        let _ = writeln!(out, "# Available AI Interfaces");
        let _ = writeln!(out, "# -----------------------");
        let _ = writeln!(out, "# {:<20} {}", "[Name]", "[Version]");
        for key in self.interfaces.keys() {
            let _ = writeln!(out, "  {:<20} {}", key.short_name(), key.version());
        }
        for (key, sources) in self.interfaces.duplicates() {
            write_duplicate(&mut out, "AI interface", &key.to_string(), sources);
        }
        let _ = writeln!(out, "#");
        out
    }

    /// Name/version/interface table of the installed skirmish AIs
    pub fn skirmish_ais_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#");
        let _ = writeln!(out, "# Available Skirmish AIs");
        let _ = writeln!(out, "# ----------------------");
        let _ = writeln!(
            out,
            "# {:<20} {:<20} {:<20} {}",
            "[Name]", "[Version]", "[Interface-name]", "[Interface-version]"
        );
        for key in self.skirmish_ais.keys() {
            let _ = writeln!(
                out,
                "  {:<20} {:<20} {:<20} {}",
                key.short_name(),
                key.version(),
                key.interface().short_name(),
                key.interface().version()
            );
        }
        for (key, sources) in self.skirmish_ais.duplicates() {
            let name = format!("{} {}", key.short_name(), key.version());
            write_duplicate(&mut out, "skirmish AI", &name, sources);
        }
        let _ = writeln!(out, "#");
        out
    }
}

fn write_duplicate(out: &mut String, family: &str, name: &str, sources: &BTreeSet<String>) {
    let _ = writeln!(out, "# WARNING: Duplicate {} info found:", family);
    let _ = writeln!(out, "# \tfor {}: {}", family, name);
    let _ = writeln!(out, "# \tin:");
    for source in sources {
        let _ = writeln!(out, "# \t{}", source);
    }
}

impl Drop for AiLibraryManager {
    fn drop(&mut self) {
        self.loaded.release_everything();
    }
}

impl Debug for AiLibraryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiLibraryManager")
            .field("config", &self.config)
            .field("interfaces", &self.interfaces.len())
            .field("skirmish_ais", &self.skirmish_ais.len())
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}
