//! Discovery of installed interfaces and skirmish AIs.
//!
//! Both families live two directory levels below their root in every data
//! directory: `{root}/{shortName}/{version}/`. A candidate directory without
//! a descriptor file is not a plugin. Descriptors that fail to read or parse
//! are skipped, only logged at debug level.
//!
//! Skirmish AI discovery may load interface libraries: an interface that
//! advertises lookup support is fetched through the [`LoadedInterfaces`]
//! table so it can list the AIs it bundles. Those loads are counted like any
//! other fetch and are not released here.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error, warn};
use tokio::fs;

use crate::kernel::constants;
use crate::plugin_system::dependency::find_fitting_interface;
use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource};
use crate::plugin_system::key::{InterfaceKey, SkirmishAiKey};
use crate::plugin_system::manager::LoadedInterfaces;
use crate::plugin_system::manifest::{InterfaceInfo, RawInfo, SkirmishAiInfo};
use crate::plugin_system::registry::{Catalog, CatalogBuilder};
use crate::storage::config::ManagerConfig;

pub type InterfaceCatalog = Catalog<InterfaceKey, InterfaceInfo>;
pub type SkirmishAiCatalog = Catalog<SkirmishAiKey, SkirmishAiInfo>;

/// Where descriptors come from
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Every `{data_dir}/{root}/{*}/{*}` directory, data directories in
    /// priority order
    async fn candidate_dirs(&self, root: &Path) -> Vec<PathBuf>;

    /// `dir/file_name` if it exists and is a file
    async fn find_file(&self, dir: &Path, file_name: &str) -> Option<PathBuf>;

    async fn read_descriptor(&self, path: &Path) -> Result<RawInfo, PluginSystemError>;

    async fn read_options(&self, path: &Path) -> Result<String, PluginSystemError>;
}

/// Reads descriptors from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsDescriptorSource {
    data_dirs: Vec<PathBuf>,
}

impl FsDescriptorSource {
    pub fn new(data_dirs: Vec<PathBuf>) -> Self {
        Self { data_dirs }
    }

    pub fn data_dirs(&self) -> &[PathBuf] {
        &self.data_dirs
    }

    /// Sorted subdirectories of `dir`; unreadable directories yield nothing.
    async fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
        let mut read_dir = match fs::read_dir(dir).await {
            Ok(read_dir) => read_dir,
            Err(e) => {
                debug!("Skipping {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut dirs = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
                        dirs.push(path);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Error while listing {}: {}", dir.display(), e);
                    break;
                }
            }
        }
        dirs.sort();
        dirs
    }

    async fn read_to_string(path: &Path) -> Result<String, PluginSystemError> {
        fs::read_to_string(path).await.map_err(|e| PluginSystemError::LoadingError {
            plugin_id: path.display().to_string(),
            path: Some(path.to_path_buf()),
            source: Box::new(PluginSystemErrorSource::Io(e)),
        })
    }
}

#[async_trait]
impl DescriptorSource for FsDescriptorSource {
    async fn candidate_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        for data_dir in &self.data_dirs {
            for name_dir in Self::sorted_subdirs(&data_dir.join(root)).await {
                candidates.extend(Self::sorted_subdirs(&name_dir).await);
            }
        }
        candidates
    }

    async fn find_file(&self, dir: &Path, file_name: &str) -> Option<PathBuf> {
        let path = dir.join(file_name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    async fn read_descriptor(&self, path: &Path) -> Result<RawInfo, PluginSystemError> {
        let content = Self::read_to_string(path).await?;
        RawInfo::from_json(&content).map_err(|e| PluginSystemError::ManifestError {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        })
    }

    async fn read_options(&self, path: &Path) -> Result<String, PluginSystemError> {
        Self::read_to_string(path).await
    }
}

/// `{root}/{shortName}/common` for a `{root}/{shortName}/{version}` directory
fn common_dir(data_dir: &Path) -> PathBuf {
    match data_dir.parent() {
        Some(parent) => parent.join(constants::COMMON_DIR_NAME),
        None => data_dir.join(constants::COMMON_DIR_NAME),
    }
}

/// Builds the interface catalog.
///
/// Keys declared by more than one descriptor file are logged as errors; the
/// first file found wins.
pub async fn discover_interfaces(source: &dyn DescriptorSource, config: &ManagerConfig) -> InterfaceCatalog {
    let mut builder = CatalogBuilder::new();

    for dir in source.candidate_dirs(&config.interfaces_dir).await {
        let Some(info_file) = source.find_file(&dir, &config.interface_info_file).await else {
            continue;
        };

        let parsed = source.read_descriptor(&info_file).await.and_then(|raw| {
            InterfaceInfo::from_raw(raw).map_err(|e| PluginSystemError::ManifestError {
                path: info_file.clone(),
                message: e.to_string(),
                source: None,
            })
        });
        let mut info = match parsed {
            Ok(info) => info,
            Err(e) => {
                debug!("Ignoring interface candidate {}: {}", dir.display(), e);
                continue;
            }
        };

        info.set_data_dir(&dir);
        info.set_data_dir_common(common_dir(&dir));
        let key = info.key().clone();
        builder.register(key, info, info_file.display().to_string());
    }

    let (catalog, kept) = builder.finish();
    for (key, sources) in catalog.duplicates() {
        error!("Duplicate AI interface info found for interface {}", key);
        for path in sources {
            error!("\tin file {}", path);
        }
        if let Some(path) = kept.get(key) {
            error!("\tusing {}", path);
        }
    }
    catalog
}

/// Builds the skirmish AI catalog from descriptor files, then from every
/// interface that supports lookup (loading it if necessary).
///
/// AIs whose required interface cannot be resolved are logged as errors and
/// dropped. Keys declared more than once, across both phases, are logged as
/// warnings; the first declaration wins.
pub async fn discover_skirmish_ais(
    source: &dyn DescriptorSource,
    config: &ManagerConfig,
    interfaces: &InterfaceCatalog,
    loaded: &mut LoadedInterfaces,
) -> SkirmishAiCatalog {
    let mut builder = CatalogBuilder::new();

    // Descriptor files
    for dir in source.candidate_dirs(&config.skirmish_ais_dir).await {
        let Some(info_file) = source.find_file(&dir, &config.skirmish_ai_info_file).await else {
            continue;
        };

        let raw = match source.read_descriptor(&info_file).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Ignoring skirmish AI candidate {}: {}", dir.display(), e);
                continue;
            }
        };

        let options = match source.find_file(&dir, &config.skirmish_ai_options_file).await {
            Some(options_file) => match source.read_options(&options_file).await {
                Ok(options) => Some(options),
                Err(e) => {
                    debug!("Ignoring options of {}: {}", dir.display(), e);
                    None
                }
            },
            None => None,
        };

        let mut info = match SkirmishAiInfo::from_raw(raw, options) {
            Ok(info) => info,
            Err(e) => {
                debug!("Ignoring skirmish AI candidate {}: {}", info_file.display(), e);
                continue;
            }
        };
        info.set_data_dir(&dir);
        info.set_data_dir_common(common_dir(&dir));

        store_skirmish_ai_info(&mut builder, interfaces.keys(), info, info_file.display().to_string());
    }

    // Interface-provided: data dirs are the interface's business, not ours.
    for interface_info in interfaces.infos().values() {
        if !interface_info.is_lookup_supported() {
            continue;
        }
        let interface_key = interface_info.key();

        let Some(library) = loaded.fetch(interface_key, interfaces) else {
            warn!("Could not load AI interface {} to look up its skirmish AIs", interface_key);
            continue;
        };

        for index in 0..library.skirmish_ai_count() {
            let raw = library.skirmish_ai_info(index);
            let options = library.skirmish_ai_options(index);
            match SkirmishAiInfo::from_raw(raw, options) {
                Ok(info) => {
                    store_skirmish_ai_info(&mut builder, interfaces.keys(), info, interface_key.to_string())
                }
                Err(e) => debug!("Ignoring skirmish AI {} of interface {}: {}", index, interface_key, e),
            }
        }
    }

    let (catalog, kept) = builder.finish();
    for (key, sources) in catalog.duplicates() {
        warn!("Duplicate skirmish AI info found for skirmish AI {}", key);
        for declared_by in sources {
            warn!("\tin {}", declared_by);
        }
        if let Some(declared_by) = kept.get(key) {
            warn!("\tusing {}", declared_by);
        }
    }
    catalog
}

fn store_skirmish_ai_info(
    builder: &mut CatalogBuilder<SkirmishAiKey, SkirmishAiInfo>,
    interface_keys: &BTreeSet<InterfaceKey>,
    mut info: SkirmishAiInfo,
    source: String,
) {
    info.set_lua_ai(false);

    let interface = find_fitting_interface(info.interface_short_name(), info.interface_version(), interface_keys);
    if interface.is_unspecified() {
        error!(
            "Required AI interface {} {} for skirmish AI {} {} not found",
            info.interface_short_name(),
            info.interface_version(),
            info.short_name(),
            info.version()
        );
        return;
    }

    info.set_interface(interface);
    builder.register(info.key(), info, source);
}
