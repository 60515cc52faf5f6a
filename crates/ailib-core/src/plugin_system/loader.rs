//! Native interface libraries, loaded with `libloading`.
//!
//! An interface library is `{data_dir}/{lib}AIInterface{.so,.dylib,.dll}` and
//! exports these C entry points:
//!
//! | symbol                           | signature                                              |
//! |----------------------------------|--------------------------------------------------------|
//! | `initStatic`                     | `(int interfaceId, const void* callback) -> int`       |
//! | `releaseStatic`                  | `() -> int`                                            |
//! | `loadSkirmishAILibrary`          | `(const char* shortName, const char* version) -> const FfiSkirmishAiLibrary*` |
//! | `unloadSkirmishAILibrary`        | `(const char* shortName, const char* version) -> int`  |
//! | `unloadAllSkirmishAILibraries`   | `() -> int`                                            |
//!
//! Interfaces that support AI lookup additionally export
//! `listSkirmishAILibraries`, `listSkirmishAILibraryInfos`,
//! `listSkirmishAILibraryInfoKey`, `listSkirmishAILibraryInfoValue` and
//! `listSkirmishAILibraryOptions`. Status codes are `0` for success.
//! The host callback pointer is always null; host callbacks are not part of
//! this crate.
use std::ffi::{CStr, CString, c_void};
use std::os::raw::{c_char, c_int};
use std::panic;
use std::path::PathBuf;

use libloading::{Library, Symbol};
use log::debug;

use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource};
use crate::plugin_system::manifest::{InterfaceInfo, RawInfo};
use crate::plugin_system::traits::{BindingResult, InterfaceBinding, ModuleLoader, SkirmishAiBinding};

type InitStaticFn = unsafe extern "C-unwind" fn(interface_id: c_int, callback: *const c_void) -> c_int;
type ReleaseStaticFn = unsafe extern "C-unwind" fn() -> c_int;
type LoadSkirmishAiFn =
    unsafe extern "C-unwind" fn(short_name: *const c_char, version: *const c_char) -> *const FfiSkirmishAiLibrary;
type UnloadSkirmishAiFn = unsafe extern "C-unwind" fn(short_name: *const c_char, version: *const c_char) -> c_int;
type UnloadAllSkirmishAisFn = unsafe extern "C-unwind" fn() -> c_int;
type ListSkirmishAisFn = unsafe extern "C-unwind" fn(interface_id: c_int) -> c_int;
type ListSkirmishAiInfosFn = unsafe extern "C-unwind" fn(interface_id: c_int, ai_index: c_int) -> c_int;
type ListSkirmishAiInfoStrFn =
    unsafe extern "C-unwind" fn(interface_id: c_int, ai_index: c_int, info_index: c_int) -> *const c_char;
type ListSkirmishAiOptionsFn = unsafe extern "C-unwind" fn(interface_id: c_int, ai_index: c_int) -> *const c_char;

type AiInitFn = unsafe extern "C-unwind" fn(skirmish_ai_id: c_int, callback: *const c_void) -> c_int;
type AiReleaseFn = unsafe extern "C-unwind" fn(skirmish_ai_id: c_int) -> c_int;
type AiHandleEventFn = unsafe extern "C-unwind" fn(skirmish_ai_id: c_int, topic: c_int, data: *const c_void) -> c_int;

/// Entry points of one skirmish AI, as returned by `loadSkirmishAILibrary`.
/// Any of them may be null.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiSkirmishAiLibrary {
    pub init: Option<AiInitFn>,
    pub release: Option<AiReleaseFn>,
    pub handle_event: Option<AiHandleEventFn>,
}

/// Runs an FFI call, turning a panic that unwinds out of it into an error.
fn guarded<R>(library_id: &str, operation: &str, call: impl FnOnce() -> R) -> BindingResult<R> {
    panic::catch_unwind(panic::AssertUnwindSafe(call)).map_err(|panic_obj| {
        let panic_msg = if let Some(s_ref) = panic_obj.downcast_ref::<&'static str>() {
            (*s_ref).to_string()
        } else if let Some(s_obj) = panic_obj.downcast_ref::<String>() {
            s_obj.clone()
        } else {
            "Unknown panic reason".to_string()
        };
        PluginSystemError::FfiError {
            plugin_id: library_id.to_string(),
            operation: operation.to_string(),
            message: format!("panic: {}", panic_msg),
        }
    })
}

fn check_status(library_id: &str, operation: &str, status: c_int) -> BindingResult<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(PluginSystemError::FfiError {
            plugin_id: library_id.to_string(),
            operation: operation.to_string(),
            message: format!("returned status {}", status),
        })
    }
}

/// Copies a C string owned by the library; null becomes `None`.
/// # Safety
/// If non-null, `ptr` must point to a valid null-terminated C string that
/// stays valid for the duration of this call.
unsafe fn ffi_opt_string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

fn c_string(library_id: &str, operation: &str, value: &str) -> BindingResult<CString> {
    CString::new(value).map_err(|e| PluginSystemError::FfiError {
        plugin_id: library_id.to_string(),
        operation: operation.to_string(),
        message: format!("argument contains a NUL byte: {}", e),
    })
}

#[derive(Debug, Clone, Copy)]
struct LookupEntryPoints {
    list_skirmish_ais: ListSkirmishAisFn,
    list_infos: ListSkirmishAiInfosFn,
    list_info_key: ListSkirmishAiInfoStrFn,
    list_info_value: ListSkirmishAiInfoStrFn,
    list_options: Option<ListSkirmishAiOptionsFn>,
}

/// A skirmish AI loaded by a native interface
#[derive(Debug)]
struct NativeSkirmishAiBinding {
    id: String,
    entry: FfiSkirmishAiLibrary,
}

impl NativeSkirmishAiBinding {
    fn missing(&self, operation: &str) -> PluginSystemError {
        PluginSystemError::FfiError {
            plugin_id: self.id.clone(),
            operation: operation.to_string(),
            message: "entry point not exported".to_string(),
        }
    }
}

impl SkirmishAiBinding for NativeSkirmishAiBinding {
    fn entry_points(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.entry.init.is_some() {
            names.push("init");
        }
        if self.entry.release.is_some() {
            names.push("release");
        }
        if self.entry.handle_event.is_some() {
            names.push("handleEvent");
        }
        names
    }

    fn init(&self, skirmish_ai_id: i32) -> BindingResult<()> {
        let init = self.entry.init.ok_or_else(|| self.missing("init"))?;
        let status = guarded(&self.id, "init", || unsafe { init(skirmish_ai_id, std::ptr::null()) })?;
        check_status(&self.id, "init", status)
    }

    fn release(&self, skirmish_ai_id: i32) -> BindingResult<()> {
        let release = self.entry.release.ok_or_else(|| self.missing("release"))?;
        let status = guarded(&self.id, "release", || unsafe { release(skirmish_ai_id) })?;
        check_status(&self.id, "release", status)
    }

    fn handle_event(&self, skirmish_ai_id: i32, topic: i32, data: &[u8]) -> BindingResult<i32> {
        let handle_event = self.entry.handle_event.ok_or_else(|| self.missing("handleEvent"))?;
        let data_ptr = data.as_ptr() as *const c_void;
        guarded(&self.id, "handleEvent", || unsafe { handle_event(skirmish_ai_id, topic, data_ptr) })
    }
}

/// A loaded interface library and its bound entry points
#[derive(Debug)]
struct NativeInterfaceBinding {
    id: String,
    interface_id: c_int,
    init_static: InitStaticFn,
    release_static: ReleaseStaticFn,
    load_skirmish_ai: LoadSkirmishAiFn,
    unload_skirmish_ai: UnloadSkirmishAiFn,
    unload_all_skirmish_ais: UnloadAllSkirmishAisFn,
    lookup: Option<LookupEntryPoints>,
    // Last field: dropped after everything bound from it.
    _library: Library,
}

impl NativeInterfaceBinding {
    /// Binds the entry points of an opened library.
    /// # Safety
    /// The exported symbols must have the signatures listed in the module docs.
    unsafe fn bind(id: String, interface_id: c_int, path: PathBuf, library: Library) -> BindingResult<Self> {
        let missing = |symbol: &str, e: libloading::Error| PluginSystemError::LoadingError {
            plugin_id: id.clone(),
            path: Some(path.clone()),
            source: Box::new(PluginSystemErrorSource::Other(format!("missing symbol {}: {}", symbol, e))),
        };

        let init_static =
            *unsafe { library.get::<InitStaticFn>(b"initStatic\0") }.map_err(|e| missing("initStatic", e))?;
        let release_static =
            *unsafe { library.get::<ReleaseStaticFn>(b"releaseStatic\0") }.map_err(|e| missing("releaseStatic", e))?;
        let load_skirmish_ai = *unsafe { library.get::<LoadSkirmishAiFn>(b"loadSkirmishAILibrary\0") }
            .map_err(|e| missing("loadSkirmishAILibrary", e))?;
        let unload_skirmish_ai = *unsafe { library.get::<UnloadSkirmishAiFn>(b"unloadSkirmishAILibrary\0") }
            .map_err(|e| missing("unloadSkirmishAILibrary", e))?;
        let unload_all_skirmish_ais =
            *unsafe { library.get::<UnloadAllSkirmishAisFn>(b"unloadAllSkirmishAILibraries\0") }
                .map_err(|e| missing("unloadAllSkirmishAILibraries", e))?;

        let lookup = unsafe { Self::bind_lookup(&library) };
        if lookup.is_none() {
            debug!("AI interface {} exports no skirmish AI lookup", id);
        }

        Ok(Self {
            id,
            interface_id,
            init_static,
            release_static,
            load_skirmish_ai,
            unload_skirmish_ai,
            unload_all_skirmish_ais,
            lookup,
            _library: library,
        })
    }

    unsafe fn bind_lookup(library: &Library) -> Option<LookupEntryPoints> {
        unsafe {
            let list_skirmish_ais: Symbol<ListSkirmishAisFn> = library.get(b"listSkirmishAILibraries\0").ok()?;
            let list_infos: Symbol<ListSkirmishAiInfosFn> = library.get(b"listSkirmishAILibraryInfos\0").ok()?;
            let list_info_key: Symbol<ListSkirmishAiInfoStrFn> =
                library.get(b"listSkirmishAILibraryInfoKey\0").ok()?;
            let list_info_value: Symbol<ListSkirmishAiInfoStrFn> =
                library.get(b"listSkirmishAILibraryInfoValue\0").ok()?;
            let list_options: Option<Symbol<ListSkirmishAiOptionsFn>> =
                library.get(b"listSkirmishAILibraryOptions\0").ok();
            Some(LookupEntryPoints {
                list_skirmish_ais: *list_skirmish_ais,
                list_infos: *list_infos,
                list_info_key: *list_info_key,
                list_info_value: *list_info_value,
                list_options: list_options.map(|symbol| *symbol),
            })
        }
    }

    fn ai_index(index: usize) -> c_int {
        c_int::try_from(index).unwrap_or(c_int::MAX)
    }
}

impl InterfaceBinding for NativeInterfaceBinding {
    fn init_static(&mut self) -> BindingResult<()> {
        let init_static = self.init_static;
        let interface_id = self.interface_id;
        let status = guarded(&self.id, "initStatic", || unsafe { init_static(interface_id, std::ptr::null()) })?;
        check_status(&self.id, "initStatic", status)
    }

    fn release_static(&mut self) -> BindingResult<()> {
        let release_static = self.release_static;
        let status = guarded(&self.id, "releaseStatic", || unsafe { release_static() })?;
        check_status(&self.id, "releaseStatic", status)
    }

    fn skirmish_ai_count(&self) -> usize {
        let Some(lookup) = self.lookup else {
            return 0;
        };
        let interface_id = self.interface_id;
        guarded(&self.id, "listSkirmishAILibraries", || unsafe { (lookup.list_skirmish_ais)(interface_id) })
            .ok()
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(0)
    }

    fn skirmish_ai_info(&self, index: usize) -> RawInfo {
        let mut info = RawInfo::new();
        let Some(lookup) = self.lookup else {
            return info;
        };
        let interface_id = self.interface_id;
        let ai_index = Self::ai_index(index);

        let count = guarded(&self.id, "listSkirmishAILibraryInfos", || unsafe {
            (lookup.list_infos)(interface_id, ai_index)
        })
        .unwrap_or(0);

        for info_index in 0..count.max(0) {
            let entry = guarded(&self.id, "listSkirmishAILibraryInfoKey", || unsafe {
                let key = ffi_opt_string_from_ptr((lookup.list_info_key)(interface_id, ai_index, info_index));
                let value = ffi_opt_string_from_ptr((lookup.list_info_value)(interface_id, ai_index, info_index));
                (key, value)
            });
            if let Ok((Some(key), value)) = entry {
                info.insert(&key, value.unwrap_or_default());
            }
        }
        info
    }

    fn skirmish_ai_options(&self, index: usize) -> Option<String> {
        let list_options = self.lookup?.list_options?;
        let interface_id = self.interface_id;
        let ai_index = Self::ai_index(index);
        guarded(&self.id, "listSkirmishAILibraryOptions", || unsafe {
            ffi_opt_string_from_ptr(list_options(interface_id, ai_index))
        })
        .ok()
        .flatten()
    }

    fn load_skirmish_ai(&mut self, short_name: &str, version: &str) -> BindingResult<Box<dyn SkirmishAiBinding>> {
        let operation = "loadSkirmishAILibrary";
        let c_short_name = c_string(&self.id, operation, short_name)?;
        let c_version = c_string(&self.id, operation, version)?;
        let load = self.load_skirmish_ai;

        let table = guarded(&self.id, operation, || unsafe { load(c_short_name.as_ptr(), c_version.as_ptr()) })?;
        if table.is_null() {
            return Err(PluginSystemError::LoadingError {
                plugin_id: format!("{} {}", short_name, version),
                path: None,
                source: Box::new(PluginSystemErrorSource::Other(format!(
                    "interface {} returned no entry points",
                    self.id
                ))),
            });
        }

        let entry = unsafe { *table };
        Ok(Box::new(NativeSkirmishAiBinding {
            id: format!("{} {}", short_name, version),
            entry,
        }))
    }

    fn unload_skirmish_ai(&mut self, short_name: &str, version: &str) -> BindingResult<()> {
        let operation = "unloadSkirmishAILibrary";
        let c_short_name = c_string(&self.id, operation, short_name)?;
        let c_version = c_string(&self.id, operation, version)?;
        let unload = self.unload_skirmish_ai;
        let status = guarded(&self.id, operation, || unsafe { unload(c_short_name.as_ptr(), c_version.as_ptr()) })?;
        check_status(&self.id, operation, status)
    }

    fn unload_all_skirmish_ais(&mut self) -> BindingResult<()> {
        let unload_all = self.unload_all_skirmish_ais;
        let status = guarded(&self.id, "unloadAllSkirmishAILibraries", || unsafe { unload_all() })?;
        check_status(&self.id, "unloadAllSkirmishAILibraries", status)
    }
}

/// Loads interface libraries from their data directories
#[derive(Debug, Clone)]
pub struct NativeModuleLoader {
    library_name: String,
    next_interface_id: c_int,
}

impl NativeModuleLoader {
    /// `library_name` is the platform-neutral stem, e.g. `"AIInterface"`
    pub fn new(library_name: impl Into<String>) -> Self {
        Self {
            library_name: library_name.into(),
            next_interface_id: 0,
        }
    }

    /// Where the library of `info` is expected
    pub fn library_path(&self, info: &InterfaceInfo) -> Option<PathBuf> {
        info.data_dir()
            .map(|dir| dir.join(libloading::library_filename(&self.library_name)))
    }
}

impl ModuleLoader for NativeModuleLoader {
    fn load_interface(&mut self, info: &InterfaceInfo) -> BindingResult<Box<dyn InterfaceBinding>> {
        let id = info.key().to_string();
        let path = self.library_path(info).ok_or_else(|| PluginSystemError::LoadingError {
            plugin_id: id.clone(),
            path: None,
            source: Box::new(PluginSystemErrorSource::Other("interface has no data directory".to_string())),
        })?;

        let library = unsafe { Library::new(&path) }.map_err(|e| PluginSystemError::LoadingError {
            plugin_id: id.clone(),
            path: Some(path.clone()),
            source: Box::new(PluginSystemErrorSource::Library(e)),
        })?;

        let interface_id = self.next_interface_id;
        self.next_interface_id += 1;

        let binding = unsafe { NativeInterfaceBinding::bind(id, interface_id, path, library)? };
        Ok(Box::new(binding))
    }
}
