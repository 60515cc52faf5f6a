//! AI interface used by the loader tests.
//!
//! Bundles one skirmish AI, `EchoAI 1.0`, which answers every event with its
//! topic. Only `EchoAI` can be loaded.
#![allow(non_snake_case)]

use std::ffi::{c_void, CStr};
use std::os::raw::{c_char, c_int};

#[repr(C)]
pub struct SkirmishAiLibrary {
    pub init: Option<unsafe extern "C-unwind" fn(c_int, *const c_void) -> c_int>,
    pub release: Option<unsafe extern "C-unwind" fn(c_int) -> c_int>,
    pub handle_event: Option<unsafe extern "C-unwind" fn(c_int, c_int, *const c_void) -> c_int>,
}

unsafe extern "C-unwind" fn ai_init(_skirmish_ai_id: c_int, _callback: *const c_void) -> c_int {
    0
}

unsafe extern "C-unwind" fn ai_release(_skirmish_ai_id: c_int) -> c_int {
    0
}

unsafe extern "C-unwind" fn ai_handle_event(_skirmish_ai_id: c_int, topic: c_int, _data: *const c_void) -> c_int {
    topic
}

static ECHO_AI: SkirmishAiLibrary = SkirmishAiLibrary {
    init: Some(ai_init),
    release: Some(ai_release),
    handle_event: Some(ai_handle_event),
};

const INFO_KEYS: [&[u8]; 4] = [b"shortName\0", b"version\0", b"interfaceShortName\0", b"interfaceVersion\0"];
const INFO_VALUES: [&[u8]; 4] = [b"EchoAI\0", b"1.0\0", b"Echo\0", b"0.1\0"];
const OPTIONS: &[u8] = b"[{\"key\":\"volume\",\"type\":\"number\"}]\0";

#[no_mangle]
pub extern "C-unwind" fn initStatic(_interface_id: c_int, _callback: *const c_void) -> c_int {
    0
}

#[no_mangle]
pub extern "C-unwind" fn releaseStatic() -> c_int {
    0
}

#[no_mangle]
pub extern "C-unwind" fn listSkirmishAILibraries(_interface_id: c_int) -> c_int {
    1
}

#[no_mangle]
pub extern "C-unwind" fn listSkirmishAILibraryInfos(_interface_id: c_int, ai_index: c_int) -> c_int {
    if ai_index == 0 {
        INFO_KEYS.len() as c_int
    } else {
        0
    }
}

fn info_entry(table: &[&[u8]; 4], ai_index: c_int, info_index: c_int) -> *const c_char {
    if ai_index != 0 {
        return std::ptr::null();
    }
    match usize::try_from(info_index).ok().and_then(|i| table.get(i)) {
        Some(entry) => entry.as_ptr() as *const c_char,
        None => std::ptr::null(),
    }
}

#[no_mangle]
pub extern "C-unwind" fn listSkirmishAILibraryInfoKey(_interface_id: c_int, ai_index: c_int, info_index: c_int) -> *const c_char {
    info_entry(&INFO_KEYS, ai_index, info_index)
}

#[no_mangle]
pub extern "C-unwind" fn listSkirmishAILibraryInfoValue(_interface_id: c_int, ai_index: c_int, info_index: c_int) -> *const c_char {
    info_entry(&INFO_VALUES, ai_index, info_index)
}

#[no_mangle]
pub extern "C-unwind" fn listSkirmishAILibraryOptions(_interface_id: c_int, ai_index: c_int) -> *const c_char {
    if ai_index == 0 {
        OPTIONS.as_ptr() as *const c_char
    } else {
        std::ptr::null()
    }
}

/// # Safety
/// Both arguments must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C-unwind" fn loadSkirmishAILibrary(short_name: *const c_char, _version: *const c_char) -> *const SkirmishAiLibrary {
    if short_name.is_null() {
        return std::ptr::null();
    }
    match CStr::from_ptr(short_name).to_str() {
        Ok("EchoAI") => &ECHO_AI,
        _ => std::ptr::null(),
    }
}

#[no_mangle]
pub extern "C-unwind" fn unloadSkirmishAILibrary(_short_name: *const c_char, _version: *const c_char) -> c_int {
    0
}

#[no_mangle]
pub extern "C-unwind" fn unloadAllSkirmishAILibraries() -> c_int {
    0
}
