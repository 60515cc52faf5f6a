//! An AI interface that only exports `initStatic`; every other required
//! entry point is missing.
#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::c_int;

#[no_mangle]
pub extern "C-unwind" fn initStatic(_interface_id: c_int, _callback: *const c_void) -> c_int {
    0
}
