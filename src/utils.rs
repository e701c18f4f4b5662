use std::ffi::{c_char, c_int, CStr, CString};
use std::path::Path;

use crate::errors::*;

pub fn _string(raw_ptr: *const c_char) -> String {
    if raw_ptr.is_null() {
        return String::new();
    }
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

/// Copies a null-terminated `char**` into owned strings. A null list yields an empty vector.
pub fn _string_array(raw_ptr: *mut *mut c_char) -> Vec<String> {
    let mut ret_val: Vec<String> = vec![];
    if raw_ptr.is_null() {
        return ret_val;
    }
    let mut i = 0;
    unsafe {
        loop {
            let next = raw_ptr.add(i).read();
            if next.is_null() {
                break;
            }
            ret_val.push(_string(next));
            i += 1;
        }
    }
    ret_val
}

/// Copies a length-prefixed native array. A null pointer decodes to an empty vector.
///
/// # Safety
/// `ptr` must be null or point to at least `len` initialized values.
pub unsafe fn _array_to_vec<T: Copy>(ptr: *const T, len: c_int) -> Vec<T> {
    if ptr.is_null() || len <= 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(ptr, len as usize).to_vec()
}

/// Takes ownership of a `CPLMalloc`ed string, copying it and releasing the native buffer.
pub fn _owned_string(raw_ptr: *mut c_char) -> String {
    let s = _string(raw_ptr);
    if !raw_ptr.is_null() {
        unsafe { gdal_sys::VSIFree(raw_ptr.cast::<std::ffi::c_void>()) };
    }
    s
}

pub fn _path_to_c_string(path: &Path) -> Result<CString> {
    let path_str = path.to_string_lossy();
    CString::new(path_str.as_ref()).map_err(Into::into)
}
