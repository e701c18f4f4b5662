//! GDAL configuration options.
//!
//! GDAL reads runtime settings (cache size, driver switches, `CPL_DEBUG`, ...) from
//! configuration options. Process-wide options are set with [`set_config_option`]; options
//! that should only affect the current thread use the `thread_local` variants. Per-call
//! options given to [`CallOptions::with_config_option`](crate::context::CallOptions::with_config_option)
//! are applied with the thread-local variants and restored when the call returns.
//!
//! ```
//! use gdal_safe::config::*;
//!
//! set_config_option("GDAL_CACHEMAX", "64").unwrap();
//! assert_eq!(get_config_option("GDAL_CACHEMAX", "").unwrap(), "64");
//! clear_config_option("GDAL_CACHEMAX").unwrap();
//! ```

use std::ffi::CString;
use std::ptr;

use crate::errors::Result;
use crate::utils::_string;

/// Set a process-wide GDAL configuration option.
pub fn set_config_option(key: &str, value: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    let c_val = CString::new(value.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetConfigOption(c_key.as_ptr(), c_val.as_ptr());
    };
    Ok(())
}

/// Get the value of a GDAL configuration option, or `default` when it is not set.
///
/// Thread-local values take precedence over process-wide ones.
pub fn get_config_option(key: &str, default: &str) -> Result<String> {
    let c_key = CString::new(key.as_bytes())?;
    let c_default = CString::new(default.as_bytes())?;
    let rv = unsafe { gdal_sys::CPLGetConfigOption(c_key.as_ptr(), c_default.as_ptr()) };
    Ok(_string(rv))
}

/// Clear a process-wide GDAL configuration option.
pub fn clear_config_option(key: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetConfigOption(c_key.as_ptr(), ptr::null());
    };
    Ok(())
}

/// Set a GDAL configuration option for the current thread only.
pub fn set_thread_local_config_option(key: &str, value: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    let c_val = CString::new(value.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetThreadLocalConfigOption(c_key.as_ptr(), c_val.as_ptr());
    };
    Ok(())
}

/// The thread-local value of `key`, or `None` when this thread has not set it.
pub fn thread_local_config_option(key: &str) -> Result<Option<String>> {
    let c_key = CString::new(key.as_bytes())?;
    let rv = unsafe { gdal_sys::CPLGetThreadLocalConfigOption(c_key.as_ptr(), ptr::null()) };
    if rv.is_null() {
        Ok(None)
    } else {
        Ok(Some(_string(rv)))
    }
}

/// Get the thread-local value of `key`, or `default` when it is not set.
pub fn get_thread_local_config_option(key: &str, default: &str) -> Result<String> {
    Ok(thread_local_config_option(key)?.unwrap_or_else(|| default.to_string()))
}

/// Clear a thread-local GDAL configuration option.
pub fn clear_thread_local_config_option(key: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetThreadLocalConfigOption(c_key.as_ptr(), ptr::null());
    };
    Ok(())
}
