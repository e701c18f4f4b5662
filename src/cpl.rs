//! GDAL string lists.
//!
//! Command line switches, creation options and `KEY=VALUE` option lists all cross the FFI
//! boundary as a null-terminated `char**` owned by GDAL's allocator. [`CslStringList`] owns such
//! a list and frees it on drop.

use std::ffi::{c_char, CString};
use std::fmt::{Debug, Formatter};
use std::ptr;

use gdal_sys::{CSLAddString, CSLCount, CSLDestroy, CSLFetchNameValue, CSLSetNameValue};

use crate::errors::{GdalError, Result};
use crate::utils::{_string, _string_array};

/// An owned `char **papszStrList`.
pub struct CslStringList {
    list_ptr: *mut *mut c_char,
}

impl CslStringList {
    /// Creates an empty list. Its pointer is null, which GDAL treats as "no options".
    pub fn new() -> Self {
        Self {
            list_ptr: ptr::null_mut(),
        }
    }

    /// Builds a list of verbatim entries, e.g. `["-f", "GeoJSON"]`.
    pub fn from_strings<S: AsRef<str>>(entries: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut list = Self::new();
        for entry in entries {
            list.add_string(entry.as_ref())?;
        }
        Ok(list)
    }

    /// Appends `value` as a new entry.
    pub fn add_string(&mut self, value: &str) -> Result<()> {
        let c_value = CString::new(value)?;
        // CSLAddString copies the string.
        self.list_ptr = unsafe { CSLAddString(self.list_ptr, c_value.as_ptr()) };
        Ok(())
    }

    /// Assigns `value` to `name`, replacing a previous assignment.
    ///
    /// `name` must be a plain token and `value` must not contain line breaks.
    pub fn set_name_value(&mut self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(GdalError::BadArgument(format!(
                "Invalid characters in name: '{name}'"
            )));
        }
        if value.contains(['\n', '\r']) {
            return Err(GdalError::BadArgument(format!(
                "Invalid characters in value: '{value}'"
            )));
        }
        let psz_name = CString::new(name)?;
        let psz_value = CString::new(value)?;
        self.list_ptr =
            unsafe { CSLSetNameValue(self.list_ptr, psz_name.as_ptr(), psz_value.as_ptr()) };
        Ok(())
    }

    /// Looks up the value assigned to `key`.
    pub fn fetch_name_value(&self, key: &str) -> Result<Option<String>> {
        let key = CString::new(key)?;
        let c_value = unsafe { CSLFetchNameValue(self.list_ptr, key.as_ptr()) };
        if c_value.is_null() {
            Ok(None)
        } else {
            Ok(Some(_string(c_value)))
        }
    }

    pub fn len(&self) -> usize {
        (unsafe { CSLCount(self.list_ptr) }) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the entries out, in order.
    pub fn to_vec(&self) -> Vec<String> {
        _string_array(self.list_ptr)
    }

    /// The raw list, valid as long as `self` is alive and unmodified.
    pub fn as_ptr(&self) -> gdal_sys::CSLConstList {
        self.list_ptr
    }
}

impl Drop for CslStringList {
    fn drop(&mut self) {
        unsafe { CSLDestroy(self.list_ptr) }
    }
}

impl Default for CslStringList {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for CslStringList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_keep_order() -> Result<()> {
        let l = CslStringList::from_strings(["-f", "GeoJSON", "-dsco", "RFC7946=YES"])?;
        assert_eq!(l.len(), 4);
        assert_eq!(l.to_vec(), vec!["-f", "GeoJSON", "-dsco", "RFC7946=YES"]);
        Ok(())
    }

    #[test]
    fn name_values() -> Result<()> {
        let mut l = CslStringList::new();
        assert!(l.is_empty());
        l.set_name_value("COORDINATE_PRECISION", "7")?;
        l.set_name_value("COORDINATE_PRECISION", "3")?;
        assert_eq!(l.len(), 1);
        assert_eq!(l.fetch_name_value("COORDINATE_PRECISION")?, Some("3".into()));
        assert_eq!(l.fetch_name_value("MISSING")?, None);
        Ok(())
    }

    #[test]
    fn invalid_entries() {
        let mut l = CslStringList::new();
        assert!(l.set_name_value("l==t", "2").is_err());
        assert!(l.set_name_value("foo", "2\n4").is_err());
        assert!(l.add_string("nul\0byte").is_err());
    }
}
