use std::ffi::CString;

use gdal_sys::GDALMajorObjectH;

use crate::context::{with_context, CallOptions};
use crate::errors::*;
use crate::utils::_string;

/// Objects that carry GDAL metadata: datasets and raster bands.
pub trait MajorObject {
    /// The raw handle, failing like the object's other accessors once it is closed.
    fn gdal_object_ptr(&self) -> Result<GDALMajorObjectH>;
}

/// `KEY=VALUE` metadata, grouped in domains. The default domain is `""`.
pub trait Metadata: MajorObject {
    /// Get the metadata value of `key` in `domain`, if present.
    fn metadata_item(&self, key: &str, domain: &str) -> Result<Option<String>> {
        let c_key = CString::new(key)?;
        let c_domain = CString::new(domain)?;
        let c_res = unsafe {
            gdal_sys::GDALGetMetadataItem(
                self.gdal_object_ptr()?,
                c_key.as_ptr(),
                c_domain.as_ptr(),
            )
        };
        if c_res.is_null() {
            return Ok(None);
        }
        Ok(Some(_string(c_res)))
    }

    fn set_metadata_item(
        &mut self,
        key: &str,
        value: &str,
        domain: &str,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let c_object = self.gdal_object_ptr()?;
        let c_key = CString::new(key)?;
        let c_value = CString::new(value)?;
        let c_domain = CString::new(domain)?;
        with_context(opts, |ctx| {
            let rv = unsafe {
                gdal_sys::GDALSetMetadataItem(
                    c_object,
                    c_key.as_ptr(),
                    c_value.as_ptr(),
                    c_domain.as_ptr(),
                )
            };
            ctx.check_cpl(rv, "GDALSetMetadataItem");
        })
    }
}
