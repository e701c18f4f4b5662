use std::ffi::{c_char, c_int, CString};
use std::ptr;

use gdal_sys::{OGRErr, OGRSpatialReferenceH};

use crate::context::with_context;
use crate::errors::{GdalError, Result};
use crate::handle::{NativeHandle, Ownership, SpatialRefKind};
use crate::utils::{_owned_string, _string};

/// A coordinate reference system (`OGRSpatialReferenceH`).
///
/// Spatial references built by this crate use the traditional GIS axis order
/// (longitude/easting first) regardless of what the authority defines.
#[derive(Debug, Default)]
pub struct SpatialRef {
    handle: NativeHandle<SpatialRefKind>,
}

impl SpatialRef {
    /// An empty definition.
    pub fn new() -> Result<SpatialRef> {
        Self::build("OSRNewSpatialReference", |_| OGRErr::OGRERR_NONE)
    }

    /// See: [OSRImportFromEPSG](https://gdal.org/api/ogr_srs_api.html#_CPPv417OSRImportFromEPSG20OGRSpatialReferenceHi)
    pub fn from_epsg(epsg_code: u32) -> Result<SpatialRef> {
        Self::build("OSRImportFromEPSG", |c_obj| unsafe {
            gdal_sys::OSRImportFromEPSG(c_obj, epsg_code as c_int)
        })
    }

    pub fn from_wkt(wkt: &str) -> Result<SpatialRef> {
        let c_str = CString::new(wkt)?;
        Self::build("OSRImportFromWkt", |c_obj| unsafe {
            let mut c_ptr = c_str.as_ptr() as *mut c_char;
            gdal_sys::OSRImportFromWkt(c_obj, &mut c_ptr)
        })
    }

    /// Accepts anything `OSRSetFromUserInput` understands: `EPSG:n`, WKT, PROJ strings,
    /// `OGC:CRS84`, ...
    pub fn from_definition(definition: &str) -> Result<SpatialRef> {
        let c_str = CString::new(definition)?;
        Self::build("OSRSetFromUserInput", |c_obj| unsafe {
            gdal_sys::OSRSetFromUserInput(c_obj, c_str.as_ptr())
        })
    }

    pub fn from_proj4(proj4_string: &str) -> Result<SpatialRef> {
        let c_str = CString::new(proj4_string)?;
        Self::build("OSRImportFromProj4", |c_obj| unsafe {
            gdal_sys::OSRImportFromProj4(c_obj, c_str.as_ptr())
        })
    }

    fn build(
        method_name: &'static str,
        import: impl FnOnce(OGRSpatialReferenceH) -> OGRErr::Type,
    ) -> Result<SpatialRef> {
        with_context((), |ctx| {
            let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(ptr::null()) };
            if c_obj.is_null() {
                ctx.note_failure("OSRNewSpatialReference");
                return SpatialRef::default();
            }
            let srs = unsafe { SpatialRef::from_raw(c_obj, Ownership::Owned) };
            if import(c_obj) != OGRErr::OGRERR_NONE {
                ctx.note_failure(method_name);
            }
            #[cfg(major_ge_3)]
            unsafe {
                gdal_sys::OSRSetAxisMappingStrategy(
                    c_obj,
                    gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER,
                )
            };
            srs
        })
    }

    /// Wraps a raw handle.
    ///
    /// # Safety
    /// See [`NativeHandle::wrap`].
    pub unsafe fn from_raw(c_obj: OGRSpatialReferenceH, ownership: Ownership) -> SpatialRef {
        SpatialRef {
            handle: NativeHandle::wrap(c_obj, ownership),
        }
    }

    /// Takes a counted reference to an object owned elsewhere. A null `c_obj` yields `None`.
    ///
    /// # Safety
    /// `c_obj` must be null or a live spatial reference.
    pub(crate) unsafe fn from_shared(c_obj: OGRSpatialReferenceH) -> Option<SpatialRef> {
        if c_obj.is_null() {
            return None;
        }
        gdal_sys::OSRReference(c_obj);
        Some(SpatialRef::from_raw(c_obj, Ownership::Owned))
    }

    /// The raw handle, or [`GdalError::InvalidHandle`] once closed.
    pub fn c_srs(&self) -> Result<OGRSpatialReferenceH> {
        self.handle.get()
    }

    pub fn to_wkt(&self) -> Result<String> {
        let c_obj = self.c_srs()?;
        let mut c_wkt: *mut c_char = ptr::null_mut();
        let rv = unsafe { gdal_sys::OSRExportToWkt(c_obj, &mut c_wkt) };
        let wkt = _owned_string(c_wkt);
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OSRExportToWkt",
            });
        }
        Ok(wkt)
    }

    pub fn to_proj4(&self) -> Result<String> {
        let c_obj = self.c_srs()?;
        let mut c_proj4str: *mut c_char = ptr::null_mut();
        let rv = unsafe { gdal_sys::OSRExportToProj4(c_obj, &mut c_proj4str) };
        let proj4 = _owned_string(c_proj4str);
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OSRExportToProj4",
            });
        }
        Ok(proj4)
    }

    /// `NAME:CODE`, e.g. `EPSG:4326`.
    pub fn authority(&self) -> Result<String> {
        let c_obj = self.c_srs()?;
        let c_name = unsafe { gdal_sys::OSRGetAuthorityName(c_obj, ptr::null()) };
        let c_code = unsafe { gdal_sys::OSRGetAuthorityCode(c_obj, ptr::null()) };
        if c_name.is_null() || c_code.is_null() {
            return Err(GdalError::NullPointer {
                method_name: "OSRGetAuthorityName",
                msg: "no authority".to_string(),
            });
        }
        Ok(format!("{}:{}", _string(c_name), _string(c_code)))
    }

    /// Whether both describe the same coordinate system.
    pub fn is_same(&self, other: &SpatialRef) -> Result<bool> {
        let rv = unsafe { gdal_sys::OSRIsSame(self.c_srs()?, other.c_srs()?) };
        Ok(rv != 0)
    }

    /// Releases this reference. Closing again has no effect.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

impl Clone for SpatialRef {
    /// Clones the definition. Cloning a closed reference yields a closed reference.
    fn clone(&self) -> SpatialRef {
        match self.handle.get() {
            Ok(c_obj) => {
                let c_clone = unsafe { gdal_sys::OSRClone(c_obj) };
                #[cfg(major_ge_3)]
                if !c_clone.is_null() {
                    unsafe {
                        gdal_sys::OSRSetAxisMappingStrategy(
                            c_clone,
                            gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER,
                        )
                    };
                }
                unsafe { SpatialRef::from_raw(c_clone, Ownership::Owned) }
            }
            Err(_) => SpatialRef::default(),
        }
    }
}

impl PartialEq for SpatialRef {
    fn eq(&self, other: &SpatialRef) -> bool {
        self.is_same(other).unwrap_or(false)
    }
}
