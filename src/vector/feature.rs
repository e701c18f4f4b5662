use std::ffi::{c_int, CString};
use std::fmt::{self, Debug, Formatter};

use gdal_sys::{OGRErr, OGRFeatureH};

use crate::context::{with_context, CallOptions};
use crate::errors::*;
use crate::handle::{FeatureKind, NativeHandle, Ownership};
use crate::utils::_string;
use crate::vector::{Defn, Field, FieldKind, FieldValue, Fields, Geometry, GeometryRef};

/// `OGRNullFID`
const NULL_FID: i64 = -1;

/// OGR Feature
///
/// A feature owns its native object and caches its FID. Attribute values are read as
/// [`Fields`] snapshots and written through a [`crate::vector::FieldAccessor`].
pub struct Feature {
    handle: NativeHandle<FeatureKind>,
    fid: Option<u64>,
}

impl Feature {
    /// Creates an empty feature following the schema of `defn`.
    pub fn new(defn: &Defn) -> Result<Feature> {
        let c_defn = defn.c_defn();
        with_context((), |ctx| {
            let c_feature = unsafe { gdal_sys::OGR_F_Create(c_defn) };
            if c_feature.is_null() {
                ctx.note_failure("OGR_F_Create");
            }
            unsafe { Feature::owned(c_feature) }
        })
    }

    /// Takes ownership of a feature returned by GDAL.
    ///
    /// # Safety
    /// `c_feature` must be null or a feature the caller owns.
    pub(crate) unsafe fn owned(c_feature: OGRFeatureH) -> Feature {
        let fid = if c_feature.is_null() {
            None
        } else {
            fid_from_native(gdal_sys::OGR_F_GetFID(c_feature))
        };
        Feature {
            handle: NativeHandle::wrap(c_feature, Ownership::Owned),
            fid,
        }
    }

    /// The raw handle, or [`GdalError::InvalidHandle`] once closed.
    pub fn c_feature(&self) -> Result<OGRFeatureH> {
        self.handle.get()
    }

    /// The feature id, if one was assigned.
    pub fn fid(&self) -> Option<u64> {
        self.fid
    }

    pub fn set_fid(&mut self, fid: Option<u64>) -> Result<()> {
        let c_feature = self.c_feature()?;
        let native = fid.map_or(NULL_FID, |fid| fid as i64);
        let rv = unsafe { gdal_sys::OGR_F_SetFID(c_feature, native) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_F_SetFID",
            });
        }
        self.fid = fid;
        Ok(())
    }

    /// Re-reads the FID from the native feature, e.g. after a layer assigned one.
    pub(crate) fn refresh_fid(&mut self) -> Result<()> {
        let c_feature = self.c_feature()?;
        self.fid = fid_from_native(unsafe { gdal_sys::OGR_F_GetFID(c_feature) });
        Ok(())
    }

    /// A snapshot of every attribute, in schema order.
    ///
    /// Unset and null fields carry the zero value of their kind. Later writes are not
    /// reflected until `fields` is called again.
    pub fn fields(&self) -> Result<Fields> {
        let c_feature = self.c_feature()?;
        let count = unsafe { gdal_sys::OGR_F_GetFieldCount(c_feature) }.max(0);
        let mut fields = Vec::with_capacity(count as usize);
        for index in 0..count {
            fields.push(unsafe { read_field(c_feature, index) });
        }
        Ok(Fields::new(fields))
    }

    /// The primary geometry, borrowed from this feature.
    pub fn geometry(&self) -> Result<Option<GeometryRef<'_>>> {
        let c_geom = unsafe { gdal_sys::OGR_F_GetGeometryRef(self.c_feature()?) };
        if c_geom.is_null() {
            return Ok(None);
        }
        Ok(Some(unsafe { GeometryRef::borrowed(c_geom) }))
    }

    /// Removes the primary geometry from this feature and hands it over.
    pub fn take_geometry(&mut self) -> Result<Option<Geometry>> {
        let c_geom = unsafe { gdal_sys::OGR_F_StealGeometry(self.c_feature()?) };
        if c_geom.is_null() {
            return Ok(None);
        }
        Ok(Some(unsafe { Geometry::owned(c_geom) }))
    }

    /// Stores a copy of `geometry` as the primary geometry.
    pub fn set_geometry(
        &mut self,
        geometry: &Geometry,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (c_feature, c_geom) = (self.c_feature()?, geometry.c_geometry()?);
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_F_SetGeometry(c_feature, c_geom) };
            ctx.check_ogr(rv, "OGR_F_SetGeometry");
        })
    }

    /// Renames the first geometry column of this feature's schema.
    pub fn set_geometry_column_name(
        &mut self,
        name: &str,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let c_feature = self.c_feature()?;
        let c_name = CString::new(name)?;
        with_context(opts, |ctx| {
            let c_geom_field = unsafe { gdal_sys::OGR_F_GetGeomFieldDefnRef(c_feature, 0) };
            if c_geom_field.is_null() {
                ctx.note_failure("OGR_F_GetGeomFieldDefnRef");
                return;
            }
            unsafe { gdal_sys::OGR_GFld_SetName(c_geom_field, c_name.as_ptr()) };
        })
    }

    /// Destroys the native feature. Closing again has no effect.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

impl Default for Feature {
    /// An empty handle; every accessor fails.
    fn default() -> Self {
        Feature {
            handle: NativeHandle::empty(),
            fid: None,
        }
    }
}

impl Debug for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("handle", &self.handle)
            .field("fid", &self.fid)
            .finish()
    }
}

fn fid_from_native(fid: i64) -> Option<u64> {
    (fid >= 0).then_some(fid as u64)
}

unsafe fn read_field(c_feature: OGRFeatureH, index: c_int) -> Field {
    let c_field_defn = gdal_sys::OGR_F_GetFieldDefnRef(c_feature, index);
    let kind = FieldKind::from_ogr(gdal_sys::OGR_Fld_GetType(c_field_defn));
    let is_set = gdal_sys::OGR_F_IsFieldSet(c_feature, index) != 0;
    let value = if gdal_sys::OGR_F_IsFieldSetAndNotNull(c_feature, index) != 0 {
        FieldValue::read(c_feature, index, kind)
    } else {
        FieldValue::zero(kind)
    };
    Field {
        index: index as usize,
        name: _string(gdal_sys::OGR_Fld_GetNameRef(c_field_defn)),
        is_set,
        value,
    }
}
