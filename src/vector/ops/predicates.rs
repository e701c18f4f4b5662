use crate::context::{with_context, CallOptions};
use crate::errors::Result;
use crate::vector::Geometry;

/// # Geometric Predicates
///
/// These methods provide common [spatial relations](https://en.wikipedia.org/wiki/DE-9IM#Spatial_predicates) between
/// two geometries. Both geometries must be valid handles.
impl Geometry {
    /// Tests if this geometry _contains_ the other geometry;
    /// `other` lies in `self`, and the interiors intersect.
    ///
    /// If GDAL is built without GEOS this is always `false`.
    ///
    /// See: [`OGR_G_Contains`](https://gdal.org/api/vector_c_api.html#_CPPv414OGR_G_Contains12OGRGeometryH12OGRGeometryH)
    pub fn contains(&self, other: &Geometry) -> Result<bool> {
        let p = unsafe { gdal_sys::OGR_G_Contains(self.c_geometry()?, other.c_geometry()?) };
        Ok(p != 0)
    }

    /// Tests if two geometries _intersect_; `self` and `other` have at least one point in
    /// common.
    ///
    /// See: [`OGR_G_Intersects`](https://gdal.org/api/vector_c_api.html#_CPPv416OGR_G_Intersects12OGRGeometryH12OGRGeometryH)
    pub fn intersects(&self, other: &Geometry, opts: impl Into<CallOptions>) -> Result<bool> {
        let (c_geom, c_other) = (self.c_geometry()?, other.c_geometry()?);
        let p = with_context(opts, |_| unsafe { gdal_sys::OGR_G_Intersects(c_geom, c_other) })?;
        Ok(p != 0)
    }
}
