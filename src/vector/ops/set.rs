use crate::context::CallOptions;
use crate::errors::Result;
use crate::vector::Geometry;

/// # Set Operations
///
/// These methods provide set operations over two geometries, producing a new, owned
/// geometry. An empty `other` fails before GDAL is called.
impl Geometry {
    /// Computes the union of `self` and `other`.
    ///
    /// See: [`OGR_G_Union`](https://gdal.org/api/vector_c_api.html#_CPPv411OGR_G_Union12OGRGeometryH12OGRGeometryH)
    pub fn union(&self, other: &Geometry, opts: impl Into<CallOptions>) -> Result<Geometry> {
        let (c_geom, c_other) = (self.c_geometry()?, other.c_geometry()?);
        Geometry::build(opts, "OGR_G_Union", || unsafe {
            gdal_sys::OGR_G_Union(c_geom, c_other)
        })
    }

    /// Computes the part of `self` that is not in `other`.
    ///
    /// See: [`OGR_G_Difference`](https://gdal.org/api/vector_c_api.html#_CPPv416OGR_G_Difference12OGRGeometryH12OGRGeometryH)
    pub fn difference(&self, other: &Geometry, opts: impl Into<CallOptions>) -> Result<Geometry> {
        let (c_geom, c_other) = (self.c_geometry()?, other.c_geometry()?);
        Geometry::build(opts, "OGR_G_Difference", || unsafe {
            gdal_sys::OGR_G_Difference(c_geom, c_other)
        })
    }
}
