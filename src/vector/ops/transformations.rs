use std::ffi::c_int;

use crate::context::{with_context, CallOptions};
use crate::errors::Result;
use crate::handle::Ownership;
use crate::spatial_ref::{CoordTransform, SpatialRef};
use crate::vector::Geometry;

/// # Geometry Transformations
///
/// These methods provide geometric transformations on a `Geometry`.
impl Geometry {
    /// Compute a simplified geometry.
    ///
    /// # Arguments
    /// * `tolerance`: the distance tolerance for the simplification.
    ///
    /// See: [`OGR_G_Simplify`](https://gdal.org/api/vector_c_api.html#_CPPv414OGR_G_Simplify12OGRGeometryHd)
    pub fn simplify(&self, tolerance: f64, opts: impl Into<CallOptions>) -> Result<Geometry> {
        let c_geom = self.c_geometry()?;
        Geometry::build(opts, "OGR_G_Simplify", || unsafe {
            gdal_sys::OGR_G_Simplify(c_geom, tolerance)
        })
    }

    /// Compute buffer of geometry
    ///
    /// # Arguments
    /// * `distance`: the buffer distance to be applied. Should be expressed in
    ///   the same unit as the coordinates of the geometry.
    /// * `n_quad_segs` specifies the number of segments used to approximate a
    ///   90 degree (quadrant) of curvature.
    ///
    /// See: [`OGR_G_Buffer`](https://gdal.org/api/vector_c_api.html#_CPPv412OGR_G_Buffer12OGRGeometryHdi)
    pub fn buffer(
        &self,
        distance: f64,
        n_quad_segs: u32,
        opts: impl Into<CallOptions>,
    ) -> Result<Geometry> {
        let c_geom = self.c_geometry()?;
        Geometry::build(opts, "OGR_G_Buffer", || unsafe {
            gdal_sys::OGR_G_Buffer(c_geom, distance, n_quad_segs as c_int)
        })
    }

    /// Converts to a polygon, e.g. a multipolygon with a single part.
    ///
    /// Consumes `self`; GDAL reuses or destroys the input. A borrowed input is copied first so
    /// its owner keeps its geometry.
    pub fn force_to_polygon(self) -> Result<Geometry> {
        self.force("OGR_G_ForceToPolygon", |c_geom| unsafe {
            gdal_sys::OGR_G_ForceToPolygon(c_geom)
        })
    }

    /// Converts to a multipolygon. Same ownership rules as [`Geometry::force_to_polygon`].
    pub fn force_to_multi_polygon(self) -> Result<Geometry> {
        self.force("OGR_G_ForceToMultiPolygon", |c_geom| unsafe {
            gdal_sys::OGR_G_ForceToMultiPolygon(c_geom)
        })
    }

    fn force(
        self,
        method_name: &'static str,
        convert: impl FnOnce(gdal_sys::OGRGeometryH) -> gdal_sys::OGRGeometryH,
    ) -> Result<Geometry> {
        self.c_geometry()?;
        let source = if self.ownership() == Ownership::Owned {
            self
        } else {
            self.clone()
        };
        let c_geom = source.into_handle().into_raw();
        Geometry::build((), method_name, || convert(c_geom))
    }

    /// Transforms this geometry's coordinates into `spatial_ref`, in place.
    ///
    /// The geometry must have a spatial reference assigned.
    ///
    /// See: [`OGR_G_TransformTo`](https://gdal.org/api/vector_c_api.html#_CPPv417OGR_G_TransformTo12OGRGeometryH20OGRSpatialReferenceH)
    pub fn reproject(
        &mut self,
        spatial_ref: &SpatialRef,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (c_geom, c_srs) = (self.c_geometry()?, spatial_ref.c_srs()?);
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_G_TransformTo(c_geom, c_srs) };
            ctx.check_ogr(rv, "OGR_G_TransformTo");
        })
    }

    /// Apply a coordinate transformation in place.
    ///
    /// See: [`OGR_G_Transform`](https://gdal.org/api/vector_c_api.html#_CPPv415OGR_G_Transform12OGRGeometryH28OGRCoordinateTransformationH)
    pub fn transform(
        &mut self,
        transform: &CoordTransform,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (c_geom, c_transform) = (self.c_geometry()?, transform.c_transform()?);
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_G_Transform(c_geom, c_transform) };
            ctx.check_ogr(rv, "OGR_G_Transform");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GdalError;
    use crate::test_utils::assert_near;

    #[test]
    fn test_simplify() {
        let line =
            Geometry::from_wkt("LINESTRING(1.2 0.19,1.63 0.58,1.98 0.65,2.17 0.89)", None, ())
                .unwrap();
        let expected = Geometry::from_wkt("LINESTRING (1.2 0.19,2.17 0.89)", None, ()).unwrap();
        assert_eq!(line.simplify(0.5, ()).unwrap(), expected);
    }

    #[test]
    fn test_buffer() {
        let point = Geometry::from_wkt("POINT (0 0)", None, ()).unwrap();
        let buffered = point.buffer(1.0, 8, ()).unwrap();
        assert_eq!(buffered.geometry_name().unwrap(), "POLYGON");
        assert_near!(buffered.area().unwrap(), std::f64::consts::PI, epsilon = 0.05);
    }

    #[test]
    fn multipolygon_conversions() {
        let multi = Geometry::from_wkt(
            "MULTIPOLYGON (((0 0,0 1,1 1,0 0)),((10 10,10 11,11 11,10 10)))",
            None,
            (),
        )
        .unwrap();
        assert!(multi.geometry(2, ()).is_err());

        let single = multi.geometry(1, ()).unwrap();
        let as_multi = single.force_to_multi_polygon().unwrap();
        assert_eq!(
            as_multi.wkt(()).unwrap(),
            "MULTIPOLYGON (((10 10,10 11,11 11,10 10)))"
        );
        drop(single);
        // the container still has both parts
        assert_eq!(multi.geometry_count().unwrap(), 2);

        let polygon = as_multi.force_to_polygon().unwrap();
        assert_eq!(polygon.wkt(()).unwrap(), "POLYGON ((10 10,10 11,11 11,10 10))");
    }

    #[test]
    fn reproject_out_of_range_fails() {
        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        let mercator = SpatialRef::from_epsg(3857).unwrap();

        let mut bad = Geometry::from_wkt("POINT (10 91)", Some(&wgs84), ()).unwrap();
        assert!(matches!(
            bad.reproject(&mercator, ()),
            Err(GdalError::Diagnostic { .. })
        ));

        let mut good = Geometry::from_wkt("POINT (10 10)", Some(&wgs84), ()).unwrap();
        good.reproject(&mercator, ()).unwrap();
        assert!(good.spatial_ref().unwrap().unwrap().is_same(&mercator).unwrap());
        let (x, _, _) = good.get_point(0).unwrap();
        assert_near!(x, 1_113_194.907_932_735_7, epsilon = 1e-3);
    }

    #[test]
    fn bounds_in_other_srs() {
        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        let mercator = SpatialRef::from_epsg(3857).unwrap();
        let geom =
            Geometry::from_wkt("LINESTRING (0 0,10 0)", Some(&wgs84), ()).unwrap();
        let bounds = geom.bounds_in(&mercator, ()).unwrap();
        assert_near!(bounds.max_x, 1_113_194.907_932_735_7, epsilon = 1e-3);
        // the geometry itself is unchanged
        assert_eq!(geom.bounds().unwrap().max_x, 10.0);
    }

    #[test]
    fn transform_with_coord_transform() {
        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        let mercator = SpatialRef::from_epsg(3857).unwrap();
        let ct = CoordTransform::new(&wgs84, &mercator).unwrap();
        let mut geom = Geometry::from_wkt("POINT (10 0)", None, ()).unwrap();
        geom.transform(&ct, ()).unwrap();
        assert_near!(geom.get_point(0).unwrap().0, 1_113_194.907_932_735_7, epsilon = 1e-3);
    }
}
