use std::ffi::c_int;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::Deref;

use gdal_sys::{OGREnvelope, OGRGeometryH, OGRwkbGeometryType};

use crate::context::{with_context, CallOptions};
use crate::errors::{GdalError, Result};
use crate::handle::{GeometryKind, NativeHandle, Ownership};
use crate::spatial_ref::SpatialRef;
use crate::utils::_string;

/// Axis aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl From<OGREnvelope> for Envelope {
    fn from(env: OGREnvelope) -> Self {
        Envelope {
            min_x: env.MinX,
            min_y: env.MinY,
            max_x: env.MaxX,
            max_y: env.MaxY,
        }
    }
}

/// An OGR geometry.
///
/// Geometries parsed or computed by this crate are owned and destroyed on drop. Parts of a
/// container and the geometry of a feature are handed out as [`GeometryRef`] views instead.
pub struct Geometry {
    handle: NativeHandle<GeometryKind>,
}

impl Geometry {
    /// Wraps a raw geometry.
    ///
    /// # Safety
    /// See [`NativeHandle::wrap`].
    pub unsafe fn from_raw(c_geometry: OGRGeometryH, ownership: Ownership) -> Geometry {
        Geometry {
            handle: NativeHandle::wrap(c_geometry, ownership),
        }
    }

    pub(crate) unsafe fn owned(c_geometry: OGRGeometryH) -> Geometry {
        Self::from_raw(c_geometry, Ownership::Owned)
    }

    /// Runs a native constructor inside an error context; a null result is a failure.
    pub(crate) fn build(
        opts: impl Into<CallOptions>,
        method_name: &'static str,
        create: impl FnOnce() -> OGRGeometryH,
    ) -> Result<Geometry> {
        with_context(opts, |ctx| {
            let c_geom = create();
            if c_geom.is_null() {
                ctx.note_failure(method_name);
            }
            unsafe { Geometry::owned(c_geom) }
        })
    }

    /// Creates an empty geometry of the given type, e.g. `wkbMultiPolygon`.
    pub fn empty(wkb_type: OGRwkbGeometryType::Type) -> Result<Geometry> {
        Self::build((), "OGR_G_CreateGeometry", || unsafe {
            gdal_sys::OGR_G_CreateGeometry(wkb_type)
        })
    }

    /// The raw handle, or [`GdalError::InvalidHandle`] for an empty or closed geometry.
    pub fn c_geometry(&self) -> Result<OGRGeometryH> {
        self.handle.get()
    }

    pub fn ownership(&self) -> Ownership {
        self.handle.ownership()
    }

    pub(crate) fn into_handle(self) -> NativeHandle<GeometryKind> {
        self.handle
    }

    pub fn geometry_type(&self) -> Result<OGRwkbGeometryType::Type> {
        Ok(unsafe { gdal_sys::OGR_G_GetGeometryType(self.c_geometry()?) })
    }

    /// The WKT name of the geometry type, e.g. `POLYGON`.
    pub fn geometry_name(&self) -> Result<String> {
        let rv = unsafe { gdal_sys::OGR_G_GetGeometryName(self.c_geometry()?) };
        Ok(_string(rv))
    }

    /// Number of parts of a container geometry, or rings of a polygon.
    pub fn geometry_count(&self) -> Result<usize> {
        let cnt = unsafe { gdal_sys::OGR_G_GetGeometryCount(self.c_geometry()?) };
        Ok(cnt.max(0) as usize)
    }

    pub fn point_count(&self) -> Result<usize> {
        let cnt = unsafe { gdal_sys::OGR_G_GetPointCount(self.c_geometry()?) };
        Ok(cnt.max(0) as usize)
    }

    /// Returns the point at `index` as `(x, y, z)`.
    pub fn get_point(&self, index: usize) -> Result<(f64, f64, f64)> {
        let c_geom = self.c_geometry()?;
        if index >= self.point_count()? {
            return Err(GdalError::BadArgument(format!(
                "point index {index} out of range"
            )));
        }
        let mut x: f64 = 0.;
        let mut y: f64 = 0.;
        let mut z: f64 = 0.;
        unsafe { gdal_sys::OGR_G_GetPoint(c_geom, index as c_int, &mut x, &mut y, &mut z) };
        Ok((x, y, z))
    }

    pub fn add_point_2d(&mut self, (x, y): (f64, f64)) -> Result<()> {
        unsafe { gdal_sys::OGR_G_AddPoint_2D(self.c_geometry()?, x, y) };
        Ok(())
    }

    /// Area of a surface, or of the surfaces contained in a collection. Zero otherwise.
    pub fn area(&self) -> Result<f64> {
        Ok(unsafe { gdal_sys::OGR_G_Area(self.c_geometry()?) })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(unsafe { gdal_sys::OGR_G_IsEmpty(self.c_geometry()?) } != 0)
    }

    pub fn is_valid(&self) -> Result<bool> {
        let c_geom = self.c_geometry()?;
        Ok(with_context((), |_| unsafe { gdal_sys::OGR_G_IsValid(c_geom) })? != 0)
    }

    /// The bounding box in the geometry's own coordinates.
    pub fn bounds(&self) -> Result<Envelope> {
        let mut envelope = OGREnvelope {
            MinX: 0.0,
            MaxX: 0.0,
            MinY: 0.0,
            MaxY: 0.0,
        };
        unsafe { gdal_sys::OGR_G_GetEnvelope(self.c_geometry()?, &mut envelope) };
        Ok(envelope.into())
    }

    /// The bounding box once reprojected to `spatial_ref`. The geometry itself is left as is.
    pub fn bounds_in(
        &self,
        spatial_ref: &SpatialRef,
        opts: impl Into<CallOptions>,
    ) -> Result<Envelope> {
        self.c_geometry()?;
        let mut copy = self.clone();
        copy.reproject(spatial_ref, opts)?;
        copy.bounds()
    }

    /// A view of the part at `index`, valid as long as `self` is borrowed.
    pub fn geometry(
        &self,
        index: usize,
        opts: impl Into<CallOptions>,
    ) -> Result<GeometryRef<'_>> {
        let c_geom = self.c_geometry()?;
        with_context(opts, |ctx| {
            let c_sub = unsafe { gdal_sys::OGR_G_GetGeometryRef(c_geom, index as c_int) };
            if c_sub.is_null() {
                ctx.note_failure("OGR_G_GetGeometryRef");
            }
            unsafe { GeometryRef::borrowed(c_sub) }
        })
    }

    /// Removes the part at `index` from this container and returns it as an owned geometry.
    pub fn detach_geometry(
        &mut self,
        index: usize,
        opts: impl Into<CallOptions>,
    ) -> Result<Geometry> {
        let c_geom = self.c_geometry()?;
        with_context(opts, |ctx| {
            let c_sub = unsafe { gdal_sys::OGR_G_GetGeometryRef(c_geom, index as c_int) };
            if c_sub.is_null() {
                ctx.note_failure("OGR_G_GetGeometryRef");
                return Geometry::default();
            }
            let rv = unsafe { gdal_sys::OGR_G_RemoveGeometry(c_geom, index as c_int, 0) };
            if ctx.check_ogr(rv, "OGR_G_RemoveGeometry") {
                unsafe { Geometry::owned(c_sub) }
            } else {
                Geometry::default()
            }
        })
    }

    /// Appends a copy of `other` to this container.
    pub fn add_geometry(&mut self, other: &Geometry, opts: impl Into<CallOptions>) -> Result<()> {
        let c_geom = self.c_geometry()?;
        let c_other = other.c_geometry()?;
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_G_AddGeometry(c_geom, c_other) };
            ctx.check_ogr(rv, "OGR_G_AddGeometry");
        })
    }

    /// The spatial reference assigned to this geometry, if any.
    pub fn spatial_ref(&self) -> Result<Option<SpatialRef>> {
        let c_srs = unsafe { gdal_sys::OGR_G_GetSpatialReference(self.c_geometry()?) };
        Ok(unsafe { SpatialRef::from_shared(c_srs) })
    }

    /// Assigns `spatial_ref` without transforming coordinates.
    pub fn set_spatial_ref(&mut self, spatial_ref: &SpatialRef) -> Result<()> {
        let c_geom = self.c_geometry()?;
        unsafe { gdal_sys::OGR_G_AssignSpatialReference(c_geom, spatial_ref.c_srs()?) };
        Ok(())
    }

    /// Releases the geometry if owned. Closing again has no effect.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

impl Default for Geometry {
    /// An empty handle, not an empty geometry: every accessor fails.
    fn default() -> Self {
        Geometry {
            handle: NativeHandle::empty(),
        }
    }
}

impl Clone for Geometry {
    /// A deep, owned copy. Cloning an empty or closed geometry yields an empty handle.
    fn clone(&self) -> Self {
        match self.c_geometry() {
            Ok(c_geom) => unsafe { Geometry::owned(gdal_sys::OGR_G_Clone(c_geom)) },
            Err(_) => Geometry::default(),
        }
    }
}

impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        match (self.c_geometry(), other.c_geometry()) {
            (Ok(a), Ok(b)) => unsafe { gdal_sys::OGR_G_Equals(a, b) != 0 },
            _ => false,
        }
    }
}

impl Debug for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.wkt(()) {
            Ok(wkt) => f.write_str(wkt.as_str()),
            Err(_) => write!(f, "Geometry({:?})", self.handle),
        }
    }
}

/// A borrowed view of a geometry owned by a feature or a container.
///
/// Closing a view never destroys the geometry; use [`Clone::clone`] (through `Deref`) to get
/// an owned copy that may outlive the parent.
pub struct GeometryRef<'a> {
    geometry: Geometry,
    _owner: PhantomData<&'a ()>,
}

impl GeometryRef<'_> {
    pub(crate) unsafe fn borrowed(c_geometry: OGRGeometryH) -> Self {
        GeometryRef {
            geometry: Geometry::from_raw(c_geometry, Ownership::Borrowed),
            _owner: PhantomData,
        }
    }

    /// Marks this view closed. The parent keeps its geometry.
    pub fn close(&mut self) -> Result<()> {
        self.geometry.close()
    }

    /// Converts a copy of this view; the parent is left untouched.
    pub fn force_to_polygon(&self) -> Result<Geometry> {
        self.geometry.clone().force_to_polygon()
    }

    /// Converts a copy of this view; the parent is left untouched.
    pub fn force_to_multi_polygon(&self) -> Result<Geometry> {
        self.geometry.clone().force_to_multi_polygon()
    }
}

impl Deref for GeometryRef<'_> {
    type Target = Geometry;

    fn deref(&self) -> &Geometry {
        &self.geometry
    }
}

impl Debug for GeometryRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.geometry.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handle_fails_every_accessor() {
        let g = Geometry::default();
        assert!(matches!(g.area(), Err(GdalError::InvalidHandle { kind: "geometry" })));
        assert!(g.geometry_type().is_err());
        assert!(g.bounds().is_err());
        assert!(g.wkt(()).is_err());
        assert!(g.clone().c_geometry().is_err());
    }

    #[test]
    fn close_is_idempotent() {
        let mut g = Geometry::from_wkt("POINT (1 2)", None, ()).unwrap();
        g.close().unwrap();
        g.close().unwrap();
        assert!(g.c_geometry().is_err());
    }

    #[test]
    fn build_by_points() {
        let mut line = Geometry::empty(OGRwkbGeometryType::wkbLineString).unwrap();
        line.add_point_2d((0.0, 0.0)).unwrap();
        line.add_point_2d((2.0, 1.0)).unwrap();
        assert_eq!(line.point_count().unwrap(), 2);
        assert_eq!(line.get_point(1).unwrap(), (2.0, 1.0, 0.0));
        assert!(line.get_point(2).is_err());
        assert_eq!(
            line.bounds().unwrap(),
            Envelope {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 2.0,
                max_y: 1.0
            }
        );
    }

    #[test]
    fn sub_geometries_are_borrowed() {
        let multi = Geometry::from_wkt(
            "MULTIPOLYGON (((0 0,0 1,1 1,0 0)),((10 10,10 11,11 11,10 10)))",
            None,
            (),
        )
        .unwrap();
        assert_eq!(multi.geometry_count().unwrap(), 2);

        let mut first = multi.geometry(0, ()).unwrap();
        assert_eq!(first.ownership(), Ownership::Borrowed);
        assert_eq!(first.geometry_name().unwrap(), "POLYGON");
        first.close().unwrap();
        first.close().unwrap();

        // the parent still owns its part
        assert_eq!(multi.geometry(0, ()).unwrap().area().unwrap(), 0.5);
        assert!(multi.geometry(2, ()).is_err());
    }

    #[test]
    fn detach_transfers_ownership() {
        let mut multi = Geometry::from_wkt("MULTIPOINT ((1 2),(3 4))", None, ()).unwrap();
        let point = multi.detach_geometry(1, ()).unwrap();
        assert_eq!(point.ownership(), Ownership::Owned);
        assert_eq!(point.wkt(()).unwrap(), "POINT (3 4)");
        assert_eq!(multi.geometry_count().unwrap(), 1);
        drop(multi);
        assert_eq!(point.get_point(0).unwrap(), (3.0, 4.0, 0.0));
    }

    #[test]
    fn add_geometry_copies() {
        let mut multi = Geometry::empty(OGRwkbGeometryType::wkbMultiPoint).unwrap();
        let mut point = Geometry::from_wkt("POINT (1 1)", None, ()).unwrap();
        multi.add_geometry(&point, ()).unwrap();
        point.close().unwrap();
        assert_eq!(multi.geometry_count().unwrap(), 1);
        assert_eq!(
            multi.geometry(0, ()).unwrap().get_point(0).unwrap(),
            (1.0, 1.0, 0.0)
        );
        assert!(matches!(
            multi.add_geometry(&point, ()),
            Err(GdalError::InvalidHandle { .. })
        ));
    }

    #[test]
    fn spatial_ref_is_shared() {
        let srs = SpatialRef::from_epsg(4326).unwrap();
        let mut g = Geometry::from_wkt("POINT (1 1)", None, ()).unwrap();
        assert!(g.spatial_ref().unwrap().is_none());
        g.set_spatial_ref(&srs).unwrap();
        drop(srs);
        let got = g.spatial_ref().unwrap().unwrap();
        assert_eq!(got.authority().unwrap(), "EPSG:4326");
    }
}
