use std::ffi::{c_char, c_int, CString};
use std::ptr::null_mut;

use gdal_sys::OGRwkbByteOrder;

use crate::context::{with_context, CallOptions};
use crate::cpl::CslStringList;
use crate::errors::{GdalError, Result};
use crate::spatial_ref::SpatialRef;
use crate::utils::_owned_string;
use crate::vector::Geometry;

fn c_srs_or_null(spatial_ref: Option<&SpatialRef>) -> Result<gdal_sys::OGRSpatialReferenceH> {
    match spatial_ref {
        Some(srs) => srs.c_srs(),
        None => Ok(null_mut()),
    }
}

/// Methods supporting translation between GDAL [`Geometry`] and various text representations.
///
/// These include:
/// * ["Well Known" representations of geometry][wikipedia].
/// * [GeoJSON][geojson]
/// * [GML][gml] (export only)
///
/// [wikipedia]: https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry
/// [geojson]: https://geojson.org/
/// [gml]: https://en.wikipedia.org/wiki/Geography_Markup_Language
impl Geometry {
    /// Create a geometry by parsing a WKT string, optionally assigning `spatial_ref`.
    pub fn from_wkt(
        wkt: &str,
        spatial_ref: Option<&SpatialRef>,
        opts: impl Into<CallOptions>,
    ) -> Result<Geometry> {
        let c_wkt = CString::new(wkt)?;
        let c_srs = c_srs_or_null(spatial_ref)?;
        with_context(opts, |ctx| {
            // The input is only read; the signature takes `char**` to advance the cursor.
            let mut c_wkt_ptr = c_wkt.as_ptr() as *mut c_char;
            let mut c_geom = null_mut();
            let rv = unsafe { gdal_sys::OGR_G_CreateFromWkt(&mut c_wkt_ptr, c_srs, &mut c_geom) };
            let geom = unsafe { Geometry::owned(c_geom) };
            ctx.check_ogr(rv, "OGR_G_CreateFromWkt");
            geom
        })
    }

    /// Creates a geometry by parsing WKB bytes, optionally assigning `spatial_ref`.
    ///
    /// Empty input is rejected before reaching GDAL.
    pub fn from_wkb(
        wkb: &[u8],
        spatial_ref: Option<&SpatialRef>,
        opts: impl Into<CallOptions>,
    ) -> Result<Geometry> {
        if wkb.is_empty() {
            return Err(GdalError::BadArgument("empty WKB input".to_string()));
        }
        let c_srs = c_srs_or_null(spatial_ref)?;
        with_context(opts, |ctx| {
            let mut c_geom = null_mut();
            let rv = unsafe {
                gdal_sys::OGR_G_CreateFromWkb(
                    wkb.as_ptr() as _,
                    c_srs,
                    &mut c_geom,
                    wkb.len() as c_int,
                )
            };
            let geom = unsafe { Geometry::owned(c_geom) };
            ctx.check_ogr(rv, "OGR_G_CreateFromWkb");
            geom
        })
    }

    /// Create a geometry by parsing a GeoJSON geometry object.
    pub fn from_geojson(json: &str, opts: impl Into<CallOptions>) -> Result<Geometry> {
        let c_geojson = CString::new(json)?;
        Geometry::build(opts, "OGR_G_CreateGeometryFromJson", || unsafe {
            gdal_sys::OGR_G_CreateGeometryFromJson(c_geojson.as_ptr())
        })
    }

    /// Serialize the geometry as WKT.
    pub fn wkt(&self, opts: impl Into<CallOptions>) -> Result<String> {
        let c_geom = self.c_geometry()?;
        with_context(opts, |ctx| {
            let mut c_wkt = null_mut();
            let rv = unsafe { gdal_sys::OGR_G_ExportToWkt(c_geom, &mut c_wkt) };
            ctx.check_ogr(rv, "OGR_G_ExportToWkt");
            _owned_string(c_wkt)
        })
    }

    /// Serializes the geometry to little-endian WKB.
    pub fn wkb(&self, opts: impl Into<CallOptions>) -> Result<Vec<u8>> {
        let c_geom = self.c_geometry()?;
        with_context(opts, |ctx| {
            let wkb_size = unsafe { gdal_sys::OGR_G_WkbSize(c_geom) }.max(0) as usize;
            let mut wkb = vec![0; wkb_size];
            let rv = unsafe {
                gdal_sys::OGR_G_ExportToWkb(c_geom, OGRwkbByteOrder::wkbNDR, wkb.as_mut_ptr())
            };
            ctx.check_ogr(rv, "OGR_G_ExportToWkb");
            wkb
        })
    }

    /// Serialize the geometry as GeoJSON, rounding coordinates to `precision` decimals.
    ///
    /// See: [`OGR_G_ExportToJsonEx`](https://gdal.org/api/vector_c_api.html#_CPPv420OGR_G_ExportToJsonEx12OGRGeometryHPPc)
    pub fn geojson(&self, precision: u32, opts: impl Into<CallOptions>) -> Result<String> {
        let c_geom = self.c_geometry()?;
        let mut options = CslStringList::new();
        options.set_name_value("COORDINATE_PRECISION", &precision.to_string())?;
        with_context(opts, |ctx| {
            let c_json = unsafe { gdal_sys::OGR_G_ExportToJsonEx(c_geom, options.as_ptr()) };
            if c_json.is_null() {
                ctx.note_failure("OGR_G_ExportToJsonEx");
            }
            _owned_string(c_json)
        })
    }

    /// Serialize the geometry as GML. The options' creation options are passed to GDAL as
    /// export options, e.g. `FORMAT=GML3`.
    pub fn gml(&self, opts: impl Into<CallOptions>) -> Result<String> {
        let c_geom = self.c_geometry()?;
        let opts = opts.into();
        let options = CslStringList::from_strings(&opts.creation_options)?;
        with_context(opts, |ctx| {
            let c_gml = unsafe { gdal_sys::OGR_G_ExportToGMLEx(c_geom, options.as_ptr()) };
            if c_gml.is_null() {
                ctx.note_failure("OGR_G_ExportToGMLEx");
            }
            _owned_string(c_gml)
        })
    }
}
