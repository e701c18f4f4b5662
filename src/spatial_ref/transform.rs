use std::ffi::c_int;
use std::ptr::null_mut;

use gdal_sys::OGRCoordinateTransformationH;

use crate::context::{with_context, CallOptions};
use crate::errors::{GdalError, Result};
use crate::handle::{CoordTransformKind, NativeHandle, Ownership};
use crate::spatial_ref::SpatialRef;

/// A transformation from one [`SpatialRef`] to another.
#[derive(Debug, Default)]
pub struct CoordTransform {
    handle: NativeHandle<CoordTransformKind>,
}

impl CoordTransform {
    /// See: [OCTNewCoordinateTransformation](https://gdal.org/api/ogr_srs_api.html#_CPPv430OCTNewCoordinateTransformation20OGRSpatialReferenceH20OGRSpatialReferenceH)
    pub fn new(source: &SpatialRef, target: &SpatialRef) -> Result<CoordTransform> {
        let (c_source, c_target) = (source.c_srs()?, target.c_srs()?);
        with_context((), |ctx| {
            let c_obj = unsafe { gdal_sys::OCTNewCoordinateTransformation(c_source, c_target) };
            if c_obj.is_null() {
                ctx.note_failure("OCTNewCoordinateTransformation");
            }
            CoordTransform {
                handle: unsafe { NativeHandle::wrap(c_obj, Ownership::Owned) },
            }
        })
    }

    /// Transforms coordinates in place. `z` may be empty.
    pub fn transform_coords(
        &self,
        x: &mut [f64],
        y: &mut [f64],
        z: &mut [f64],
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let c_transform = self.c_transform()?;
        let nb_coords = x.len();
        if y.len() != nb_coords || (!z.is_empty() && z.len() != nb_coords) {
            return Err(GdalError::BadArgument(format!(
                "transform coordinate slices have different lengths: {} {} {}",
                nb_coords,
                y.len(),
                z.len()
            )));
        }
        with_context(opts, |ctx| {
            let ok = unsafe {
                gdal_sys::OCTTransform(
                    c_transform,
                    nb_coords as c_int,
                    x.as_mut_ptr(),
                    y.as_mut_ptr(),
                    if z.is_empty() {
                        null_mut()
                    } else {
                        z.as_mut_ptr()
                    },
                )
            };
            if ok == 0 {
                ctx.note_failure("OCTTransform");
            }
        })
    }

    /// The raw handle, or [`GdalError::InvalidHandle`] once closed.
    pub fn c_transform(&self) -> Result<OGRCoordinateTransformationH> {
        self.handle.get()
    }

    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}
