use std::ffi::{c_int, c_void};
use std::ptr;

use crate::context::{with_context, CallOptions};
use crate::cpl::CslStringList;
use crate::dataset::Dataset;
use crate::errors::*;
use crate::vector::Geometry;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MergeAlgorithm {
    #[default]
    Replace,
    Add,
}

/// Options that specify how to burn a geometry into raster bands.
#[derive(Clone, Debug, Default)]
pub struct RasterizeGeometryOptions {
    /// Bands to burn into, counting from 1. Empty means every band of the dataset.
    pub bands: Vec<usize>,

    /// One burn value per band, or a single value used for every band. Empty burns `0`.
    pub values: Vec<f64>,

    /// Set to `true` to set all pixels touched by the line or
    /// polygons, not just those whose center is within the polygon or
    /// that are selected by brezenhams line algorithm. Defaults to
    /// `false`.
    pub all_touched: bool,

    /// May be `MergeAlgorithm::Replace` (the default) or
    /// `MergeAlgorithm::Add`. `Replace` results in overwriting of
    /// value, while `Add` adds the new value to the existing raster,
    /// suitable for heatmaps for instance.
    pub merge_algorithm: MergeAlgorithm,
}

impl RasterizeGeometryOptions {
    fn to_options(&self) -> Result<CslStringList> {
        let mut options = CslStringList::new();
        options.set_name_value(
            "ALL_TOUCHED",
            if self.all_touched { "TRUE" } else { "FALSE" },
        )?;
        options.set_name_value(
            "MERGE_ALG",
            match self.merge_algorithm {
                MergeAlgorithm::Replace => "REPLACE",
                MergeAlgorithm::Add => "ADD",
            },
        )?;
        Ok(options)
    }
}

/// Resolves the band list and one burn value per band.
///
/// `raster_count` is only consulted when no band is given.
fn burn_plan(
    options: &RasterizeGeometryOptions,
    raster_count: impl FnOnce() -> Result<usize>,
) -> Result<(Vec<c_int>, Vec<f64>)> {
    let bands: Vec<usize> = if options.bands.is_empty() {
        (1..=raster_count()?).collect()
    } else {
        options.bands.clone()
    };
    let values = match options.values.len() {
        0 => vec![0.0; bands.len()],
        1 => vec![options.values[0]; bands.len()],
        n if n == bands.len() => options.values.clone(),
        n => {
            return Err(GdalError::BadArgument(format!(
                "{n} burn values for {} bands",
                bands.len()
            )))
        }
    };
    Ok((bands.into_iter().map(|b| b as c_int).collect(), values))
}

impl Dataset {
    /// Burns `geometry` into raster bands of this dataset.
    ///
    /// The geometry must use the dataset's georeferenced coordinates.
    pub fn rasterize_geometry(
        &mut self,
        geometry: &Geometry,
        options: RasterizeGeometryOptions,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (mut bands, mut values) = burn_plan(&options, || self.raster_count())?;
        let raster_count = self.raster_count()?;
        if let Some(band) = bands.iter().find(|&&b| b < 1 || b as usize > raster_count) {
            return Err(GdalError::BadArgument(format!(
                "band {band} out of range 1..={raster_count}"
            )));
        }
        let c_dataset = self.c_dataset()?;
        let mut geometries = [geometry.c_geometry()?];
        let c_options = options.to_options()?;
        with_context(opts, |ctx| {
            // The C function takes `bands`, `geometries`, `burn_values`
            // and `options` without mention of `const`, and this is
            // propagated to the gdal_sys wrapper. The lack of `const`
            // seems like a mistake in the GDAL API, so we just do a casts
            // here.
            let rv = unsafe {
                gdal_sys::GDALRasterizeGeometries(
                    c_dataset,
                    bands.len() as c_int,
                    bands.as_mut_ptr(),
                    geometries.len() as c_int,
                    geometries.as_mut_ptr() as *mut *mut c_void,
                    None,
                    ptr::null_mut(),
                    values.as_mut_ptr(),
                    c_options.as_ptr() as *mut *mut _,
                    None,
                    ptr::null_mut(),
                )
            };
            ctx.check_cpl(rv, "GDALRasterizeGeometries");
        })
    }
}
