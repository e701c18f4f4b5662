//! GDAL Raster Data

mod rasterband;
mod rasterize;

pub use rasterband::{PolygonizeMask, PolygonizeOptions, RasterBand};
pub use rasterize::{MergeAlgorithm, RasterizeGeometryOptions};
