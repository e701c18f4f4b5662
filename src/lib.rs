//! Ownership-tracked [GDAL](http://gdal.org/) bindings with per-call diagnostic capture.
//!
//! Every native call runs inside an [`ErrorContext`](context::ErrorContext) that listens
//! to GDAL diagnostics on the calling thread. Once the call returns, the diagnostics are
//! forwarded to the call's handlers (logging through `tracing` by default) and any
//! diagnostic at or above the threshold turns the call into an `Err`.
//!
//! Native objects live in [`NativeHandle`](handle::NativeHandle)s that know whether they
//! own the object: owned objects are released exactly once, on `close` or on drop, while
//! borrowed views (a feature's geometry, a dataset's layer) never release anything.
//!
//! ## Use
//!
//! ```no_run
//! use gdal_safe::context::{CallOptions, Diagnostic};
//! use gdal_safe::spatial_ref::SpatialRef;
//! use gdal_safe::vector::Geometry;
//!
//! # fn main() -> gdal_safe::errors::Result<()> {
//! let wgs84 = SpatialRef::from_epsg(4326)?;
//! let mercator = SpatialRef::from_epsg(3857)?;
//! let mut point = Geometry::from_wkt("POINT (10 91)", Some(&wgs84), ())?;
//! let opts = CallOptions::default().with_handler(|d: &Diagnostic| eprintln!("{d}"));
//! assert!(point.reproject(&mercator, opts).is_err());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod cpl;
mod dataset;
mod driver;
pub mod errors;
pub mod handle;
mod metadata;
mod options;
pub mod programs;
pub mod raster;
pub mod spatial_ref;
mod utils;
pub mod vector;

pub use dataset::{Dataset, GeoTransform, LayerIterator};
pub use driver::{Driver, DriverManager};
pub use metadata::{MajorObject, Metadata};
pub use options::{DatasetOptions, GdalOpenFlags};

#[cfg(test)]
pub(crate) mod test_utils;
