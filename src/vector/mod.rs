//! GDAL Vector Data
//!
//! ## Reading
//!
//! ```no_run
//! use std::path::Path;
//! use gdal_safe::Dataset;
//! use gdal_safe::vector::FieldAccessor;
//!
//! # fn main() -> gdal_safe::errors::Result<()> {
//! let dataset = Dataset::open(Path::new("fixtures/test.geojson"))?;
//! let mut layer = dataset.layer(0)?;
//! let names = FieldAccessor::<String>::unbound();
//! for feature in layer.features() {
//!     let feature = feature?;
//!     let fields = feature.fields()?;
//!     let name = names.get(fields.by_name("name")?)?;
//!     if let Some(geometry) = feature.geometry()? {
//!         println!("{name}: {}", geometry.wkt(())?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub use crate::vector::accessor::{FieldAccessor, FieldValueType};
pub use crate::vector::defn::{Defn, FieldDefinition, FieldIterator, SchemaField};
pub use crate::vector::feature::Feature;
pub use crate::vector::field::{Field, FieldKind, FieldValue, Fields};
pub use crate::vector::geometry::{Envelope, Geometry, GeometryRef};
pub use crate::vector::layer::{FeatureIterator, Layer};
pub use crate::vector::options::LayerOptions;
pub use gdal_sys::{OGRFieldType, OGRwkbGeometryType};

mod accessor;
mod defn;
mod feature;
mod field;
mod geometry;
mod layer;
mod ops;
mod options;
