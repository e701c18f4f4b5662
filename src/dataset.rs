use std::ffi::{c_int, CString};
use std::path::Path;
use std::ptr::null_mut;

use gdal_sys::{CPLErr, GDALDatasetH, GDALMajorObjectH};

use crate::context::{with_context, CallOptions};
use crate::cpl::CslStringList;
use crate::driver::{Driver, _register_drivers};
use crate::errors::*;
use crate::handle::{DatasetKind, NativeHandle, Ownership};
use crate::metadata::{MajorObject, Metadata};
use crate::options::DatasetOptions;
use crate::raster::RasterBand;
use crate::utils::_path_to_c_string;
use crate::vector::{Layer, LayerOptions};

/// Affine transformation from pixel/line to georeferenced coordinates.
///
/// x-coordinate of the top-left corner pixel (x-offset),
/// width of a pixel (x-resolution),
/// row rotation (typically zero),
/// y-coordinate of the top-left corner pixel,
/// column rotation (typically zero),
/// height of a pixel (y-resolution, typically negative)
pub type GeoTransform = [f64; 6];

/// A raster and/or vector dataset.
///
/// Closing flushes pending writes; failures surface as `Err` from [`Dataset::close`].
/// A dataset dropped without closing logs such failures instead.
#[derive(Debug, Default)]
pub struct Dataset {
    handle: NativeHandle<DatasetKind>,
}

// GDAL Docs state: The returned dataset should only be accessed by one thread at a time.
// See: https://gdal.org/api/raster_c_api.html#_CPPv48GDALOpenPKc10GDALAccess
// Additionally, VRT Datasets are not safe before GDAL 2.3.
// See: https://gdal.org/drivers/raster/vrt.html#multi-threading-issues
#[cfg(any(all(major_is_2, minor_ge_3), major_ge_3))]
unsafe impl Send for Dataset {}

impl Dataset {
    /// Wraps a C pointer.
    ///
    /// # Safety
    /// See [`NativeHandle::wrap`].
    pub unsafe fn from_c_dataset(c_dataset: GDALDatasetH, ownership: Ownership) -> Dataset {
        Dataset {
            handle: NativeHandle::wrap(c_dataset, ownership),
        }
    }

    pub(crate) unsafe fn owned(c_dataset: GDALDatasetH) -> Dataset {
        Self::from_c_dataset(c_dataset, Ownership::Owned)
    }

    pub fn c_dataset(&self) -> Result<GDALDatasetH> {
        self.handle.get()
    }

    /// Open a dataset read-only with any driver.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        Self::open_ex(path, DatasetOptions::default())
    }

    /// Open a dataset with extended options, see [`DatasetOptions`].
    pub fn open_ex<P: AsRef<Path>>(path: P, options: DatasetOptions) -> Result<Dataset> {
        _register_drivers();
        let path = path.as_ref();
        let c_filename = _path_to_c_string(path)?;
        let (drivers, open_options) = options.c_lists()?;
        let c_drivers = drivers.as_ref().map_or(std::ptr::null(), |d| d.as_ptr());
        let c_open_options = open_options.as_ref().map_or(std::ptr::null(), |o| o.as_ptr());
        tracing::debug!(path = %path.display(), flags = ?options.open_flags, "opening dataset");
        with_context((), |ctx| {
            let c_dataset = unsafe {
                gdal_sys::GDALOpenEx(
                    c_filename.as_ptr(),
                    options.open_flags.bits(),
                    c_drivers as *const *const std::ffi::c_char,
                    c_open_options as *const *const std::ffi::c_char,
                    std::ptr::null(),
                )
            };
            if c_dataset.is_null() {
                ctx.note_failure("GDALOpenEx");
            }
            unsafe { Dataset::owned(c_dataset) }
        })
    }

    pub fn driver(&self) -> Result<Driver> {
        let c_driver = unsafe { gdal_sys::GDALGetDatasetDriver(self.c_dataset()?) };
        Ok(unsafe { Driver::from_c_driver(c_driver) })
    }

    /// Flushes and closes the dataset. Closing again has no effect.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    pub fn layer_count(&self) -> Result<usize> {
        let count = unsafe { gdal_sys::GDALDatasetGetLayerCount(self.c_dataset()?) };
        Ok(count.max(0) as usize)
    }

    /// The layer at `idx`, borrowed from this dataset.
    pub fn layer(&self, idx: usize) -> Result<Layer<'_>> {
        let c_dataset = self.c_dataset()?;
        let c_layer = with_context((), |ctx| {
            let c_layer = unsafe { gdal_sys::GDALDatasetGetLayer(c_dataset, idx as c_int) };
            if c_layer.is_null() {
                ctx.note_failure("GDALDatasetGetLayer");
            }
            c_layer
        })?;
        Ok(unsafe { Layer::from_c_layer(self, c_layer) })
    }

    /// The layer called `name`, if there is one.
    pub fn layer_by_name(&self, name: &str) -> Result<Option<Layer<'_>>> {
        let c_dataset = self.c_dataset()?;
        let c_name = CString::new(name)?;
        let c_layer = unsafe { gdal_sys::GDALDatasetGetLayerByName(c_dataset, c_name.as_ptr()) };
        if c_layer.is_null() {
            return Ok(None);
        }
        Ok(Some(unsafe { Layer::from_c_layer(self, c_layer) }))
    }

    /// Every layer of the dataset, in order.
    pub fn layers(&self) -> Result<LayerIterator<'_>> {
        Ok(LayerIterator {
            dataset: self,
            next_id: 0,
            total: self.layer_count()?,
        })
    }

    /// Creates a layer and its attribute fields.
    ///
    /// ```no_run
    /// use gdal_safe::DriverManager;
    /// use gdal_safe::vector::{FieldDefinition, FieldKind, LayerOptions, OGRwkbGeometryType};
    ///
    /// # fn main() -> gdal_safe::errors::Result<()> {
    /// let driver = DriverManager::get_driver_by_name("Memory")?;
    /// let mut dataset = driver.create_vector_only("", ())?;
    /// let fields = [FieldDefinition::new("name", FieldKind::String)];
    /// let layer = dataset.create_layer(
    ///     LayerOptions {
    ///         name: "places",
    ///         ty: OGRwkbGeometryType::wkbPoint,
    ///         fields: &fields,
    ///         ..Default::default()
    ///     },
    ///     (),
    /// )?;
    /// assert_eq!(layer.defn()?.field_count(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_layer(
        &mut self,
        options: LayerOptions<'_>,
        opts: impl Into<CallOptions>,
    ) -> Result<Layer<'_>> {
        let c_dataset = self.c_dataset()?;
        let c_name = CString::new(options.name)?;
        let c_srs = match options.srs {
            Some(srs) => srs.c_srs()?,
            None => null_mut(),
        };
        let layer_options = match options.options {
            Some(o) => CslStringList::from_strings(o.iter())?,
            None => CslStringList::new(),
        };
        let c_field_defns = options
            .fields
            .iter()
            .map(|f| f.to_c_field_defn())
            .collect::<Vec<_>>();
        let c_layer = with_context(opts, |ctx| {
            let c_layer = unsafe {
                gdal_sys::GDALDatasetCreateLayer(
                    c_dataset,
                    c_name.as_ptr(),
                    c_srs,
                    options.ty,
                    layer_options.as_ptr(),
                )
            };
            if c_layer.is_null() {
                ctx.note_failure("GDALDatasetCreateLayer");
            }
            for c_field_defn in &c_field_defns {
                let Ok(c_field_defn) = c_field_defn else {
                    ctx.note_failure("OGR_Fld_Create");
                    continue;
                };
                if !c_layer.is_null() {
                    let rv = unsafe { gdal_sys::OGR_L_CreateField(c_layer, *c_field_defn, 1) };
                    ctx.check_ogr(rv, "OGR_L_CreateField");
                }
                unsafe { gdal_sys::OGR_Fld_Destroy(*c_field_defn) };
            }
            c_layer
        })?;
        Ok(unsafe { Layer::from_c_layer(self, c_layer) })
    }

    /// Copies `source`, schema and features, into a new layer called `name`.
    ///
    /// `opts.creation_options` are passed as layer creation options.
    pub fn copy_layer(
        &mut self,
        source: &Layer,
        name: &str,
        opts: impl Into<CallOptions>,
    ) -> Result<Layer<'_>> {
        let (c_dataset, c_source) = (self.c_dataset()?, source.c_layer()?);
        let c_name = CString::new(name)?;
        let opts = opts.into();
        let layer_options = CslStringList::from_strings(&opts.creation_options)?;
        let c_layer = with_context(opts, |ctx| {
            let c_layer = unsafe {
                gdal_sys::GDALDatasetCopyLayer(
                    c_dataset,
                    c_source,
                    c_name.as_ptr(),
                    layer_options.as_ptr(),
                )
            };
            if c_layer.is_null() {
                ctx.note_failure("GDALDatasetCopyLayer");
            }
            c_layer
        })?;
        Ok(unsafe { Layer::from_c_layer(self, c_layer) })
    }

    pub fn raster_count(&self) -> Result<usize> {
        let count = unsafe { gdal_sys::GDALGetRasterCount(self.c_dataset()?) };
        Ok(count.max(0) as usize)
    }

    /// The band at `band_index`, counting from 1 as GDAL does.
    pub fn rasterband(&self, band_index: usize) -> Result<RasterBand<'_>> {
        let c_dataset = self.c_dataset()?;
        let c_band = with_context((), |ctx| {
            let c_band = unsafe { gdal_sys::GDALGetRasterBand(c_dataset, band_index as c_int) };
            if c_band.is_null() {
                ctx.note_failure("GDALGetRasterBand");
            }
            c_band
        })?;
        Ok(unsafe { RasterBand::from_c_rasterband(self, c_band) })
    }

    /// Raster size as `(width, height)`.
    pub fn raster_size(&self) -> Result<(usize, usize)> {
        let c_dataset = self.c_dataset()?;
        let size_x = unsafe { gdal_sys::GDALGetRasterXSize(c_dataset) };
        let size_y = unsafe { gdal_sys::GDALGetRasterYSize(c_dataset) };
        Ok((size_x.max(0) as usize, size_y.max(0) as usize))
    }

    pub fn set_geo_transform(
        &mut self,
        transformation: &GeoTransform,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let c_dataset = self.c_dataset()?;
        let mut transformation = *transformation;
        with_context(opts, |ctx| {
            let rv =
                unsafe { gdal_sys::GDALSetGeoTransform(c_dataset, transformation.as_mut_ptr()) };
            ctx.check_cpl(rv, "GDALSetGeoTransform");
        })
    }

    /// Get affine transformation coefficients, failing when the dataset has none.
    pub fn geo_transform(&self, opts: impl Into<CallOptions>) -> Result<GeoTransform> {
        let c_dataset = self.c_dataset()?;
        with_context(opts, |ctx| {
            let mut transformation = GeoTransform::default();
            let rv =
                unsafe { gdal_sys::GDALGetGeoTransform(c_dataset, transformation.as_mut_ptr()) };
            // a missing geotransform is reported through the return value only
            if rv != CPLErr::CE_None {
                ctx.note_failure("GDALGetGeoTransform");
            }
            transformation
        })
    }
}

impl MajorObject for Dataset {
    fn gdal_object_ptr(&self) -> Result<GDALMajorObjectH> {
        self.c_dataset()
    }
}

impl Metadata for Dataset {}

pub struct LayerIterator<'a> {
    dataset: &'a Dataset,
    next_id: usize,
    total: usize,
}

impl<'a> Iterator for LayerIterator<'a> {
    type Item = Layer<'a>;

    #[inline]
    fn next(&mut self) -> Option<Layer<'a>> {
        if self.next_id >= self.total {
            return None;
        }
        let c_dataset = self.dataset.c_dataset().ok()?;
        let c_layer = unsafe { gdal_sys::GDALDatasetGetLayer(c_dataset, self.next_id as c_int) };
        self.next_id += 1;
        if c_layer.is_null() {
            return None;
        }
        Some(unsafe { Layer::from_c_layer(self.dataset, c_layer) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next_id.min(self.total);
        (0, Some(left))
    }
}
