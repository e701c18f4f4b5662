use std::ffi::c_int;
use std::marker::PhantomData;
use std::ptr::null_mut;

use gdal_sys::{GDALDataType, GDALMajorObjectH, GDALRWFlag, GDALRasterBandH};

use crate::context::{with_context, CallOptions};
use crate::cpl::CslStringList;
use crate::dataset::Dataset;
use crate::errors::*;
use crate::handle::{NativeHandle, Ownership, RasterBandKind};
use crate::metadata::{MajorObject, Metadata};
use crate::vector::Layer;

/// Represents a single band of a dataset.
///
/// This object carries the lifetime of the dataset that
/// contains it. This is necessary to prevent the dataset
/// from being dropped before the band.
#[derive(Debug)]
pub struct RasterBand<'a> {
    handle: NativeHandle<RasterBandKind>,
    _dataset: PhantomData<&'a Dataset>,
}

impl<'a> RasterBand<'a> {
    /// Create a RasterBand from a wrapped C pointer
    ///
    /// # Safety
    /// `c_rasterband` must be null or a band of `_dataset`.
    pub unsafe fn from_c_rasterband(_dataset: &'a Dataset, c_rasterband: GDALRasterBandH) -> Self {
        RasterBand {
            handle: NativeHandle::wrap(c_rasterband, Ownership::Borrowed),
            _dataset: PhantomData,
        }
    }

    pub fn c_rasterband(&self) -> Result<GDALRasterBandH> {
        self.handle.get()
    }

    /// Get dimensions of the band as `(width, height)`.
    /// Note that this may not be the same as `size` on the
    /// owning dataset due to scale.
    pub fn size(&self) -> Result<(usize, usize)> {
        let c_band = self.c_rasterband()?;
        let x = unsafe { gdal_sys::GDALGetRasterBandXSize(c_band) };
        let y = unsafe { gdal_sys::GDALGetRasterBandYSize(c_band) };
        Ok((x.max(0) as usize, y.max(0) as usize))
    }

    /// Get block size from a 'Dataset'.
    pub fn block_size(&self) -> Result<(usize, usize)> {
        let mut size_x = 0;
        let mut size_y = 0;
        unsafe { gdal_sys::GDALGetBlockSize(self.c_rasterband()?, &mut size_x, &mut size_y) };
        Ok((size_x.max(0) as usize, size_y.max(0) as usize))
    }

    /// Sets every pixel to `value`.
    pub fn fill(&mut self, value: f64, opts: impl Into<CallOptions>) -> Result<()> {
        let c_band = self.c_rasterband()?;
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::GDALFillRaster(c_band, value, 0.0) };
            ctx.check_cpl(rv, "GDALFillRaster");
        })
    }

    /// Read a window of pixels as bytes, row by row.
    ///
    /// # Arguments
    /// * window - the window position from top left
    /// * window_size - the window size
    pub fn read_bytes(
        &self,
        window: (usize, usize),
        window_size: (usize, usize),
        opts: impl Into<CallOptions>,
    ) -> Result<Vec<u8>> {
        let c_band = self.c_rasterband()?;
        let mut data = vec![0u8; window_size.0 * window_size.1];
        with_context(opts, |ctx| {
            let rv = unsafe {
                raster_io(c_band, GDALRWFlag::GF_Read, window, window_size, data.as_mut_ptr())
            };
            ctx.check_cpl(rv, "GDALRasterIO");
        })?;
        Ok(data)
    }

    /// Write bytes, row by row, into a window of pixels.
    ///
    /// `data` must hold exactly one byte per pixel of the window.
    pub fn write_bytes(
        &mut self,
        window: (usize, usize),
        window_size: (usize, usize),
        data: &[u8],
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let c_band = self.c_rasterband()?;
        if data.len() != window_size.0 * window_size.1 {
            return Err(GdalError::BadArgument(format!(
                "{} bytes do not fill a {}x{} window",
                data.len(),
                window_size.0,
                window_size.1
            )));
        }
        with_context(opts, |ctx| {
            // GF_Write only reads from the buffer
            let rv = unsafe {
                raster_io(
                    c_band,
                    GDALRWFlag::GF_Write,
                    window,
                    window_size,
                    data.as_ptr() as *mut u8,
                )
            };
            ctx.check_cpl(rv, "GDALRasterIO");
        })
    }

    /// The mask band of this band; all pixels are valid when there is no explicit mask.
    pub fn mask_band(&self) -> Result<RasterBand<'a>> {
        let c_band = self.c_rasterband()?;
        let c_mask = with_context((), |ctx| {
            let c_mask = unsafe { gdal_sys::GDALGetMaskBand(c_band) };
            if c_mask.is_null() {
                ctx.note_failure("GDALGetMaskBand");
            }
            c_mask
        })?;
        Ok(RasterBand {
            handle: unsafe { NativeHandle::wrap(c_mask, Ownership::Borrowed) },
            _dataset: PhantomData,
        })
    }

    /// Creates one polygon feature in `layer` per connected region of equal pixel values.
    ///
    /// See: [`GDALPolygonize`](https://gdal.org/api/gdal_alg.html#_CPPv414GDALPolygonize15GDALRasterBandH15GDALRasterBandH9OGRLayerHiPPc16GDALProgressFuncPv)
    pub fn polygonize(
        &self,
        layer: &mut Layer,
        options: PolygonizeOptions,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (c_band, c_layer) = (self.c_rasterband()?, layer.c_layer()?);
        let c_mask = match options.mask {
            PolygonizeMask::BandMask => self.mask_band()?.c_rasterband()?,
            PolygonizeMask::Band(mask) => mask.c_rasterband()?,
            PolygonizeMask::None => null_mut(),
        };
        let field_index = options.pixel_value_field.map_or(-1, |i| i as c_int);
        let mut algo_options = CslStringList::new();
        if options.eight_connected {
            algo_options.set_name_value("8CONNECTED", "8")?;
        }
        with_context(opts, |ctx| {
            let rv = unsafe {
                gdal_sys::GDALPolygonize(
                    c_band,
                    c_mask,
                    c_layer,
                    field_index,
                    algo_options.as_ptr() as *mut *mut _,
                    None,
                    null_mut(),
                )
            };
            ctx.check_cpl(rv, "GDALPolygonize");
        })
    }

    /// Invalidates this view. The dataset keeps its band.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

/// Byte-typed `GDALRasterIO` over a window, with a buffer the size of the window.
unsafe fn raster_io(
    c_band: GDALRasterBandH,
    flag: GDALRWFlag::Type,
    window: (usize, usize),
    window_size: (usize, usize),
    buffer: *mut u8,
) -> gdal_sys::CPLErr::Type {
    gdal_sys::GDALRasterIO(
        c_band,
        flag,
        window.0 as c_int,
        window.1 as c_int,
        window_size.0 as c_int,
        window_size.1 as c_int,
        buffer.cast(),
        window_size.0 as c_int,
        window_size.1 as c_int,
        GDALDataType::GDT_Byte,
        0,
        0,
    )
}

/// Which pixels [`RasterBand::polygonize`] skips.
#[derive(Debug, Default, Clone, Copy)]
pub enum PolygonizeMask<'b, 'a> {
    /// The band's own mask band, see [`RasterBand::mask_band`].
    #[default]
    BandMask,
    /// Pixels that are zero in this band are skipped.
    Band(&'b RasterBand<'a>),
    /// Every pixel is polygonized, nodata included.
    None,
}

/// Options for [`RasterBand::polygonize`].
#[derive(Debug, Default)]
pub struct PolygonizeOptions<'b, 'a> {
    /// Attribute field of the output layer receiving the pixel value; none when `None`.
    pub pixel_value_field: Option<usize>,
    pub mask: PolygonizeMask<'b, 'a>,
    /// Use 8 connectedness instead of 4.
    pub eight_connected: bool,
}

impl MajorObject for RasterBand<'_> {
    fn gdal_object_ptr(&self) -> Result<GDALMajorObjectH> {
        self.c_rasterband()
    }
}

impl Metadata for RasterBand<'_> {}
