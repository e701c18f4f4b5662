//! Ownership-tagged wrappers around GDAL's opaque handles.
//!
//! Every native object this crate exposes (dataset, layer, feature, geometry, spatial
//! reference, coordinate transformation, raster band) is held in a [`NativeHandle`]. A
//! handle is either [`Ownership::Owned`], in which case it releases the native object
//! exactly once (on [`close`](NativeHandle::close) or on drop), or
//! [`Ownership::Borrowed`], in which case the native object belongs to some parent
//! (a feature's geometry, a dataset's layer) and is never released through this handle.
//!
//! A null handle represents an empty object. Accessing it yields
//! [`GdalError::InvalidHandle`] instead of handing the null pointer to GDAL.

use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr;

use gdal_sys::{
    GDALDatasetH, GDALRasterBandH, OGRCoordinateTransformationH, OGRFeatureH, OGRGeometryH,
    OGRLayerH, OGRSpatialReferenceH,
};

use crate::context::with_context;
use crate::errors::{GdalError, Result};

/// Whether a handle is responsible for releasing its native object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
}

/// A raw native pointer that can be null.
pub trait RawPtr: Copy {
    fn null() -> Self;
    fn is_null(self) -> bool;
}

impl<T> RawPtr for *mut T {
    fn null() -> Self {
        ptr::null_mut()
    }

    fn is_null(self) -> bool {
        <*mut T>::is_null(self)
    }
}

/// A family of native objects sharing a handle type and a release function.
pub trait HandleKind {
    type Raw: RawPtr;
    /// Human readable name used in [`GdalError::InvalidHandle`].
    const NAME: &'static str;

    /// Releases an owned, non-null native object.
    ///
    /// # Safety
    /// `raw` must be a live object owned by the caller; it is invalid afterwards.
    unsafe fn release(raw: Self::Raw) -> Result<()>;
}

/// A native handle tagged with its ownership and close state.
pub struct NativeHandle<K: HandleKind> {
    raw: K::Raw,
    ownership: Ownership,
    closed: bool,
    _kind: PhantomData<K>,
}

impl<K: HandleKind> NativeHandle<K> {
    /// Wraps a raw handle.
    ///
    /// # Safety
    /// `raw` must be null or a valid `K` object. When `ownership` is `Owned` the handle
    /// becomes responsible for releasing it; when `Borrowed` the caller guarantees that the
    /// owner outlives every use of this handle.
    pub unsafe fn wrap(raw: K::Raw, ownership: Ownership) -> Self {
        NativeHandle {
            raw,
            ownership,
            closed: false,
            _kind: PhantomData,
        }
    }

    /// An empty handle. Every access fails with [`GdalError::InvalidHandle`].
    pub fn empty() -> Self {
        NativeHandle {
            raw: K::Raw::null(),
            ownership: Ownership::Borrowed,
            closed: false,
            _kind: PhantomData,
        }
    }

    /// The raw handle, or [`GdalError::InvalidHandle`] when empty or closed.
    pub fn get(&self) -> Result<K::Raw> {
        if self.closed || self.raw.is_null() {
            Err(GdalError::InvalidHandle { kind: K::NAME })
        } else {
            Ok(self.raw)
        }
    }

    /// The raw handle without any check. It may be null.
    pub fn raw(&self) -> K::Raw {
        self.raw
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` when the handle refers to no native object, either because it was created
    /// empty or because it has been closed.
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    /// Releases the native object if owned, then marks the handle closed.
    ///
    /// Closing again, or closing a borrowed or empty handle, only updates local state.
    /// Any failure reported while releasing is returned; the handle is closed regardless.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let raw = std::mem::replace(&mut self.raw, K::Raw::null());
        self.closed = true;
        if self.ownership == Ownership::Owned && !raw.is_null() {
            unsafe { K::release(raw) }
        } else {
            Ok(())
        }
    }

    /// Gives up ownership, returning the raw handle without releasing it.
    pub fn into_raw(mut self) -> K::Raw {
        let raw = std::mem::replace(&mut self.raw, K::Raw::null());
        self.closed = true;
        raw
    }
}

impl<K: HandleKind> Default for NativeHandle<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: HandleKind> Drop for NativeHandle<K> {
    fn drop(&mut self) {
        match self.close() {
            // diagnostics were already forwarded to the release's handler chain
            Ok(()) | Err(GdalError::Diagnostic { .. }) => {}
            Err(e) => tracing::error!("releasing {} failed: {e}", K::NAME),
        }
    }
}

impl<K: HandleKind> Debug for NativeHandle<K>
where
    K::Raw: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(K::NAME)
            .field("raw", &self.raw)
            .field("ownership", &self.ownership)
            .field("closed", &self.closed)
            .finish()
    }
}

/// `GDALDatasetH`, released with `GDALClose`.
///
/// Closing flushes pending writes, so the release runs inside an error context and a
/// failed flush is reported.
pub enum DatasetKind {}

impl HandleKind for DatasetKind {
    type Raw = GDALDatasetH;
    const NAME: &'static str = "dataset";

    unsafe fn release(raw: GDALDatasetH) -> Result<()> {
        with_context((), |ctx| {
            #[cfg(any(major_ge_4, all(major_is_3, minor_ge_8)))]
            {
                let rv = gdal_sys::GDALClose(raw);
                ctx.check_cpl(rv, "GDALClose");
            }
            // before 3.8 only the diagnostics report a failed flush
            #[cfg(not(any(major_ge_4, all(major_is_3, minor_ge_8))))]
            {
                let _ = ctx;
                gdal_sys::GDALClose(raw);
            }
        })
    }
}

/// `OGRLayerH`. Layers always belong to their dataset.
pub enum LayerKind {}

impl HandleKind for LayerKind {
    type Raw = OGRLayerH;
    const NAME: &'static str = "layer";

    unsafe fn release(_raw: OGRLayerH) -> Result<()> {
        Ok(())
    }
}

/// `OGRFeatureH`, released with `OGR_F_Destroy`.
pub enum FeatureKind {}

impl HandleKind for FeatureKind {
    type Raw = OGRFeatureH;
    const NAME: &'static str = "feature";

    unsafe fn release(raw: OGRFeatureH) -> Result<()> {
        gdal_sys::OGR_F_Destroy(raw);
        Ok(())
    }
}

/// `OGRGeometryH`, released with `OGR_G_DestroyGeometry`.
pub enum GeometryKind {}

impl HandleKind for GeometryKind {
    type Raw = OGRGeometryH;
    const NAME: &'static str = "geometry";

    unsafe fn release(raw: OGRGeometryH) -> Result<()> {
        gdal_sys::OGR_G_DestroyGeometry(raw);
        Ok(())
    }
}

/// `OGRSpatialReferenceH`, reference counted and released with `OSRRelease`.
pub enum SpatialRefKind {}

impl HandleKind for SpatialRefKind {
    type Raw = OGRSpatialReferenceH;
    const NAME: &'static str = "spatial reference";

    unsafe fn release(raw: OGRSpatialReferenceH) -> Result<()> {
        gdal_sys::OSRRelease(raw);
        Ok(())
    }
}

/// `OGRCoordinateTransformationH`, released with `OCTDestroyCoordinateTransformation`.
pub enum CoordTransformKind {}

impl HandleKind for CoordTransformKind {
    type Raw = OGRCoordinateTransformationH;
    const NAME: &'static str = "coordinate transformation";

    unsafe fn release(raw: OGRCoordinateTransformationH) -> Result<()> {
        gdal_sys::OCTDestroyCoordinateTransformation(raw);
        Ok(())
    }
}

/// `GDALRasterBandH`. Bands always belong to their dataset.
pub enum RasterBandKind {}

impl HandleKind for RasterBandKind {
    type Raw = GDALRasterBandH;
    const NAME: &'static str = "raster band";

    unsafe fn release(_raw: GDALRasterBandH) -> Result<()> {
        Ok(())
    }
}
