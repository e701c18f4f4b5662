use std::marker::PhantomData;

use gdal_sys::{OGREnvelope, OGRLayerH, OGRwkbGeometryType};

use crate::context::{with_context, CallOptions};
use crate::dataset::Dataset;
use crate::errors::*;
use crate::handle::{LayerKind, NativeHandle, Ownership};
use crate::spatial_ref::SpatialRef;
use crate::utils::_string;
use crate::vector::{Defn, Envelope, Feature, Geometry};

/// Layer in a vector dataset
///
/// A layer always belongs to its dataset: closing it only invalidates this view.
///
/// ```no_run
/// use std::path::Path;
/// use gdal_safe::Dataset;
///
/// # fn main() -> gdal_safe::errors::Result<()> {
/// let dataset = Dataset::open(Path::new("fixtures/test.geojson"))?;
/// let mut layer = dataset.layer(0)?;
/// for feature in layer.features() {
///     let feature = feature?;
///     println!("{:?}", feature.geometry()?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Layer<'a> {
    handle: NativeHandle<LayerKind>,
    _dataset: PhantomData<&'a Dataset>,
}

impl<'a> Layer<'a> {
    /// Wraps a layer owned by `_dataset`.
    ///
    /// # Safety
    /// `c_layer` must be null or a layer of `_dataset`.
    pub unsafe fn from_c_layer(_dataset: &'a Dataset, c_layer: OGRLayerH) -> Self {
        Layer {
            handle: NativeHandle::wrap(c_layer, Ownership::Borrowed),
            _dataset: PhantomData,
        }
    }

    pub fn c_layer(&self) -> Result<OGRLayerH> {
        self.handle.get()
    }

    pub fn name(&self) -> Result<String> {
        let rv = unsafe { gdal_sys::OGR_L_GetName(self.c_layer()?) };
        Ok(_string(rv))
    }

    pub fn geometry_type(&self) -> Result<OGRwkbGeometryType::Type> {
        Ok(unsafe { gdal_sys::OGR_L_GetGeomType(self.c_layer()?) })
    }

    pub fn defn(&self) -> Result<Defn<'_>> {
        let c_defn = unsafe { gdal_sys::OGR_L_GetLayerDefn(self.c_layer()?) };
        Ok(unsafe { Defn::from_c_defn(c_defn) })
    }

    /// The spatial reference of the layer, if it has one.
    pub fn spatial_ref(&self) -> Result<Option<SpatialRef>> {
        let c_srs = unsafe { gdal_sys::OGR_L_GetSpatialRef(self.c_layer()?) };
        Ok(unsafe { SpatialRef::from_shared(c_srs) })
    }

    /// Extent of all features, computed by scanning the layer when the driver has no
    /// cached value.
    pub fn bounds(&self, opts: impl Into<CallOptions>) -> Result<Envelope> {
        let c_layer = self.c_layer()?;
        with_context(opts, |ctx| {
            let mut envelope = OGREnvelope {
                MinX: 0.0,
                MaxX: 0.0,
                MinY: 0.0,
                MaxY: 0.0,
            };
            let rv = unsafe { gdal_sys::OGR_L_GetExtent(c_layer, &mut envelope, 1) };
            ctx.check_ogr(rv, "OGR_L_GetExtent");
            Envelope::from(envelope)
        })
    }

    /// Number of features, counted by scanning the layer when needed.
    pub fn feature_count(&self, opts: impl Into<CallOptions>) -> Result<u64> {
        let c_layer = self.c_layer()?;
        with_context(opts, |ctx| {
            let count = unsafe { gdal_sys::OGR_L_GetFeatureCount(c_layer, 1) };
            if count < 0 {
                ctx.note_failure("OGR_L_GetFeatureCount");
            }
            count.max(0) as u64
        })
    }

    /// Restarts [`Layer::next_feature`] at the first feature.
    pub fn reset_reading(&mut self) -> Result<()> {
        unsafe { gdal_sys::OGR_L_ResetReading(self.c_layer()?) };
        Ok(())
    }

    /// The next feature of the sequential read, owned by the caller.
    pub fn next_feature(&mut self) -> Result<Option<Feature>> {
        let c_layer = self.c_layer()?;
        let feature = with_context((), |_| unsafe {
            Feature::owned(gdal_sys::OGR_L_GetNextFeature(c_layer))
        })?;
        Ok(feature.c_feature().is_ok().then_some(feature))
    }

    /// Iterate over all features in this layer, from the first one.
    pub fn features(&mut self) -> FeatureIterator<'_, 'a> {
        let reset = self.reset_reading();
        FeatureIterator {
            layer: self,
            pending_error: reset.err(),
            done: false,
        }
    }

    /// Writes `feature` as a new feature of this layer and records the FID it was given.
    pub fn create_feature(
        &mut self,
        feature: &mut Feature,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (c_layer, c_feature) = (self.c_layer()?, feature.c_feature()?);
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_L_CreateFeature(c_layer, c_feature) };
            ctx.check_ogr(rv, "OGR_L_CreateFeature");
        })?;
        feature.refresh_fid()
    }

    /// Creates and writes a feature with an optional geometry and unset attributes.
    pub fn new_feature(
        &mut self,
        geometry: Option<&Geometry>,
        opts: impl Into<CallOptions>,
    ) -> Result<Feature> {
        let c_layer = self.c_layer()?;
        let c_geom = geometry.map(Geometry::c_geometry).transpose()?;
        let mut feature = with_context(opts, |ctx| {
            let c_defn = unsafe { gdal_sys::OGR_L_GetLayerDefn(c_layer) };
            let feature = unsafe { Feature::owned(gdal_sys::OGR_F_Create(c_defn)) };
            let Ok(c_feature) = feature.c_feature() else {
                ctx.note_failure("OGR_F_Create");
                return feature;
            };
            if let Some(c_geom) = c_geom {
                let rv = unsafe { gdal_sys::OGR_F_SetGeometry(c_feature, c_geom) };
                if !ctx.check_ogr(rv, "OGR_F_SetGeometry") {
                    return feature;
                }
            }
            let rv = unsafe { gdal_sys::OGR_L_CreateFeature(c_layer, c_feature) };
            ctx.check_ogr(rv, "OGR_L_CreateFeature");
            feature
        })?;
        feature.refresh_fid()?;
        Ok(feature)
    }

    /// Rewrites the stored feature with the FID of `feature`.
    pub fn update_feature(
        &mut self,
        feature: &Feature,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let (c_layer, c_feature) = (self.c_layer()?, feature.c_feature()?);
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_L_SetFeature(c_layer, c_feature) };
            ctx.check_ogr(rv, "OGR_L_SetFeature");
        })
    }

    /// Deletes the stored feature with the FID of `feature`.
    pub fn delete_feature(
        &mut self,
        feature: &Feature,
        opts: impl Into<CallOptions>,
    ) -> Result<()> {
        let c_layer = self.c_layer()?;
        let fid = feature.fid().ok_or_else(|| {
            GdalError::BadArgument("cannot delete a feature without FID".to_string())
        })?;
        with_context(opts, |ctx| {
            let rv = unsafe { gdal_sys::OGR_L_DeleteFeature(c_layer, fid as i64) };
            ctx.check_ogr(rv, "OGR_L_DeleteFeature");
        })
    }

    /// Invalidates this view. The dataset keeps its layer.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

/// Sequential read over a layer, see [`Layer::features`].
///
/// Stops after the first error.
pub struct FeatureIterator<'l, 'a> {
    layer: &'l mut Layer<'a>,
    pending_error: Option<GdalError>,
    done: bool,
}

impl Iterator for FeatureIterator<'_, '_> {
    type Item = Result<Feature>;

    #[inline]
    fn next(&mut self) -> Option<Result<Feature>> {
        if self.done {
            return None;
        }
        if let Some(e) = self.pending_error.take() {
            self.done = true;
            return Some(Err(e));
        }
        match self.layer.next_feature() {
            Ok(Some(feature)) => Some(Ok(feature)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
