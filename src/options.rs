use std::ffi::c_uint;

use bitflags::bitflags;

use crate::cpl::CslStringList;
use crate::errors::Result;

/// Open options for [`crate::Dataset::open_ex`]
#[derive(Debug, Default)]
pub struct DatasetOptions<'a> {
    pub open_flags: GdalOpenFlags,
    /// Short names of the drivers allowed to open the dataset; all when `None`.
    pub allowed_drivers: Option<&'a [&'a str]>,
    /// Driver specific `KEY=VALUE` open options.
    pub open_options: Option<&'a [&'a str]>,
}

impl DatasetOptions<'_> {
    /// Null-terminated lists for `GDALOpenEx`; `None` stays a null pointer.
    pub(crate) fn c_lists(&self) -> Result<(Option<CslStringList>, Option<CslStringList>)> {
        let drivers = self
            .allowed_drivers
            .map(|d| CslStringList::from_strings(d.iter()))
            .transpose()?;
        let open_options = self
            .open_options
            .map(|o| CslStringList::from_strings(o.iter()))
            .transpose()?;
        Ok((drivers, open_options))
    }
}

// These are skipped by bindgen and manually updated.
bitflags! {
    /// GDAL extended open flags used by [`crate::Dataset::open_ex`].
    ///
    /// Used in the `nOpenFlags` argument to [`GDALOpenEx`].
    ///
    /// `GDAL_OF_SHARED` is left out because a shared dataset could be handed to
    /// another thread through the `Send` implementation of `Dataset`.
    ///
    /// [`GDALOpenEx`]: https://gdal.org/doxygen/gdal_8h.html#a9cb8585d0b3c16726b08e25bcc94274a
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GdalOpenFlags: c_uint {
        /// Open in read-only mode (default).
        const GDAL_OF_READONLY = 0x00;
        /// Open in update mode.
        const GDAL_OF_UPDATE = 0x01;
        /// Allow raster and vector drivers to be used.
        const GDAL_OF_ALL = 0x00;
        /// Allow raster drivers to be used.
        const GDAL_OF_RASTER = 0x02;
        /// Allow vector drivers to be used.
        const GDAL_OF_VECTOR = 0x04;
        /// Emit error message in case of failed open.
        const GDAL_OF_VERBOSE_ERROR = 0x40;
    }
}

impl Default for GdalOpenFlags {
    fn default() -> GdalOpenFlags {
        GdalOpenFlags::GDAL_OF_READONLY
    }
}
