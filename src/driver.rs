use std::ffi::{c_int, CString};
use std::sync::Once;

use gdal_sys::{GDALDataType, GDALDriverH};

use crate::context::{with_context, CallOptions};
use crate::cpl::CslStringList;
use crate::dataset::Dataset;
use crate::errors::*;
use crate::utils::_string;

static START: Once = Once::new();

/// Registers every driver GDAL was built with. Runs once per process.
pub fn _register_drivers() {
    START.call_once(|| unsafe {
        gdal_sys::GDALAllRegister();
    });
}

/// Raster and vector drivers.
///
/// Drivers are registered by GDAL for the life of the process and are never released.
#[derive(Debug, Clone, Copy)]
pub struct Driver {
    c_driver: GDALDriverH,
}

impl Driver {
    /// Wraps a C pointer
    ///
    /// # Safety
    /// `c_driver` must be a registered driver.
    pub unsafe fn from_c_driver(c_driver: GDALDriverH) -> Driver {
        Driver { c_driver }
    }

    pub fn c_driver(&self) -> GDALDriverH {
        self.c_driver
    }

    pub fn short_name(&self) -> String {
        let rv = unsafe { gdal_sys::GDALGetDriverShortName(self.c_driver) };
        _string(rv)
    }

    pub fn long_name(&self) -> String {
        let rv = unsafe { gdal_sys::GDALGetDriverLongName(self.c_driver) };
        _string(rv)
    }

    /// Creates a dataset of `bands` Byte bands of `size_x` x `size_y` pixels.
    ///
    /// `opts.creation_options` are forwarded to the driver.
    pub fn create(
        &self,
        filename: &str,
        size_x: usize,
        size_y: usize,
        bands: usize,
        opts: impl Into<CallOptions>,
    ) -> Result<Dataset> {
        let c_filename = CString::new(filename)?;
        let opts = opts.into();
        let options = CslStringList::from_strings(&opts.creation_options)?;
        let c_driver = self.c_driver;
        with_context(opts, |ctx| {
            let c_dataset = unsafe {
                gdal_sys::GDALCreate(
                    c_driver,
                    c_filename.as_ptr(),
                    size_x as c_int,
                    size_y as c_int,
                    bands as c_int,
                    GDALDataType::GDT_Byte,
                    options.as_ptr(),
                )
            };
            if c_dataset.is_null() {
                ctx.note_failure("GDALCreate");
            }
            unsafe { Dataset::owned(c_dataset) }
        })
    }

    /// Creates a dataset without raster bands, to hold vector layers.
    pub fn create_vector_only(
        &self,
        filename: &str,
        opts: impl Into<CallOptions>,
    ) -> Result<Dataset> {
        self.create(filename, 0, 0, 0, opts)
    }
}

/// A registry of available drivers.
pub struct DriverManager;

impl DriverManager {
    /// Number of registered drivers.
    pub fn count() -> usize {
        _register_drivers();
        unsafe { gdal_sys::GDALGetDriverCount() }.max(0) as usize
    }

    /// Looks up a driver by its short name, e.g. `GTiff` or `Memory`.
    pub fn get_driver_by_name(name: &str) -> Result<Driver> {
        _register_drivers();
        let c_name = CString::new(name)?;
        let c_driver = unsafe { gdal_sys::GDALGetDriverByName(c_name.as_ptr()) };
        if c_driver.is_null() {
            return Err(GdalError::NullPointer {
                method_name: "GDALGetDriverByName",
                msg: format!("no driver named '{name}'"),
            });
        }
        Ok(unsafe { Driver::from_c_driver(c_driver) })
    }
}
