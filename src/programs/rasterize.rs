use std::path::Path;
use std::ptr::null_mut;

use gdal_sys::GDALRasterizeOptions;

use super::{program_args, CArgs, OutputSwitches};
use crate::context::{with_context, CallOptions};
use crate::dataset::Dataset;
use crate::errors::*;
use crate::utils::_path_to_c_string;

struct RasterizeOptions {
    c_options: *mut GDALRasterizeOptions,
}

impl Drop for RasterizeOptions {
    fn drop(&mut self) {
        unsafe { gdal_sys::GDALRasterizeOptionsFree(self.c_options) };
    }
}

/// Burns vector geometries into a new raster, like `gdal_rasterize`.
///
/// `opts.driver` selects the output format (`-of`) and each of `opts.creation_options`
/// is passed as a creation option (`-co`).
///
/// Wraps [GDALRasterize].
/// See the [program docs] for more details.
///
/// [GDALRasterize]: https://gdal.org/api/gdal_utils.html#_CPPv413GDALRasterizePKc12GDALDatasetH12GDALDatasetHPK20GDALRasterizeOptionsPi
/// [program docs]: https://gdal.org/programs/gdal_rasterize.html
pub fn rasterize<P: AsRef<Path>>(
    src: &Dataset,
    dest: P,
    switches: &[&str],
    opts: impl Into<CallOptions>,
) -> Result<Dataset> {
    let c_src = src.c_dataset()?;
    let c_dest = _path_to_c_string(dest.as_ref())?;
    let opts = opts.into();
    let args = program_args(
        switches,
        &opts,
        OutputSwitches {
            format: "-of",
            creation_option: "-co",
        },
    );
    let mut c_args = CArgs::new(&args)?;
    with_context(opts, |ctx| {
        let options = RasterizeOptions {
            c_options: unsafe {
                gdal_sys::GDALRasterizeOptionsNew(c_args.as_mut_ptr(), null_mut())
            },
        };
        if options.c_options.is_null() {
            ctx.note_failure("GDALRasterizeOptionsNew");
            return Dataset::default();
        }
        let mut usage_error = 0;
        let c_dataset = unsafe {
            gdal_sys::GDALRasterize(
                c_dest.as_ptr(),
                null_mut(),
                c_src,
                options.c_options,
                &mut usage_error,
            )
        };
        if c_dataset.is_null() || usage_error != 0 {
            ctx.note_failure("GDALRasterize");
        }
        unsafe { Dataset::owned(c_dataset) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture, TempFixture};

    #[test]
    fn rasterize_fixture() {
        let src = Dataset::open(fixture("test.geojson")).unwrap();
        let out = TempFixture::empty("burned.tif");
        let dst = rasterize(
            &src,
            out.path(),
            &["-burn", "255", "-ts", "10", "10", "-ot", "Byte"],
            CallOptions::default()
                .with_driver("GTiff")
                .with_creation_option("COMPRESS=DEFLATE"),
        )
        .unwrap();
        assert_eq!(dst.raster_size().unwrap(), (10, 10));
        let band = dst.rasterband(1).unwrap();
        assert_eq!(band.read_bytes((5, 5), (1, 1), ()).unwrap(), vec![255]);
    }

    #[test]
    fn unknown_format_fails() {
        let src = Dataset::open(fixture("test.geojson")).unwrap();
        let out = TempFixture::empty("burned.xyz");
        let res = rasterize(
            &src,
            out.path(),
            &["-burn", "1", "-ts", "4", "4"],
            CallOptions::default()
                .with_driver("NoSuchFormat")
                .without_default_handler(),
        );
        assert!(res.is_err());
    }
}
