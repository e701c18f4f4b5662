use std::path::Path;
use std::ptr::null_mut;

use gdal_sys::GDALVectorTranslateOptions;

use super::{program_args, CArgs, OutputSwitches};
use crate::context::{with_context, CallOptions};
use crate::dataset::Dataset;
use crate::errors::*;
use crate::utils::_path_to_c_string;

/// Wraps a [GDALVectorTranslateOptions] object.
///
/// [GDALVectorTranslateOptions]: https://gdal.org/api/gdal_utils.html#_CPPv426GDALVectorTranslateOptions
struct VectorTranslateOptions {
    c_options: *mut GDALVectorTranslateOptions,
}

impl Drop for VectorTranslateOptions {
    fn drop(&mut self) {
        unsafe { gdal_sys::GDALVectorTranslateOptionsFree(self.c_options) };
    }
}

/// Converts simple features data between file formats, like `ogr2ogr`.
///
/// `opts.driver` selects the output format (`-f`) and each of `opts.creation_options` is
/// passed as a dataset creation option (`-dsco`).
///
/// Wraps [GDALVectorTranslate].
/// See the [program docs] for more details.
///
/// [GDALVectorTranslate]: https://gdal.org/api/gdal_utils.html#_CPPv419GDALVectorTranslatePKc12GDALDatasetHiP12GDALDatasetHPK26GDALVectorTranslateOptionsPi
/// [program docs]: https://gdal.org/programs/ogr2ogr.html
pub fn vector_translate<P: AsRef<Path>>(
    src: &Dataset,
    dest: P,
    switches: &[&str],
    opts: impl Into<CallOptions>,
) -> Result<Dataset> {
    let mut src_raw = [src.c_dataset()?];
    let c_dest = _path_to_c_string(dest.as_ref())?;
    let opts = opts.into();
    let args = program_args(
        switches,
        &opts,
        OutputSwitches {
            format: "-f",
            creation_option: "-dsco",
        },
    );
    let mut c_args = CArgs::new(&args)?;
    with_context(opts, |ctx| {
        let options = VectorTranslateOptions {
            c_options: unsafe {
                gdal_sys::GDALVectorTranslateOptionsNew(c_args.as_mut_ptr(), null_mut())
            },
        };
        if options.c_options.is_null() {
            ctx.note_failure("GDALVectorTranslateOptionsNew");
            return Dataset::default();
        }
        let mut usage_error = 0;
        let c_dataset = unsafe {
            gdal_sys::GDALVectorTranslate(
                c_dest.as_ptr(),
                null_mut(),
                1,
                src_raw.as_mut_ptr(),
                options.c_options,
                &mut usage_error,
            )
        };
        if c_dataset.is_null() || usage_error != 0 {
            ctx.note_failure("GDALVectorTranslate");
        }
        unsafe { Dataset::owned(c_dataset) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture, TempFixture};
    use crate::errors::GdalError;

    #[test]
    fn translate_to_gpkg() {
        let src = Dataset::open(fixture("test.geojson")).unwrap();
        let out = TempFixture::empty("out.gpkg");
        let dst = vector_translate(
            &src,
            out.path(),
            &["-nln", "copied"],
            CallOptions::default().with_driver("GPKG"),
        )
        .unwrap();
        assert_eq!(dst.driver().unwrap().short_name(), "GPKG");
        let layer = dst.layer_by_name("copied").unwrap().unwrap();
        assert_eq!(layer.feature_count(()).unwrap(), 1);
    }

    #[test]
    fn bad_switch_fails() {
        let src = Dataset::open(fixture("test.geojson")).unwrap();
        let out = TempFixture::empty("out.geojson");
        let res = vector_translate(
            &src,
            out.path(),
            &["-no-such-switch"],
            CallOptions::default().without_default_handler(),
        );
        assert!(matches!(res, Err(GdalError::Diagnostic { .. })));
    }
}
