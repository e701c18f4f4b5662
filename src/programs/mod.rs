//! Rust wrappers for the [GDAL Programs](https://gdal.org/programs/index.html)
//!
//! Switches are passed as on the command line. The output driver and creation options
//! of the [`CallOptions`](crate::context::CallOptions) are appended to them.

mod rasterize;
mod vector_translate;

pub use rasterize::rasterize;
pub use vector_translate::vector_translate;

use std::ffi::{c_char, CString};
use std::ptr::null_mut;

use crate::context::CallOptions;
use crate::errors::Result;

/// The switches naming an output format and its creation options for one program.
pub(crate) struct OutputSwitches {
    pub format: &'static str,
    pub creation_option: &'static str,
}

/// `switches` followed by the output format and creation options of `opts`.
pub(crate) fn program_args(
    switches: &[&str],
    opts: &CallOptions,
    output: OutputSwitches,
) -> Vec<String> {
    let mut args: Vec<String> = switches.iter().map(|s| s.to_string()).collect();
    if let Some(driver) = &opts.driver {
        args.push(output.format.to_string());
        args.push(driver.clone());
    }
    for option in &opts.creation_options {
        args.push(output.creation_option.to_string());
        args.push(option.clone());
    }
    args
}

/// A null-terminated `char**` view over owned arguments.
pub(crate) struct CArgs {
    _strings: Vec<CString>,
    ptrs: Vec<*mut c_char>,
}

impl CArgs {
    pub fn new(args: &[String]) -> Result<Self> {
        let strings = args
            .iter()
            .map(|a| CString::new(a.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let ptrs = strings
            .iter()
            .map(|s| s.as_ptr() as *mut c_char)
            .chain(std::iter::once(null_mut()))
            .collect();
        Ok(CArgs {
            _strings: strings,
            ptrs,
        })
    }

    pub fn as_mut_ptr(&mut self) -> *mut *mut c_char {
        self.ptrs.as_mut_ptr()
    }
}
