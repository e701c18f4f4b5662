use std::ffi::{c_int, NulError};
use std::str::Utf8Error;

use gdal_sys::OGRErr;
use thiserror::Error;

use crate::context::Severity;
use crate::vector::FieldKind;

pub type Result<T> = std::result::Result<T, GdalError>;

#[derive(Clone, Debug, Error)]
pub enum GdalError {
    #[error("FfiNulError")]
    FfiNulError(#[from] NulError),
    #[error("StrUtf8Error")]
    StrUtf8Error(#[from] Utf8Error),
    #[error("{severity:?} diagnostic (code {code}): {message}")]
    Diagnostic {
        severity: Severity,
        code: c_int,
        message: String,
    },
    #[error("GDAL method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
    #[error("OGR method '{method_name}' returned error: '{err:?}'")]
    OgrError {
        err: OGRErr::Type,
        method_name: &'static str,
    },
    #[error("Invalid {kind} handle: the object is empty or has been closed")]
    InvalidHandle { kind: &'static str },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Field accessor is not bound to a feature")]
    MissingBinding,
    #[error("Field of kind {kind:?} cannot be accessed as '{requested}'")]
    TypeMismatch {
        kind: FieldKind,
        requested: &'static str,
    },
    #[error("Writing to fields of kind {kind:?} is not supported")]
    Unsupported { kind: FieldKind },
    #[error("Invalid field name '{field_name}' used on method {method_name}")]
    InvalidFieldName {
        field_name: String,
        method_name: &'static str,
    },
    #[error("Invalid field index {index} used on method {method_name}")]
    InvalidFieldIndex {
        index: usize,
        method_name: &'static str,
    },
    #[error("Bad argument: {0}")]
    BadArgument(String),
}

impl GdalError {
    /// The severity carried by a [`GdalError::Diagnostic`], if this is one.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            GdalError::Diagnostic { severity, .. } => Some(*severity),
            _ => None,
        }
    }
}
