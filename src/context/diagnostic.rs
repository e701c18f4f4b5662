use std::ffi::c_int;
use std::fmt::{Display, Formatter};

use gdal_sys::CPLErr;

/// Severity of a GDAL diagnostic, ordered from least to most severe.
///
/// Mirrors `CPLErr`; `CE_Failure` is called [`Severity::Error`] here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    None,
    Debug,
    Warning,
    Error,
    Fatal,
}

impl From<CPLErr::Type> for Severity {
    fn from(error_type: CPLErr::Type) -> Self {
        match error_type {
            CPLErr::CE_None => Severity::None,
            CPLErr::CE_Debug => Severity::Debug,
            CPLErr::CE_Warning => Severity::Warning,
            CPLErr::CE_Failure => Severity::Error,
            CPLErr::CE_Fatal => Severity::Fatal,
            _ => Severity::None,
        }
    }
}

impl From<Severity> for CPLErr::Type {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::None => CPLErr::CE_None,
            Severity::Debug => CPLErr::CE_Debug,
            Severity::Warning => CPLErr::CE_Warning,
            Severity::Error => CPLErr::CE_Failure,
            Severity::Fatal => CPLErr::CE_Fatal,
        }
    }
}

/// One message reported by GDAL through `CPLError`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The `CPLErrorNum` (`CPLE_*`) code.
    pub code: c_int,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: c_int, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            code,
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?} {}] {}", self.severity, self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::from(CPLErr::CE_Failure), Severity::Error);
        assert_eq!(CPLErr::Type::from(Severity::Warning), CPLErr::CE_Warning);
    }
}
