//! Statically typed reads and writes of dynamically typed OGR fields.
//!
//! ```no_run
//! use gdal_safe::vector::{FieldAccessor, Feature};
//! # fn demo(feature: &Feature) -> gdal_safe::errors::Result<()> {
//! let mut fields = feature.fields()?;
//! let population = fields.by_name_mut("population")?;
//! let ints = FieldAccessor::<i64>::new(feature);
//! let current = ints.get(population)?;
//! ints.set(population, current + 1, ())?;
//! # Ok(())
//! # }
//! ```

use std::ffi::c_int;
use std::marker::PhantomData;

use chrono::{DateTime, FixedOffset};

use super::{Feature, Field, FieldKind, FieldValue};
use crate::context::{with_context, CallOptions};
use crate::errors::{GdalError, Result};

/// A Rust type that corresponds to one or more OGR field kinds.
///
/// | Kind | Type |
/// |---|---|
/// | Integer | `i32` |
/// | Integer64 | `i64` |
/// | Real | `f64` |
/// | String | `String` |
/// | Date, Time, DateTime | `DateTime<FixedOffset>` |
/// | Binary | `Vec<u8>` |
/// | IntegerList | `Vec<i32>` |
/// | Integer64List | `Vec<i64>` |
/// | RealList | `Vec<f64>` |
/// | StringList | `Vec<String>` |
pub trait FieldValueType: Sized {
    /// Name reported in [`GdalError::TypeMismatch`].
    const NAME: &'static str;

    /// Extracts `Self` when the value's kind maps to this type.
    fn from_value(value: &FieldValue) -> Option<Self>;

    /// Wraps `self` as a value of `kind`, or `None` when `kind` does not map to this type.
    fn into_value(self, kind: FieldKind) -> Option<FieldValue>;
}

macro_rules! scalar_field_type {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl FieldValueType for $ty {
            const NAME: &'static str = $name;

            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self, kind: FieldKind) -> Option<FieldValue> {
                (kind == FieldKind::$variant).then(|| FieldValue::$variant(self))
            }
        }
    };
}

scalar_field_type!(i32, "i32", Integer);
scalar_field_type!(i64, "i64", Integer64);
scalar_field_type!(f64, "f64", Real);
scalar_field_type!(Vec<u8>, "Vec<u8>", Binary);
scalar_field_type!(Vec<i32>, "Vec<i32>", IntegerList);
scalar_field_type!(Vec<i64>, "Vec<i64>", Integer64List);
scalar_field_type!(Vec<f64>, "Vec<f64>", RealList);
scalar_field_type!(Vec<String>, "Vec<String>", StringList);

impl FieldValueType for String {
    const NAME: &'static str = "String";

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(s) | FieldValue::Unknown(Some(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self, kind: FieldKind) -> Option<FieldValue> {
        (kind == FieldKind::String).then(|| FieldValue::String(self))
    }
}

impl FieldValueType for DateTime<FixedOffset> {
    const NAME: &'static str = "DateTime<FixedOffset>";

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Date(v) | FieldValue::Time(v) | FieldValue::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self, kind: FieldKind) -> Option<FieldValue> {
        match kind {
            FieldKind::Date => Some(FieldValue::Date(self)),
            FieldKind::Time => Some(FieldValue::Time(self)),
            FieldKind::DateTime => Some(FieldValue::DateTime(self)),
            _ => None,
        }
    }
}

/// Reads and writes fields as `T`, optionally bound to the feature that writes go to.
///
/// Reads work on any [`Field`] snapshot. Writes need a bound, open feature; the field
/// snapshot is updated in place after a successful write.
#[derive(Debug)]
pub struct FieldAccessor<'f, T> {
    feature: Option<&'f Feature>,
    _value: PhantomData<fn() -> T>,
}

impl<'f, T: FieldValueType> FieldAccessor<'f, T> {
    pub fn new(feature: &'f Feature) -> Self {
        FieldAccessor {
            feature: Some(feature),
            _value: PhantomData,
        }
    }

    /// An accessor that can read but not write.
    pub fn unbound() -> Self {
        FieldAccessor {
            feature: None,
            _value: PhantomData,
        }
    }

    /// The field's value as `T`. The field kind must map exactly to `T`; there is no
    /// widening, so an `Integer` field cannot be read as `i64`.
    pub fn get(&self, field: &Field) -> Result<T> {
        T::from_value(&field.value).ok_or(GdalError::TypeMismatch {
            kind: field.kind(),
            requested: T::NAME,
        })
    }

    /// Writes `value` to the bound feature and refreshes `field` from it.
    ///
    /// `field` must describe a slot of the bound feature: its kind is checked against the
    /// feature's schema before anything is written. Temporal values are cached with whole
    /// seconds, as stored.
    pub fn set(&self, field: &mut Field, value: T, opts: impl Into<CallOptions>) -> Result<()> {
        let feature = self.feature.ok_or(GdalError::MissingBinding)?;
        let c_feature = feature.c_feature().map_err(|_| {
            GdalError::InvalidState("the bound feature is empty or closed".to_string())
        })?;

        let kind = field.kind();
        if kind == FieldKind::Unknown {
            return Err(GdalError::Unsupported { kind });
        }
        let value = value.into_value(kind).ok_or(GdalError::TypeMismatch {
            kind,
            requested: T::NAME,
        })?;

        let field_count = unsafe { gdal_sys::OGR_F_GetFieldCount(c_feature) };
        if field.index >= field_count.max(0) as usize {
            return Err(GdalError::InvalidFieldIndex {
                index: field.index,
                method_name: "FieldAccessor::set",
            });
        }
        let index = field.index as c_int;
        let native_kind = unsafe {
            let c_field_defn = gdal_sys::OGR_F_GetFieldDefnRef(c_feature, index);
            FieldKind::from_ogr(gdal_sys::OGR_Fld_GetType(c_field_defn))
        };
        if native_kind != kind {
            return Err(GdalError::TypeMismatch {
                kind: native_kind,
                requested: T::NAME,
            });
        }

        with_context(opts, |_| unsafe { value.write(c_feature, index) })??;
        field.is_set = unsafe { gdal_sys::OGR_F_IsFieldSet(c_feature, index) } != 0;
        field.value = value.as_stored();
        Ok(())
    }
}
