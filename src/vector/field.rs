//! Snapshots of a feature's attribute values.

use std::ffi::c_int;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use gdal_sys::{OGRFeatureH, OGRFieldType};

use crate::cpl::CslStringList;
use crate::errors::{GdalError, Result};
use crate::utils::{_array_to_vec, _string, _string_array};

/// The OGR field types this crate distinguishes.
///
/// The deprecated wide-string kinds map to [`FieldKind::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    IntegerList,
    Real,
    RealList,
    String,
    StringList,
    Binary,
    Date,
    Time,
    DateTime,
    Integer64,
    Integer64List,
    Unknown,
}

impl FieldKind {
    pub fn from_ogr(field_type: OGRFieldType::Type) -> Self {
        match field_type {
            OGRFieldType::OFTInteger => FieldKind::Integer,
            OGRFieldType::OFTIntegerList => FieldKind::IntegerList,
            OGRFieldType::OFTReal => FieldKind::Real,
            OGRFieldType::OFTRealList => FieldKind::RealList,
            OGRFieldType::OFTString => FieldKind::String,
            OGRFieldType::OFTStringList => FieldKind::StringList,
            OGRFieldType::OFTBinary => FieldKind::Binary,
            OGRFieldType::OFTDate => FieldKind::Date,
            OGRFieldType::OFTTime => FieldKind::Time,
            OGRFieldType::OFTDateTime => FieldKind::DateTime,
            OGRFieldType::OFTInteger64 => FieldKind::Integer64,
            OGRFieldType::OFTInteger64List => FieldKind::Integer64List,
            _ => FieldKind::Unknown,
        }
    }

    /// The OGR type to create a field of this kind with. `Unknown` maps to `OFTWideString`.
    pub fn to_ogr(self) -> OGRFieldType::Type {
        match self {
            FieldKind::Integer => OGRFieldType::OFTInteger,
            FieldKind::IntegerList => OGRFieldType::OFTIntegerList,
            FieldKind::Real => OGRFieldType::OFTReal,
            FieldKind::RealList => OGRFieldType::OFTRealList,
            FieldKind::String => OGRFieldType::OFTString,
            FieldKind::StringList => OGRFieldType::OFTStringList,
            FieldKind::Binary => OGRFieldType::OFTBinary,
            FieldKind::Date => OGRFieldType::OFTDate,
            FieldKind::Time => OGRFieldType::OFTTime,
            FieldKind::DateTime => OGRFieldType::OFTDateTime,
            FieldKind::Integer64 => OGRFieldType::OFTInteger64,
            FieldKind::Integer64List => OGRFieldType::OFTInteger64List,
            FieldKind::Unknown => OGRFieldType::OFTWideString,
        }
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::Time | FieldKind::DateTime)
    }
}

/// A decoded attribute value. The variant determines the field kind.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i32),
    IntegerList(Vec<i32>),
    Real(f64),
    RealList(Vec<f64>),
    String(String),
    StringList(Vec<String>),
    Binary(Vec<u8>),
    Date(DateTime<FixedOffset>),
    Time(DateTime<FixedOffset>),
    DateTime(DateTime<FixedOffset>),
    Integer64(i64),
    Integer64List(Vec<i64>),
    /// A value of a kind without typed support, with its string rendering when set.
    Unknown(Option<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::IntegerList(_) => FieldKind::IntegerList,
            FieldValue::Real(_) => FieldKind::Real,
            FieldValue::RealList(_) => FieldKind::RealList,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::StringList(_) => FieldKind::StringList,
            FieldValue::Binary(_) => FieldKind::Binary,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Time(_) => FieldKind::Time,
            FieldValue::DateTime(_) => FieldKind::DateTime,
            FieldValue::Integer64(_) => FieldKind::Integer64,
            FieldValue::Integer64List(_) => FieldKind::Integer64List,
            FieldValue::Unknown(_) => FieldKind::Unknown,
        }
    }

    /// The value an unset field of `kind` carries.
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Integer => FieldValue::Integer(0),
            FieldKind::IntegerList => FieldValue::IntegerList(Vec::new()),
            FieldKind::Real => FieldValue::Real(0.0),
            FieldKind::RealList => FieldValue::RealList(Vec::new()),
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::StringList => FieldValue::StringList(Vec::new()),
            FieldKind::Binary => FieldValue::Binary(Vec::new()),
            FieldKind::Date => FieldValue::Date(epoch()),
            FieldKind::Time => FieldValue::Time(epoch()),
            FieldKind::DateTime => FieldValue::DateTime(epoch()),
            FieldKind::Integer64 => FieldValue::Integer64(0),
            FieldKind::Integer64List => FieldValue::Integer64List(Vec::new()),
            FieldKind::Unknown => FieldValue::Unknown(None),
        }
    }

    /// This value as OGR stores it: temporal values keep whole seconds only.
    pub(crate) fn as_stored(self) -> Self {
        let whole = |v: DateTime<FixedOffset>| v.with_nanosecond(0).unwrap_or(v);
        match self {
            FieldValue::Date(v) => FieldValue::Date(whole(v)),
            FieldValue::Time(v) => FieldValue::Time(whole(v)),
            FieldValue::DateTime(v) => FieldValue::DateTime(whole(v)),
            other => other,
        }
    }

    /// Reads field `index` of `c_feature`, which has kind `kind`.
    ///
    /// # Safety
    /// `c_feature` must be a live feature and `index` a valid field index of it.
    pub(crate) unsafe fn read(c_feature: OGRFeatureH, index: c_int, kind: FieldKind) -> Self {
        let mut len: c_int = 0;
        match kind {
            FieldKind::Integer => {
                FieldValue::Integer(gdal_sys::OGR_F_GetFieldAsInteger(c_feature, index))
            }
            FieldKind::Integer64 => {
                FieldValue::Integer64(gdal_sys::OGR_F_GetFieldAsInteger64(c_feature, index))
            }
            FieldKind::Real => FieldValue::Real(gdal_sys::OGR_F_GetFieldAsDouble(c_feature, index)),
            FieldKind::String => {
                FieldValue::String(_string(gdal_sys::OGR_F_GetFieldAsString(c_feature, index)))
            }
            FieldKind::Date => FieldValue::Date(read_datetime(c_feature, index)),
            FieldKind::Time => FieldValue::Time(read_datetime(c_feature, index)),
            FieldKind::DateTime => FieldValue::DateTime(read_datetime(c_feature, index)),
            FieldKind::Binary => {
                let ptr = gdal_sys::OGR_F_GetFieldAsBinary(c_feature, index, &mut len);
                FieldValue::Binary(_array_to_vec(ptr as *const u8, len))
            }
            FieldKind::IntegerList => {
                let ptr = gdal_sys::OGR_F_GetFieldAsIntegerList(c_feature, index, &mut len);
                FieldValue::IntegerList(_array_to_vec(ptr, len))
            }
            FieldKind::Integer64List => {
                let ptr = gdal_sys::OGR_F_GetFieldAsInteger64List(c_feature, index, &mut len);
                FieldValue::Integer64List(_array_to_vec(ptr, len))
            }
            FieldKind::RealList => {
                let ptr = gdal_sys::OGR_F_GetFieldAsDoubleList(c_feature, index, &mut len);
                FieldValue::RealList(_array_to_vec(ptr, len))
            }
            FieldKind::StringList => FieldValue::StringList(_string_array(
                gdal_sys::OGR_F_GetFieldAsStringList(c_feature, index),
            )),
            FieldKind::Unknown => FieldValue::Unknown(Some(_string(
                gdal_sys::OGR_F_GetFieldAsString(c_feature, index),
            ))),
        }
    }

    /// Writes this value into field `index` of `c_feature`.
    ///
    /// Date, time and date-time values share one path; their offset is stored as OGR's TZ
    /// flag (`100` is UTC, each step is 15 minutes).
    /// Sub-second precision is dropped.
    ///
    /// # Safety
    /// `c_feature` must be a live feature and `index` a valid field index of it.
    pub(crate) unsafe fn write(&self, c_feature: OGRFeatureH, index: c_int) -> Result<()> {
        match self {
            FieldValue::Integer(value) => gdal_sys::OGR_F_SetFieldInteger(c_feature, index, *value),
            FieldValue::Integer64(value) => {
                gdal_sys::OGR_F_SetFieldInteger64(c_feature, index, *value)
            }
            FieldValue::Real(value) => gdal_sys::OGR_F_SetFieldDouble(c_feature, index, *value),
            FieldValue::String(value) => {
                let c_value = std::ffi::CString::new(value.as_str())?;
                gdal_sys::OGR_F_SetFieldString(c_feature, index, c_value.as_ptr())
            }
            FieldValue::Date(value) | FieldValue::Time(value) | FieldValue::DateTime(value) => {
                let tzflag = 100 + value.offset().local_minus_utc() / (15 * 60);
                gdal_sys::OGR_F_SetFieldDateTime(
                    c_feature,
                    index,
                    value.year() as c_int,
                    value.month() as c_int,
                    value.day() as c_int,
                    value.hour() as c_int,
                    value.minute() as c_int,
                    value.second() as c_int,
                    tzflag as c_int,
                )
            }
            FieldValue::Binary(bytes) => {
                let ptr = if bytes.is_empty() {
                    std::ptr::null()
                } else {
                    bytes.as_ptr()
                };
                gdal_sys::OGR_F_SetFieldBinary(c_feature, index, bytes.len() as c_int, ptr as _)
            }
            FieldValue::IntegerList(values) => gdal_sys::OGR_F_SetFieldIntegerList(
                c_feature,
                index,
                values.len() as c_int,
                values.as_ptr(),
            ),
            FieldValue::Integer64List(values) => gdal_sys::OGR_F_SetFieldInteger64List(
                c_feature,
                index,
                values.len() as c_int,
                values.as_ptr(),
            ),
            FieldValue::RealList(values) => gdal_sys::OGR_F_SetFieldDoubleList(
                c_feature,
                index,
                values.len() as c_int,
                values.as_ptr(),
            ),
            FieldValue::StringList(values) => {
                let list = CslStringList::from_strings(values)?;
                gdal_sys::OGR_F_SetFieldStringList(c_feature, index, list.as_ptr())
            }
            FieldValue::Unknown(_) => {
                return Err(GdalError::Unsupported {
                    kind: FieldKind::Unknown,
                })
            }
        }
        Ok(())
    }
}

fn epoch() -> DateTime<FixedOffset> {
    Utc.fix().from_utc_datetime(&NaiveDateTime::default())
}

/// Temporal values always decode as UTC wall-clock values; the stored TZ flag is ignored.
/// Missing calendar parts (time-only fields) fall back to 1970-01-01.
unsafe fn read_datetime(c_feature: OGRFeatureH, index: c_int) -> DateTime<FixedOffset> {
    let mut year: c_int = 0;
    let mut month: c_int = 0;
    let mut day: c_int = 0;
    let mut hour: c_int = 0;
    let mut minute: c_int = 0;
    let mut second: c_int = 0;
    let mut tzflag: c_int = 0;

    let success = gdal_sys::OGR_F_GetFieldAsDateTime(
        c_feature,
        index,
        &mut year,
        &mut month,
        &mut day,
        &mut hour,
        &mut minute,
        &mut second,
        &mut tzflag,
    );
    if success == 0 {
        return epoch();
    }

    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or_default();
    let time =
        NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32).unwrap_or_default();
    Utc.fix().from_utc_datetime(&NaiveDateTime::new(date, time))
}

/// One attribute of a feature, as read by [`Feature::fields`](crate::vector::Feature::fields).
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Position in the layer schema.
    pub index: usize,
    pub name: String,
    /// Whether the feature holds a value for this field.
    pub is_set: bool,
    pub value: FieldValue,
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }
}

/// A feature's attributes in schema order.
///
/// This is a snapshot: later changes to the feature are only visible after calling
/// [`Feature::fields`](crate::vector::Feature::fields) again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields {
    fields: Vec<Field>,
}

impl Fields {
    pub(crate) fn new(fields: Vec<Field>) -> Self {
        Fields { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn by_index(&self, index: usize) -> Result<&Field> {
        self.fields.get(index).ok_or(GdalError::InvalidFieldIndex {
            index,
            method_name: "Fields::by_index",
        })
    }

    pub fn by_index_mut(&mut self, index: usize) -> Result<&mut Field> {
        self.fields.get_mut(index).ok_or(GdalError::InvalidFieldIndex {
            index,
            method_name: "Fields::by_index_mut",
        })
    }

    pub fn by_name(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| GdalError::InvalidFieldName {
                field_name: name.to_string(),
                method_name: "Fields::by_name",
            })
    }

    pub fn by_name_mut(&mut self, name: &str) -> Result<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| GdalError::InvalidFieldName {
                field_name: name.to_string(),
                method_name: "Fields::by_name_mut",
            })
    }
}

impl IntoIterator for Fields {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
