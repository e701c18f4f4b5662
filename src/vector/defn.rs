use std::ffi::{c_int, CString};
use std::marker::PhantomData;

use gdal_sys::{OGRFeatureDefnH, OGRFieldDefnH, OGRwkbGeometryType};

use crate::errors::*;
use crate::utils::_string;
use crate::vector::FieldKind;

/// Layer definition
///
/// Defines the fields available for features in a layer. A `Defn` is owned by its layer
/// and borrowed for as long as the layer is.
#[derive(Debug)]
pub struct Defn<'a> {
    c_defn: OGRFeatureDefnH,
    _layer: PhantomData<&'a ()>,
}

impl Defn<'_> {
    /// Wraps a C pointer.
    ///
    /// # Safety
    /// `c_defn` must stay valid for the chosen lifetime.
    pub unsafe fn from_c_defn(c_defn: OGRFeatureDefnH) -> Self {
        Defn {
            c_defn,
            _layer: PhantomData,
        }
    }

    pub fn c_defn(&self) -> OGRFeatureDefnH {
        self.c_defn
    }

    pub fn field_count(&self) -> usize {
        unsafe { gdal_sys::OGR_FD_GetFieldCount(self.c_defn) }.max(0) as usize
    }

    /// Iterate over the field schema of this layer.
    pub fn fields(&self) -> FieldIterator<'_> {
        FieldIterator {
            c_defn: self.c_defn,
            next_id: 0,
            total: self.field_count(),
            _defn: PhantomData,
        }
    }

    /// Position of the field called `name`.
    pub fn field_index(&self, name: &str) -> Result<usize> {
        let c_name = CString::new(name)?;
        let idx = unsafe { gdal_sys::OGR_FD_GetFieldIndex(self.c_defn, c_name.as_ptr()) };
        if idx < 0 {
            return Err(GdalError::InvalidFieldName {
                field_name: name.to_string(),
                method_name: "OGR_FD_GetFieldIndex",
            });
        }
        Ok(idx as usize)
    }

    /// Get the geometry type of the first geometry field
    pub fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        unsafe { gdal_sys::OGR_FD_GetGeomType(self.c_defn) }
    }

    pub fn geom_field_count(&self) -> usize {
        unsafe { gdal_sys::OGR_FD_GetGeomFieldCount(self.c_defn) }.max(0) as usize
    }
}

pub struct FieldIterator<'a> {
    c_defn: OGRFeatureDefnH,
    next_id: usize,
    total: usize,
    _defn: PhantomData<&'a ()>,
}

impl<'a> Iterator for FieldIterator<'a> {
    type Item = SchemaField<'a>;

    #[inline]
    fn next(&mut self) -> Option<SchemaField<'a>> {
        if self.next_id == self.total {
            return None;
        }
        let field = SchemaField {
            c_field_defn: unsafe {
                gdal_sys::OGR_FD_GetFieldDefn(self.c_defn, self.next_id as c_int)
            },
            _defn: PhantomData,
        };
        self.next_id += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next_id;
        (left, Some(left))
    }
}

/// One slot of a layer schema.
pub struct SchemaField<'a> {
    c_field_defn: OGRFieldDefnH,
    _defn: PhantomData<&'a ()>,
}

impl SchemaField<'_> {
    /// Get the name of this field.
    pub fn name(&self) -> String {
        let rv = unsafe { gdal_sys::OGR_Fld_GetNameRef(self.c_field_defn) };
        _string(rv)
    }

    pub fn kind(&self) -> FieldKind {
        FieldKind::from_ogr(unsafe { gdal_sys::OGR_Fld_GetType(self.c_field_defn) })
    }

    /// Get the formatting width for this field.
    ///
    /// Zero means no specified width.
    pub fn width(&self) -> i32 {
        unsafe { gdal_sys::OGR_Fld_GetWidth(self.c_field_defn) }
    }

    /// Get the formatting precision for this field.
    ///
    /// This should normally be zero for fields of types other than Real.
    pub fn precision(&self) -> i32 {
        unsafe { gdal_sys::OGR_Fld_GetPrecision(self.c_field_defn) }
    }

    /// Return whether this field can receive null values.
    pub fn is_nullable(&self) -> bool {
        unsafe { gdal_sys::OGR_Fld_IsNullable(self.c_field_defn) != 0 }
    }
}

/// A field to add to a new layer, see [`crate::vector::LayerOptions`].
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    /// Formatting width; zero leaves the driver default.
    pub width: i32,
    pub precision: i32,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldDefinition {
            name: name.into(),
            kind,
            width: 0,
            precision: 0,
        }
    }

    /// Creates a detached `OGRFieldDefnH`; the caller destroys it with `OGR_Fld_Destroy`.
    pub(crate) fn to_c_field_defn(&self) -> Result<OGRFieldDefnH> {
        let c_name = CString::new(self.name.as_str())?;
        let c_field_defn = unsafe { gdal_sys::OGR_Fld_Create(c_name.as_ptr(), self.kind.to_ogr()) };
        if c_field_defn.is_null() {
            return Err(GdalError::NullPointer {
                method_name: "OGR_Fld_Create",
                msg: format!("creating field {}", self.name),
            });
        }
        unsafe {
            if self.width > 0 {
                gdal_sys::OGR_Fld_SetWidth(c_field_defn, self.width);
            }
            if self.precision > 0 {
                gdal_sys::OGR_Fld_SetPrecision(c_field_defn, self.precision);
            }
        }
        Ok(c_field_defn)
    }
}
