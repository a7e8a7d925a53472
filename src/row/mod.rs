//! Nested rows assembled from per-column value streams, with typed access.
mod assemble;
mod reader;
mod stream;

pub(crate) use assemble::{build_nodes, RowAssembler};
pub use reader::RowReader;
pub(crate) use stream::ValueStream;

use std::fmt;

use crate::error::{Error, Result};
use crate::types::Int96;

/// A single value of a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Int96(Int96),
    Float(f32),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    Group(Row),
    List(List),
    Map(Map),
}

impl Field {
    fn kind(&self) -> &'static str {
        match self {
            Field::Null => "NULL",
            Field::Bool(_) => "BOOLEAN",
            Field::Int(_) => "INT32",
            Field::Long(_) => "INT64",
            Field::Int96(_) => "INT96",
            Field::Float(_) => "FLOAT",
            Field::Double(_) => "DOUBLE",
            Field::Str(_) => "STRING",
            Field::Bytes(_) => "BYTE_ARRAY",
            Field::Group(_) => "ROW",
            Field::List(_) => "LIST",
            Field::Map(_) => "MAP",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    fn mismatch(&self, requested: &str) -> Error {
        Error::TypeMismatch(format!(
            "requested {}, but the value is {}",
            requested,
            self.kind()
        ))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Field::Bool(v) => Ok(*v),
            other => Err(other.mismatch("BOOLEAN")),
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        match self {
            Field::Int(v) => Ok(*v),
            other => Err(other.mismatch("INT32")),
        }
    }

    pub fn as_long(&self) -> Result<i64> {
        match self {
            Field::Long(v) => Ok(*v),
            other => Err(other.mismatch("INT64")),
        }
    }

    pub fn as_int96(&self) -> Result<Int96> {
        match self {
            Field::Int96(v) => Ok(*v),
            other => Err(other.mismatch("INT96")),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match self {
            Field::Float(v) => Ok(*v),
            other => Err(other.mismatch("FLOAT")),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            Field::Double(v) => Ok(*v),
            other => Err(other.mismatch("DOUBLE")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Field::Str(v) => Ok(v),
            other => Err(other.mismatch("STRING")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Field::Bytes(v) => Ok(v),
            Field::Str(v) => Ok(v.as_bytes()),
            other => Err(other.mismatch("BYTE_ARRAY")),
        }
    }

    pub fn as_row(&self) -> Result<&Row> {
        match self {
            Field::Group(v) => Ok(v),
            other => Err(other.mismatch("ROW")),
        }
    }

    pub fn as_list(&self) -> Result<&List> {
        match self {
            Field::List(v) => Ok(v),
            other => Err(other.mismatch("LIST")),
        }
    }

    pub fn as_map(&self) -> Result<&Map> {
        match self {
            Field::Map(v) => Ok(v),
            other => Err(other.mismatch("MAP")),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Null => write!(f, "null"),
            Field::Bool(v) => write!(f, "{}", v),
            Field::Int(v) => write!(f, "{}", v),
            Field::Long(v) => write!(f, "{}", v),
            Field::Int96(v) => write!(f, "{:?}", v),
            Field::Float(v) => write!(f, "{}", v),
            Field::Double(v) => write!(f, "{}", v),
            Field::Str(v) => write!(f, "{:?}", v),
            Field::Bytes(v) => write!(f, "{:?}", v),
            Field::Group(v) => write!(f, "{}", v),
            Field::List(v) => write!(f, "{}", v),
            Field::Map(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! typed_getters {
    ($(($by_index:ident, $by_name:ident, $as:ident, $ret:ty)),+ $(,)?) => {
        $(
        pub fn $by_index(&self, i: usize) -> Result<$ret> {
            self.field(i)?.$as()
        }

        pub fn $by_name(&self, name: &str) -> Result<$ret> {
            self.field_by_name(name)?.$as()
        }
        )+
    };
}

/// One logical record, shaped by the file's schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Field)>,
}

impl Row {
    pub(crate) fn new(fields: Vec<(String, Field)>) -> Self {
        Self { fields }
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn column_name(&self, i: usize) -> Result<&str> {
        self.fields
            .get(i)
            .map(|(name, _)| name.as_str())
            .ok_or_else(|| self.bad_index(i))
    }

    fn bad_index(&self, i: usize) -> Error {
        Error::IndexOutOfRange(format!(
            "column {} of a row with {} columns",
            i,
            self.fields.len()
        ))
    }

    /// The field at position `i`.
    pub fn field(&self, i: usize) -> Result<&Field> {
        self.fields
            .get(i)
            .map(|(_, field)| field)
            .ok_or_else(|| self.bad_index(i))
    }

    /// The field called `name`.
    pub fn field_by_name(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, field)| field)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }

    pub fn is_null(&self, i: usize) -> Result<bool> {
        Ok(self.field(i)?.is_null())
    }

    pub fn is_null_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.field_by_name(name)?.is_null())
    }

    typed_getters!(
        (get_bool, get_bool_by_name, as_bool, bool),
        (get_int, get_int_by_name, as_int, i32),
        (get_long, get_long_by_name, as_long, i64),
        (get_int96, get_int96_by_name, as_int96, Int96),
        (get_float, get_float_by_name, as_float, f32),
        (get_double, get_double_by_name, as_double, f64),
        (get_string, get_string_by_name, as_str, &str),
        (get_bytes, get_bytes_by_name, as_bytes, &[u8]),
        (get_row, get_row_by_name, as_row, &Row),
        (get_list, get_list_by_name, as_list, &List),
        (get_map, get_map_by_name, as_map, &Map),
    );
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, field)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, field)?;
        }
        write!(f, "}}")
    }
}

/// The elements of one repeated value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    elements: Vec<Field>,
}

impl List {
    pub(crate) fn new(elements: Vec<Field>) -> Self {
        Self { elements }
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Field] {
        &self.elements
    }

    pub fn get(&self, i: usize) -> Result<&Field> {
        self.elements.get(i).ok_or_else(|| {
            Error::IndexOutOfRange(format!(
                "element {} of a list with {} elements",
                i,
                self.elements.len()
            ))
        })
    }

    pub fn get_string(&self, i: usize) -> Result<&str> {
        self.get(i)?.as_str()
    }

    pub fn get_int(&self, i: usize) -> Result<i32> {
        self.get(i)?.as_int()
    }

    pub fn get_long(&self, i: usize) -> Result<i64> {
        self.get(i)?.as_long()
    }

    /// All elements as strings, failing on the first that is not one.
    pub fn strings(&self) -> Result<Vec<&str>> {
        self.elements.iter().map(|e| e.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

/// The entries of one map value, in stored order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<(Field, Field)>,
}

impl Map {
    pub(crate) fn new(entries: Vec<(Field, Field)>) -> Self {
        Self { entries }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Field, Field)] {
        &self.entries
    }

    fn entry(&self, i: usize) -> Result<&(Field, Field)> {
        self.entries.get(i).ok_or_else(|| {
            Error::IndexOutOfRange(format!(
                "entry {} of a map with {} entries",
                i,
                self.entries.len()
            ))
        })
    }

    pub fn key(&self, i: usize) -> Result<&Field> {
        Ok(&self.entry(i)?.0)
    }

    pub fn value(&self, i: usize) -> Result<&Field> {
        Ok(&self.entry(i)?.1)
    }

    pub fn is_value_null(&self, i: usize) -> Result<bool> {
        Ok(self.entry(i)?.1.is_null())
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a (Field, Field);
    type IntoIter = std::slice::Iter<'a, (Field, Field)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", key, value)?;
        }
        write!(f, "}}")
    }
}
