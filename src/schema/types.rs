// see https://github.com/apache/parquet-format/blob/master/LogicalTypes.md
pub use crate::bridge::{
    GroupConvertedType, GroupLogicalType, PrimitiveConvertedType, PrimitiveLogicalType,
};

use parquet_format_async_temp::Type;

use crate::bridge::Repetition;
use crate::error::{Error, Result};

/// The eight storage types a leaf column can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(usize),
}

pub(crate) fn type_to_physical_type(type_: &Type, length: Option<i32>) -> Result<PhysicalType> {
    Ok(match *type_ {
        Type::BOOLEAN => PhysicalType::Boolean,
        Type::INT32 => PhysicalType::Int32,
        Type::INT64 => PhysicalType::Int64,
        Type::INT96 => PhysicalType::Int96,
        Type::FLOAT => PhysicalType::Float,
        Type::DOUBLE => PhysicalType::Double,
        Type::BYTE_ARRAY => PhysicalType::ByteArray,
        Type::FIXED_LEN_BYTE_ARRAY => {
            let length = length.filter(|length| *length > 0).ok_or_else(|| {
                Error::MalformedFile(
                    "FIXED_LEN_BYTE_ARRAY requires a positive length".to_string(),
                )
            })?;
            PhysicalType::FixedLenByteArray(length as usize)
        }
        _ => {
            return Err(Error::MalformedFile(format!(
                "unknown physical type {:?}",
                type_
            )))
        }
    })
}

/// One node of the schema tree: a primitive leaf or a group. The root message
/// is a [`ParquetType::Group`] whose `repetition` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub enum ParquetType {
    Primitive {
        name: String,
        repetition: Repetition,
        physical_type: PhysicalType,
        logical_type: Option<PrimitiveLogicalType>,
        converted_type: Option<PrimitiveConvertedType>,
        id: Option<i32>,
    },
    Group {
        name: String,
        /// `None` marks the root message.
        repetition: Option<Repetition>,
        logical_type: Option<GroupLogicalType>,
        converted_type: Option<GroupConvertedType>,
        fields: Vec<ParquetType>,
        id: Option<i32>,
    },
}

impl ParquetType {
    /// This node's field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive { name, .. } | Self::Group { name, .. } => name,
        }
    }

    /// This node's repetition; the root message reads as `Required`.
    pub fn repetition(&self) -> Repetition {
        match self {
            Self::Primitive { repetition, .. } => *repetition,
            Self::Group { repetition, .. } => repetition.unwrap_or(Repetition::Required),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(
            self,
            Self::Group {
                repetition: None,
                ..
            }
        )
    }

    /// The storage type of a leaf, `None` for groups.
    pub fn physical_type(&self) -> Option<PhysicalType> {
        match self {
            Self::Primitive { physical_type, .. } => Some(*physical_type),
            Self::Group { .. } => None,
        }
    }

    /// The fields of a group, empty for leaves.
    pub fn fields(&self) -> &[ParquetType] {
        match self {
            Self::Group { fields, .. } => fields,
            Self::Primitive { .. } => &[],
        }
    }

    /// Whether this group is annotated (or converted) as a list.
    pub fn is_list(&self) -> bool {
        match self {
            Self::Group {
                logical_type,
                converted_type,
                ..
            } => {
                *logical_type == Some(GroupLogicalType::List)
                    || *converted_type == Some(GroupConvertedType::List)
            }
            Self::Primitive { .. } => false,
        }
    }

    /// Whether this group is annotated (or converted) as a map.
    pub fn is_map(&self) -> bool {
        match self {
            Self::Group {
                logical_type,
                converted_type,
                ..
            } => {
                *logical_type == Some(GroupLogicalType::Map)
                    || matches!(
                        converted_type,
                        Some(GroupConvertedType::Map | GroupConvertedType::MapKeyValue)
                    )
            }
            Self::Primitive { .. } => false,
        }
    }

    /// Whether this leaf carries a UTF-8 annotation (strings, enums, JSON).
    pub fn is_utf8(&self) -> bool {
        match self {
            Self::Primitive {
                logical_type,
                converted_type,
                ..
            } => {
                matches!(
                    logical_type,
                    Some(
                        PrimitiveLogicalType::String
                            | PrimitiveLogicalType::Enum
                            | PrimitiveLogicalType::Json
                    )
                ) || matches!(
                    converted_type,
                    Some(
                        PrimitiveConvertedType::Utf8
                            | PrimitiveConvertedType::Enum
                            | PrimitiveConvertedType::Json
                    )
                )
            }
            Self::Group { .. } => false,
        }
    }
}
