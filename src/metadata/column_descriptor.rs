use crate::schema::types::{ParquetType, PhysicalType};

/// Everything decoders need to know about one leaf column: its primitive
/// type, the maximum definition and repetition levels derived from its
/// ancestors, and its dotted path in the schema.
#[derive(Debug, PartialEq, Clone)]
pub struct ColumnDescriptor {
    /// The leaf node; always a [`ParquetType::Primitive`].
    pub primitive_type: ParquetType,
    pub max_def_level: i16,
    pub max_rep_level: i16,
    pub path_in_schema: Vec<String>,
}

impl ColumnDescriptor {
    /// The column's name (the last path segment).
    pub fn name(&self) -> &str {
        self.primitive_type.name()
    }

    /// The column's storage type.
    pub fn physical_type(&self) -> PhysicalType {
        self.primitive_type
            .physical_type()
            .expect("a column descriptor always wraps a primitive")
    }
}
