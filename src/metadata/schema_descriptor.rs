use parquet_format_async_temp::SchemaElement;

use crate::error::Result;
use crate::schema::types::ParquetType;
use crate::schema::Repetition;

use super::column_descriptor::ColumnDescriptor;

/// The resolved schema of a file: the root message plus one
/// [`ColumnDescriptor`] per leaf column, with maximum levels precomputed.
///
/// Every `OPTIONAL` ancestor of a leaf raises its maximum definition level by
/// one; every `REPEATED` ancestor raises both maxima by one.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    root: ParquetType,
    // leaf descriptors in depth-first schema order
    leaves: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    /// Resolves a root [`ParquetType`] into leaf descriptors.
    pub fn new(root: ParquetType) -> Self {
        debug_assert!(root.is_root());
        let mut leaves = vec![];
        for field in root.fields() {
            collect_leaves(field, 0, 0, &mut vec![], &mut leaves);
        }
        Self { root, leaves }
    }

    /// Resolves the thrift element list of a footer.
    pub fn try_from_thrift(elements: &[&SchemaElement]) -> Result<Self> {
        Ok(Self::new(ParquetType::try_from_thrift(elements)?))
    }

    /// The descriptor of the `i`th leaf column.
    pub fn column(&self, i: usize) -> &ColumnDescriptor {
        &self.leaves[i]
    }

    /// The descriptors of all leaf columns, in schema order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.leaves
    }

    /// The number of leaf columns.
    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    /// The root message node.
    pub fn root_schema(&self) -> &ParquetType {
        &self.root
    }

    /// The top-level fields of the root message.
    pub fn fields(&self) -> &[ParquetType] {
        self.root.fields()
    }

    /// The root message's name.
    pub fn name(&self) -> &str {
        self.root.name()
    }
}

fn collect_leaves<'a>(
    node: &'a ParquetType,
    mut max_rep: i16,
    mut max_def: i16,
    path: &mut Vec<&'a str>,
    leaves: &mut Vec<ColumnDescriptor>,
) {
    path.push(node.name());
    match node.repetition() {
        Repetition::Optional => max_def += 1,
        Repetition::Repeated => {
            max_def += 1;
            max_rep += 1;
        }
        Repetition::Required => {}
    }

    match node {
        ParquetType::Primitive { .. } => leaves.push(ColumnDescriptor {
            primitive_type: node.clone(),
            max_def_level: max_def,
            max_rep_level: max_rep,
            path_in_schema: path.iter().map(|s| s.to_string()).collect(),
        }),
        ParquetType::Group { fields, .. } => {
            for field in fields {
                collect_leaves(field, max_rep, max_def, path, leaves);
            }
        }
    }
    path.pop();
}
