use std::convert::TryInto;

use parquet_format_async_temp::SchemaElement;

use crate::bridge::{converted_to_group_converted, converted_to_primitive_converted};
use crate::error::{Error, Result};

use super::types::{type_to_physical_type, ParquetType};

impl ParquetType {
    /// Rebuilds the schema tree from the flat thrift element list. The first
    /// element is the root message; each group element declares how many of
    /// the following elements are its children.
    pub fn try_from_thrift(elements: &[&SchemaElement]) -> Result<ParquetType> {
        let mut cursor = 0;
        let mut roots = Vec::new();
        while cursor < elements.len() {
            let (next, node) = convert_node(elements, cursor, cursor == 0)?;
            cursor = next;
            roots.push(node);
        }
        if roots.len() != 1 {
            return Err(Error::MalformedFile(format!(
                "expected exactly one root node, but found {}",
                roots.len()
            )));
        }

        Ok(roots.remove(0))
    }
}

/// Converts the element at `cursor` (and, for groups, its children) into a
/// node, returning the index of the first element after it.
fn convert_node(
    elements: &[&SchemaElement],
    cursor: usize,
    is_root: bool,
) -> Result<(usize, ParquetType)> {
    let element = *elements.get(cursor).ok_or_else(|| {
        Error::MalformedFile("schema tree ends before all declared children".to_string())
    })?;

    match element.num_children {
        // parquet-cpp sometimes writes num_children: 0 for leaves, so both
        // absent and zero mean a primitive
        None | Some(0) => convert_primitive(element).map(|node| (cursor + 1, node)),
        Some(n) => {
            let mut fields = Vec::with_capacity(n as usize);
            let mut next = cursor + 1;
            for _ in 0..n {
                let (after_child, child) = convert_node(elements, next, false)?;
                next = after_child;
                fields.push(child);
            }

            let repetition = if is_root {
                None
            } else {
                match element.repetition_type {
                    Some(repetition) => Some(repetition.try_into()?),
                    None => {
                        return Err(Error::MalformedFile(
                            "repetition must be defined for a non-root group".to_string(),
                        ))
                    }
                }
            };
            let converted_type = element
                .converted_type
                .filter(|_| !is_root)
                .map(|t| converted_to_group_converted(&t))
                .transpose()?;
            // LogicalType only appears in files written against format v2;
            // ConvertedType is present either way
            let logical_type = element
                .logical_type
                .clone()
                .filter(|_| !is_root)
                .map(|t| t.try_into())
                .transpose()?;

            let node = ParquetType::Group {
                name: element.name.clone(),
                repetition,
                logical_type,
                converted_type,
                fields,
                id: element.field_id,
            };
            Ok((next, node))
        }
    }
}

fn convert_primitive(element: &SchemaElement) -> Result<ParquetType> {
    let repetition = element
        .repetition_type
        .ok_or_else(|| {
            Error::MalformedFile("repetition must be defined for a primitive".to_string())
        })?
        .try_into()?;
    let physical_type = element.type_.ok_or_else(|| {
        Error::MalformedFile("physical type must be defined for a primitive".to_string())
    })?;
    let physical_type = type_to_physical_type(&physical_type, element.type_length)?;

    let converted_type = match element.converted_type {
        Some(converted_type) => {
            let maybe_decimal = match (element.precision, element.scale) {
                (Some(precision), Some(scale)) => Some((precision, scale)),
                (None, None) => None,
                _ => {
                    return Err(Error::MalformedFile(
                        "when precision or scale are defined, both must be".to_string(),
                    ))
                }
            };
            Some(converted_to_primitive_converted(
                &converted_type,
                maybe_decimal,
            )?)
        }
        None => None,
    };
    let logical_type = element
        .logical_type
        .clone()
        .map(|t| t.try_into())
        .transpose()?;

    Ok(ParquetType::Primitive {
        name: element.name.clone(),
        repetition,
        physical_type,
        logical_type,
        converted_type,
        id: element.field_id,
    })
}
