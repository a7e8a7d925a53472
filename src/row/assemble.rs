//! Reconstruction of nested records from flat (def, rep, value) streams.
//!
//! Each leaf stream carries, per entry, how deeply the value is defined (def)
//! and at which repeated ancestor the entry continues (rep). A new record
//! starts at rep 0; a positive rep appends to the open list at that depth.
use crate::error::{Error, Result};
use crate::read::PageCursor;
use crate::schema::types::ParquetType;
use crate::schema::Repetition;

use super::{Field, List, Map, Row, ValueStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Primitive,
    Struct,
    List,
    Map,
}

/// A schema node annotated with the cumulative levels the assembler needs.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub name: String,
    pub repetition: Repetition,
    /// The definition level of entries for which this node is present.
    pub def_level: u32,
    /// The repetition level of this node's repeated ancestors, itself
    /// included.
    pub rep_level: u32,
    pub kind: NodeKind,
    pub children: Vec<Node>,
    /// The range of projected leaf streams under this node.
    pub leaves: std::ops::Range<usize>,
}

/// Annotates `fields` (the root group's children) with cumulative levels and
/// leaf stream indices, in schema (DFS) order.
pub(crate) fn build_nodes(fields: &[&ParquetType]) -> Vec<Node> {
    let mut counter = 0;
    fields
        .iter()
        .map(|field| build_node(field, 0, 0, &mut counter))
        .collect()
}

fn build_node(tp: &ParquetType, def: u32, rep: u32, counter: &mut usize) -> Node {
    let repetition = tp.repetition();
    let (def, rep) = match repetition {
        Repetition::Optional => (def + 1, rep),
        Repetition::Repeated => (def + 1, rep + 1),
        Repetition::Required => (def, rep),
    };

    match tp {
        ParquetType::Primitive { .. } => {
            let leaf = *counter;
            *counter += 1;
            Node {
                name: tp.name().to_string(),
                repetition,
                def_level: def,
                rep_level: rep,
                kind: NodeKind::Primitive,
                children: vec![],
                leaves: leaf..leaf + 1,
            }
        }
        ParquetType::Group { fields, .. } => {
            let start = *counter;
            let children = fields
                .iter()
                .map(|field| build_node(field, def, rep, counter))
                .collect();
            let kind = if tp.is_list() {
                NodeKind::List
            } else if tp.is_map() {
                NodeKind::Map
            } else {
                NodeKind::Struct
            };
            Node {
                name: tp.name().to_string(),
                repetition,
                def_level: def,
                rep_level: rep,
                kind,
                children,
                leaves: start..*counter,
            }
        }
    }
}

fn end_of_record() -> Error {
    Error::CorruptPage("a column stream ended in the middle of a record".to_string())
}

fn first_leaf_levels(node: &Node, streams: &mut [ValueStream]) -> Result<(u32, u32)> {
    streams[node.leaves.start]
        .peek_levels()?
        .ok_or_else(end_of_record)
}

/// Consumes one entry from every leaf under `node`; used when an ancestor is
/// absent and all leaves carry the same null marker for this instance.
fn skip_subtree(node: &Node, streams: &mut [ValueStream]) -> Result<()> {
    for leaf in node.leaves.clone() {
        streams[leaf].next_triple()?.ok_or_else(end_of_record)?;
    }
    Ok(())
}

/// Whether the next entry continues the repeated `node` at its own depth.
fn next_continues(node: &Node, streams: &mut [ValueStream]) -> Result<bool> {
    Ok(match streams[node.leaves.start].peek_levels()? {
        Some((_, rep)) => rep == node.rep_level,
        None => false,
    })
}

/// Assembles the value of `node` for the current position of its streams.
pub(crate) fn assemble_field(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    if node.repetition == Repetition::Repeated {
        return assemble_repeated(node, streams);
    }
    match node.kind {
        NodeKind::Primitive => assemble_primitive(node, streams),
        NodeKind::Struct => assemble_struct(node, streams),
        NodeKind::List => assemble_list(node, streams),
        NodeKind::Map => assemble_map(node, streams),
    }
}

fn assemble_primitive(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    let (def, _, value) = streams[node.leaves.start]
        .next_triple()?
        .ok_or_else(end_of_record)?;
    if def >= node.def_level {
        value.ok_or_else(|| {
            Error::CorruptPage("value missing at the maximum definition level".to_string())
        })
    } else {
        Ok(Field::Null)
    }
}

fn assemble_struct(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    let (def, _) = first_leaf_levels(node, streams)?;
    if def < node.def_level {
        skip_subtree(node, streams)?;
        return Ok(Field::Null);
    }
    let mut fields = Vec::with_capacity(node.children.len());
    for child in &node.children {
        fields.push((child.name.clone(), assemble_field(child, streams)?));
    }
    Ok(Field::Group(Row::new(fields)))
}

fn assemble_list(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    let repeated = list_entry_node(node)?;
    let (def, _) = first_leaf_levels(node, streams)?;
    if def < node.def_level {
        skip_subtree(node, streams)?;
        return Ok(Field::Null);
    }
    if def < repeated.def_level {
        // the group is present but holds no entries
        skip_subtree(node, streams)?;
        return Ok(Field::List(List::new(vec![])));
    }
    let mut elements = vec![assemble_list_element(repeated, streams)?];
    while next_continues(repeated, streams)? {
        elements.push(assemble_list_element(repeated, streams)?);
    }
    Ok(Field::List(List::new(elements)))
}

/// The repeated child of a LIST- or MAP-annotated group.
fn list_entry_node(node: &Node) -> Result<&Node> {
    let repeated = node.children.first().ok_or_else(|| {
        Error::TypeMismatch(format!("group `{}` has no repeated child", node.name))
    })?;
    if repeated.repetition != Repetition::Repeated {
        return Err(Error::TypeMismatch(format!(
            "child of annotated group `{}` does not repeat",
            node.name
        )));
    }
    Ok(repeated)
}

fn assemble_list_element(repeated: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    match repeated.kind {
        // two-level layout: the repeated primitive is the element
        NodeKind::Primitive => assemble_repeated_instance(repeated, streams),
        // standard three-level layout: a wrapper group with a single child
        _ if repeated.children.len() == 1 => assemble_field(&repeated.children[0], streams),
        // legacy: the repeated group itself is the element
        _ => assemble_repeated_instance(repeated, streams),
    }
}

fn assemble_map(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    let entry = list_entry_node(node)?;
    if entry.children.len() != 2 {
        return Err(Error::TypeMismatch(format!(
            "map entry group `{}` does not hold a key and a value",
            entry.name
        )));
    }
    let (def, _) = first_leaf_levels(node, streams)?;
    if def < node.def_level {
        skip_subtree(node, streams)?;
        return Ok(Field::Null);
    }
    if def < entry.def_level {
        skip_subtree(node, streams)?;
        return Ok(Field::Map(Map::new(vec![])));
    }
    let mut entries = vec![assemble_map_entry(entry, streams)?];
    while next_continues(entry, streams)? {
        entries.push(assemble_map_entry(entry, streams)?);
    }
    Ok(Field::Map(Map::new(entries)))
}

fn assemble_map_entry(entry: &Node, streams: &mut [ValueStream]) -> Result<(Field, Field)> {
    let key = assemble_field(&entry.children[0], streams)?;
    let value = assemble_field(&entry.children[1], streams)?;
    Ok((key, value))
}

/// A repeated field outside any LIST/MAP annotation is a list whose element
/// is the field itself.
fn assemble_repeated(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    let (def, _) = first_leaf_levels(node, streams)?;
    if def < node.def_level {
        // zero occurrences
        skip_subtree(node, streams)?;
        return Ok(Field::List(List::new(vec![])));
    }
    let mut elements = vec![assemble_repeated_instance(node, streams)?];
    while next_continues(node, streams)? {
        elements.push(assemble_repeated_instance(node, streams)?);
    }
    Ok(Field::List(List::new(elements)))
}

/// One instance of a repeated node: its value for primitives, a row of its
/// children for groups.
fn assemble_repeated_instance(node: &Node, streams: &mut [ValueStream]) -> Result<Field> {
    match node.kind {
        NodeKind::Primitive => {
            let (def, _, value) = streams[node.leaves.start]
                .next_triple()?
                .ok_or_else(end_of_record)?;
            if def >= node.def_level {
                value.ok_or_else(|| {
                    Error::CorruptPage(
                        "value missing at the maximum definition level".to_string(),
                    )
                })
            } else {
                Ok(Field::Null)
            }
        }
        _ => {
            let mut fields = Vec::with_capacity(node.children.len());
            for child in &node.children {
                fields.push((child.name.clone(), assemble_field(child, streams)?));
            }
            Ok(Field::Group(Row::new(fields)))
        }
    }
}

/// Joins the projected leaf streams into rows, advancing every stream by
/// exactly one record per row.
pub(crate) struct RowAssembler {
    nodes: Vec<Node>,
    streams: Vec<ValueStream>,
}

impl RowAssembler {
    pub fn new(nodes: Vec<Node>, streams: Vec<ValueStream>) -> Self {
        debug_assert_eq!(
            nodes.last().map(|node| node.leaves.end).unwrap_or(0),
            streams.len()
        );
        Self { nodes, streams }
    }

    pub fn has_next(&mut self) -> Result<bool> {
        for stream in &mut self.streams {
            if stream.peek_levels()?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if !self.has_next()? {
            return Ok(None);
        }
        // every stream must sit at a record boundary
        for stream in &mut self.streams {
            match stream.peek_levels()? {
                Some((_, 0)) => {}
                Some((_, rep)) => {
                    return Err(Error::CorruptPage(format!(
                        "record starts at repetition level {}",
                        rep
                    )))
                }
                None => return Err(end_of_record()),
            }
        }
        let nodes = &self.nodes;
        let streams = &mut self.streams;
        let mut fields = Vec::with_capacity(nodes.len());
        for node in nodes {
            fields.push((node.name.clone(), assemble_field(node, streams)?));
        }
        Ok(Some(Row::new(fields)))
    }

    pub fn push_cursor(&mut self, stream: usize, cursor: PageCursor) {
        self.streams[stream].push_cursor(cursor);
    }

    pub fn num_streams(&self) -> usize {
        self.streams.len()
    }

    pub fn close(&mut self) {
        for stream in &mut self.streams {
            stream.close();
        }
    }
}
