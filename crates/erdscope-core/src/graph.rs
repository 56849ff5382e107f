use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, GraphResult};
use crate::format::format_columns;
use crate::metadata::TableDescriptor;
use crate::relationship::RelationshipType;

/// One table box in the diagram.
///
/// `id` is the table's position in the list the graph was built from and is
/// never rewritten, even when the cell is moved into a search subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: usize,
    pub table_name: String,
    pub columns: Vec<String>,
}

/// A foreign-key relationship between two cells.
///
/// `source` and `destination` index the cell list the link is currently scoped
/// to. Indices from different cell lists are not interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source: usize,
    pub destination: usize,
    pub source_relationship_type: RelationshipType,
    pub destination_relationship_type: RelationshipType,
}

impl Link {
    pub fn new(
        source: usize,
        destination: usize,
        source_relationship_type: RelationshipType,
        destination_relationship_type: RelationshipType,
    ) -> Self {
        Self {
            source,
            destination,
            source_relationship_type,
            destination_relationship_type,
        }
    }

    pub fn touches(&self, index: usize) -> bool {
        self.source == index || self.destination == index
    }

    /// The endpoint that is not `index`. When neither endpoint is `index` the
    /// destination is returned.
    pub fn other_index(&self, index: usize) -> usize {
        if self.destination == index {
            self.source
        } else {
            self.destination
        }
    }
}

/// Cells and links ready to be handed to a renderer. Serialized as
/// `{ "cells": [...], "links": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Graph {
    pub cells: Vec<Cell>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new(cells: Vec<Cell>, links: Vec<Link>) -> Self {
        Self { cells, links }
    }

    pub fn cell_index(&self, table_name: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.table_name == table_name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.cells.iter().map(|cell| cell.table_name.clone()).collect()
    }
}

/// Build the full graph: one cell per table, one link per foreign key.
pub fn build_graph(tables: &[TableDescriptor]) -> GraphResult<Graph> {
    let cells = generate_cells(tables)?;
    let links = generate_links(tables, &cells)?;

    tracing::debug!(
        event = "graph_built",
        cells = cells.len(),
        links = links.len()
    );

    Ok(Graph { cells, links })
}

/// Build the graph from untyped JSON, as received over the wire.
pub fn build_graph_from_json(value: &Value) -> GraphResult<Graph> {
    let items = match value {
        Value::Array(items) if items.is_empty() => return Err(GraphError::EmptyInput),
        Value::Array(items) => items,
        _ => return Err(GraphError::InvalidInputType),
    };

    let tables = items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            TableDescriptor::deserialize(item).map_err(|err| GraphError::MalformedTable {
                position,
                reason: err.to_string(),
            })
        })
        .collect::<GraphResult<Vec<_>>>()?;

    build_graph(&tables)
}

/// One cell per table, in input order, with `id` equal to the position.
pub fn generate_cells(tables: &[TableDescriptor]) -> GraphResult<Vec<Cell>> {
    if tables.is_empty() {
        return Err(GraphError::EmptyInput);
    }

    tables
        .iter()
        .enumerate()
        .map(|(position, table)| {
            if table.name.is_empty() {
                return Err(GraphError::MissingTableName { position });
            }
            Ok(Cell {
                id: position,
                table_name: table.name.clone(),
                columns: format_columns(table),
            })
        })
        .collect()
}

/// Links for every foreign key whose referenced table has a cell.
///
/// The referencing side is ONE when the foreign key column is also a primary
/// key and MANY otherwise. The referenced side is always ONE. References to
/// tables without a cell are skipped.
pub fn generate_links(tables: &[TableDescriptor], cells: &[Cell]) -> GraphResult<Vec<Link>> {
    let mut cells_by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for cell in cells {
        cells_by_name
            .entry(cell.table_name.as_str())
            .or_default()
            .push(cell.id);
    }

    let mut links = Vec::new();
    for (table_index, table) in tables.iter().enumerate() {
        if table.name.is_empty() {
            return Err(GraphError::MissingTableName {
                position: table_index,
            });
        }

        for column in &table.columns {
            let Some(referenced_table) = column.referenced_table.as_deref() else {
                return Err(GraphError::MissingReferenceTableProperty {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            };
            if referenced_table.is_empty() {
                continue;
            }

            let source_type = if column.is_primary_key {
                RelationshipType::One
            } else {
                RelationshipType::Many
            };

            match cells_by_name.get(referenced_table) {
                Some(destinations) => {
                    links.extend(destinations.iter().map(|&destination| {
                        Link::new(table_index, destination, source_type, RelationshipType::One)
                    }));
                }
                None => {
                    tracing::warn!(
                        event = "dangling_reference_skipped",
                        table = %table.name,
                        column = %column.name,
                        referenced_table = %referenced_table
                    );
                }
            }
        }
    }

    Ok(links)
}
