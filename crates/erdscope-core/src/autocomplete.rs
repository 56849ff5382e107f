use std::collections::{BTreeMap, BTreeSet};

use crate::graph::Cell;

/// Column name to the names of the tables that have a column with that name.
pub type ColumnIndex = BTreeMap<String, Vec<String>>;

/// Map every column name found in the cells' formatted columns to the tables
/// that carry it.
///
/// Formatted columns read `name: type`; entries without a colon cannot be
/// split into name and type and are skipped. A column with nothing before the
/// colon is filed under the empty name. Buckets keep append order and are not
/// de-duplicated.
pub fn build_column_index(cells: &[Cell]) -> ColumnIndex {
    let mut index = ColumnIndex::new();
    for cell in cells {
        for column in &cell.columns {
            let Some(name) = column_name(column) else {
                continue;
            };
            index
                .entry(name.to_string())
                .or_default()
                .push(cell.table_name.clone());
        }
    }
    index
}

fn column_name(formatted: &str) -> Option<&str> {
    let (head, _) = formatted.split_once(':')?;
    Some(head.split_whitespace().next().unwrap_or(""))
}

/// Table names to suggest for a partially typed search.
///
/// Tables that have a column whose name contains `query` come first, then
/// tables whose own name contains it. Each table appears once. An empty query
/// suggests nothing.
pub fn autocomplete_search(
    query: &str,
    column_index: &ColumnIndex,
    table_names: &[String],
) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    let mut suggestions = Vec::new();
    let by_column = column_index
        .iter()
        .filter(|(column, _)| column.contains(query))
        .flat_map(|(_, tables)| tables.iter());
    let by_name = table_names.iter().filter(|name| name.contains(query));

    for table in by_column.chain(by_name) {
        if seen.insert(table.as_str()) {
            suggestions.push(table.clone());
        }
    }
    suggestions
}
