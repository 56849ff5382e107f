use crate::metadata::{ColumnDescriptor, TableDescriptor};

const PRIMARY_KEY_SUFFIX: &str = " PK";

/// Render a table's columns as `name: type` strings, in column order.
/// Primary key columns get a ` PK` suffix.
pub fn format_columns(table: &TableDescriptor) -> Vec<String> {
    table.columns.iter().map(format_column).collect()
}

pub fn format_column(column: &ColumnDescriptor) -> String {
    let mut formatted = format!("{}: {}", column.name, column.column_type);
    if column.is_primary_key {
        formatted.push_str(PRIMARY_KEY_SUFFIX);
    }
    formatted
}
