use erdscope_core::{ColumnDescriptor, TableDescriptor};

pub const PRIMARY_KEY: &str = "PRIMARY KEY";
pub const FOREIGN_KEY: &str = "FOREIGN KEY";

/// One row of the metadata query: a column of a table, joined with at most
/// one of its key constraints. Rows arrive ordered by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct MetadataRow {
    pub table_name: String,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub constraint_type: Option<String>,
    pub referenced_table_name: Option<String>,
    pub referenced_column_name: Option<String>,
}

/// Group metadata rows into tables.
///
/// A new table starts whenever the table name changes. A column listed once
/// per constraint is merged into a single descriptor. A table without columns
/// comes back with an empty column list.
pub fn process_rows(rows: Vec<MetadataRow>) -> Vec<TableDescriptor> {
    let mut tables: Vec<TableDescriptor> = Vec::new();

    for row in rows {
        let starts_new_table = tables
            .last()
            .is_none_or(|table| table.name != row.table_name);
        if starts_new_table {
            tables.push(TableDescriptor::new(row.table_name.clone()));
        }
        let Some(table) = tables.last_mut() else {
            continue;
        };

        let Some(column_name) = row.column_name.as_deref() else {
            continue;
        };
        let column = match table.column_index_by_name(column_name) {
            Some(index) => &mut table.columns[index],
            None => table.add_column_by_name_and_type(
                column_name,
                row.column_type.clone().unwrap_or_default(),
            ),
        };
        apply_constraint(column, &row);
    }

    tables
}

fn apply_constraint(column: &mut ColumnDescriptor, row: &MetadataRow) {
    match row.constraint_type.as_deref() {
        Some(PRIMARY_KEY) => column.is_primary_key = true,
        Some(FOREIGN_KEY) => {
            column.referenced_table = Some(row.referenced_table_name.clone().unwrap_or_default());
            column.referenced_column = Some(row.referenced_column_name.clone().unwrap_or_default());
        }
        _ => {}
    }
}
