use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata for one column, as produced by metadata ingestion.
///
/// `referenced_table` distinguishes three states: `Some("")` is a column that is
/// not a foreign key, `Some(name)` references `name`, and `None` means the field
/// was missing from the source entirely (a malformed column). A field that is
/// present but `null` reads as `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(
        default,
        deserialize_with = "present_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub referenced_table: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub referenced_column: Option<String>,
}

/// Only called when the key is present; a missing key falls back to `None`.
fn present_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(value.unwrap_or_default()))
}

impl ColumnDescriptor {
    /// A plain column: not a primary key, not a foreign key.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            is_primary_key: false,
            referenced_table: Some(String::new()),
            referenced_column: Some(String::new()),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.referenced_table = Some(table.into());
        self.referenced_column = Some(column.into());
        self
    }

    /// Name of the referenced table when this column is a foreign key.
    pub fn foreign_table(&self) -> Option<&str> {
        self.referenced_table
            .as_deref()
            .filter(|table| !table.is_empty())
    }
}

/// Metadata for one table. Column order is the order received from the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn add_column(&mut self, column: ColumnDescriptor) {
        self.columns.push(column);
    }

    /// Append a plain column and return a handle to it for further edits.
    pub fn add_column_by_name_and_type(
        &mut self,
        name: impl Into<String>,
        column_type: impl Into<String>,
    ) -> &mut ColumnDescriptor {
        self.columns.push(ColumnDescriptor::new(name, column_type));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_index_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn primary_key_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|column| column.is_primary_key)
            .collect()
    }
}
