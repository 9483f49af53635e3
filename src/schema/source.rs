use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// One column as reported by the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub ordinal_position: u32,
    pub raw_type: String,
    #[serde(default)]
    pub nullable: bool,
}

/// A local column and the table it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyPair {
    pub column: String,
    pub referenced_table: String,
}

/// Raw schema reader. Table names are passed without delimiters.
pub trait SchemaSource {
    /// Columns of `table`, ordered by ordinal position
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Names of the columns forming the primary key
    fn primary_keys(&self, table: &str) -> Result<Vec<String>>;

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyPair>>;

    /// The name `table` is stored under. Sources with case-insensitive
    /// names map every spelling to one canonical form.
    fn canonical_table_name(&self, table: &str) -> Result<String> {
        Ok(table.to_string())
    }
}

/// Schema definition for one table of a [`MemorySchema`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTable {
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyPair>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; ordinal positions follow insertion order
    pub fn column(mut self, name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        let ordinal_position = self.columns.len() as u32 + 1;
        self.columns.push(ColumnDescriptor {
            name: name.into(),
            ordinal_position,
            raw_type: raw_type.into(),
            nullable: false,
        });
        self
    }

    /// Mark the last added column nullable
    pub fn nullable(mut self) -> Self {
        if let Some(col) = self.columns.last_mut() {
            col.nullable = true;
        }
        self
    }

    pub fn key(mut self, column: impl Into<String>) -> Self {
        self.primary_key.push(column.into());
        self
    }

    pub fn references(mut self, column: impl Into<String>, table: impl Into<String>) -> Self {
        self.foreign_keys.push(ForeignKeyPair {
            column: column.into(),
            referenced_table: table.into(),
        });
        self
    }
}

/// In-memory schema, handy for offline generation and tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySchema {
    pub tables: BTreeMap<String, MemoryTable>,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: impl Into<String>, table: MemoryTable) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    fn get(&self, table: &str) -> Result<&MemoryTable> {
        self.tables.get(table).ok_or_else(|| Error::TableNotFound {
            table: table.to_string(),
        })
    }
}

impl SchemaSource for MemorySchema {
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut columns = self.get(table)?.columns.clone();
        columns.sort_by_key(|col| col.ordinal_position);
        Ok(columns)
    }

    fn primary_keys(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.get(table)?.primary_key.clone())
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyPair>> {
        Ok(self.get(table)?.foreign_keys.clone())
    }
}
