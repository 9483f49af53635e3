use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use super::infer::QueryInference;
use super::source::{ColumnDescriptor, ForeignKeyPair, SchemaSource};
use crate::config::MapperConfig;
use crate::error::{Diagnostic, Error, Result};
use crate::mapping::{SemanticType, TableMapping};

/// Schema source backed by a SQLite database
pub struct SqliteSchema {
    conn: Connection,
}

impl SqliteSchema {
    /// Open an existing database read-only
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// User tables, sorted by name
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Run `sql` and infer a mapping for `table_name` from its result rows
    pub fn infer_from_query(
        &self,
        sql: &str,
        table_name: &str,
        config: &MapperConfig,
    ) -> Result<(TableMapping, Vec<Diagnostic>)> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let count = names.len();
        let mut inference = QueryInference::new(names);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = (0..count)
                .map(|idx| row.get_ref(idx).map(value_kind))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            inference.observe_row(&values);
        }

        tracing::debug!(table = %table_name, rows = inference.rows(), "sampled query");
        inference.finish(config, table_name, None)
    }
}

fn value_kind(value: ValueRef<'_>) -> Option<SemanticType> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(_) => Some(SemanticType::I64),
        ValueRef::Real(_) => Some(SemanticType::F64),
        ValueRef::Text(_) => Some(SemanticType::String),
        ValueRef::Blob(_) => Some(SemanticType::Bytes),
    }
}

impl SchemaSource for SqliteSchema {
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT cid, name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map([table], |row| {
                let cid: i64 = row.get(0)?;
                let not_null: bool = row.get(3)?;
                let pk: i64 = row.get(4)?;
                Ok(ColumnDescriptor {
                    name: row.get(1)?,
                    ordinal_position: cid as u32 + 1,
                    raw_type: row.get(2)?,
                    nullable: !not_null && pk == 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Err(Error::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }

    fn primary_keys(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk",
        )?;
        let keys = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyPair>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT \"from\", \"table\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        )?;
        let fks = stmt
            .query_map([table], |row| {
                Ok(ForeignKeyPair {
                    column: row.get(0)?,
                    referenced_table: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fks)
    }

    /// SQLite resolves table names case-insensitively; foreign keys keep
    /// the spelling used in their DDL.
    fn canonical_table_name(&self, table: &str) -> Result<String> {
        let stored: Option<String> = self
            .conn
            .prepare_cached(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name = ?1 COLLATE NOCASE
                 ORDER BY name = ?1 DESC
                 LIMIT 1",
            )?
            .query_row([table], |row| row.get(0))
            .optional()?;
        Ok(stored.unwrap_or_else(|| table.to_string()))
    }
}
