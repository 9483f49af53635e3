use std::collections::HashSet;

use crate::config::MapperConfig;
use crate::error::{Diagnostic, Result};
use crate::mapping::{ColumnMapping, SemanticType, TableMapping, ValueType};
use crate::naming::{strip_delimiters, to_alias, to_identifier, to_valid_name, unique_name};

#[derive(Debug, Clone)]
struct SampledColumn {
    name: String,
    kind: Option<SemanticType>,
    nullable: bool,
}

/// Infers a table mapping from sampled query result rows.
///
/// A column takes the type of its first non-null value and becomes
/// nullable once a null is seen.
#[derive(Debug, Clone)]
pub struct QueryInference {
    columns: Vec<SampledColumn>,
    rows: usize,
}

impl QueryInference {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(|name| SampledColumn {
                name: name.into(),
                kind: None,
                nullable: false,
            })
            .collect();
        Self { columns, rows: 0 }
    }

    /// Record one row; `None` is a null value. Extra values are ignored.
    pub fn observe_row(&mut self, values: &[Option<SemanticType>]) {
        for (col, value) in self.columns.iter_mut().zip(values) {
            match value {
                Some(kind) => {
                    col.kind.get_or_insert(*kind);
                }
                None => col.nullable = true,
            }
        }
        self.rows += 1;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Build the mapping for `table_name`, with `alias` overriding the derived one
    pub fn finish(
        self,
        config: &MapperConfig,
        table_name: &str,
        alias: Option<&str>,
    ) -> Result<(TableMapping, Vec<Diagnostic>)> {
        let table_name = strip_delimiters(table_name);
        let name = to_identifier(table_name)?;
        let rules = config.rules;

        let mut table = TableMapping::new(name.clone(), table_name, config.provider, rules);
        table.alias = to_alias(alias.unwrap_or(&name));

        let mut diagnostics = Vec::new();
        let mut taken = HashSet::new();
        let mut columns = Vec::with_capacity(self.columns.len());

        for sampled in self.columns {
            let ty = match sampled.kind {
                Some(kind) => ValueType {
                    kind,
                    nullable: sampled.nullable,
                },
                None => {
                    diagnostics.push(
                        Diagnostic::UntypedColumn {
                            table: table_name.to_string(),
                            column: sampled.name.clone(),
                        }
                        .emit(),
                    );
                    ValueType::nullable(SemanticType::String)
                }
            };

            let base = to_valid_name(&sampled.name);
            let col_name = unique_name(&base, &mut taken);
            if col_name != base {
                diagnostics.push(
                    Diagnostic::RenamedColumn {
                        table: table_name.to_string(),
                        column: sampled.name.clone(),
                        name: col_name.clone(),
                    }
                    .emit(),
                );
            }

            let mut col = ColumnMapping::with_rules(col_name, ty, &rules);
            col.field = rules.db_name(&sampled.name);
            col.title = rules.view_name(&sampled.name);
            columns.push(col);
        }

        table.set_columns(columns)?;
        Ok((table, diagnostics))
    }
}
