use serde::Serialize;
use std::collections::HashSet;

use super::types::{DbProvider, ValueType};
use crate::error::{Error, Result};
use crate::naming::{strip_delimiters, to_alias, RuleSet};

/// Target of a column that logically references another mapped table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    /// A type known to the registry
    Mapped(String),
    /// Unresolved target, carried as a plain string
    Text,
}

impl RefType {
    pub fn type_name(&self) -> &str {
        match self {
            RefType::Mapped(name) => name,
            RefType::Text => "String",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RefType::Text)
    }
}

/// Storage binding of one property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMapping {
    /// Logical property name
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    /// View-form label
    pub title: String,
    /// Database-form column name, unquoted
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub is_key: bool,
    pub readonly: bool,
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<RefType>,
}

impl ColumnMapping {
    /// Column with field and title derived from `rules`
    pub fn with_rules(name: impl Into<String>, ty: ValueType, rules: &RuleSet) -> Self {
        let name = name.into();
        Self {
            field: rules.db_name(&name),
            title: rules.view_name(&name),
            name,
            ty,
            format: None,
            is_key: false,
            readonly: false,
            hide: false,
            ref_type: None,
        }
    }
}

/// Resolved mapping of one table
#[derive(Debug, Clone, Serialize)]
pub struct TableMapping {
    /// Identifier of the generated type or table reference
    pub name: String,
    #[serde(rename = "table_name")]
    raw_table_name: String,
    pub title: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_property: Option<String>,
    pub readonly: bool,
    /// Registry type this table is bound to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
    columns: Vec<ColumnMapping>,
    provider: DbProvider,
    rules: RuleSet,
    #[serde(skip)]
    quoting: Option<Quoting>,
}

/// Custom identifier-quoting function
#[derive(Clone, Copy)]
struct Quoting(fn(&str) -> String);

impl std::fmt::Debug for Quoting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Quoting(..)")
    }
}

impl TableMapping {
    /// Empty mapping with title and alias derived from `name`
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        provider: DbProvider,
        rules: RuleSet,
    ) -> Self {
        let name = name.into();
        let table_name: String = table_name.into();
        Self {
            title: rules.view_name(&name),
            alias: to_alias(&name),
            raw_table_name: strip_delimiters(&table_name).to_string(),
            name,
            id_property: None,
            text_property: None,
            readonly: false,
            bound_type: None,
            columns: Vec::new(),
            provider,
            rules,
            quoting: None,
        }
    }

    pub(crate) fn set_id_property(&mut self, id_property: Option<String>) {
        self.id_property = id_property;
    }

    /// Install the columns, rejecting duplicate names
    pub(crate) fn set_columns(&mut self, columns: Vec<ColumnMapping>) -> Result<()> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(Error::DuplicateColumn {
                    table: self.name.clone(),
                    column: col.name.clone(),
                });
            }
        }
        self.columns = columns;
        Ok(())
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [ColumnMapping] {
        &mut self.columns
    }

    /// Physical table name, quoted for the active provider
    pub fn table_name(&self) -> String {
        self.quote_identifier(&self.raw_table_name)
    }

    /// Physical table name as stored, without quoting
    pub fn raw_table_name(&self) -> &str {
        &self.raw_table_name
    }

    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|col| col.name == name)
    }

    pub fn keys(&self) -> Vec<&ColumnMapping> {
        self.columns.iter().filter(|col| col.is_key).collect()
    }

    pub fn references(&self) -> Vec<&ColumnMapping> {
        self.columns
            .iter()
            .filter(|col| col.ref_type.is_some())
            .collect()
    }

    /// The single-row identifier: the explicit value, else the only key column
    pub fn id_property(&self) -> Result<&str> {
        self.try_id_property()
            .ok_or_else(|| Error::AmbiguousOrMissingIdentifier {
                table: self.name.clone(),
                keys: self.keys().len(),
            })
    }

    pub fn try_id_property(&self) -> Option<&str> {
        if let Some(id) = self.id_property.as_deref() {
            return Some(id);
        }
        let mut keys = self.columns.iter().filter(|col| col.is_key);
        match (keys.next(), keys.next()) {
            (Some(only), None) => Some(only.name.as_str()),
            _ => None,
        }
    }

    pub fn provider(&self) -> DbProvider {
        self.provider
    }

    /// Switch dialect; drops any custom quoting function
    pub fn set_provider(&mut self, provider: DbProvider) {
        self.provider = provider;
        self.quoting = None;
    }

    /// Replace the provider's quoting with a custom function
    pub fn use_quoting(&mut self, quote: fn(&str) -> String) {
        self.quoting = Some(Quoting(quote));
    }

    /// Rules that were active when the mapping was built
    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        match self.quoting {
            Some(Quoting(quote)) => quote(name),
            None => self.provider.quote(name),
        }
    }
}
