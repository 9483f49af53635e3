use crate::mapping::{ColumnMapping, TableMapping};

/// An ordered subset of a table's columns.
///
/// Borrows the owning table for identifier quoting, so fragments always
/// use the table's current provider.
#[derive(Debug, Clone)]
pub struct ColumnSet<'a> {
    table: &'a TableMapping,
    columns: Vec<&'a ColumnMapping>,
}

impl<'a> ColumnSet<'a> {
    /// Every column, in declaration order
    pub fn all(table: &'a TableMapping) -> Self {
        Self {
            table,
            columns: table.columns().iter().collect(),
        }
    }

    pub fn keys(table: &'a TableMapping) -> Self {
        Self {
            table,
            columns: table.keys(),
        }
    }

    /// Columns whose name is not listed
    pub fn reject(&self, names: &[&str]) -> Self {
        self.filter(|col| !names.contains(&col.name.as_str()))
    }

    /// Columns whose name is listed, kept in declaration order
    pub fn select(&self, names: &[&str]) -> Self {
        self.filter(|col| names.contains(&col.name.as_str()))
    }

    /// [`reject`](Self::reject) with a comma-separated name list
    pub fn reject_list(&self, filter: &str) -> Self {
        self.reject(&split_names(filter))
    }

    /// [`select`](Self::select) with a comma-separated name list
    pub fn select_list_of(&self, filter: &str) -> Self {
        self.select(&split_names(filter))
    }

    fn filter(&self, keep: impl Fn(&ColumnMapping) -> bool) -> Self {
        Self {
            table: self.table,
            columns: self.columns.iter().copied().filter(|col| keep(col)).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ColumnMapping> + '_ {
        self.columns.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn quoted(&self, col: &ColumnMapping) -> String {
        self.table.quote_identifier(&col.field)
    }

    /// `[field], [field2]`
    pub fn field_list(&self) -> String {
        self.join(", ", |col| self.quoted(col))
    }

    /// `[field] AS name, ...`
    pub fn select_list(&self) -> String {
        self.join(", ", |col| format!("{} AS {}", self.quoted(col), col.name))
    }

    /// `[field] = @name AND ...`
    pub fn key_condition(&self) -> String {
        self.join(" AND ", |col| format!("{} = @{}", self.quoted(col), col.name))
    }

    /// Quoted fields of the writable columns
    pub fn insert_fields(&self) -> String {
        self.writable().join(", ", |col| self.quoted(col))
    }

    /// `@name` placeholders of the writable columns
    pub fn insert_placeholders(&self) -> String {
        self.writable().join(", ", |col| format!("@{}", col.name))
    }

    /// `[field] = @name, ...` over columns that are neither key nor readonly
    pub fn update_set(&self) -> String {
        self.filter(|col| !col.is_key && !col.readonly)
            .join(", ", |col| format!("{} = @{}", self.quoted(col), col.name))
    }

    fn writable(&self) -> Self {
        self.filter(|col| !col.readonly)
    }

    fn join(&self, sep: &str, render: impl Fn(&ColumnMapping) -> String) -> String {
        self.columns
            .iter()
            .map(|col| render(col))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

fn split_names(filter: &str) -> Vec<&str> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{DbProvider, SemanticType};
    use crate::registry::{AttributeResolver, TypeDescriptor};

    fn invoice() -> TableMapping {
        let desc = TypeDescriptor::table("Invoice")
            .column("Id", SemanticType::I32)
            .key()
            .column("Name", SemanticType::String)
            .column("CreatedAt", SemanticType::Timestamp)
            .readonly()
            .finish();
        AttributeResolver::default().resolve(&desc).unwrap()
    }

    #[test]
    fn test_select_list() {
        let table = invoice();
        assert_eq!(
            ColumnSet::all(&table).select_list(),
            "[Id] AS Id, [Name] AS Name, [CreatedAt] AS CreatedAt"
        );
    }

    #[test]
    fn test_update_set_skips_key_and_readonly() {
        let table = invoice();
        assert_eq!(ColumnSet::all(&table).update_set(), "[Name] = @Name");
    }

    #[test]
    fn test_insert_skips_readonly() {
        let table = invoice();
        let all = ColumnSet::all(&table);
        assert_eq!(all.insert_fields(), "[Id], [Name]");
        assert_eq!(all.insert_placeholders(), "@Id, @Name");
    }

    #[test]
    fn test_key_condition() {
        let table = invoice();
        assert_eq!(ColumnSet::keys(&table).key_condition(), "[Id] = @Id");

        let pair = ColumnSet::all(&table).select(&["Name", "Id"]);
        assert_eq!(pair.key_condition(), "[Id] = @Id AND [Name] = @Name");
    }

    #[test]
    fn test_reject_and_select_lists() {
        let table = invoice();
        let all = ColumnSet::all(&table);

        let rest = all.reject_list(" Id, ,CreatedAt ");
        assert_eq!(rest.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["Name"]);

        let picked = all.select_list_of("CreatedAt,Id");
        assert_eq!(picked.field_list(), "[Id], [CreatedAt]");
        assert!(all.select(&["Nope"]).is_empty());
    }

    #[test]
    fn test_quoting_follows_provider() {
        let mut table = invoice();
        table.set_provider(DbProvider::PostgreSql);
        assert_eq!(ColumnSet::keys(&table).key_condition(), "\"Id\" = @Id");
    }
}
