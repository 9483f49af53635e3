//! Complete statements assembled from column fragments.
//!
//! Writes against a readonly table, and statements that need a key on a
//! table without one, yield `None`.

use super::fragments::ColumnSet;
use crate::mapping::TableMapping;

pub fn select_all(table: &TableMapping) -> String {
    format!(
        "SELECT {} FROM {}",
        ColumnSet::all(table).select_list(),
        table.table_name()
    )
}

pub fn select_by_key(table: &TableMapping) -> Option<String> {
    let keys = ColumnSet::keys(table);
    if keys.is_empty() {
        return None;
    }
    Some(format!("{} WHERE {}", select_all(table), keys.key_condition()))
}

pub fn insert(table: &TableMapping) -> Option<String> {
    let columns = ColumnSet::all(table);
    if table.readonly || columns.insert_fields().is_empty() {
        return None;
    }
    Some(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.table_name(),
        columns.insert_fields(),
        columns.insert_placeholders()
    ))
}

pub fn update_by_key(table: &TableMapping) -> Option<String> {
    let keys = ColumnSet::keys(table);
    let set = ColumnSet::all(table).update_set();
    if table.readonly || keys.is_empty() || set.is_empty() {
        return None;
    }
    Some(format!(
        "UPDATE {} SET {} WHERE {}",
        table.table_name(),
        set,
        keys.key_condition()
    ))
}

pub fn delete_by_key(table: &TableMapping) -> Option<String> {
    let keys = ColumnSet::keys(table);
    if table.readonly || keys.is_empty() {
        return None;
    }
    Some(format!(
        "DELETE FROM {} WHERE {}",
        table.table_name(),
        keys.key_condition()
    ))
}
