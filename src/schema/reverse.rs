use std::collections::HashSet;

use super::raw_types::lookup_raw_type;
use super::source::SchemaSource;
use crate::config::MapperConfig;
use crate::error::{Diagnostic, Result};
use crate::mapping::{ColumnMapping, RefType, SemanticType, TableMapping, ValueType};
use crate::naming::{strip_delimiters, to_alias, to_identifier, to_valid_name, unique_name};
use crate::registry::TypeRegistry;

/// Reference left as a string placeholder because its target had no bound type
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReference {
    table: usize,
    column: String,
    target: usize,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    mappings: usize,
    diagnostics: usize,
    pending: usize,
}

/// Mappings discovered by a schema walk, in discovery order, plus every
/// diagnostic recorded along the way.
///
/// Also serves as the visited set: walking a table already present returns
/// the existing mapping instead of rebuilding it.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolution {
    pub mappings: Vec<TableMapping>,
    pub diagnostics: Vec<Diagnostic>,
    pending: Vec<PendingReference>,
}

impl SchemaResolution {
    /// Mapping of a physical table, delimiters ignored
    pub fn get(&self, table_name: &str) -> Option<&TableMapping> {
        self.position(table_name).map(|index| &self.mappings[index])
    }

    fn position(&self, table_name: &str) -> Option<usize> {
        let table_name = strip_delimiters(table_name);
        self.mappings
            .iter()
            .position(|mapping| mapping.raw_table_name() == table_name)
    }

    fn mark(&self) -> Mark {
        Mark {
            mappings: self.mappings.len(),
            diagnostics: self.diagnostics.len(),
            pending: self.pending.len(),
        }
    }

    /// Drop everything recorded since `mark`
    fn rollback(&mut self, mark: Mark) {
        self.mappings.truncate(mark.mappings);
        self.diagnostics.truncate(mark.diagnostics);
        self.pending.truncate(mark.pending);
    }

    /// Number of references still carried as string placeholders
    pub fn unresolved_references(&self) -> usize {
        self.pending.len()
    }

    pub fn into_mappings(self) -> Vec<TableMapping> {
        self.mappings
    }
}

/// Builds table mappings from live schema, following foreign keys
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaReverseEngineer {
    config: MapperConfig,
}

impl SchemaReverseEngineer {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Map `table_name` and every table reachable from it through foreign keys.
    /// The requested table comes first.
    pub fn from_schema<S, R>(
        &self,
        source: &S,
        table_name: &str,
        registry: &R,
    ) -> Result<SchemaResolution>
    where
        S: SchemaSource + ?Sized,
        R: TypeRegistry + ?Sized,
    {
        let mut visited = SchemaResolution::default();
        self.resolve_into(source, table_name, registry, &mut visited)?;
        Ok(visited)
    }

    /// Walk `table_name` into an existing resolution, sharing its visited set.
    /// Returns the index of the table's mapping.
    ///
    /// On error the resolution is left as it was before the call.
    pub fn resolve_into<S, R>(
        &self,
        source: &S,
        table_name: &str,
        registry: &R,
        visited: &mut SchemaResolution,
    ) -> Result<usize>
    where
        S: SchemaSource + ?Sized,
        R: TypeRegistry + ?Sized,
    {
        let table_name = source.canonical_table_name(strip_delimiters(table_name))?;
        if let Some(index) = visited.position(&table_name) {
            tracing::debug!(table = %table_name, "already visited");
            return Ok(index);
        }

        let mark = visited.mark();
        let result = self.visit(source, &table_name, registry, visited);
        if result.is_err() {
            visited.rollback(mark);
        }
        result
    }

    fn visit<S, R>(
        &self,
        source: &S,
        table_name: &str,
        registry: &R,
        visited: &mut SchemaResolution,
    ) -> Result<usize>
    where
        S: SchemaSource + ?Sized,
        R: TypeRegistry + ?Sized,
    {
        let rules = self.config.rules;
        let name = to_identifier(table_name)?;

        let mut table = TableMapping::new(name.clone(), table_name, self.config.provider, rules);
        table.alias = to_alias(&name);
        table.bound_type = self.bind_type(table_name, registry, &mut visited.diagnostics);

        // registered before its columns so cycles find it
        let index = visited.mappings.len();
        visited.mappings.push(table);
        tracing::debug!(table = %table_name, "visiting");

        let descriptors = source.columns(table_name)?;
        let keys: HashSet<String> = source.primary_keys(table_name)?.into_iter().collect();
        let foreign_keys = source.foreign_keys(table_name)?;

        let mut taken = HashSet::new();
        let mut columns = Vec::with_capacity(descriptors.len());
        for desc in descriptors {
            let kind = match lookup_raw_type(&desc.raw_type) {
                Some(kind) => kind,
                None => {
                    visited.diagnostics.push(
                        Diagnostic::UnknownRawType {
                            table: table_name.to_string(),
                            column: desc.name.clone(),
                            raw_type: desc.raw_type.clone(),
                        }
                        .emit(),
                    );
                    SemanticType::String
                }
            };
            let ty = ValueType {
                kind,
                nullable: desc.nullable,
            };

            let base = to_valid_name(&desc.name);
            let col_name = unique_name(&base, &mut taken);
            if col_name != base {
                visited.diagnostics.push(
                    Diagnostic::RenamedColumn {
                        table: table_name.to_string(),
                        column: desc.name.clone(),
                        name: col_name.clone(),
                    }
                    .emit(),
                );
            }

            let mut col = ColumnMapping::with_rules(col_name, ty, &rules);
            col.field = rules.db_name(&desc.name);
            col.title = rules.view_name(&desc.name);
            col.is_key = keys.contains(&desc.name);

            if let Some(fk) = foreign_keys.iter().find(|fk| fk.column == desc.name) {
                let target = self.resolve_into(source, &fk.referenced_table, registry, visited)?;
                let target_mapping = &visited.mappings[target];

                col.ref_type = match &target_mapping.bound_type {
                    Some(type_name) => Some(RefType::Mapped(type_name.clone())),
                    None => {
                        visited.diagnostics.push(
                            Diagnostic::UnresolvedReference {
                                table: table_name.to_string(),
                                column: col.name.clone(),
                                target: target_mapping.raw_table_name().to_string(),
                            }
                            .emit(),
                        );
                        visited.pending.push(PendingReference {
                            table: index,
                            column: col.name.clone(),
                            target,
                        });
                        Some(RefType::Text)
                    }
                };
            }

            columns.push(col);
        }

        visited.mappings[index].set_columns(columns)?;
        Ok(index)
    }

    /// Optional second pass: bind still-unbound mappings against `registry`
    /// and replace placeholder references whose target is now bound.
    pub fn rebind<R>(&self, resolution: &mut SchemaResolution, registry: &R)
    where
        R: TypeRegistry + ?Sized,
    {
        for mapping in resolution
            .mappings
            .iter_mut()
            .filter(|mapping| mapping.bound_type.is_none())
        {
            mapping.bound_type =
                self.bind_type(mapping.raw_table_name(), registry, &mut resolution.diagnostics);
        }

        let mappings = &mut resolution.mappings;
        let diagnostics = &mut resolution.diagnostics;
        resolution.pending.retain(|pending| {
            let Some(type_name) = mappings[pending.target].bound_type.clone() else {
                return true;
            };
            let table = &mut mappings[pending.table];
            diagnostics.retain(|diag| {
                !matches!(diag, Diagnostic::UnresolvedReference { table: t, column, .. }
                    if t == table.raw_table_name() && *column == pending.column)
            });
            if let Some(col) = table
                .columns_mut()
                .iter_mut()
                .find(|col| col.name == pending.column)
            {
                col.ref_type = Some(RefType::Mapped(type_name));
            }
            false
        });
    }

    /// Find the registry type for a table: first a type declaring this
    /// table name, then a type named like the table that declares none.
    fn bind_type<R>(
        &self,
        table_name: &str,
        registry: &R,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String>
    where
        R: TypeRegistry + ?Sized,
    {
        let descriptors = match registry.descriptors() {
            Ok(descriptors) => descriptors,
            Err(err) => {
                diagnostics.push(
                    Diagnostic::MetadataExploration {
                        table: table_name.to_string(),
                        message: err.to_string(),
                    }
                    .emit(),
                );
                return None;
            }
        };

        let by_table = descriptors.iter().find(|desc| {
            desc.declared_table_name()
                .is_some_and(|declared| strip_delimiters(declared) == table_name)
        });
        if let Some(desc) = by_table {
            return Some(desc.name.clone());
        }

        let valid_name = to_valid_name(table_name);
        descriptors
            .iter()
            .find(|desc| {
                desc.table.is_some()
                    && desc.declared_table_name().is_none()
                    && (desc.name == table_name || desc.name == valid_name)
            })
            .map(|desc| desc.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::registry::TypeDescriptor;
    use crate::schema::{MemorySchema, MemoryTable};

    fn no_types() -> Vec<TypeDescriptor> {
        Vec::new()
    }

    fn cycle_schema() -> MemorySchema {
        MemorySchema::new()
            .table(
                "A",
                MemoryTable::new()
                    .column("id", "int")
                    .column("b_id", "int")
                    .key("id")
                    .references("b_id", "B"),
            )
            .table(
                "B",
                MemoryTable::new()
                    .column("id", "int")
                    .column("a_id", "int")
                    .key("id")
                    .references("a_id", "[A]"),
            )
    }

    #[test]
    fn test_cycle_terminates() {
        let engineer = SchemaReverseEngineer::default();
        let resolution = engineer
            .from_schema(&cycle_schema(), "A", &no_types())
            .unwrap();

        let names: Vec<_> = resolution
            .mappings
            .iter()
            .map(|m| m.raw_table_name())
            .collect();
        assert_eq!(names, ["A", "B"]);

        // both references unresolved without a registry
        assert_eq!(resolution.diagnostics.len(), 2);
        assert_eq!(resolution.unresolved_references(), 2);
        let b = resolution.get("B").unwrap();
        assert_eq!(b.column("a_id").unwrap().ref_type, Some(RefType::Text));
    }

    #[test]
    fn test_self_reference() {
        let schema = MemorySchema::new().table(
            "Employee",
            MemoryTable::new()
                .column("Id", "int")
                .column("ManagerId", "int")
                .nullable()
                .key("Id")
                .references("ManagerId", "Employee"),
        );
        let registry = vec![TypeDescriptor::table("Employee").finish()];

        let resolution = SchemaReverseEngineer::default()
            .from_schema(&schema, "Employee", &registry)
            .unwrap();

        assert_eq!(resolution.mappings.len(), 1);
        let manager = resolution.mappings[0].column("ManagerId").unwrap();
        assert_eq!(manager.ref_type, Some(RefType::Mapped("Employee".to_string())));
        assert_eq!(manager.ty, ValueType::nullable(SemanticType::I32));
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_bind_by_declared_table_name_first() {
        let registry = vec![
            TypeDescriptor::table("A").finish(),
            TypeDescriptor::table("Alpha").table_name("[A]").finish(),
        ];
        let resolution = SchemaReverseEngineer::default()
            .from_schema(&cycle_schema(), "A", &registry)
            .unwrap();

        assert_eq!(resolution.mappings[0].bound_type.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_bind_by_name_ignores_types_declaring_other_tables() {
        let registry = vec![TypeDescriptor::table("B").table_name("Other").finish()];
        let resolution = SchemaReverseEngineer::default()
            .from_schema(&cycle_schema(), "A", &registry)
            .unwrap();

        assert!(resolution.get("B").unwrap().bound_type.is_none());
    }

    #[test]
    fn test_bind_by_identifier_form() {
        let schema = MemorySchema::new().table(
            "Order Details",
            MemoryTable::new().column("Id", "int").key("Id"),
        );
        let registry = vec![TypeDescriptor::table("Order_Details").finish()];
        let resolution = SchemaReverseEngineer::default()
            .from_schema(&schema, "[Order Details]", &registry)
            .unwrap();

        let mapping = &resolution.mappings[0];
        assert_eq!(mapping.name, "Order_Details");
        assert_eq!(mapping.table_name(), "[Order Details]");
        assert_eq!(mapping.bound_type.as_deref(), Some("Order_Details"));
    }

    #[test]
    fn test_unknown_raw_type_one_diagnostic() {
        let schema = MemorySchema::new().table(
            "Place",
            MemoryTable::new()
                .column("Id", "int")
                .column("Shape", "geography")
                .key("Id"),
        );
        let resolution = SchemaReverseEngineer::default()
            .from_schema(&schema, "Place", &no_types())
            .unwrap();

        assert_eq!(
            resolution.diagnostics,
            vec![Diagnostic::UnknownRawType {
                table: "Place".to_string(),
                column: "Shape".to_string(),
                raw_type: "geography".to_string(),
            }]
        );
        let shape = resolution.mappings[0].column("Shape").unwrap();
        assert_eq!(shape.ty.kind, SemanticType::String);
        assert_eq!(shape.title, "Shape");
    }

    struct BrokenRegistry;

    impl TypeRegistry for BrokenRegistry {
        fn descriptors(&self) -> std::result::Result<Vec<&TypeDescriptor>, Error> {
            Err(Error::Schema("registry unavailable".to_string()))
        }
    }

    #[test]
    fn test_registry_failure_is_not_fatal() {
        let resolution = SchemaReverseEngineer::default()
            .from_schema(&cycle_schema(), "B", &BrokenRegistry)
            .unwrap();

        assert_eq!(resolution.mappings.len(), 2);
        let exploration = resolution
            .diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MetadataExploration { .. }))
            .count();
        assert_eq!(exploration, 2);
    }

    #[test]
    fn test_missing_referenced_table_propagates() {
        let schema = MemorySchema::new().table(
            "A",
            MemoryTable::new()
                .column("id", "int")
                .column("ghost_id", "int")
                .references("ghost_id", "Ghost"),
        );
        let result = SchemaReverseEngineer::default().from_schema(&schema, "A", &no_types());
        assert!(matches!(result, Err(Error::TableNotFound { table }) if table == "Ghost"));
    }

    #[test]
    fn test_rebind_resolves_placeholders() {
        let engineer = SchemaReverseEngineer::default();
        let mut resolution = engineer
            .from_schema(&cycle_schema(), "A", &no_types())
            .unwrap();
        assert_eq!(resolution.unresolved_references(), 2);

        let registry = vec![TypeDescriptor::table("A").finish()];
        engineer.rebind(&mut resolution, &registry);

        assert_eq!(resolution.unresolved_references(), 1);
        assert_eq!(
            resolution.diagnostics,
            vec![Diagnostic::UnresolvedReference {
                table: "A".to_string(),
                column: "b_id".to_string(),
                target: "B".to_string(),
            }]
        );
        let b = resolution.get("B").unwrap();
        assert_eq!(
            b.column("a_id").unwrap().ref_type,
            Some(RefType::Mapped("A".to_string()))
        );
        let a = resolution.get("A").unwrap();
        assert_eq!(a.column("b_id").unwrap().ref_type, Some(RefType::Text));
    }

    #[test]
    fn test_shared_visited_set() {
        let engineer = SchemaReverseEngineer::default();
        let schema = cycle_schema();
        let mut visited = SchemaResolution::default();

        let b = engineer.resolve_into(&schema, "B", &no_types(), &mut visited).unwrap();
        let a = engineer.resolve_into(&schema, "A", &no_types(), &mut visited).unwrap();

        assert_eq!((b, a), (0, 1));
        assert_eq!(visited.mappings.len(), 2);
    }

    #[test]
    fn test_failed_walk_leaves_visited_untouched() {
        let schema = cycle_schema().table(
            "C",
            MemoryTable::new()
                .column("id", "int")
                .column("a_id", "int")
                .column("ghost_id", "int")
                .references("a_id", "A")
                .references("ghost_id", "Ghost"),
        );
        let engineer = SchemaReverseEngineer::default();
        let mut visited = SchemaResolution::default();

        for _ in 0..2 {
            let result = engineer.resolve_into(&schema, "C", &no_types(), &mut visited);
            assert!(matches!(result, Err(Error::TableNotFound { table }) if table == "Ghost"));
            assert!(visited.mappings.is_empty());
            assert!(visited.diagnostics.is_empty());
            assert_eq!(visited.unresolved_references(), 0);
        }

        // earlier successful walks survive a later failure
        engineer.resolve_into(&schema, "B", &no_types(), &mut visited).unwrap();
        assert!(engineer.resolve_into(&schema, "C", &no_types(), &mut visited).is_err());
        assert_eq!(visited.mappings.len(), 2);
        assert_eq!(visited.unresolved_references(), 2);
    }

    #[test]
    fn test_colliding_column_names_renamed() {
        let schema = MemorySchema::new().table(
            "t",
            MemoryTable::new()
                .column("id", "int")
                .column("unit price", "int")
                .column("unit_price", "int")
                .key("id"),
        );
        let resolution = SchemaReverseEngineer::default()
            .from_schema(&schema, "t", &no_types())
            .unwrap();

        let table = &resolution.mappings[0];
        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "unit_price", "unit_price_2"]);
        assert_eq!(table.column("unit_price").unwrap().field, "unit price");
        assert_eq!(table.column("unit_price_2").unwrap().field, "unit_price");
        assert_eq!(
            resolution.diagnostics,
            vec![Diagnostic::RenamedColumn {
                table: "t".to_string(),
                column: "unit_price".to_string(),
                name: "unit_price_2".to_string(),
            }]
        );
    }
}
