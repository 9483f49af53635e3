use crate::config::MapperConfig;
use crate::error::{Error, Result};
use crate::mapping::{ColumnMapping, RefType, TableMapping};
use crate::naming::to_alias;

use super::descriptor::{TypeDescriptor, TypeRegistry};

/// Builds table mappings from declared type descriptors
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeResolver {
    config: MapperConfig,
}

impl AttributeResolver {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Resolve one type. Types without a table declaration are rejected.
    pub fn resolve(&self, desc: &TypeDescriptor) -> Result<TableMapping> {
        let annotation = desc
            .table
            .as_ref()
            .ok_or_else(|| Error::MissingTableDeclaration {
                type_name: desc.name.clone(),
            })?;

        let table_rules = self.config.rules.with_overrides(&annotation.rules);

        let table_name = match desc.declared_table_name() {
            Some(name) => name.to_string(),
            None => table_rules.db_name(&desc.name),
        };

        let mut table = TableMapping::new(
            desc.name.clone(),
            table_name,
            self.config.provider,
            table_rules,
        );
        if let Some(title) = &annotation.title {
            table.title = title.clone();
        }
        table.alias = to_alias(annotation.alias.as_deref().unwrap_or(&desc.name));
        table.set_id_property(annotation.id_property.clone());
        table.text_property = annotation.text_property.clone();
        table.readonly = annotation.readonly;
        table.bound_type = Some(desc.name.clone());

        // property-level switches persist until superseded
        let mut rules = table_rules;
        let mut columns = Vec::with_capacity(desc.properties.len());

        for prop in &desc.properties {
            let Some(ann) = prop.column.as_ref() else {
                columns.push(ColumnMapping::with_rules(prop.name.clone(), prop.ty, &rules));
                continue;
            };

            rules.apply_overrides(&ann.rules);

            let mut col = ColumnMapping::with_rules(prop.name.clone(), prop.ty, &rules);
            if let Some(field) = &ann.field {
                col.field = field.clone();
            }
            if let Some(title) = &ann.title {
                col.title = title.clone();
            }
            col.format = ann.format.clone();
            col.is_key = ann.is_key;
            col.readonly = ann.readonly;
            col.hide = ann.hide;
            col.ref_type = ann.ref_type.clone().map(RefType::Mapped);

            columns.push(col);
        }

        table.set_columns(columns)?;

        tracing::debug!(
            type_name = %desc.name,
            table = %table.raw_table_name(),
            columns = table.columns().len(),
            "resolved type"
        );

        Ok(table)
    }

    /// Resolve every type in the registry that declares a table
    pub fn resolve_all<R>(&self, registry: &R) -> Result<Vec<TableMapping>>
    where
        R: TypeRegistry + ?Sized,
    {
        registry
            .descriptors()?
            .into_iter()
            .filter(|desc| desc.table.is_some())
            .map(|desc| self.resolve(desc))
            .collect()
    }
}
