use crate::error::Result;
use crate::mapping::{ColumnMapping, TableMapping};
use crate::naming::{to_alias, to_identifier};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

fn field_ident(name: &str) -> Result<String> {
    let ident = to_identifier(name)?;
    if KEYWORDS.contains(&ident.as_str()) {
        Ok(format!("r#{}", ident))
    } else {
        Ok(ident)
    }
}

/// Emit a Rust struct declaration for `table`.
///
/// Attributes only carry what the recorded rules would not derive on
/// their own, so re-resolving the declaration yields the same mapping.
pub fn emit_declaration(table: &TableMapping) -> Result<String> {
    let type_name = to_identifier(&table.name)?;
    let rules = table.rules();

    let mut out = format!(
        "#[ormgen(db_rule = \"{:?}\", view_rule = \"{:?}\")]\n",
        rules.db, rules.view
    );

    let mut values = Vec::new();
    if table.title != rules.view_name(&type_name) {
        values.push(format!("title = {:?}", table.title));
    }
    if table.raw_table_name() != rules.db_name(&type_name) {
        values.push(format!("table_name = {:?}", table.raw_table_name()));
    }
    if table.alias != to_alias(&type_name) {
        values.push(format!("alias = {:?}", table.alias));
    }
    if let Some(id) = table.try_id_property() {
        values.push(format!("id_property = {:?}", id));
    }
    if let Some(text) = table.text_property.as_deref().filter(|t| !t.trim().is_empty()) {
        values.push(format!("text_property = {:?}", text));
    }
    if table.readonly {
        values.push("readonly".to_string());
    }

    if values.is_empty() {
        out.push_str("#[table]\n");
    } else {
        out.push_str(&format!("#[table({})]\n", values.join(", ")));
    }
    out.push_str("#[derive(Debug, Clone)]\n");
    out.push_str("#[allow(non_camel_case_types, non_snake_case)]\n");
    out.push_str(&format!("pub struct {} {{\n", type_name));

    for col in table.columns() {
        let attrs = column_attributes(table, col);
        if !attrs.is_empty() {
            out.push_str(&format!("    #[column({})]\n", attrs.join(", ")));
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field_ident(&col.name)?,
            col.ty.rust_syntax()
        ));
    }
    out.push_str("}\n");

    Ok(out)
}

fn column_attributes(table: &TableMapping, col: &ColumnMapping) -> Vec<String> {
    let rules = table.rules();
    let mut values = Vec::new();

    if col.title != rules.view_name(&col.name) {
        values.push(format!("title = {:?}", col.title));
    }
    if col.field != rules.db_name(&col.name) {
        values.push(format!("field = {:?}", col.field));
    }
    if let Some(format) = col.format.as_deref().filter(|f| !f.trim().is_empty()) {
        values.push(format!("format = {:?}", format));
    }
    if col.is_key {
        values.push("key".to_string());
    }
    if col.readonly {
        values.push("readonly".to_string());
    }
    if col.hide {
        values.push("hide".to_string());
    }
    if let Some(ref_type) = &col.ref_type {
        values.push(format!("ref_type = {:?}", ref_type.type_name()));
    }

    values
}

/// Emit declarations for several tables as one source file
pub fn emit_module(tables: &[TableMapping]) -> Result<String> {
    let mut out = String::from("// @generated by ormgen\n");
    for table in tables {
        out.push('\n');
        out.push_str(&emit_declaration(table)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapperConfig;
    use crate::error::Error;
    use crate::mapping::{DbProvider, SemanticType, ValueType};
    use crate::naming::RuleSet;
    use crate::registry::{AttributeResolver, TypeDescriptor};
    use crate::schema::{MemorySchema, MemoryTable, SchemaReverseEngineer};

    #[test]
    fn test_emit_defaults_only() {
        let desc = TypeDescriptor::table("Tag")
            .column("Label", SemanticType::String)
            .finish();
        let table = AttributeResolver::default().resolve(&desc).unwrap();

        let code = emit_declaration(&table).unwrap();
        assert_eq!(
            code,
            "#[ormgen(db_rule = \"AsIs\", view_rule = \"Humanize\")]\n\
             #[table]\n\
             #[derive(Debug, Clone)]\n\
             #[allow(non_camel_case_types, non_snake_case)]\n\
             pub struct Tag {\n    \
                 pub Label: String,\n\
             }\n"
        );
    }

    #[test]
    fn test_emit_schema_mapping() {
        let schema = MemorySchema::new()
            .table(
                "Order Lines",
                MemoryTable::new()
                    .column("Id", "int")
                    .column("type", "nvarchar(20)")
                    .nullable()
                    .column("ProductId", "int")
                    .key("Id")
                    .references("ProductId", "Products"),
            )
            .table("Products", MemoryTable::new().column("Id", "int").key("Id"));
        let registry = vec![TypeDescriptor::table("Product").table_name("Products").finish()];

        let resolution = SchemaReverseEngineer::default()
            .from_schema(&schema, "Order Lines", &registry)
            .unwrap();
        let code = emit_declaration(&resolution.mappings[0]).unwrap();

        assert!(code.contains("#[table(table_name = \"Order Lines\", id_property = \"Id\")]"));
        assert!(code.contains("pub struct Order_Lines {"));
        assert!(code.contains("    #[column(key)]\n    pub Id: i32,"));
        assert!(code.contains("    pub r#type: Option<String>,"));
        assert!(code.contains("    #[column(ref_type = \"Product\")]\n    pub ProductId: i32,"));
    }

    #[test]
    fn test_emit_explicit_values() {
        let desc = TypeDescriptor::table("Order")
            .table_name("Orders")
            .title("Sales \"orders\"")
            .readonly_table()
            .column("Total", ValueType::nullable(SemanticType::Decimal))
            .field("total_amount")
            .format("0.00")
            .column("CustomerId", SemanticType::I32)
            .ref_type("Customer")
            .hide()
            .finish();
        let table = AttributeResolver::default().resolve(&desc).unwrap();
        let code = emit_declaration(&table).unwrap();

        assert!(code.contains(
            "#[table(title = \"Sales \\\"orders\\\"\", table_name = \"Orders\", readonly)]"
        ));
        assert!(code.contains("#[column(field = \"total_amount\", format = \"0.00\")]"));
        assert!(code.contains("pub Total: Option<rust_decimal::Decimal>,"));
        assert!(code.contains("#[column(hide, ref_type = \"Customer\")]"));
    }

    #[test]
    fn test_invalid_type_name() {
        let config = MapperConfig::new(DbProvider::MsSql, RuleSet::default());
        let table = TableMapping::new("???", "x", config.provider, config.rules);
        assert!(matches!(
            emit_declaration(&table),
            Err(Error::InvalidIdentifier { .. })
        ));
    }
}
