use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::mapping::ValueType;
use crate::naming::RuleOverride;

/// Table-level declaration attached to a type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableAnnotation {
    pub table_name: Option<String>,
    pub title: Option<String>,
    pub alias: Option<String>,
    pub id_property: Option<String>,
    pub text_property: Option<String>,
    pub readonly: bool,
    /// Rule switches applied in order before the table is resolved
    pub rules: Vec<RuleOverride>,
}

/// Property-level declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyAnnotation {
    pub title: Option<String>,
    pub field: Option<String>,
    pub format: Option<String>,
    pub is_key: bool,
    pub readonly: bool,
    /// Name of the referenced registry type
    pub ref_type: Option<String>,
    pub hide: bool,
    /// Rule switches that stay in effect for this and all later properties
    pub rules: Vec<RuleOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<PropertyAnnotation>,
}

/// Structural description of a type: its name, table declaration and
/// properties in declaration order.
///
/// ```
/// use ormgen::mapping::SemanticType;
/// use ormgen::registry::TypeDescriptor;
///
/// let order = TypeDescriptor::table("Order")
///     .table_name("Orders")
///     .column("Id", SemanticType::I32)
///     .key()
///     .column("CustomerId", SemanticType::I32)
///     .ref_type("Customer")
///     .finish();
/// assert_eq!(order.properties.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableAnnotation>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// A plain type without table declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            properties: Vec::new(),
        }
    }

    /// Start declaring a table type
    pub fn table(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            desc: Self {
                name: name.into(),
                table: Some(TableAnnotation::default()),
                properties: Vec::new(),
            },
        }
    }

    /// Add a property without annotation
    pub fn property(mut self, name: impl Into<String>, ty: impl Into<ValueType>) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            ty: ty.into(),
            column: None,
        });
        self
    }

    /// Explicit table name declared by the annotation, if any
    pub fn declared_table_name(&self) -> Option<&str> {
        self.table
            .as_ref()
            .and_then(|table| table.table_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

/// Fluent builder for [`TypeDescriptor`]s with a table declaration.
///
/// Table-level setters apply until the first `column`; after that,
/// column setters apply to the most recently added column.
///
/// # Panics
///
/// Column setters (`key`, `readonly`, `hide`, `field`, `column_title`,
/// `format`, `ref_type`, `column_rule`) panic when no column was added yet.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    desc: TypeDescriptor,
}

impl TableBuilder {
    fn annotation(&mut self) -> &mut TableAnnotation {
        self.desc.table.get_or_insert_with(TableAnnotation::default)
    }

    #[track_caller]
    fn last_column(&mut self) -> &mut PropertyAnnotation {
        match self.desc.properties.last_mut() {
            Some(prop) => prop.column.get_or_insert_with(PropertyAnnotation::default),
            None => panic!("column setter used before any column was declared"),
        }
    }

    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.annotation().table_name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.annotation().title = Some(title.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.annotation().alias = Some(alias.into());
        self
    }

    pub fn id_property(mut self, name: impl Into<String>) -> Self {
        self.annotation().id_property = Some(name.into());
        self
    }

    pub fn text_property(mut self, name: impl Into<String>) -> Self {
        self.annotation().text_property = Some(name.into());
        self
    }

    pub fn readonly_table(mut self) -> Self {
        self.annotation().readonly = true;
        self
    }

    /// Rule switch at table scope
    pub fn rule(mut self, rule: RuleOverride) -> Self {
        self.annotation().rules.push(rule);
        self
    }

    pub fn column(mut self, name: impl Into<String>, ty: impl Into<ValueType>) -> Self {
        self.desc.properties.push(PropertyDescriptor {
            name: name.into(),
            ty: ty.into(),
            column: None,
        });
        self
    }

    #[track_caller]
    pub fn key(mut self) -> Self {
        self.last_column().is_key = true;
        self
    }

    #[track_caller]
    pub fn readonly(mut self) -> Self {
        self.last_column().readonly = true;
        self
    }

    #[track_caller]
    pub fn hide(mut self) -> Self {
        self.last_column().hide = true;
        self
    }

    #[track_caller]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.last_column().field = Some(field.into());
        self
    }

    #[track_caller]
    pub fn column_title(mut self, title: impl Into<String>) -> Self {
        self.last_column().title = Some(title.into());
        self
    }

    #[track_caller]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.last_column().format = Some(format.into());
        self
    }

    #[track_caller]
    pub fn ref_type(mut self, type_name: impl Into<String>) -> Self {
        self.last_column().ref_type = Some(type_name.into());
        self
    }

    /// Rule switch at column scope, in effect from the current column on
    #[track_caller]
    pub fn column_rule(mut self, rule: RuleOverride) -> Self {
        self.last_column().rules.push(rule);
        self
    }

    pub fn finish(self) -> TypeDescriptor {
        self.desc
    }
}

/// Source of type descriptors to bind reverse-engineered tables to
pub trait TypeRegistry {
    fn descriptors(&self) -> Result<Vec<&TypeDescriptor>, Error>;
}

impl TypeRegistry for [TypeDescriptor] {
    fn descriptors(&self) -> Result<Vec<&TypeDescriptor>, Error> {
        Ok(self.iter().collect())
    }
}

impl TypeRegistry for Vec<TypeDescriptor> {
    fn descriptors(&self) -> Result<Vec<&TypeDescriptor>, Error> {
        Ok(self.iter().collect())
    }
}
