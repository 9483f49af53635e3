pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod mapping;
pub mod naming;
pub mod registry;
pub mod schema;
pub mod script;

pub use cli::{Cli, Commands, Format};
pub use config::MapperConfig;
pub use error::{Diagnostic, Error, Result};
pub use mapping::{ColumnMapping, DbProvider, SemanticType, TableMapping, ValueType};
pub use naming::RuleSet;
