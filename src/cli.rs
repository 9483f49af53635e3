use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::mapping::DbProvider;

#[derive(Parser, Debug)]
#[command(name = "ormgen")]
#[command(
    version,
    about = "Derive table mappings from type registries or database schema"
)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured database provider
    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderArg>,

    /// Log traversal details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the tables of a SQLite database
    Tables {
        /// SQLite database path
        db: PathBuf,
    },

    /// Reverse-engineer a table and everything it references
    Reverse {
        /// SQLite database path
        db: PathBuf,

        /// Starting table
        table: String,

        /// Type registry (JSON) to bind tables against
        #[arg(short, long)]
        registry: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Rust)]
        format: Format,
    },

    /// Resolve declared types from a registry file
    Resolve {
        /// Type registry (JSON)
        registry: PathBuf,

        /// Only resolve this type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Infer a mapping from the rows a query returns
    Infer {
        /// SQLite database path
        db: PathBuf,

        /// Query to sample
        #[arg(short, long)]
        query: String,

        /// Table name to give the mapping
        #[arg(short, long)]
        table: String,

        #[arg(short, long, value_enum, default_value_t = Format::Rust)]
        format: Format,
    },
}

/// Output format of a resolved mapping
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Rust struct declarations
    Rust,
    /// Serialized mappings
    Json,
    /// SQL statements per table
    Sql,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    Mssql,
    Mysql,
    Oracle,
    Postgresql,
}

impl From<ProviderArg> for DbProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Mssql => DbProvider::MsSql,
            ProviderArg::Mysql => DbProvider::MySql,
            ProviderArg::Oracle => DbProvider::Oracle,
            ProviderArg::Postgresql => DbProvider::PostgreSql,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
