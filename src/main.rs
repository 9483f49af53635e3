use anyhow::{Context, Result};
use ormgen::{
    cli::{Cli, Commands, Format},
    codegen::emit_module,
    config::MapperConfig,
    mapping::TableMapping,
    registry::{load_registry, AttributeResolver, TypeDescriptor},
    schema::{SchemaReverseEngineer, SqliteSchema},
    script::statements,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let mut config = MapperConfig::load(cli.config.as_deref())?;
    if let Some(provider) = cli.provider {
        config.provider = provider.into();
    }

    match cli.command {
        Commands::Tables { db } => {
            let schema = open_db(&db)?;
            for name in schema.table_names()? {
                println!("{}", name);
            }
        }

        Commands::Reverse {
            db,
            table,
            registry,
            format,
        } => {
            let schema = open_db(&db)?;
            let registry = match registry {
                Some(path) => load_registry(&path)?,
                None => Vec::new(),
            };

            let resolution = SchemaReverseEngineer::new(config)
                .from_schema(&schema, &table, &registry)
                .with_context(|| format!("Failed to reverse-engineer table {:?}", table))?;

            tracing::info!(
                tables = resolution.mappings.len(),
                diagnostics = resolution.diagnostics.len(),
                unresolved = resolution.unresolved_references(),
                "reverse-engineered {}",
                table
            );
            print!("{}", render(&resolution.into_mappings(), format)?);
        }

        Commands::Resolve {
            registry,
            type_name,
            format,
        } => {
            let registry = load_registry(&registry)?;
            let resolver = AttributeResolver::new(config);

            let mappings = match type_name {
                Some(name) => {
                    let desc = find_type(&registry, &name)?;
                    vec![resolver.resolve(desc)?]
                }
                None => resolver.resolve_all(&registry)?,
            };
            print!("{}", render(&mappings, format)?);
        }

        Commands::Infer {
            db,
            query,
            table,
            format,
        } => {
            let schema = open_db(&db)?;
            let (mapping, diagnostics) = schema
                .infer_from_query(&query, &table, &config)
                .context("Failed to infer mapping from query")?;

            tracing::info!(diagnostics = diagnostics.len(), "inferred {}", table);
            print!("{}", render(&[mapping], format)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_db(path: &Path) -> Result<SqliteSchema> {
    SqliteSchema::open(path).with_context(|| format!("Failed to open database: {:?}", path))
}

fn find_type<'a>(registry: &'a [TypeDescriptor], name: &str) -> Result<&'a TypeDescriptor> {
    registry
        .iter()
        .find(|desc| desc.name == name)
        .with_context(|| format!("Type {:?} not found in registry", name))
}

fn render(mappings: &[TableMapping], format: Format) -> Result<String> {
    let text = match format {
        Format::Rust => emit_module(mappings)?,
        Format::Json => {
            let mut json = serde_json::to_string_pretty(mappings)?;
            json.push('\n');
            json
        }
        Format::Sql => {
            let mut out = String::new();
            for table in mappings {
                out.push_str(&format!("-- {}\n", table.name));
                out.push_str(&format!("{};\n", statements::select_all(table)));
                let writes = [
                    statements::select_by_key(table),
                    statements::insert(table),
                    statements::update_by_key(table),
                    statements::delete_by_key(table),
                ];
                for stmt in writes.into_iter().flatten() {
                    out.push_str(&format!("{};\n", stmt));
                }
                out.push('\n');
            }
            out
        }
    };
    Ok(text)
}
