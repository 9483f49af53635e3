use thiserror::Error;

/// Fatal mapping errors, surfaced to the immediate caller
#[derive(Debug, Error)]
pub enum Error {
    #[error("type `{type_name}` has no table declaration")]
    MissingTableDeclaration { type_name: String },

    #[error("cannot determine id property of `{table}`: {keys} key column(s) and no explicit id_property")]
    AmbiguousOrMissingIdentifier { table: String, keys: usize },

    #[error("`{name}` does not yield a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("duplicate column `{column}` in `{table}`")]
    DuplicateColumn { table: String, column: String },

    #[error("table `{table}` not found")]
    TableNotFound { table: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("schema source: {0}")]
    Schema(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Non-fatal findings recorded while resolving metadata.
///
/// The resolved value always falls back to a safe default; the diagnostic
/// only explains why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("{table}.{column}: unknown raw type `{raw_type}`, mapped to string")]
    UnknownRawType {
        table: String,
        column: String,
        raw_type: String,
    },

    #[error("{table}.{column}: unresolved reference to `{target}`, mapped to string")]
    UnresolvedReference {
        table: String,
        column: String,
        target: String,
    },

    #[error("{table}: exploring type registry failed: {message}")]
    MetadataExploration { table: String, message: String },

    #[error("{table}.{column}: name collides with another column, mapped as `{name}`")]
    RenamedColumn {
        table: String,
        column: String,
        name: String,
    },

    #[error("{table}.{column}: no values to infer a type from, mapped to nullable string")]
    UntypedColumn { table: String, column: String },
}

impl Diagnostic {
    /// Log the diagnostic and hand it back for collection
    pub(crate) fn emit(self) -> Self {
        tracing::warn!("{}", self);
        self
    }
}
