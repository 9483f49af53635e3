use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic value type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Arbitrary-precision decimal
    Decimal,
    Char,
    String,
    /// Timestamp without offset
    Timestamp,
    /// Timestamp with a UTC offset
    TimestampTz,
    /// Time of day
    Time,
    Bytes,
    Uuid,
    /// Opaque value of any type
    Any,
}

const ALL_TYPES: &[SemanticType] = &[
    SemanticType::Bool,
    SemanticType::I8,
    SemanticType::U8,
    SemanticType::I16,
    SemanticType::U16,
    SemanticType::I32,
    SemanticType::U32,
    SemanticType::I64,
    SemanticType::U64,
    SemanticType::F32,
    SemanticType::F64,
    SemanticType::Decimal,
    SemanticType::Char,
    SemanticType::String,
    SemanticType::Timestamp,
    SemanticType::TimestampTz,
    SemanticType::Time,
    SemanticType::Bytes,
    SemanticType::Uuid,
    SemanticType::Any,
];

impl SemanticType {
    /// Short name used in registry files
    pub const fn name(self) -> &'static str {
        match self {
            SemanticType::Bool => "bool",
            SemanticType::I8 => "i8",
            SemanticType::U8 => "u8",
            SemanticType::I16 => "i16",
            SemanticType::U16 => "u16",
            SemanticType::I32 => "i32",
            SemanticType::U32 => "u32",
            SemanticType::I64 => "i64",
            SemanticType::U64 => "u64",
            SemanticType::F32 => "f32",
            SemanticType::F64 => "f64",
            SemanticType::Decimal => "decimal",
            SemanticType::Char => "char",
            SemanticType::String => "string",
            SemanticType::Timestamp => "timestamp",
            SemanticType::TimestampTz => "timestamp_tz",
            SemanticType::Time => "time",
            SemanticType::Bytes => "bytes",
            SemanticType::Uuid => "uuid",
            SemanticType::Any => "any",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_TYPES.iter().copied().find(|ty| ty.name() == name)
    }

    /// Rust type used for generated field declarations
    pub const fn rust_syntax(self) -> &'static str {
        match self {
            SemanticType::Bool => "bool",
            SemanticType::I8 => "i8",
            SemanticType::U8 => "u8",
            SemanticType::I16 => "i16",
            SemanticType::U16 => "u16",
            SemanticType::I32 => "i32",
            SemanticType::U32 => "u32",
            SemanticType::I64 => "i64",
            SemanticType::U64 => "u64",
            SemanticType::F32 => "f32",
            SemanticType::F64 => "f64",
            SemanticType::Decimal => "rust_decimal::Decimal",
            SemanticType::Char => "char",
            SemanticType::String => "String",
            SemanticType::Timestamp => "chrono::NaiveDateTime",
            SemanticType::TimestampTz => "chrono::DateTime<chrono::FixedOffset>",
            SemanticType::Time => "chrono::NaiveTime",
            SemanticType::Bytes => "Vec<u8>",
            SemanticType::Uuid => "uuid::Uuid",
            SemanticType::Any => "serde_json::Value",
        }
    }
}

/// Nullable-aware value type, written `i32` or `i32?` in registry files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValueType {
    pub kind: SemanticType,
    pub nullable: bool,
}

impl ValueType {
    pub const fn new(kind: SemanticType) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(kind: SemanticType) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    pub fn rust_syntax(&self) -> String {
        if self.nullable {
            format!("Option<{}>", self.kind.rust_syntax())
        } else {
            self.kind.rust_syntax().to_string()
        }
    }
}

impl From<SemanticType> for ValueType {
    fn from(kind: SemanticType) -> Self {
        ValueType::new(kind)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, nullable) = match s.strip_suffix('?') {
            Some(name) => (name, true),
            None => (s, false),
        };
        let kind = SemanticType::from_name(name).ok_or_else(|| format!("unknown type `{}`", s))?;
        Ok(Self { kind, nullable })
    }
}

impl TryFrom<String> for ValueType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

/// Target database dialect, selecting the identifier-quoting convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbProvider {
    #[default]
    MsSql,
    MySql,
    Oracle,
    PostgreSql,
}

impl DbProvider {
    const fn delimiters(self) -> (char, char) {
        match self {
            DbProvider::MsSql => ('[', ']'),
            DbProvider::MySql => ('`', '`'),
            DbProvider::Oracle | DbProvider::PostgreSql => ('"', '"'),
        }
    }

    /// Quote an identifier. Already-quoted input is returned unchanged.
    pub fn quote(self, name: &str) -> String {
        let (open, close) = self.delimiters();
        if name.starts_with(open) {
            name.to_string()
        } else {
            format!("{}{}{}", open, name, close)
        }
    }
}

impl fmt::Display for DbProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbProvider::MsSql => write!(f, "mssql"),
            DbProvider::MySql => write!(f, "mysql"),
            DbProvider::Oracle => write!(f, "oracle"),
            DbProvider::PostgreSql => write!(f, "postgresql"),
        }
    }
}
