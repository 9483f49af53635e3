//! Provider raw type names to semantic types

use crate::mapping::SemanticType;

/// Known raw type names. Anything else maps to a string.
pub static RAW_TYPES: &[(&str, SemanticType)] = &[
    // integers
    ("tinyint", SemanticType::U8),
    ("smallint", SemanticType::I16),
    ("int", SemanticType::I32),
    ("bigint", SemanticType::I64),
    ("bit", SemanticType::Bool),
    // text
    ("char", SemanticType::String),
    ("nchar", SemanticType::String),
    ("varchar", SemanticType::String),
    ("nvarchar", SemanticType::String),
    ("text", SemanticType::String),
    ("ntext", SemanticType::String),
    // temporal
    ("date", SemanticType::Timestamp),
    ("datetime", SemanticType::Timestamp),
    ("datetime2", SemanticType::Timestamp),
    ("smalldatetime", SemanticType::Timestamp),
    ("datetimeoffset", SemanticType::TimestampTz),
    ("time", SemanticType::Time),
    // numeric
    ("decimal", SemanticType::Decimal),
    ("numeric", SemanticType::Decimal),
    ("money", SemanticType::Decimal),
    ("smallmoney", SemanticType::Decimal),
    ("float", SemanticType::F64),
    ("real", SemanticType::F32),
    // binary
    ("binary", SemanticType::Bytes),
    ("varbinary", SemanticType::Bytes),
    ("image", SemanticType::Bytes),
    ("timestamp", SemanticType::Bytes),
    ("rowversion", SemanticType::Bytes),
    // other
    ("uniqueidentifier", SemanticType::Uuid),
    ("sql_variant", SemanticType::Any),
];

/// Lowercase and drop any length/precision suffix: `NVARCHAR(50)` -> `nvarchar`
pub fn normalize_raw_type(raw: &str) -> String {
    let base = match raw.find('(') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    base.trim().to_lowercase()
}

pub fn lookup_raw_type(raw: &str) -> Option<SemanticType> {
    let name = normalize_raw_type(raw);
    RAW_TYPES
        .iter()
        .find(|(raw_name, _)| *raw_name == name)
        .map(|(_, ty)| *ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_raw_type() {
        assert_eq!(lookup_raw_type("int"), Some(SemanticType::I32));
        assert_eq!(lookup_raw_type("NVARCHAR(50)"), Some(SemanticType::String));
        assert_eq!(lookup_raw_type("decimal(18, 2)"), Some(SemanticType::Decimal));
        assert_eq!(lookup_raw_type("rowversion"), Some(SemanticType::Bytes));
        assert_eq!(lookup_raw_type("tinyint"), Some(SemanticType::U8));
        assert_eq!(lookup_raw_type("geography"), None);
        assert_eq!(lookup_raw_type(""), None);
    }

    #[test]
    fn test_raw_type_names_unique() {
        for (i, (name, _)) in RAW_TYPES.iter().enumerate() {
            assert!(
                RAW_TYPES[i + 1..].iter().all(|(other, _)| other != name),
                "duplicate raw type {}",
                name
            );
        }
    }
}
