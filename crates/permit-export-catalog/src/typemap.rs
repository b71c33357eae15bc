//! Query-engine type names to canonical attribute types
//!
//! The mapping is total: any input, recognized or not, yields a
//! [`CanonicalType`]. Unrecognized types fall back to [`FALLBACK_TYPE`].

use permit_export_core::CanonicalType;

/// Canonical type used for engine types with no explicit mapping
pub const FALLBACK_TYPE: CanonicalType = CanonicalType::String;

/// Map an engine type name to a canonical attribute type
///
/// Matching is case-insensitive and ignores parameter lists, so
/// `VARCHAR(255)`, `decimal(10, 2)`, `array(integer)` and
/// `timestamp(3) with time zone` map like their bare names.
///
/// # Supported Types
///
/// - **Text**: `varchar`, `char`, `varbinary`, `uuid`, `ipaddress`, `interval ...`
/// - **Numeric**: `tinyint`, `smallint`, `integer`, `bigint`, `real`, `double`, `decimal`
/// - **Boolean**: `boolean`
/// - **JSON**: `json`
/// - **Date/Time**: `date`, `time`, `timestamp` (with or without time zone)
/// - **Collections**: `array`; `row` and `map` become objects
pub fn map_type(foreign_type: &str) -> CanonicalType {
    let base_type = base_type_name(foreign_type);

    match base_type.as_str() {
        // String types
        "varchar" | "char" | "varbinary" => CanonicalType::String,
        "uuid" | "ipaddress" => CanonicalType::String,
        "interval day to second" | "interval year to month" => CanonicalType::String,

        // Numeric types
        "tinyint" | "smallint" | "integer" | "int" | "bigint" => CanonicalType::Number,
        "real" | "double" | "decimal" | "numeric" => CanonicalType::Number,

        "boolean" => CanonicalType::Bool,

        "json" => CanonicalType::Json,

        // Date/Time types
        "date" | "time" | "timestamp" => CanonicalType::Time,
        "time with time zone" | "timestamp with time zone" => CanonicalType::Time,

        "array" => CanonicalType::Array,
        "row" | "map" => CanonicalType::Object,

        _ => FALLBACK_TYPE,
    }
}

/// Lower-cased type name with every parenthesized parameter list removed
///
/// `timestamp(3) with time zone` becomes `timestamp with time zone`.
fn base_type_name(foreign_type: &str) -> String {
    let mut base = String::with_capacity(foreign_type.len());
    let mut depth = 0usize;

    for c in foreign_type.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => base.push(c),
            _ => {}
        }
    }

    base.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_mappings() {
        assert_eq!(map_type("varchar"), CanonicalType::String);
        assert_eq!(map_type("integer"), CanonicalType::Number);
        assert_eq!(map_type("boolean"), CanonicalType::Bool);
        assert_eq!(map_type("json"), CanonicalType::Json);
        assert_eq!(map_type("timestamp"), CanonicalType::Time);
        assert_eq!(map_type("array"), CanonicalType::Array);
        assert_eq!(map_type("row"), CanonicalType::Object);
    }

    #[test]
    fn test_parameterized_types() {
        assert_eq!(map_type("varchar(255)"), CanonicalType::String);
        assert_eq!(map_type("decimal(10, 2)"), CanonicalType::Number);
        assert_eq!(map_type("array(integer)"), CanonicalType::Array);
        assert_eq!(map_type("row(a integer, b row(c varchar))"), CanonicalType::Object);
        assert_eq!(map_type("map(varchar, bigint)"), CanonicalType::Object);
        assert_eq!(map_type("timestamp(3) with time zone"), CanonicalType::Time);
        assert_eq!(map_type("time(6)"), CanonicalType::Time);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(map_type("VARCHAR"), CanonicalType::String);
        assert_eq!(map_type("  BigInt "), CanonicalType::Number);
        assert_eq!(map_type("TIMESTAMP   WITH TIME ZONE"), CanonicalType::Time);
    }

    #[test]
    fn test_unknown_types_fall_back() {
        assert_eq!(map_type("hyperloglog"), FALLBACK_TYPE);
        assert_eq!(map_type(""), FALLBACK_TYPE);
        assert_eq!(map_type("(((("), FALLBACK_TYPE);
        assert_eq!(map_type("))"), FALLBACK_TYPE);
    }
}
