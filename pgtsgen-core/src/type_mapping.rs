//! PostgreSQL type name to target type category conversion.
//!
//! Lookup order is: user overrides, then the built-in table, then
//! [`TargetType::Unknown`] with a warning. An unmapped type never stops
//! generation.

use crate::models::{TargetType, TypeOverrides};

/// Resolves catalog type names (`udt_name`) to target type categories.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    overrides: TypeOverrides,
}

impl TypeMapper {
    /// Creates a mapper; `overrides` is captured and never mutated afterwards.
    pub fn new(overrides: TypeOverrides) -> Self {
        Self { overrides }
    }

    /// Overrides this mapper was built with
    pub fn overrides(&self) -> &TypeOverrides {
        &self.overrides
    }

    /// Looks up `database_type` without falling back to `Unknown`.
    pub fn lookup(&self, database_type: &str) -> Option<TargetType> {
        self.overrides
            .get(database_type)
            .copied()
            .or_else(|| builtin(database_type))
    }

    /// Resolves `database_type`, mapping unmapped types to `Unknown`.
    pub fn resolve(&self, database_type: &str) -> TargetType {
        self.lookup(database_type).unwrap_or_else(|| {
            tracing::warn!(
                "No type match for PostgreSQL type '{}', mapping to unknown",
                database_type
            );
            TargetType::Unknown
        })
    }
}

/// Built-in PostgreSQL type table.
///
/// Array types use the catalog convention of a leading underscore on the
/// element type name (`_int4` is `int4[]`).
pub fn builtin(database_type: &str) -> Option<TargetType> {
    let target = match database_type {
        // Character and string-like types
        "bpchar" | "char" | "varchar" | "text" | "citext" | "character varying" | "character"
        | "uuid" | "bytea" | "inet" | "cidr" | "macaddr" | "hstore" | "time" | "timetz"
        | "interval" | "name" | "xml" => TargetType::String,

        "_bpchar" | "_char" | "_varchar" | "_text" | "_citext" | "_uuid" | "_bytea" | "_inet"
        | "_name" | "_time" | "_timetz" | "_interval" => TargetType::StringArray,

        // Numeric types
        "integer" | "int2" | "int4" | "int8" | "float4" | "float8" | "double precision"
        | "decimal" | "numeric" | "real" | "money" | "oid" => TargetType::Number,

        "_int2" | "_int4" | "_int8" | "_float4" | "_float8" | "_numeric" | "_money" | "_oid" => {
            TargetType::NumberArray
        }

        // Boolean
        "bool" | "boolean" => TargetType::Boolean,
        "_bool" => TargetType::BooleanArray,

        // Date and timestamp
        "date" | "timestamp" | "timestamptz" => TargetType::Date,
        "_date" | "_timestamp" | "_timestamptz" => TargetType::DateArray,

        // JSON
        "json" | "jsonb" => TargetType::Json,
        "_json" | "_jsonb" => TargetType::JsonArray,

        _ => return None,
    };

    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scalar_types() {
        let cases = [
            ("varchar", TargetType::String),
            ("text", TargetType::String),
            ("uuid", TargetType::String),
            ("interval", TargetType::String),
            ("int4", TargetType::Number),
            ("numeric", TargetType::Number),
            ("float8", TargetType::Number),
            ("bool", TargetType::Boolean),
            ("timestamptz", TargetType::Date),
            ("date", TargetType::Date),
            ("jsonb", TargetType::Json),
        ];
        let mapper = TypeMapper::default();
        for (name, expected) in cases {
            assert_eq!(mapper.resolve(name), expected, "type {}", name);
        }
    }

    #[test]
    fn test_builtin_array_types() {
        let cases = [
            ("_text", TargetType::StringArray),
            ("_uuid", TargetType::StringArray),
            ("_int8", TargetType::NumberArray),
            ("_bool", TargetType::BooleanArray),
            ("_timestamptz", TargetType::DateArray),
            ("_jsonb", TargetType::JsonArray),
        ];
        for (name, expected) in cases {
            assert_eq!(builtin(name), Some(expected), "type {}", name);
            assert!(expected.is_array());
        }
    }

    #[test]
    fn test_unmapped_type_falls_back_to_unknown() {
        let mapper = TypeMapper::default();
        assert_eq!(mapper.lookup("tsvector"), None);
        assert_eq!(mapper.resolve("tsvector"), TargetType::Unknown);
    }

    #[test]
    fn test_override_wins_over_builtin() {
        let overrides = TypeOverrides::from([
            ("int8".to_string(), TargetType::String),
            ("tsvector".to_string(), TargetType::String),
        ]);
        let mapper = TypeMapper::new(overrides);

        assert_eq!(mapper.resolve("int8"), TargetType::String);
        assert_eq!(mapper.resolve("tsvector"), TargetType::String);
        assert_eq!(mapper.resolve("int4"), TargetType::Number);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let mapper = TypeMapper::default();
        assert_eq!(mapper.lookup("INT4"), None);
        assert_eq!(mapper.lookup(" int4"), None);
    }
}
