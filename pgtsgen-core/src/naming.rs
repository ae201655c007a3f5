//! Parsing of possibly schema-qualified entity names.
//!
//! `users` resolves against the default schema, `audit.events` names its
//! schema explicitly, and anything with more separators is rejected instead
//! of guessing which part is the schema.

use crate::error::{Result, TsGenError};
use crate::models::{EntityName, SchemaName};

/// Separator between schema and local name
pub const SEPARATOR: char = '.';

/// Splits `name` into an optional schema and the local name.
///
/// # Errors
/// Returns [`TsGenError::MalformedName`] when `name` has two or more
/// separators or an empty segment.
pub fn split(name: &str) -> Result<(Option<SchemaName>, EntityName)> {
    let mut parts = name.split(SEPARATOR);
    let first = parts.next().unwrap_or_default();
    let second = parts.next();

    if parts.next().is_some() {
        return Err(TsGenError::malformed_name(name));
    }

    match second {
        None if !first.is_empty() => Ok((None, EntityName::new(first))),
        Some(local) if !first.is_empty() && !local.is_empty() => {
            Ok((Some(SchemaName::new(first)), EntityName::new(local)))
        }
        _ => Err(TsGenError::malformed_name(name)),
    }
}

/// True when `name` carries exactly one schema separator.
pub fn is_qualified(name: &str) -> bool {
    name.matches(SEPARATOR).count() == 1
}

/// Splits `name`, applying `default_schema` when it is unqualified.
pub fn resolve(name: &str, default_schema: &SchemaName) -> Result<(SchemaName, EntityName)> {
    let (schema, local) = split(name)?;
    Ok((schema.unwrap_or_else(|| default_schema.clone()), local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_unqualified() {
        let (schema, name) = split("users").unwrap();
        assert_eq!(schema, None);
        assert_eq!(name.as_str(), "users");
    }

    #[test]
    fn test_split_qualified() {
        let (schema, name) = split("audit.events").unwrap();
        assert_eq!(schema, Some(SchemaName::new("audit")));
        assert_eq!(name.as_str(), "events");
    }

    #[test]
    fn test_split_rejects_two_separators() {
        let error = split("db.audit.events").unwrap_err();
        assert!(
            matches!(error, TsGenError::MalformedName { ref name } if name == "db.audit.events")
        );
        assert!(error.to_string().contains("db.audit.events"));
    }

    #[test]
    fn test_split_rejects_empty_segments() {
        for name in ["", ".users", "audit.", "."] {
            assert!(split(name).is_err(), "expected '{}' to be rejected", name);
        }
    }

    #[test]
    fn test_is_qualified() {
        assert!(is_qualified("audit.events"));
        assert!(!is_qualified("events"));
        assert!(!is_qualified("a.b.c"));
    }

    #[test]
    fn test_resolve_applies_default_schema() {
        let default_schema = SchemaName::new("app");
        let (schema, name) = resolve("users", &default_schema).unwrap();
        assert_eq!(schema.as_str(), "app");
        assert_eq!(name.as_str(), "users");

        let (schema, _) = resolve("audit.events", &default_schema).unwrap();
        assert_eq!(schema.as_str(), "audit");
    }
}
