//! Row extraction, identifier quoting and error classification shared by the
//! PostgreSQL catalog queries.

use crate::{Result, error::TsGenError};
use sqlx::{Row, postgres::PgRow};

/// PostgreSQL truncates identifiers longer than this many bytes.
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// SQLSTATE `insufficient_privilege`
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Extension trait for extracting typed values from catalog rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// let name: String = row.get_field("table_name", Some("public.users"))?;
/// let comment: Option<String> = row.get_field("comment", None)?;
/// ```
pub(crate) trait RowExt {
    fn get_field<'r, T>(&'r self, field_name: &str, entity_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, entity_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| TsGenError::parse_field(field_name, entity_context, e))
    }
}

/// Quotes a PostgreSQL identifier for interpolation into a statement.
///
/// Identifiers cannot be bound as parameters, so table and column names of
/// enum sources are validated and double-quoted instead.
///
/// # Examples
/// ```rust
/// use pgtsgen_core::explorer::postgres::quote_ident;
///
/// assert_eq!(quote_ident("users").unwrap(), "\"users\"");
/// assert_eq!(quote_ident("odd\"name").unwrap(), "\"odd\"\"name\"");
/// assert!(quote_ident("").is_err());
/// ```
pub fn quote_ident(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(TsGenError::configuration("Identifier cannot be empty"));
    }

    if name.contains('\0') {
        return Err(TsGenError::configuration(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(TsGenError::configuration(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Classifies a query failure.
///
/// Transport and pool failures become [`TsGenError::Connection`], a missing
/// row becomes [`TsGenError::EmptyResult`] and everything else is reported as
/// a [`TsGenError::Catalog`] failure carrying `context`.
pub(crate) fn map_query_error(context: &str, error: sqlx::Error) -> TsGenError {
    let denied = error
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .is_some_and(|code| code == INSUFFICIENT_PRIVILEGE);
    if denied {
        return TsGenError::catalog_failed(format!("{}: insufficient privileges", context), error);
    }

    match error {
        sqlx::Error::RowNotFound => TsGenError::empty_result(context),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => TsGenError::connection_failed(context, error),
        other => TsGenError::catalog_failed(context, other),
    }
}
