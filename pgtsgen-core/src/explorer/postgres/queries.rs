//! Catalog introspection queries.
//!
//! Each query returns [`TsGenError::EmptyResult`] when it matches nothing so
//! the explorer can tell "no rows" apart from a failed query.

use super::helpers::{RowExt, map_query_error, quote_ident};
use crate::Result;
use crate::error::TsGenError;
use crate::explorer::{ColumnRow, EntityRow};
use crate::models::{ColumnName, EntityKind, EntityName, EnumOption, EnumRow, SchemaName};
use sqlx::PgPool;

const ENTITIES_QUERY: &str = r#"
    SELECT
        t.table_name::text AS name,
        obj_description(
            to_regclass(quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::oid,
            'pg_class'
        ) AS comment
    FROM information_schema.tables t
    WHERE t.table_type = $1
      AND t.table_schema = $2
      AND ($3::text[] IS NULL OR t.table_name::text = ANY($3))
    ORDER BY lower(t.table_name), t.table_name
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        c.column_name::text AS name,
        c.udt_name::text AS database_type,
        c.ordinal_position::int4 AS position,
        (c.is_nullable = 'YES') AS is_nullable,
        (c.column_default IS NOT NULL) AS has_default,
        EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_name = tc.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
        ) AS is_primary,
        col_description(
            to_regclass(quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::oid,
            c.ordinal_position::int4
        ) AS comment
    FROM information_schema.columns c
    WHERE c.table_schema = $1
      AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Lists tables or views in one schema, optionally restricted to `names`.
pub(crate) async fn list_entities(
    pool: &PgPool,
    kind: EntityKind,
    schema: &SchemaName,
    names: Option<&[EntityName]>,
) -> Result<Vec<EntityRow>> {
    let context = format!("{}s in schema '{}'", kind, schema);
    let filter: Option<Vec<String>> =
        names.map(|names| names.iter().map(|name| name.as_str().to_string()).collect());

    tracing::debug!(
        "Listing {} ({} requested)",
        context,
        filter
            .as_ref()
            .map_or_else(|| "all".to_string(), |names| names.len().to_string())
    );

    let rows = sqlx::query(ENTITIES_QUERY)
        .bind(kind.catalog_table_type())
        .bind(schema.as_str())
        .bind(filter)
        .fetch_all(pool)
        .await
        .map_err(|e| map_query_error(&format!("Failed to list {}", context), e))?;

    if rows.is_empty() {
        return Err(TsGenError::empty_result(context));
    }

    let mut entities = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.get_field("name", None)?;
        let comment: Option<String> = row.get_field("comment", Some(name.as_str()))?;
        entities.push(EntityRow {
            name: EntityName::new(name),
            comment,
        });
    }

    tracing::debug!("Found {} {}", entities.len(), context);
    Ok(entities)
}

/// Lists the columns of one table or view in ordinal order.
pub(crate) async fn list_columns(
    pool: &PgPool,
    schema: &SchemaName,
    entity: &EntityName,
) -> Result<Vec<ColumnRow>> {
    let qualified = format!("{}.{}", schema, entity);

    let rows = sqlx::query(COLUMNS_QUERY)
        .bind(schema.as_str())
        .bind(entity.as_str())
        .fetch_all(pool)
        .await
        .map_err(|e| map_query_error(&format!("Failed to list columns of {}", qualified), e))?;

    if rows.is_empty() {
        return Err(TsGenError::empty_result(format!("columns of {}", qualified)));
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let context = Some(qualified.as_str());
        let position: i32 = row.get_field("position", context)?;
        columns.push(ColumnRow {
            name: ColumnName::new(row.get_field::<String>("name", context)?),
            database_type: row.get_field("database_type", context)?,
            position: u32::try_from(position)
                .map_err(|e| TsGenError::parse_field("position", context, e))?,
            is_nullable: row.get_field("is_nullable", context)?,
            has_default: row.get_field("has_default", context)?,
            is_primary: row.get_field("is_primary", context)?,
            comment: row.get_field("comment", context)?,
        });
    }

    tracing::trace!("Loaded {} columns for {}", columns.len(), qualified);
    Ok(columns)
}

/// Selects the key and value columns of an enumeration source table.
///
/// Both columns are converted with `to_jsonb` so text and numeric keys and
/// values decode uniformly. Rows come back ordered by key.
pub(crate) async fn fetch_enum_rows(
    pool: &PgPool,
    schema: &SchemaName,
    table: &EntityName,
    option: &EnumOption,
) -> Result<Vec<EnumRow>> {
    let qualified = format!("{}.{}", schema, table);
    let key = quote_ident(option.key_column.as_str())?;
    let value = quote_ident(option.value_column.as_str())?;

    let query = format!(
        "SELECT to_jsonb({key}) AS key, to_jsonb({value}) AS value FROM {}.{} ORDER BY {key}",
        quote_ident(schema.as_str())?,
        quote_ident(table.as_str())?,
    );
    tracing::debug!("Reading enum values from {}", qualified);

    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            map_query_error(&format!("Failed to read enum values from {}", qualified), e)
        })?;

    if rows.is_empty() {
        return Err(TsGenError::empty_result(format!("rows of {}", qualified)));
    }

    rows.iter()
        .map(|row| {
            Ok(EnumRow {
                key: row.get_field("key", Some(qualified.as_str()))?,
                value: row.get_field("value", Some(qualified.as_str()))?,
            })
        })
        .collect()
}
