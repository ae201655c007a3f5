//! In-memory catalog.
//!
//! Holds entity, column and row data supplied up front and answers the same
//! queries as the PostgreSQL catalog, including the "no rows" signal. Every
//! entity-listing call is recorded so callers can check how many queries a
//! request cost.

use super::{Catalog, ColumnRow, EntityRow};
use crate::error::{Result, TsGenError};
use crate::models::{EntityKind, EntityName, EnumOption, EnumRow, SchemaName};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct SimulatedFailure(String);

#[derive(Debug, Clone)]
struct StoredEntity {
    kind: EntityKind,
    schema: SchemaName,
    row: EntityRow,
    columns: Vec<ColumnRow>,
}

/// Catalog backed by plain data.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entities: Vec<StoredEntity>,
    rows: HashMap<(SchemaName, EntityName), Vec<serde_json::Map<String, serde_json::Value>>>,
    failing_schemas: HashSet<SchemaName>,
    entity_queries: Mutex<Vec<(EntityKind, SchemaName)>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table or view with its columns.
    pub fn with_entity(
        mut self,
        kind: EntityKind,
        schema: &str,
        name: &str,
        comment: Option<&str>,
        columns: Vec<ColumnRow>,
    ) -> Self {
        self.entities.push(StoredEntity {
            kind,
            schema: SchemaName::new(schema),
            row: EntityRow {
                name: EntityName::new(name),
                comment: comment.map(str::to_string),
            },
            columns,
        });
        self
    }

    /// Adds a base table.
    pub fn with_table(self, schema: &str, name: &str, columns: Vec<ColumnRow>) -> Self {
        self.with_entity(EntityKind::Table, schema, name, None, columns)
    }

    /// Adds a view.
    pub fn with_view(self, schema: &str, name: &str, columns: Vec<ColumnRow>) -> Self {
        self.with_entity(EntityKind::View, schema, name, None, columns)
    }

    /// Stores data rows of `schema.table`; each value must be a JSON object.
    pub fn with_rows(mut self, schema: &str, table: &str, rows: Vec<serde_json::Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                serde_json::Value::Object(map) => Some(map),
                other => {
                    tracing::warn!("Ignoring non-object row {} for {}.{}", other, schema, table);
                    None
                }
            })
            .collect();
        self.rows
            .insert((SchemaName::new(schema), EntityName::new(table)), rows);
        self
    }

    /// Makes every query against `schema` fail like a permission error.
    pub fn with_failing_schema(mut self, schema: &str) -> Self {
        self.failing_schemas.insert(SchemaName::new(schema));
        self
    }

    /// Entity-listing queries issued so far, in call order
    pub fn entity_queries(&self) -> Vec<(EntityKind, SchemaName)> {
        self.entity_queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    fn check_schema(&self, schema: &SchemaName, what: &str) -> Result<()> {
        if self.failing_schemas.contains(schema) {
            return Err(TsGenError::catalog_failed(
                format!("Failed to query {} in schema '{}'", what, schema),
                SimulatedFailure(format!("permission denied for schema {}", schema)),
            ));
        }
        Ok(())
    }

    fn find(&self, schema: &SchemaName, name: &EntityName) -> Option<&StoredEntity> {
        self.entities
            .iter()
            .find(|entity| entity.schema == *schema && entity.row.name == *name)
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn list_entities(
        &self,
        kind: EntityKind,
        schema: &SchemaName,
        names: Option<&[EntityName]>,
    ) -> Result<Vec<EntityRow>> {
        if let Ok(mut queries) = self.entity_queries.lock() {
            queries.push((kind, schema.clone()));
        }
        self.check_schema(schema, "entities")?;

        let mut rows: Vec<EntityRow> = self
            .entities
            .iter()
            .filter(|entity| entity.kind == kind && entity.schema == *schema)
            .filter(|entity| names.is_none_or(|names| names.contains(&entity.row.name)))
            .map(|entity| entity.row.clone())
            .collect();

        if rows.is_empty() {
            return Err(TsGenError::empty_result(format!("{}s in {}", kind, schema)));
        }
        rows.sort_by_cached_key(|row| row.name.as_str().to_lowercase());
        Ok(rows)
    }

    async fn list_columns(
        &self,
        schema: &SchemaName,
        entity: &EntityName,
    ) -> Result<Vec<ColumnRow>> {
        self.check_schema(schema, "columns")?;

        match self.find(schema, entity) {
            Some(stored) if !stored.columns.is_empty() => {
                let mut columns = stored.columns.clone();
                columns.sort_by_key(|column| column.position);
                Ok(columns)
            }
            _ => Err(TsGenError::empty_result(format!(
                "columns of {}.{}",
                schema, entity
            ))),
        }
    }

    async fn fetch_enum_rows(
        &self,
        schema: &SchemaName,
        table: &EntityName,
        option: &EnumOption,
    ) -> Result<Vec<EnumRow>> {
        self.check_schema(schema, "enum values")?;

        let Some(rows) = self.rows.get(&(schema.clone(), table.clone())) else {
            return Err(TsGenError::empty_result(format!("rows of {}.{}", schema, table)));
        };
        if rows.is_empty() {
            return Err(TsGenError::empty_result(format!("rows of {}.{}", schema, table)));
        }

        rows.iter()
            .map(|row| {
                let column = |name: &str| {
                    row.get(name).cloned().ok_or_else(|| {
                        TsGenError::catalog_failed(
                            format!("Failed to read enum values from {}.{}", schema, table),
                            SimulatedFailure(format!("column \"{}\" does not exist", name)),
                        )
                    })
                };
                Ok(EnumRow {
                    key: column(option.key_column.as_str())?,
                    value: column(option.value_column.as_str())?,
                })
            })
            .collect()
    }
}
