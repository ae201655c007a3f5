//! Catalog exploration: the only component that talks to the database.
//!
//! # Module Structure
//! - `memory`: in-memory [`Catalog`] for offline generation and tests
//! - `postgres`: [`Catalog`] backed by a `sqlx` PostgreSQL pool
//!
//! # Batching
//! Requested names are resolved to `(schema, local name)` and grouped by
//! schema in the order schemas first appear in the request. Each group costs
//! exactly one entity-listing query, and groups run concurrently. Results are
//! flattened in group order, so output ordering never depends on which query
//! finishes first. Within a group, entities are sorted case-insensitively by
//! local name. Column lists are fetched with one query per entity, also
//! concurrently, and reassembled in entity order.
//!
//! # Empty results
//! [`TsGenError::EmptyResult`] from the catalog becomes an empty sequence.
//! Every other error propagates unchanged and is never retried.

pub mod memory;
#[cfg(feature = "postgresql")]
pub mod postgres;


use crate::error::{Result, TsGenError};
use crate::models::{
    ColumnDefinition, ColumnName, EntityDefinition, EntityKind, EntityName, EnumOption, EnumRow,
    SchemaName, TypeOverrides,
};
use crate::naming;
use crate::type_mapping::TypeMapper;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

pub use memory::MemoryCatalog;
#[cfg(feature = "postgresql")]
pub use postgres::PostgresCatalog;

/// Table or view as listed by the catalog, before its columns are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub name: EntityName,
    pub comment: Option<String>,
}

/// Column as reported by the catalog, before type mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: ColumnName,
    pub database_type: String,
    pub position: u32,
    pub is_nullable: bool,
    pub has_default: bool,
    pub is_primary: bool,
    pub comment: Option<String>,
}

impl ColumnRow {
    /// A nullable column without default, outside the primary key.
    pub fn new(name: impl Into<String>, database_type: impl Into<String>, position: u32) -> Self {
        Self {
            name: ColumnName::new(name),
            database_type: database_type.into(),
            position,
            is_nullable: true,
            has_default: false,
            is_primary: false,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Marks the column as primary key member, which implies NOT NULL.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Raw catalog queries.
///
/// Implementations return [`TsGenError::EmptyResult`] (or an empty vector)
/// when nothing matches; the [`Explorer`] treats both the same way.
///
/// # Object Safety
/// This trait is object-safe; the explorer holds an `Arc<dyn Catalog>`.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Lists tables or views of one schema, optionally restricted to `names`,
    /// ordered case-insensitively by name.
    async fn list_entities(
        &self,
        kind: EntityKind,
        schema: &SchemaName,
        names: Option<&[EntityName]>,
    ) -> Result<Vec<EntityRow>>;

    /// Lists the columns of one entity ordered by ordinal position.
    async fn list_columns(&self, schema: &SchemaName, entity: &EntityName)
    -> Result<Vec<ColumnRow>>;

    /// Selects the key and value columns named by `option` from a table.
    async fn fetch_enum_rows(
        &self,
        schema: &SchemaName,
        table: &EntityName,
        option: &EnumOption,
    ) -> Result<Vec<EnumRow>>;
}

/// Explorer construction options
#[derive(Debug, Clone, Default)]
pub struct ExplorerOptions {
    /// Schema for unqualified names, `public` unless overridden
    pub default_schema: SchemaName,
    /// Consulted before the built-in type table
    pub type_overrides: TypeOverrides,
}

impl ExplorerOptions {
    pub fn with_default_schema(mut self, schema: SchemaName) -> Self {
        self.default_schema = schema;
        self
    }

    pub fn with_type_overrides(mut self, overrides: TypeOverrides) -> Self {
        self.type_overrides = overrides;
        self
    }
}

/// Schema group of one request: `None` names means every entity of the kind.
type SchemaGroup = (SchemaName, Option<Vec<EntityName>>);

/// Introspects tables and views and assembles their definitions.
#[derive(Clone)]
pub struct Explorer {
    catalog: Arc<dyn Catalog>,
    default_schema: SchemaName,
    type_mapper: TypeMapper,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("default_schema", &self.default_schema)
            .field("type_overrides", &self.type_mapper.overrides().len())
            .finish()
    }
}

impl Explorer {
    /// Creates an explorer over any catalog implementation.
    pub fn new(catalog: Arc<dyn Catalog>, options: ExplorerOptions) -> Self {
        Self {
            catalog,
            default_schema: options.default_schema,
            type_mapper: TypeMapper::new(options.type_overrides),
        }
    }

    /// Connects a PostgreSQL-backed explorer.
    ///
    /// The pool is created lazily; connectivity problems surface on the
    /// first query.
    #[cfg(feature = "postgresql")]
    pub fn connect(
        database_url: &str,
        options: ExplorerOptions,
        connection: crate::config::ConnectionConfig,
    ) -> Result<Self> {
        let catalog = PostgresCatalog::with_config(database_url, connection)?;
        Ok(Self::new(Arc::new(catalog), options))
    }

    pub fn default_schema(&self) -> &SchemaName {
        &self.default_schema
    }

    pub fn type_mapper(&self) -> &TypeMapper {
        &self.type_mapper
    }

    /// Fetches table definitions; `None` means every base table of the
    /// default schema.
    pub async fn get_table_definitions(
        &self,
        requested: Option<&[String]>,
    ) -> Result<Vec<EntityDefinition>> {
        self.get_definitions(EntityKind::Table, requested).await
    }

    /// Fetches view definitions; `None` means every view of the default schema.
    pub async fn get_view_definitions(
        &self,
        requested: Option<&[String]>,
    ) -> Result<Vec<EntityDefinition>> {
        self.get_definitions(EntityKind::View, requested).await
    }

    /// Reads key/value pairs from `schema.table`.
    ///
    /// Does not check that the table is a sensible enum source; that is the
    /// calling plugin's job.
    pub async fn get_enum_values(
        &self,
        schema: &SchemaName,
        table: &EntityName,
        option: &EnumOption,
    ) -> Result<Vec<EnumRow>> {
        tracing::debug!(
            "Fetching enum values {}/{} from {}.{}",
            option.key_column,
            option.value_column,
            schema,
            table
        );
        absorb_empty(self.catalog.fetch_enum_rows(schema, table, option).await)
    }

    async fn get_definitions(
        &self,
        kind: EntityKind,
        requested: Option<&[String]>,
    ) -> Result<Vec<EntityDefinition>> {
        let groups = match requested {
            Some(names) => group_by_schema(names, &self.default_schema)?,
            None => vec![(self.default_schema.clone(), None)],
        };

        tracing::debug!("Fetching {} definitions across {} schemas", kind, groups.len());

        let per_schema = try_join_all(
            groups
                .iter()
                .map(|(schema, names)| self.fetch_schema_group(kind, schema, names.as_deref())),
        )
        .await?;

        let definitions: Vec<EntityDefinition> = per_schema.into_iter().flatten().collect();
        tracing::info!("Resolved {} {} definitions", definitions.len(), kind);
        Ok(definitions)
    }

    async fn fetch_schema_group(
        &self,
        kind: EntityKind,
        schema: &SchemaName,
        names: Option<&[EntityName]>,
    ) -> Result<Vec<EntityDefinition>> {
        let mut entities = absorb_empty(self.catalog.list_entities(kind, schema, names).await)?;
        entities.sort_by_cached_key(|entity| entity.name.as_str().to_lowercase());

        let definitions = try_join_all(
            entities
                .into_iter()
                .map(|entity| self.build_definition(kind, schema, entity)),
        )
        .await?;

        Ok(definitions.into_iter().flatten().collect())
    }

    async fn build_definition(
        &self,
        kind: EntityKind,
        schema: &SchemaName,
        entity: EntityRow,
    ) -> Result<Option<EntityDefinition>> {
        let mut rows = absorb_empty(self.catalog.list_columns(schema, &entity.name).await)?;
        if rows.is_empty() {
            tracing::debug!("Skipping {} {}.{} without columns", kind, schema, entity.name);
            return Ok(None);
        }
        rows.sort_by_key(|row| row.position);

        let columns = rows
            .into_iter()
            .map(|row| ColumnDefinition {
                target_type: self.type_mapper.resolve(&row.database_type),
                name: row.name,
                database_type: row.database_type,
                position: row.position,
                is_nullable: row.is_nullable,
                has_default: row.has_default,
                is_primary: row.is_primary,
                comment: row.comment,
            })
            .collect();

        Ok(Some(EntityDefinition {
            kind,
            schema: schema.clone(),
            name: entity.name,
            comment: entity.comment,
            columns,
        }))
    }
}

/// Resolves every name up front, so a malformed name fails before any query,
/// then groups local names by schema in first-appearance order.
fn group_by_schema(names: &[String], default_schema: &SchemaName) -> Result<Vec<SchemaGroup>> {
    let mut groups: Vec<(SchemaName, Vec<EntityName>)> = Vec::new();

    for name in names {
        let (schema, local) = naming::resolve(name, default_schema)?;
        match groups.iter_mut().find(|(existing, _)| *existing == schema) {
            Some((_, locals)) => {
                if !locals.contains(&local) {
                    locals.push(local);
                }
            }
            None => groups.push((schema, vec![local])),
        }
    }

    Ok(groups
        .into_iter()
        .map(|(schema, locals)| (schema, Some(locals)))
        .collect())
}

fn absorb_empty<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(TsGenError::EmptyResult { context }) => {
            tracing::trace!("No rows for {}", context);
            Ok(Vec::new())
        }
        other => other,
    }
}
