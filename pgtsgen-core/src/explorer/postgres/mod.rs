//! PostgreSQL catalog backed by a `sqlx` connection pool.
//!
//! # Module Structure
//! - `connection`: pool creation, connection string validation
//! - `helpers`: row extraction, identifier quoting, error classification
//! - `queries`: the catalog introspection queries
//!
//! All statements are read-only `SELECT`s against `information_schema` and
//! `pg_catalog`, plus the enum key/value select on a user table.

mod connection;
mod helpers;
mod queries;

#[cfg(test)]
mod tests;

use super::{Catalog, ColumnRow, EntityRow};
use crate::Result;
use crate::config::ConnectionConfig;
use crate::models::{EntityKind, EntityName, EnumOption, EnumRow, SchemaName};
use async_trait::async_trait;
use sqlx::PgPool;

pub use helpers::quote_ident;

/// PostgreSQL catalog with connection pooling
pub struct PostgresCatalog {
    pub pool: PgPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCatalog")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn list_entities(
        &self,
        kind: EntityKind,
        schema: &SchemaName,
        names: Option<&[EntityName]>,
    ) -> Result<Vec<EntityRow>> {
        queries::list_entities(&self.pool, kind, schema, names).await
    }

    async fn list_columns(
        &self,
        schema: &SchemaName,
        entity: &EntityName,
    ) -> Result<Vec<ColumnRow>> {
        queries::list_columns(&self.pool, schema, entity).await
    }

    async fn fetch_enum_rows(
        &self,
        schema: &SchemaName,
        table: &EntityName,
        option: &EnumOption,
    ) -> Result<Vec<EnumRow>> {
        queries::fetch_enum_rows(&self.pool, schema, table, option).await
    }
}
