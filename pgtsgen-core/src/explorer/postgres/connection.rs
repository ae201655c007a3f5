//! PostgreSQL connection pool management and validation.

use super::PostgresCatalog;
use super::helpers::map_query_error;
use crate::Result;
use crate::config::ConnectionConfig;
use crate::error::{TsGenError, redact_database_url};
use sqlx::PgPool;
use std::time::Duration;
use url::Url;

impl PostgresCatalog {
    /// Creates a catalog with settings parsed from the connection string.
    ///
    /// The pool connects lazily; connectivity problems surface on the first
    /// query.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or the pool
    /// cannot be configured.
    pub fn new(connection_string: &str) -> Result<Self> {
        let config = Self::parse_connection_config(connection_string)?;
        let pool = Self::create_connection_pool(connection_string, &config)?;
        Ok(Self { pool, config })
    }

    /// Creates a catalog with explicit pool settings.
    pub fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Self::validate_connection_string(connection_string)?;

        let pool = Self::create_connection_pool(connection_string, &config)?;
        tracing::debug!(
            "Created catalog pool for {} ({})",
            redact_database_url(connection_string),
            config
        );
        Ok(Self { pool, config })
    }

    /// Runs a trivial query to check the server is reachable and accepts
    /// the credentials.
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_query_error("Connection test failed", e))?;
        tracing::debug!("Connection test succeeded for {}", self.config);
        Ok(())
    }

    /// Closes the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Parses the connection string into pool settings.
    ///
    /// Recognized query parameters: `connect_timeout` (seconds),
    /// `statement_timeout` (milliseconds) and `pool_max_conns`.
    pub fn parse_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
        Self::validate_connection_string(connection_string)?;

        let url = Url::parse(connection_string).map_err(|e| {
            TsGenError::configuration(format!(
                "Invalid PostgreSQL connection string format: {}",
                e
            ))
        })?;

        let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string())
            .with_port(url.port().unwrap_or(5432));

        let database = url.path().trim_start_matches('/');
        if !database.is_empty() {
            config = config.with_database(database.to_string());
        }

        if !url.username().is_empty() {
            config = config.with_username(url.username().to_string());
        }

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "connect_timeout" => {
                    if let Ok(timeout_secs) = value.parse::<u64>()
                        && timeout_secs > 0
                        && timeout_secs <= 300
                    {
                        config.connect_timeout = Duration::from_secs(timeout_secs);
                    }
                }
                "statement_timeout" => {
                    if let Ok(timeout_ms) = value.parse::<u64>()
                        && timeout_ms > 0
                        && timeout_ms <= 300_000
                    {
                        config.query_timeout = Duration::from_millis(timeout_ms);
                    }
                }
                "pool_max_conns" => {
                    if let Ok(max_conns) = value.parse::<u32>()
                        && max_conns > 0
                        && max_conns <= 100
                    {
                        config.max_connections = max_conns;
                    }
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates connection string scheme and host.
    pub fn validate_connection_string(connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| {
            TsGenError::configuration(format!(
                "Invalid PostgreSQL connection string format: {}",
                e
            ))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(TsGenError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        if url.host_str().is_none() {
            return Err(TsGenError::configuration(
                "Connection string must specify a host",
            ));
        }

        Ok(())
    }

    /// Creates a lazily connecting pool whose sessions are read-only and
    /// carry a statement timeout.
    pub(crate) fn create_connection_pool(
        connection_string: &str,
        config: &ConnectionConfig,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        let query_timeout_ms = config.query_timeout.as_millis();
        let read_only = config.read_only;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections.min(100))
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        format!("SET statement_timeout = '{}ms'", query_timeout_ms).as_str(),
                    )
                    .await?;

                    let app_name = format!("pgtsgen-{}", env!("CARGO_PKG_VERSION"));
                    conn.execute(format!("SET application_name = '{}'", app_name).as_str())
                        .await?;

                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }

                    Ok(())
                })
            })
            .connect_lazy(connection_string)
            .map_err(|e| {
                TsGenError::catalog_failed(
                    format!(
                        "Failed to create PostgreSQL connection pool to {}",
                        redact_database_url(connection_string)
                    ),
                    e,
                )
            })?;

        Ok(pool)
    }
}
