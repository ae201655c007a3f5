//! Unit tests for the PostgreSQL catalog.

use super::helpers::map_query_error;
use super::*;
use crate::config::ConnectionConfig;
use crate::error::TsGenError;
use std::time::Duration;

#[test]
fn test_parse_connection_config() {
    let connection_string = "postgres://generator@localhost:5432/app";
    let config = PostgresCatalog::parse_connection_config(connection_string).unwrap();

    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, Some(5432));
    assert_eq!(config.database, Some("app".to_string()));
    assert_eq!(config.username, Some("generator".to_string()));
    assert!(config.read_only);
    assert_eq!(config.connect_timeout, Duration::from_secs(30));
    assert_eq!(config.max_connections, 10);
}

#[test]
fn test_parse_connection_config_with_query_params() {
    let connection_string =
        "postgres://user@host/db?connect_timeout=60&statement_timeout=45000&pool_max_conns=20";
    let config = PostgresCatalog::parse_connection_config(connection_string).unwrap();

    assert_eq!(config.port, Some(5432)); // Default PostgreSQL port
    assert_eq!(config.connect_timeout, Duration::from_secs(60));
    assert_eq!(config.query_timeout, Duration::from_millis(45000));
    assert_eq!(config.max_connections, 20);
}

#[test]
fn test_parse_connection_config_ignores_out_of_range_params() {
    let connection_string = "postgres://host/db?connect_timeout=0&pool_max_conns=1000";
    let config = PostgresCatalog::parse_connection_config(connection_string).unwrap();

    assert_eq!(config.connect_timeout, Duration::from_secs(30));
    assert_eq!(config.max_connections, 10);
}

#[test]
fn test_parse_connection_config_minimal() {
    let config = PostgresCatalog::parse_connection_config("postgresql://host").unwrap();

    assert_eq!(config.host, "host");
    assert_eq!(config.database, None);
    assert_eq!(config.username, None);
}

#[test]
fn test_validate_connection_string() {
    assert!(PostgresCatalog::validate_connection_string("postgres://u:p@localhost/db").is_ok());
    assert!(PostgresCatalog::validate_connection_string("postgresql://localhost").is_ok());

    assert!(matches!(
        PostgresCatalog::validate_connection_string("mysql://localhost/db"),
        Err(TsGenError::Configuration { .. })
    ));
    assert!(PostgresCatalog::validate_connection_string("not a url").is_err());
}

#[test]
fn test_with_config_rejects_invalid_settings() {
    let config = ConnectionConfig::default().with_max_connections(0);
    let result = PostgresCatalog::with_config("postgres://localhost/db", config);
    assert!(matches!(result, Err(TsGenError::Configuration { .. })));
}

#[test]
fn test_quote_ident() {
    assert_eq!(quote_ident("users").unwrap(), "\"users\"");
    assert_eq!(quote_ident("User Roles").unwrap(), "\"User Roles\"");
    assert_eq!(quote_ident("a\"b").unwrap(), "\"a\"\"b\"");

    assert!(quote_ident("").is_err());
    assert!(quote_ident("bad\0name").is_err());
    assert!(quote_ident(&"x".repeat(64)).is_err());
    assert!(quote_ident(&"x".repeat(63)).is_ok());
}

#[test]
fn test_map_query_error_row_not_found_is_empty() {
    let error = map_query_error("columns of public.users", sqlx::Error::RowNotFound);
    assert!(error.is_empty_result());
}

#[test]
fn test_map_query_error_classifies_connectivity() {
    let error = map_query_error("Failed to list tables", sqlx::Error::PoolTimedOut);
    assert!(matches!(error, TsGenError::Connection { .. }));

    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let error = map_query_error("Failed to list tables", sqlx::Error::Io(io));
    match error {
        TsGenError::Connection { context, .. } => {
            assert_eq!(context, "Failed to list tables: database unreachable");
        }
        other => panic!("expected connection failure, got {other:?}"),
    }
}

#[test]
fn test_map_query_error_other_is_catalog_failure() {
    let error = map_query_error(
        "Failed to list tables",
        sqlx::Error::Protocol("unexpected message".to_string()),
    );
    match error {
        TsGenError::Catalog { context, .. } => assert_eq!(context, "Failed to list tables"),
        other => panic!("expected catalog failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lazy_pool_creation_does_not_connect() {
    // Nothing listens on port 1; the pool must still be created.
    let catalog = PostgresCatalog::new("postgres://nobody@127.0.0.1:1/none?connect_timeout=1");
    assert!(catalog.is_ok());
}
