//! Configuration types.
//!
//! - `ConnectionConfig`: connection pool settings for the catalog connection
//! - `GeneratorConfig`: the generation config file (schema, overrides, plugins)
//!
//! Neither struct stores passwords. The database URL in a config file is only
//! ever logged through [`crate::error::redact_database_url`].

mod connection;
mod generator;

pub use connection::ConnectionConfig;
pub use generator::{EntitySelection, GeneratorConfig, PluginSpec};
