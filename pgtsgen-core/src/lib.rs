//! Core library for pgtsgen.
//!
//! Introspects a PostgreSQL catalog into table and view definitions and runs
//! code generation plugins over them to produce TypeScript declarations.
//!
//! # Guarantees
//! - Catalog access is read-only
//! - Connection strings are redacted in logs and errors
//! - One run takes one definitions snapshot, shared by every plugin
//! - A run yields either a complete document or an error, never a partial one
//!
//! # Architecture
//! - [`explorer::Explorer`] batches catalog queries behind the
//!   [`explorer::Catalog`] trait
//! - [`pipeline::Pipeline`] runs [`pipeline::Plugin`]s concurrently and merges
//!   their output in declaration order
//! - [`plugins`] holds the built-in `typescript` and `typescript-enum` plugins

pub mod config;
pub mod error;
pub mod explorer;
pub mod logging;
pub mod models;
pub mod naming;
pub mod pipeline;
pub mod plugins;
pub mod type_mapping;

// Re-export commonly used types
pub use config::{ConnectionConfig, EntitySelection, GeneratorConfig, PluginSpec};
pub use error::{Result, TsGenError};
pub use explorer::{Catalog, Explorer, ExplorerOptions, MemoryCatalog};
pub use models::{
    ColumnDefinition, EntityDefinition, EntityKind, EnumOption, GeneratedDocument, PluginResult,
    SchemaName, TargetType,
};
pub use pipeline::{Pipeline, Plugin, PluginRegistry};
pub use type_mapping::TypeMapper;
