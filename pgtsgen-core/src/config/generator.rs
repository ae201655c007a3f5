//! Generation config file.
//!
//! ```json
//! {
//!   "uri": "postgres://generator@localhost/app",
//!   "schema": "public",
//!   "types": { "int8": "string" },
//!   "tables": ["users", "audit.events"],
//!   "plugins": [
//!     { "name": "typescript", "options": { "postfix": { "select": "Row" } } },
//!     { "name": "typescript-enum", "options": { "tables": { "roles": { "key": "code", "value": "id" } } } }
//!   ],
//!   "output": "src/generated/db.ts"
//! }
//! ```

use crate::error::{Result, TsGenError};
use crate::explorer::ExplorerOptions;
use crate::models::{SchemaName, TypeOverrides};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One configured plugin, identified by its registry name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    /// Plugin-specific options, passed through untouched
    #[serde(default)]
    pub options: serde_json::Value,
}

impl PluginSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: serde_json::Value::Null,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// Which tables and views a run covers; `None` means all of that kind in the
/// default schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySelection {
    pub tables: Option<Vec<String>>,
    pub views: Option<Vec<String>>,
}

impl EntitySelection {
    /// Every table and view in the default schema
    pub fn all() -> Self {
        Self::default()
    }
}

/// Parsed generation config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Database URL; the `DATABASE_URL` environment variable or CLI flag
    /// takes precedence when given
    pub uri: Option<String>,
    /// Default schema for unqualified names
    pub schema: Option<String>,
    /// Database type name to type category overrides
    #[serde(default)]
    pub types: TypeOverrides,
    pub tables: Option<Vec<String>>,
    pub views: Option<Vec<String>>,
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    /// Connection pool size
    pub max_connections: Option<u32>,
}

impl GeneratorConfig {
    /// Reads and parses a JSON config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TsGenError::Io {
                context: format!("Failed to read config file {}", path.display()),
                source,
            })?;
        let config = Self::from_json(&content).map_err(|e| match e {
            TsGenError::Serialization { source, .. } => TsGenError::Serialization {
                context: format!("Failed to parse config file {}", path.display()),
                source,
            },
            other => other,
        })?;
        tracing::debug!(
            "Loaded config from {} with {} plugins",
            path.display(),
            config.plugins.len()
        );
        Ok(config)
    }

    /// Parses and validates config JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|source| TsGenError::Serialization {
                context: "Failed to parse config".to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the config is usable for a run.
    pub fn validate(&self) -> Result<()> {
        if self.plugins.is_empty() {
            return Err(TsGenError::configuration(
                "at least one plugin must be configured",
            ));
        }

        if let Some(plugin) = self.plugins.iter().find(|p| p.name.trim().is_empty()) {
            return Err(TsGenError::configuration(format!(
                "plugin name cannot be empty (options: {})",
                plugin.options
            )));
        }

        if let Some(schema) = &self.schema
            && (schema.is_empty() || schema.contains(crate::naming::SEPARATOR))
        {
            return Err(TsGenError::configuration(format!(
                "invalid default schema '{}'",
                schema
            )));
        }

        for name in self.tables.iter().chain(self.views.iter()).flatten() {
            crate::naming::split(name)?;
        }

        Ok(())
    }

    /// Explorer options derived from `schema` and `types`
    pub fn explorer_options(&self) -> ExplorerOptions {
        let mut options = ExplorerOptions::default().with_type_overrides(self.types.clone());
        if let Some(schema) = &self.schema {
            options = options.with_default_schema(SchemaName::new(schema.clone()));
        }
        options
    }

    /// Tables and views requested by this config
    pub fn selection(&self) -> EntitySelection {
        EntitySelection {
            tables: self.tables.clone(),
            views: self.views.clone(),
        }
    }
}
