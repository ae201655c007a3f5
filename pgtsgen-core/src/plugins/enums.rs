//! `typescript-enum` plugin: TypeScript enums built from lookup table rows.
//!
//! A classifier decides which tables are enum sources and which columns hold
//! the member name and value. It is either injected by an embedding
//! application or built from the plugin options:
//!
//! ```json
//! { "tables": { "roles": { "key": "code", "value": "id" },
//!               "billing.plans": { "key": "slug", "value": "label" } } }
//! ```

use super::format::{self, CommentStyle};
use crate::error::{Result, TsGenError};
use crate::explorer::Explorer;
use crate::models::{EntityDefinition, EntityName, EnumOption, EnumRow, PluginResult, SchemaName};
use crate::naming;
use crate::pipeline::Plugin;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Registry name of the enum plugin
pub const NAME: &str = "typescript-enum";

/// Enum value lookups in flight at once
pub const MAX_CONCURRENT_LOOKUPS: usize = 5;

/// Picks the key and value columns of an enum source table, or `None` to
/// skip the table.
pub type EnumClassifier = Arc<dyn Fn(&EntityDefinition) -> Option<EnumOption> + Send + Sync>;

/// Options of the enum plugin when no classifier is injected
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnumOptions {
    /// `[schema.]table` to key/value columns
    pub tables: BTreeMap<String, EnumOption>,
}

impl EnumOptions {
    /// Parses plugin options; `null` means no enum tables.
    pub fn from_value(options: &serde_json::Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(options).map_err(|source| TsGenError::Serialization {
            context: format!("Invalid {} plugin options", NAME),
            source,
        })
    }

    /// Builds a classifier matching tables by resolved name.
    ///
    /// Unqualified entries resolve against `default_schema`.
    pub fn classifier(&self, default_schema: &SchemaName) -> Result<EnumClassifier> {
        let mut tables: HashMap<(SchemaName, EntityName), EnumOption> =
            HashMap::with_capacity(self.tables.len());
        for (name, option) in &self.tables {
            tables.insert(naming::resolve(name, default_schema)?, option.clone());
        }

        Ok(Arc::new(move |definition: &EntityDefinition| {
            tables
                .get(&(definition.schema.clone(), definition.name.clone()))
                .cloned()
        }))
    }
}

/// Emits one `export enum` per classified table.
#[derive(Clone)]
pub struct EnumPlugin {
    classifier: Option<EnumClassifier>,
}

impl std::fmt::Debug for EnumPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumPlugin")
            .field("injected_classifier", &self.classifier.is_some())
            .finish()
    }
}

impl EnumPlugin {
    /// Uses `classifier` and ignores the configured options.
    pub fn new(classifier: EnumClassifier) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Builds the classifier from the `tables` option on every run.
    pub fn from_options() -> Self {
        Self { classifier: None }
    }

    /// Generates the enum for one table, `None` when it is not an enum source.
    async fn generate(
        explorer: &Explorer,
        table: &EntityDefinition,
        classifier: &EnumClassifier,
    ) -> Result<Option<String>> {
        let Some(option) = classifier(table) else {
            return Ok(None);
        };

        let primary_keys = table.primary_columns().count();
        if primary_keys > 1 {
            return Err(TsGenError::InvalidEnumSource {
                table: table.qualified_name(),
                primary_keys,
            });
        }

        let rows = explorer
            .get_enum_values(&table.schema, &table.name, &option)
            .await?;
        tracing::debug!("Read {} enum rows from {}", rows.len(), table.qualified_name());

        let mut seen = HashSet::with_capacity(rows.len());
        let mut members = Vec::with_capacity(rows.len());
        for row in &rows {
            let (key, member) = render_member(table, row)?;
            if !seen.insert(key.clone()) {
                return Err(TsGenError::InvalidEnumKey {
                    table: table.qualified_name(),
                    found: format!("duplicate member '{}'", key),
                });
            }
            members.push(member);
        }

        let name = format::type_name(table.name.as_str());
        let declaration = if members.is_empty() {
            format!("export enum {name}Enum {{}}")
        } else {
            format!("export enum {name}Enum {{\n{}\n}}", members.join("\n"))
        };

        Ok(Some(format::with_comment(
            &declaration,
            table.comment.as_deref(),
            CommentStyle::Block,
        )))
    }
}

/// Member name and its `  Key = value,` line.
fn render_member(table: &EntityDefinition, row: &EnumRow) -> Result<(String, String)> {
    let key = match &row.key {
        serde_json::Value::String(key) => format::type_name(key),
        serde_json::Value::Number(key) => format::type_name(&key.to_string()),
        other => {
            return Err(TsGenError::InvalidEnumKey {
                table: table.qualified_name(),
                found: format!("expecting string or number, got {}", json_kind(other)),
            });
        }
    };
    match key.chars().next() {
        None => {
            return Err(TsGenError::InvalidEnumKey {
                table: table.qualified_name(),
                found: "key is empty".to_string(),
            });
        }
        // Member names must be identifiers.
        Some(first) if !(first.is_alphabetic() || first == '_' || first == '$') => {
            return Err(TsGenError::InvalidEnumKey {
                table: table.qualified_name(),
                found: format!("'{}' is not a valid member name", key),
            });
        }
        Some(_) => {}
    }

    let value = match &row.value {
        serde_json::Value::String(value) => format::string_literal(value),
        serde_json::Value::Number(value) => value.to_string(),
        other => {
            return Err(TsGenError::plugin_failed(
                NAME,
                format!(
                    "Invalid enum value type in {}: expecting string or number, got {}",
                    table.qualified_name(),
                    json_kind(other)
                ),
            ));
        }
    };

    let member = format!("{}{key} = {value},", format::INDENT);
    Ok((key, member))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[async_trait]
impl Plugin for EnumPlugin {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(
        &self,
        explorer: &Explorer,
        definitions: &[EntityDefinition],
        options: &serde_json::Value,
    ) -> Result<PluginResult> {
        let classifier = match &self.classifier {
            Some(classifier) => classifier.clone(),
            None => EnumOptions::from_value(options)?.classifier(explorer.default_schema())?,
        };

        let pending: Vec<_> = definitions
            .iter()
            .filter(|definition| definition.is_table())
            .map(|table| Self::generate(explorer, table, &classifier))
            .collect();

        let outputs: Vec<Option<String>> = stream::iter(pending)
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .try_collect()
            .await?;

        Ok(PluginResult::new(outputs.into_iter().flatten().collect()))
    }
}
