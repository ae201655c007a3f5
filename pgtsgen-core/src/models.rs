//! Catalog metadata model shared by the explorer and the plugins.
//!
//! Every value here is an immutable snapshot produced for a single
//! generation run; nothing is cached across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a catalog identifier.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the identifier as it appears in the catalog.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type!(
    /// Schema (namespace) name
    SchemaName
);
name_type!(
    /// Local name of a table or view, without its schema
    EntityName
);
name_type!(
    /// Column name
    ColumnName
);

/// Schema used when a name carries no qualifier and none is configured.
pub const DEFAULT_SCHEMA: &str = "public";

impl Default for SchemaName {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA)
    }
}

/// Whether an entity is a base table or a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Table,
    View,
}

impl EntityKind {
    /// `information_schema.tables.table_type` value for this kind
    pub fn catalog_table_type(self) -> &'static str {
        match self {
            Self::Table => "BASE TABLE",
            Self::View => "VIEW",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::View => write!(f, "view"),
        }
    }
}

/// Target-language type category a database type maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "number[]")]
    NumberArray,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "boolean[]")]
    BooleanArray,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "date[]")]
    DateArray,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "json[]")]
    JsonArray,
    #[serde(rename = "unknown")]
    Unknown,
}

impl TargetType {
    /// All categories, scalars first
    pub const ALL: [TargetType; 11] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Date,
        Self::Json,
        Self::StringArray,
        Self::NumberArray,
        Self::BooleanArray,
        Self::DateArray,
        Self::JsonArray,
        Self::Unknown,
    ];

    /// Category name as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::StringArray => "string[]",
            Self::Number => "number",
            Self::NumberArray => "number[]",
            Self::Boolean => "boolean",
            Self::BooleanArray => "boolean[]",
            Self::Date => "date",
            Self::DateArray => "date[]",
            Self::Json => "json",
            Self::JsonArray => "json[]",
            Self::Unknown => "unknown",
        }
    }

    /// True for the one-dimensional array categories
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::StringArray
                | Self::NumberArray
                | Self::BooleanArray
                | Self::DateArray
                | Self::JsonArray
        )
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetType {
    type Err = crate::error::TsGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| {
                crate::error::TsGenError::configuration(format!(
                    "Unknown type category '{}', expected one of: {}",
                    s,
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

/// User-supplied database type overrides, consulted before the built-in table
pub type TypeOverrides = BTreeMap<String, TargetType>;

/// One column of a table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: ColumnName,
    /// Catalog type name (`udt_name`), array types carry a leading `_`
    pub database_type: String,
    pub target_type: TargetType,
    /// 1-based ordinal position
    pub position: u32,
    pub is_nullable: bool,
    pub has_default: bool,
    pub is_primary: bool,
    pub comment: Option<String>,
}

impl ColumnDefinition {
    /// Nullable or defaulted columns may be omitted on insert.
    pub fn is_optional(&self) -> bool {
        self.is_nullable || self.has_default
    }
}

/// A resolved table or view with its ordered columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub kind: EntityKind,
    pub schema: SchemaName,
    pub name: EntityName,
    pub comment: Option<String>,
    pub columns: Vec<ColumnDefinition>,
}

impl EntityDefinition {
    /// Columns that belong to the primary key, in position order
    pub fn primary_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|column| column.is_primary)
    }

    /// `schema.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn is_table(&self) -> bool {
        self.kind == EntityKind::Table
    }
}

/// Names the key and value columns of an enumeration source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    #[serde(alias = "key")]
    pub key_column: ColumnName,
    #[serde(alias = "value")]
    pub value_column: ColumnName,
}

impl EnumOption {
    pub fn new(key_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            key_column: ColumnName::new(key_column),
            value_column: ColumnName::new(value_column),
        }
    }
}

/// One key/value pair read from an enumeration source table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumRow {
    pub key: serde_json::Value,
    pub value: serde_json::Value,
}

/// Output of a single plugin invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginResult {
    #[serde(default)]
    pub headers: Vec<String>,
    pub outputs: Vec<String>,
}

impl PluginResult {
    pub fn new(outputs: Vec<String>) -> Self {
        Self {
            headers: Vec::new(),
            outputs,
        }
    }

    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }
}

/// Merged output of one pipeline run: all headers, then all outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub headers: Vec<String>,
    pub outputs: Vec<String>,
}

impl GeneratedDocument {
    /// Joins headers followed by outputs as plain text lines.
    pub fn render(&self) -> String {
        let mut document = self
            .headers
            .iter()
            .chain(self.outputs.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        if !document.is_empty() {
            document.push('\n');
        }
        document
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.outputs.is_empty()
    }
}
