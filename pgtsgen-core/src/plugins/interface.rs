//! `typescript` plugin: interface declarations for tables and views.
//!
//! For a `users` table this emits:
//!
//! ```text
//! export interface Users {
//!   id: number;
//!   email: string;
//!   createdAt?: Date | null;
//! }
//! export type UsersSelect = Required<Users>;
//! export type UsersInsert = Users;
//! export type UsersUpdate = Partial<Users>;
//! ```
//!
//! Views only get the select alias.

use super::format::{self, CommentStyle};
use crate::error::{Result, TsGenError};
use crate::explorer::Explorer;
use crate::models::{ColumnDefinition, EntityDefinition, PluginResult};
use crate::pipeline::Plugin;
use async_trait::async_trait;
use serde::Deserialize;

/// Registry name of the interface plugin
pub const NAME: &str = "typescript";

/// Header every generated document needs for `JsonValue`
pub const HEADER: &str = "import type { JsonValue } from 'type-fest';";

/// Name affixes for the three derived declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Affixes {
    pub select: Option<String>,
    pub insert: Option<String>,
    pub update: Option<String>,
}

/// Options of the interface plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceOptions {
    pub prefix: Affixes,
    pub postfix: Affixes,
}

impl InterfaceOptions {
    /// Parses plugin options; `null` means all defaults.
    pub fn from_value(options: &serde_json::Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(options).map_err(|source| TsGenError::Serialization {
            context: format!("Invalid {} plugin options", NAME),
            source,
        })
    }

    fn name(
        prefix: Option<&String>,
        base: &str,
        postfix: Option<&String>,
        default: &str,
    ) -> String {
        let prefix = prefix.map_or("", String::as_str);
        let postfix = postfix.filter(|p| !p.is_empty()).map_or(default, String::as_str);
        format!("{prefix}{base}{postfix}")
    }

    pub fn select_name(&self, base: &str) -> String {
        Self::name(
            self.prefix.select.as_ref(),
            base,
            self.postfix.select.as_ref(),
            "Select",
        )
    }

    pub fn insert_name(&self, base: &str) -> String {
        Self::name(
            self.prefix.insert.as_ref(),
            base,
            self.postfix.insert.as_ref(),
            "Insert",
        )
    }

    pub fn update_name(&self, base: &str) -> String {
        Self::name(
            self.prefix.update.as_ref(),
            base,
            self.postfix.update.as_ref(),
            "Update",
        )
    }
}

/// Emits one interface per definition plus derived select/insert/update types.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfacePlugin;

impl InterfacePlugin {
    /// Renders all declarations for one table or view.
    pub fn render(definition: &EntityDefinition, options: &InterfaceOptions) -> String {
        let base = format::type_name(definition.name.as_str());

        let fields = definition
            .columns
            .iter()
            .map(|column| format::indent(&render_field(column)))
            .collect::<Vec<_>>();

        let mut lines = vec![if fields.is_empty() {
            format!("export interface {base} {{}}")
        } else {
            format!("export interface {base} {{\n{}\n}}", fields.join("\n"))
        }];

        lines.push(format!(
            "export type {} = Required<{base}>;",
            options.select_name(&base)
        ));
        if definition.is_table() {
            lines.push(format!("export type {} = {base};", options.insert_name(&base)));
            lines.push(format!(
                "export type {} = Partial<{base}>;",
                options.update_name(&base)
            ));
        }

        format::with_comment(
            &lines.join("\n"),
            definition.comment.as_deref(),
            CommentStyle::Block,
        )
    }
}

/// `name[?]: type[ | null];` with the column comment above it.
fn render_field(column: &ColumnDefinition) -> String {
    let optional = if column.is_optional() { "?" } else { "" };
    let nullable = if column.is_nullable { " | null" } else { "" };
    let field = format!(
        "{}{optional}: {}{nullable};",
        format::field_name(column.name.as_str()),
        format::ts_type(column.target_type)
    );
    format::with_comment(&field, column.comment.as_deref(), CommentStyle::Line)
}

#[async_trait]
impl Plugin for InterfacePlugin {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(
        &self,
        _explorer: &Explorer,
        definitions: &[EntityDefinition],
        options: &serde_json::Value,
    ) -> Result<PluginResult> {
        let options = InterfaceOptions::from_value(options)?;
        let outputs = definitions
            .iter()
            .map(|definition| Self::render(definition, &options))
            .collect();
        Ok(PluginResult::new(outputs).with_headers(vec![HEADER.to_string()]))
    }
}
