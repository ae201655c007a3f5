//! End-to-end generation tests over an in-memory catalog.
//!
//! These drive the public API the same way the CLI does: config, explorer,
//! registry, pipeline, rendered document.

#![allow(clippy::unwrap_used)]

use pgtsgen_core::explorer::ColumnRow;
use pgtsgen_core::plugins::{EnumClassifier, EnumPlugin, InterfacePlugin};
use pgtsgen_core::{
    EntityDefinition, EntitySelection, EnumOption, Explorer, ExplorerOptions, GeneratorConfig,
    MemoryCatalog, Pipeline, PluginRegistry, TsGenError,
};
use serde_json::json;
use std::sync::Arc;

fn shop_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_entity(
            pgtsgen_core::EntityKind::Table,
            "public",
            "users",
            Some("Registered users"),
            vec![
                ColumnRow::new("id", "int4", 1).primary(),
                ColumnRow::new("email", "text", 2).not_null(),
                ColumnRow::new("created_at", "timestamptz", 3).with_default(),
            ],
        )
        .with_table(
            "public",
            "roles",
            vec![
                ColumnRow::new("id", "int4", 1).primary(),
                ColumnRow::new("code", "varchar", 2).not_null(),
            ],
        )
        .with_rows(
            "public",
            "roles",
            vec![
                json!({ "id": 1, "code": "admin" }),
                json!({ "id": 2, "code": "member" }),
            ],
        )
        .with_view(
            "public",
            "active_users",
            vec![
                ColumnRow::new("id", "int4", 1),
                ColumnRow::new("settings", "jsonb", 2),
            ],
        )
        .with_table(
            "audit",
            "events",
            vec![
                ColumnRow::new("id", "int8", 1).primary(),
                ColumnRow::new("tags", "_text", 2).with_comment("free form labels"),
            ],
        )
}

#[tokio::test]
async fn test_users_table_end_to_end() {
    let explorer = Explorer::new(Arc::new(shop_catalog()), ExplorerOptions::default());
    let pipeline = Pipeline::new(
        explorer,
        vec![pgtsgen_core::pipeline::ConfiguredPlugin::new(
            Arc::new(InterfacePlugin),
            serde_json::Value::Null,
        )],
    );

    let selection = EntitySelection {
        tables: Some(vec!["users".to_string()]),
        views: Some(Vec::new()),
    };
    let document = pipeline.run(&selection).await.unwrap();

    assert_eq!(
        document.render(),
        "import type { JsonValue } from 'type-fest';\n\
         /**\n * Registered users\n */\n\
         export interface Users {\n  id: number;\n  email: string;\n  createdAt?: Date | null;\n}\n\
         export type UsersSelect = Required<Users>;\n\
         export type UsersInsert = Users;\n\
         export type UsersUpdate = Partial<Users>;\n"
    );
}

#[tokio::test]
async fn test_config_driven_run() {
    let config = GeneratorConfig::from_json(
        r#"{
            "types": { "int8": "string" },
            "tables": ["roles", "audit.events"],
            "plugins": [
                { "name": "typescript-enum", "options": { "tables": { "roles": { "key": "code", "value": "id" } } } },
                { "name": "typescript", "options": { "postfix": { "select": "Row" } } }
            ]
        }"#,
    )
    .unwrap();

    let explorer = Explorer::new(Arc::new(shop_catalog()), config.explorer_options());
    let pipeline =
        Pipeline::from_specs(explorer, &PluginRegistry::builtin(), &config.plugins).unwrap();
    let document = pipeline.run(&config.selection()).await.unwrap();

    assert_eq!(
        document.headers,
        vec!["import type { JsonValue } from 'type-fest';"]
    );

    // Enum plugin output first, then one declaration block per table in
    // request order, then the views of the default schema.
    assert_eq!(document.outputs.len(), 4);
    assert_eq!(
        document.outputs[0],
        "export enum RolesEnum {\n  Admin = 1,\n  Member = 2,\n}"
    );
    assert!(document.outputs[1].starts_with("export interface Roles {"));
    assert!(document.outputs[1].contains("export type RolesRow = Required<Roles>;"));
    assert!(document.outputs[2].contains("  /* free form labels */\n  tags?: string[] | null;"));
    assert!(document.outputs[2].contains("  id: string;"));
    assert!(document.outputs[3].starts_with("export interface ActiveUsers {"));
    assert!(document.outputs[3].contains("  settings?: JsonValue | null;"));
    assert!(!document.outputs[3].contains("ActiveUsersInsert"));
}

#[tokio::test]
async fn test_injected_enum_classifier() {
    let classifier: EnumClassifier = Arc::new(|definition: &EntityDefinition| {
        definition
            .columns
            .iter()
            .any(|column| column.name.as_str() == "code")
            .then(|| EnumOption::new("code", "code"))
    });

    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(EnumPlugin::new(classifier)));

    let explorer = Explorer::new(Arc::new(shop_catalog()), ExplorerOptions::default());
    let pipeline = Pipeline::from_specs(
        explorer,
        &registry,
        &[pgtsgen_core::PluginSpec::new("typescript-enum")],
    )
    .unwrap();
    let document = pipeline.run(&EntitySelection::all()).await.unwrap();

    assert!(document.headers.is_empty());
    assert_eq!(
        document.outputs,
        vec!["export enum RolesEnum {\n  Admin = 'admin',\n  Member = 'member',\n}"]
    );
}

#[tokio::test]
async fn test_enum_failure_discards_other_plugin_output() {
    let catalog = shop_catalog().with_table(
        "public",
        "role_grants",
        vec![
            ColumnRow::new("role_id", "int4", 1).primary(),
            ColumnRow::new("user_id", "int4", 2).primary(),
        ],
    );
    let config = GeneratorConfig::from_json(
        r#"{
            "plugins": [
                { "name": "typescript" },
                { "name": "typescript-enum", "options": { "tables": { "role_grants": { "key": "role_id", "value": "user_id" } } } }
            ]
        }"#,
    )
    .unwrap();

    let explorer = Explorer::new(Arc::new(catalog), config.explorer_options());
    let pipeline =
        Pipeline::from_specs(explorer, &PluginRegistry::builtin(), &config.plugins).unwrap();
    let result = pipeline.run(&config.selection()).await;

    assert!(matches!(
        result,
        Err(TsGenError::InvalidEnumSource { table, primary_keys: 2 }) if table == "public.role_grants"
    ));
}

#[tokio::test]
async fn test_unknown_plugin_fails_before_any_query() {
    let catalog = Arc::new(shop_catalog());
    let explorer = Explorer::new(catalog.clone(), ExplorerOptions::default());

    let result = Pipeline::from_specs(
        explorer,
        &PluginRegistry::builtin(),
        &[pgtsgen_core::PluginSpec::new("zod")],
    );

    assert!(matches!(result, Err(TsGenError::UnknownPlugin { .. })));
    assert!(catalog.entity_queries().is_empty());
}

#[tokio::test]
async fn test_invalid_plugin_options_are_attributed() {
    let explorer = Explorer::new(Arc::new(shop_catalog()), ExplorerOptions::default());
    let pipeline = Pipeline::from_specs(
        explorer,
        &PluginRegistry::builtin(),
        &[pgtsgen_core::PluginSpec::new("typescript").with_options(json!({ "prefix": 3 }))],
    )
    .unwrap();

    let result = pipeline.run(&EntitySelection::all()).await;
    assert!(matches!(
        result,
        Err(TsGenError::PluginExecution { plugin, .. }) if plugin == "typescript"
    ));
}
