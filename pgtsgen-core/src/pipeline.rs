//! Plugin pipeline: one definitions snapshot, every plugin run concurrently,
//! outputs merged in declaration order.
//!
//! A run either produces a complete document or fails; if any plugin fails
//! no partial output is returned.

use crate::config::{EntitySelection, PluginSpec};
use crate::error::{Result, TsGenError};
use crate::explorer::Explorer;
use crate::models::{EntityDefinition, GeneratedDocument, PluginResult};
use crate::plugins::{EnumPlugin, InterfacePlugin};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A code generator fed with the shared definitions snapshot.
///
/// Plugins never modify the definitions. They may issue further queries
/// through the explorer (the enum plugin reads table rows this way).
///
/// # Object Safety
/// This trait is object-safe; the pipeline holds `Arc<dyn Plugin>`.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Registry name, also used to attribute failures
    fn name(&self) -> &str;

    /// Generates output for `definitions` using plugin-specific `options`.
    async fn run(
        &self,
        explorer: &Explorer,
        definitions: &[EntityDefinition],
        options: &serde_json::Value,
    ) -> Result<PluginResult>;
}

/// Plugins available by name
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.plugins.keys()).finish()
    }
}

impl PluginRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `typescript` and `typescript-enum` plugins.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(InterfacePlugin));
        registry.register(Arc::new(EnumPlugin::from_options()));
        registry
    }

    /// Adds `plugin` under its own name, replacing any previous entry.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        self.plugins.insert(plugin.name().to_string(), plugin);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }
}

/// A plugin paired with its configured options
#[derive(Clone)]
pub struct ConfiguredPlugin {
    pub plugin: Arc<dyn Plugin>,
    pub options: serde_json::Value,
}

impl ConfiguredPlugin {
    pub fn new(plugin: Arc<dyn Plugin>, options: serde_json::Value) -> Self {
        Self { plugin, options }
    }
}

/// Runs an ordered list of plugins against one explorer.
pub struct Pipeline {
    explorer: Explorer,
    plugins: Vec<ConfiguredPlugin>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("explorer", &self.explorer)
            .field(
                "plugins",
                &self
                    .plugins
                    .iter()
                    .map(|configured| configured.plugin.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline; `plugins` order is the output order.
    pub fn new(explorer: Explorer, plugins: Vec<ConfiguredPlugin>) -> Self {
        Self { explorer, plugins }
    }

    /// Looks up every configured plugin by name.
    ///
    /// # Errors
    /// Returns [`TsGenError::UnknownPlugin`] for the first name the registry
    /// does not know; nothing has been queried at that point.
    pub fn from_specs(
        explorer: Explorer,
        registry: &PluginRegistry,
        specs: &[PluginSpec],
    ) -> Result<Self> {
        let plugins = specs
            .iter()
            .map(|spec| {
                registry
                    .get(&spec.name)
                    .map(|plugin| ConfiguredPlugin::new(plugin, spec.options.clone()))
                    .ok_or_else(|| TsGenError::UnknownPlugin {
                        name: spec.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(explorer, plugins))
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// Fetches the selected definitions once and runs every plugin over them.
    pub async fn run(&self, selection: &EntitySelection) -> Result<GeneratedDocument> {
        let (tables, views) = futures::try_join!(
            self.explorer.get_table_definitions(selection.tables.as_deref()),
            self.explorer.get_view_definitions(selection.views.as_deref()),
        )?;

        let mut definitions = tables;
        definitions.extend(views);

        tracing::info!(
            "Running {} plugins over {} definitions",
            self.plugins.len(),
            definitions.len()
        );

        let results = self.run_plugins(&definitions).await?;
        let document = merge(results);

        tracing::info!(
            "Generated {} headers and {} declarations",
            document.headers.len(),
            document.outputs.len()
        );
        Ok(document)
    }

    /// Runs all plugins concurrently, results in declaration order.
    pub async fn run_plugins(&self, definitions: &[EntityDefinition]) -> Result<Vec<PluginResult>> {
        try_join_all(self.plugins.iter().map(|configured| async move {
            let name = configured.plugin.name();
            tracing::debug!("Starting plugin {}", name);

            let result = configured
                .plugin
                .run(&self.explorer, definitions, &configured.options)
                .await
                .map_err(|e| {
                    tracing::error!("Plugin {} failed: {}", name, e);
                    e.within_plugin(name)
                })?;

            tracing::debug!("Plugin {} produced {} outputs", name, result.outputs.len());
            Ok::<_, TsGenError>(result)
        }))
        .await
    }
}

/// Concatenates all headers, then all outputs, keeping plugin order.
///
/// Duplicate headers are kept as they are.
pub fn merge(results: Vec<PluginResult>) -> GeneratedDocument {
    results
        .into_iter()
        .fold(GeneratedDocument::default(), |mut document, result| {
            document.headers.extend(result.headers);
            document.outputs.extend(result.outputs);
            document
        })
}
