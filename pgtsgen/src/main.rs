//! TypeScript declaration generator for PostgreSQL.
//!
//! Reads a JSON config, introspects the selected tables and views, runs the
//! configured plugins and writes one TypeScript document.
//!
//! # Guarantees
//! - Read-only database operations only
//! - Connection strings are redacted in every log line
//! - Nothing is written unless every plugin succeeded

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use pgtsgen_core::error::redact_database_url;
use pgtsgen_core::explorer::PostgresCatalog;
use pgtsgen_core::logging::init_logging;
use pgtsgen_core::{ConnectionConfig, Explorer, GeneratorConfig, Pipeline, PluginRegistry};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pgtsgen")]
#[command(about = "Generate TypeScript declarations from a PostgreSQL catalog")]
#[command(version)]
#[command(long_about = "
pgtsgen - TypeScript declarations from PostgreSQL

Introspects tables and views and runs generator plugins over them:
- typescript: interfaces plus Select/Insert/Update types
- typescript-enum: enums read from lookup tables

EXAMPLES:
  pgtsgen --config pgtsgen.json
  DATABASE_URL=postgres://app@localhost/app pgtsgen -o src/db.ts
  pgtsgen test --database-url postgres://app@localhost/app
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Generation config file
    #[arg(
        short,
        long,
        default_value = "pgtsgen.json",
        help = "Path to the JSON config file"
    )]
    pub config: PathBuf,

    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        help = "Database connection string, overrides the config 'uri' (credentials are redacted in logs)"
    )]
    pub database_url: Option<String>,

    /// Output file path
    #[arg(
        short,
        long,
        help = "Output file, overrides the config 'output' (stdout when neither is set)"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate declarations (the default)
    Generate,
    /// Test database connection
    Test,
    /// List built-in plugins
    Plugins,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all log output except errors"
    )]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match cli.command {
        None | Some(Command::Generate) => generate(&cli).await,
        Some(Command::Test) => test_connection(&cli).await,
        Some(Command::Plugins) => {
            for name in PluginRegistry::builtin().names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Database URL from the CLI or environment, falling back to the config.
fn database_url(cli: &Cli, config: Option<&GeneratorConfig>) -> anyhow::Result<String> {
    match cli
        .database_url
        .clone()
        .or_else(|| config.and_then(|config| config.uri.clone()))
    {
        Some(url) => Ok(url),
        None => bail!(
            "Database URL is required: pass --database-url, set DATABASE_URL or add 'uri' to the config"
        ),
    }
}

/// Pool settings from the URL query string, with the config pool size applied.
fn connection_config(
    database_url: &str,
    config: &GeneratorConfig,
) -> anyhow::Result<ConnectionConfig> {
    let mut connection = PostgresCatalog::parse_connection_config(database_url)?;
    if let Some(max_connections) = config.max_connections {
        connection = connection.with_max_connections(max_connections);
    }
    Ok(connection)
}

async fn test_connection(cli: &Cli) -> anyhow::Result<()> {
    let config = if cli.config.exists() {
        Some(GeneratorConfig::load(&cli.config).await?)
    } else {
        None
    };
    let database_url = database_url(cli, config.as_ref())?;
    info!("Testing connection to {}", redact_database_url(&database_url));

    let catalog = PostgresCatalog::new(&database_url)?;
    catalog.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;
    catalog.close().await;

    println!("Connection to {} successful", redact_database_url(&database_url));
    Ok(())
}

async fn generate(cli: &Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::load(&cli.config).await?;
    let database_url = database_url(cli, Some(&config))?;
    let connection = connection_config(&database_url, &config)?;

    info!("Target: {}", redact_database_url(&database_url));

    let explorer = Explorer::connect(&database_url, config.explorer_options(), connection)?;
    let pipeline = Pipeline::from_specs(explorer, &PluginRegistry::builtin(), &config.plugins)?;

    let document = pipeline.run(&config.selection()).await.map_err(|e| {
        error!("Generation failed: {}", e);
        e
    })?;
    let rendered = document.render();

    match cli.output.as_ref().or(config.output.as_ref()) {
        Some(path) => {
            write_output(path, &rendered).await?;
            info!(
                "Wrote {} declarations to {}",
                document.outputs.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(rendered.as_bytes())
                .await
                .context("Failed to write to stdout")?;
            stdout.flush().await.context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

async fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write to {}", path.display()))
}
