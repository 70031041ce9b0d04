//! Command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use schema_drift::utils::logging;
use schema_drift::SchemaDriftClient;

#[derive(Parser)]
#[command(
    name = "schema_drift",
    about = "Generate a reversible migration from live schema drift",
    version
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "schema_drift.toml")]
    config: PathBuf,

    /// Path to the desired schema definition (YAML)
    #[arg(short, long)]
    schema: PathBuf,

    /// Print the migration instead of writing it to the migration directory
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = schema_drift::config::load_from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    logging::init(&config.logging)?;

    let client = SchemaDriftClient::new(config).await?;
    let migration = client
        .generate_migration(&cli.schema)
        .await
        .with_context(|| format!("diffing against {}", cli.schema.display()))?;

    match migration {
        None => info!("nothing to migrate"),
        Some(migration) if migration.is_empty() => {
            info!("database schema is already in sync")
        }
        Some(migration) => {
            if cli.stdout {
                print!("{}", migration.script());
            } else {
                let path = client.write_migration(&migration)?;
                info!(path = %path.display(), "migration written");
            }
        }
    }

    Ok(())
}
