//! schema_drift: generates ordered, reversible migrations by diffing a
//! live database schema against declared table definitions.
//!
//! The live schema is introspected once into a table snapshot, the
//! desired schema is loaded from a definition file, and the migration
//! builder emits a script with matching `up` and `down` bodies. The
//! diffing and rendering path is pure and synchronous; only the initial
//! introspection touches the database.

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use schema::diff::AlterTableOperations;
pub use schema::generator::{Migration, MigrationBuilder};
pub use schema::loader;
pub use schema::operations::Operation;
pub use schema::parser::Tables;

use std::path::{Path, PathBuf};

use sqlx::mysql::MySqlPool;

/// Initialize schema_drift with the specified configuration file
pub async fn init(config_path: &Path) -> Result<SchemaDriftClient> {
    let config = config::load_from_file(config_path)?;
    SchemaDriftClient::new(config).await
}

/// The main client: owns the configuration and the database pool.
pub struct SchemaDriftClient {
    config: Config,
    pool: MySqlPool,
}

impl SchemaDriftClient {
    /// Create a new client from configuration
    pub async fn new(config: Config) -> Result<Self> {
        let pool = db::connection::connect(&config.database).await?;
        Ok(Self { config, pool })
    }

    /// Introspect the current live schema
    pub async fn snapshot(&self) -> Result<Tables> {
        db::inspector::snapshot(&self.pool).await
    }

    /// Generate the migration that brings the live schema in line with
    /// the tables declared in `schema_path`. Returns `None` when there is
    /// nothing at all to migrate.
    pub async fn generate_migration(&self, schema_path: &Path) -> Result<Option<Migration>> {
        let desired = loader::load_tables(schema_path)?;
        let db_tables = self.snapshot().await?;
        Ok(MigrationBuilder::new(db_tables).generate_migration(&desired))
    }

    /// Write a generated migration into the configured directory and
    /// return the file path.
    pub fn write_migration(&self, migration: &Migration) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config.migration.directory)?;

        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let filename = format!("{}_{}.migration", stamp, self.config.migration.name);
        let path = Path::new(&self.config.migration.directory).join(filename);
        std::fs::write(&path, migration.script())?;

        Ok(path)
    }

    /// The loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
