//! Database connection handling

use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Opens a connection pool for the configured database.
pub async fn connect(config: &DatabaseConfig) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.pool_size.unwrap_or(5))
        .acquire_timeout(Duration::from_secs(config.timeout_seconds.unwrap_or(30)))
        .connect(&config.url)
        .await?;

    Ok(pool)
}
