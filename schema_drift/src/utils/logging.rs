//! Logging utilities for schema_drift
//!
//! This module provides logging setup from configuration.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Initialize logging based on configuration
pub fn init(config: &Option<LoggingConfig>) -> Result<()> {
    let config = match config {
        Some(config) => config,
        None => return Ok(()), // No logging configuration, use defaults
    };
    if !config.stdout {
        return Ok(());
    }

    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(
            format!("schema_drift={}", level)
                .parse()
                .map_err(|e| Error::Config(format!("Invalid log directive: {}", e)))?,
        );

    let builder = fmt::Subscriber::builder().with_env_filter(filter);
    let result = if config.format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| Error::Config(e.to_string()))
}
