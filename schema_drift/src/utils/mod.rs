//! Utilities for schema_drift

pub mod logging;
