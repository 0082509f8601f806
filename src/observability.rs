// src/observability.rs
//! Tracing and logging setup
//!
//! One-time process-wide subscriber installation. `RUST_LOG` wins when it
//! is set; otherwise the configured level filters the whole harness.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
pub fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))?;

    Ok(())
}
