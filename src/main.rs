// src/main.rs
//! Swarmbench Load Harness
//!
//! Launches a population of short-lived stub agents per the configured
//! spawn pattern while sampling host resources, then persists the unified
//! run log for offline plotting.

use anyhow::Result;
use swarmbench::observability::init_tracing;
use swarmbench::swarm::runner::SwarmRunner;
use swarmbench::utils::config::SwarmConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config file path as the single positional argument
    let config_path = std::env::args().nth(1);
    let config = SwarmConfig::load(config_path.as_deref())?;

    init_tracing(&config.log_level)?;
    info!("Starting swarmbench v{}", env!("CARGO_PKG_VERSION"));

    let runner = SwarmRunner::new(config)?;

    // Hard external stop: ctrl-c aborts the swarm but the collector still
    // persists whatever was recorded
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
        info!("received shutdown signal, stopping swarm");
    };

    match runner.run_with_shutdown(shutdown).await {
        Ok(summary) => {
            info!(
                completed = summary.completed,
                failed = summary.failed,
                events = summary.events_recorded,
                log = %summary.saved.json_path.display(),
                interrupted = summary.interrupted,
                "run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "run failed");
            Err(e.into())
        }
    }
}
