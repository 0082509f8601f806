// src/lib.rs
//! Swarmbench Load Harness Library
//!
//! This library simulates a population of short-lived stub agents, launches
//! them according to a configurable spawn pattern, and concurrently samples
//! host resource usage and agent lifecycle events into one timestamped run
//! log for later analysis.
//!
//! # Architecture
//!
//! The harness is structured into several key modules:
//!
//! - **swarm**: Agent lifecycle simulation, spawn patterns, run orchestration
//! - **recording**: Concurrent event capture, resource sampling, persistence
//! - **observability**: Tracing and logging setup
//! - **utils**: Configuration and error types

// Public module exports
pub mod observability;
pub mod recording;
pub mod swarm;
pub mod utils;

// Re-export commonly used types
pub use recording::collector::{CollectorConfig, StatsCollector};
pub use recording::event::{Event, EventBody, EventLog};
pub use swarm::runner::{RunSummary, SwarmRunner};
pub use utils::config::SwarmConfig;
pub use utils::errors::{HarnessError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
