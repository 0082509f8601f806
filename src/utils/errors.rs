// src/utils/errors.rs
//! Crate-wide error taxonomy
//!
//! Configuration and collector misuse errors are run-fatal. Per-agent errors
//! (`InvalidStateTransition`, `ResourceExhausted`) stay scoped to the failing
//! agent and its handoff chain; the run continues around them.

use crate::swarm::agent::AgentState;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the harness
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Harness error taxonomy
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Malformed or out-of-range configuration, rejected before any agent is built
    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    /// Configuration file or environment could not be read
    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// An agent lifecycle call arrived out of order
    #[error("agent {agent_id}: invalid transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        agent_id: usize,
        from: AgentState,
        to: AgentState,
    },

    /// Simulated ballast allocation failed; the agent aborts without
    /// starting its successor
    #[error("agent {agent_id}: failed to allocate {memory_mb} MiB of ballast")]
    ResourceExhausted { agent_id: usize, memory_mb: u64 },

    /// The stats collector was started twice
    #[error("stats collector already started")]
    AlreadyStarted,

    /// The stats collector was stopped before being started
    #[error("stats collector not started")]
    NotStarted,

    /// The run log could not be written; in-memory records are retained
    #[error("failed to persist run log at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run log could not be encoded as JSON
    #[error("failed to encode run log: {0}")]
    Encode(#[from] serde_json::Error),

    /// The run log could not be rendered as CSV
    #[error("failed to render run log as CSV: {0}")]
    Csv(#[from] csv::Error),
}
