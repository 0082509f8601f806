// src/utils/config.rs
//! Harness configuration
//!
//! An immutable value deserialized from an optional file plus `SWARM_*`
//! environment overrides, validated before any agent is built. The
//! orchestrator receives it by value; nothing reads configuration from
//! process-wide state.

use crate::utils::errors::{HarnessError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Spawn pattern parameters (only the `bursts` pattern uses them)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternParams {
    /// Group size for the `bursts` pattern
    pub agents_per_burst: usize,

    /// Seconds between group launches
    pub burst_interval: u64,
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            agents_per_burst: 5,
            burst_interval: 3,
        }
    }
}

/// Spawn pattern descriptor as configured
///
/// The tag stays a free-form string here; resolution to a launch policy
/// (including the unknown-tag fallback) happens in `swarm::pattern`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternConfig {
    /// Pattern tag: `all_at_once`, `bursts`, or `linear`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub params: PatternParams,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            kind: "all_at_once".to_string(),
            params: PatternParams::default(),
        }
    }
}

/// Immutable run configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Number of agents in the roster
    pub num_agents: usize,

    /// Inclusive TTL range in seconds, sampled once per agent
    pub ttl_range: [u64; 2],

    /// Inclusive ballast range in MiB, sampled once per agent
    pub memory_range: [u64; 2],

    /// Launch timing and topology
    pub pattern: PatternConfig,

    /// Seconds between resource samples
    pub stats_interval: f64,

    /// Directory the JSON/CSV run log pair is written into
    pub log_dir: PathBuf,

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Seed for TTL/ballast sampling; drawn from entropy when unset
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            num_agents: 2,
            ttl_range: [0, 1],
            memory_range: [50, 150],
            pattern: PatternConfig::default(),
            stats_interval: 5.0,
            log_dir: PathBuf::from("logs"),
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Load configuration, layering (lowest to highest precedence) the
    /// built-in defaults, a `swarm.*` file in the working directory, an
    /// explicit file path, and `SWARM_*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("swarm").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let raw = builder
            .add_source(config::Environment::with_prefix("SWARM").separator("__"))
            .build()?;

        Ok(raw.try_deserialize()?)
    }

    /// Reject malformed values before any agent is built
    pub fn validate(&self) -> Result<()> {
        if self.num_agents == 0 {
            return Err(HarnessError::ConfigValidation(
                "num_agents must be positive".to_string(),
            ));
        }

        if self.ttl_range[0] > self.ttl_range[1] {
            return Err(HarnessError::ConfigValidation(format!(
                "ttl_range min {} exceeds max {}",
                self.ttl_range[0], self.ttl_range[1]
            )));
        }

        if self.memory_range[0] > self.memory_range[1] {
            return Err(HarnessError::ConfigValidation(format!(
                "memory_range min {} exceeds max {}",
                self.memory_range[0], self.memory_range[1]
            )));
        }

        if self.stats_interval <= 0.0 || !self.stats_interval.is_finite() {
            return Err(HarnessError::ConfigValidation(
                "stats_interval must be a positive number".to_string(),
            ));
        }

        if self.pattern.kind == "bursts" && self.pattern.params.agents_per_burst == 0 {
            return Err(HarnessError::ConfigValidation(
                "agents_per_burst must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
