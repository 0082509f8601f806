// src/swarm/mod.rs
//! Agent swarm simulation
//!
//! This module provides the load-generation half of the harness:
//!
//! - **Agent**: Finite-state stub agent with TTL, ballast, and handoff
//! - **Roster**: Workload sampling and successor chaining at build time
//! - **Pattern**: Spawn patterns (`all_at_once`, `bursts`, `linear`)
//! - **Runner**: Orchestration of one complete run
//!
//! # Architecture
//!
//! ```text
//! SwarmRunner
//! ├─ Roster: [Agent0, Agent1, ...]   (immutable after build)
//! ├─ spawn_swarm() ──> chain tasks   (one task per explicit start)
//! └─ StatsCollector ◄── EventSink    (lifecycle events from all chains)
//! ```

pub mod agent;
pub mod pattern;
pub mod roster;
pub mod runner;

// Re-export commonly used types
pub use agent::{AgentState, EventSink, StubAgent};
pub use pattern::{LaunchStats, SpawnOutcome, SpawnPattern};
pub use roster::Roster;
pub use runner::{RunSummary, SwarmRunner};
