// src/swarm/roster.rs
//! Roster construction
//!
//! Samples each agent's TTL and ballast size once at build time and wires
//! successor chains according to the spawn pattern. Successors are indexes
//! into the roster vector, always pointing forward, so chains are acyclic
//! by construction. The roster is immutable after build; only each agent's
//! own state word changes afterwards, which is why the sampling loop may
//! read it without locks.

use crate::swarm::agent::{AgentState, StubAgent};
use crate::swarm::pattern::SpawnPattern;
use crate::utils::config::SwarmConfig;
use rand::Rng;
use tracing::debug;

/// The full set of agents for one run
pub struct Roster {
    agents: Vec<StubAgent>,
}

impl Roster {
    /// Build `num_agents` agents, sampling workloads from the configured
    /// ranges and chaining successors as the pattern requires
    pub fn build<R: Rng>(config: &SwarmConfig, pattern: &SpawnPattern, rng: &mut R) -> Self {
        let total = config.num_agents;
        let mut agents = Vec::with_capacity(total);

        for id in 0..total {
            let ttl = rng.gen_range(config.ttl_range[0]..=config.ttl_range[1]);
            let memory_mb = rng.gen_range(config.memory_range[0]..=config.memory_range[1]);
            let successor = pattern.successor_of(id, total);

            debug!(agent_id = id, ttl, memory_mb, ?successor, "built agent");
            agents.push(StubAgent::new(id, ttl, memory_mb, successor));
        }

        Self { agents }
    }

    #[cfg(test)]
    pub(crate) fn from_agents(agents: Vec<StubAgent>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent(&self, id: usize) -> &StubAgent {
        &self.agents[id]
    }

    pub fn agents(&self) -> &[StubAgent] {
        &self.agents
    }

    /// Agents not yet in a terminal state, as seen at this instant
    ///
    /// Reads race with agent transitions; a sample may be momentarily
    /// stale, never corrupt.
    pub fn active_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|agent| !agent.state().is_terminal())
            .count()
    }

    /// Number of agents currently in `state`
    pub fn count_in(&self, state: AgentState) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.state() == state)
            .count()
    }
}
