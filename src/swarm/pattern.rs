// src/swarm/pattern.rs
//! Spawn patterns
//!
//! A pattern decides which agents receive an explicit start and when;
//! everything else propagates through successor handoff. `bursts` starts
//! one agent per group and sleeps between groups; `linear` starts only the
//! head of a single chain. The burst interval is therefore a delay between
//! group launches, not a wall-clock cadence: a group's tail agents start
//! only as their predecessors finish, so a slow group stretches past the
//! interval.

use crate::swarm::agent::{run_chain, EventSink};
use crate::swarm::roster::Roster;
use crate::utils::config::PatternConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Resolved launch policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnPattern {
    /// Start every agent immediately, no chaining
    AllAtOnce,

    /// Chain agents inside fixed-size groups; start group heads one burst
    /// interval apart
    Bursts {
        agents_per_burst: usize,
        burst_interval_secs: u64,
    },

    /// One chain across the whole roster, a single explicit start
    Linear,
}

impl SpawnPattern {
    /// Resolve the configured pattern tag, warning and falling back to
    /// `all_at_once` when the tag is unknown
    pub fn resolve(config: &PatternConfig) -> Self {
        match config.kind.as_str() {
            "all_at_once" => SpawnPattern::AllAtOnce,
            "bursts" => SpawnPattern::Bursts {
                agents_per_burst: config.params.agents_per_burst,
                burst_interval_secs: config.params.burst_interval,
            },
            "linear" => SpawnPattern::Linear,
            other => {
                warn!(pattern = other, "unknown spawn pattern, defaulting to all_at_once");
                SpawnPattern::AllAtOnce
            }
        }
    }

    /// Successor index for agent `id` in a roster of `total`, per this
    /// pattern's chaining policy
    pub fn successor_of(&self, id: usize, total: usize) -> Option<usize> {
        let next = id + 1;
        if next >= total {
            return None;
        }

        match self {
            SpawnPattern::AllAtOnce => None,
            SpawnPattern::Linear => Some(next),
            SpawnPattern::Bursts {
                agents_per_burst, ..
            } => {
                // Chains never cross a group boundary
                if next % agents_per_burst == 0 {
                    None
                } else {
                    Some(next)
                }
            }
        }
    }
}

/// Accounting for one scheduler invocation
#[derive(Debug, Clone, Default)]
pub struct LaunchStats {
    /// Agents that received an explicit start, in launch order
    pub explicit_starts: Vec<usize>,

    /// Number of inter-burst delays taken
    pub sleep_count: usize,
}

/// Tasks and accounting produced by `spawn_swarm`
pub struct SpawnOutcome {
    /// One task per launched chain; joining the set means every started
    /// agent reached a terminal state
    pub tasks: JoinSet<()>,

    pub stats: LaunchStats,
}

/// Launch the roster according to `pattern`
///
/// Returns once every explicit start has been issued; chain execution
/// continues on the spawned tasks. An empty roster is a no-op.
pub async fn spawn_swarm(
    roster: &Arc<Roster>,
    pattern: &SpawnPattern,
    events: &EventSink,
) -> SpawnOutcome {
    let mut tasks = JoinSet::new();
    let mut stats = LaunchStats::default();

    if roster.is_empty() {
        return SpawnOutcome { tasks, stats };
    }

    match pattern {
        SpawnPattern::AllAtOnce => {
            info!(agents = roster.len(), "launching all agents at once");
            for id in 0..roster.len() {
                launch(&mut tasks, roster, id, events);
                stats.explicit_starts.push(id);
            }
        }
        SpawnPattern::Bursts {
            agents_per_burst,
            burst_interval_secs,
        } => {
            info!(
                per_burst = agents_per_burst,
                interval_secs = burst_interval_secs,
                "launching agents in bursts"
            );
            for head in (0..roster.len()).step_by(*agents_per_burst) {
                launch(&mut tasks, roster, head, events);
                stats.explicit_starts.push(head);

                tokio::time::sleep(Duration::from_secs(*burst_interval_secs)).await;
                stats.sleep_count += 1;
            }
        }
        SpawnPattern::Linear => {
            info!(agents = roster.len(), "launching agents in a linear chain");
            launch(&mut tasks, roster, 0, events);
            stats.explicit_starts.push(0);
        }
    }

    SpawnOutcome { tasks, stats }
}

fn launch(tasks: &mut JoinSet<()>, roster: &Arc<Roster>, head: usize, events: &EventSink) {
    tasks.spawn(run_chain(Arc::clone(roster), head, events.clone()));
}
