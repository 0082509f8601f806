// src/swarm/runner.rs
//! Run orchestration
//!
//! Composes roster, collector, and spawn pattern into a complete run:
//! build and wire the roster, start the collector, launch the pattern,
//! wait for every agent to reach a terminal state, then stop the collector
//! and persist. A run is a two-state machine, running then finished, with
//! the single forward transition gated on all agents being terminal (or an
//! external stop arriving first).

use crate::recording::collector::{CollectorConfig, StatsCollector};
use crate::recording::exporter::SavedLog;
use crate::swarm::agent::AgentState;
use crate::swarm::pattern::{spawn_swarm, LaunchStats, SpawnOutcome, SpawnPattern};
use crate::swarm::roster::Roster;
use crate::utils::config::SwarmConfig;
use crate::utils::errors::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one completed (or interrupted) run
#[derive(Debug)]
pub struct RunSummary {
    pub total_agents: usize,

    /// Agents that reached `Done`
    pub completed: usize,

    /// Agents that failed terminally (counted apart from completions)
    pub failed: usize,

    /// Records in the persisted log
    pub events_recorded: usize,

    /// Scheduler accounting: explicit starts and inter-burst sleeps
    pub launch: LaunchStats,

    /// Where the log pair landed
    pub saved: SavedLog,

    /// Whether an external stop cut the run short
    pub interrupted: bool,
}

/// Orchestrates one swarm run
pub struct SwarmRunner {
    config: SwarmConfig,
}

impl SwarmRunner {
    /// Validates the configuration up front; no agent is built on error
    pub fn new(config: SwarmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the swarm to completion
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run until all agents are terminal or `shutdown` resolves
    ///
    /// On early shutdown the in-flight agents are aborted, and the
    /// collector still stops and persists whatever was recorded.
    pub async fn run_with_shutdown(&self, shutdown: impl Future<Output = ()>) -> Result<RunSummary> {
        let config = &self.config;
        info!(
            agents = config.num_agents,
            pattern = %config.pattern.kind,
            "starting swarm"
        );

        let pattern = SpawnPattern::resolve(&config.pattern);
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let roster = Arc::new(Roster::build(config, &pattern, &mut rng));

        let mut collector = StatsCollector::new(
            CollectorConfig {
                interval_secs: config.stats_interval,
                out_dir: config.log_dir.clone(),
            },
            Arc::clone(&roster),
        );
        let sink = collector.sink();
        collector.start()?;

        let mut launch = LaunchStats::default();
        let mut interrupted = false;
        tokio::pin!(shutdown);

        tokio::select! {
            outcome = spawn_swarm(&roster, &pattern, &sink) => {
                let SpawnOutcome { mut tasks, stats } = outcome;
                launch = stats;

                loop {
                    tokio::select! {
                        joined = tasks.join_next() => match joined {
                            None => break,
                            Some(Err(join_error)) if !join_error.is_cancelled() => {
                                warn!(error = %join_error, "agent chain task failed");
                            }
                            Some(_) => {}
                        },
                        _ = &mut shutdown, if !interrupted => {
                            warn!("external stop requested, aborting remaining agents");
                            tasks.abort_all();
                            interrupted = true;
                        }
                    }
                }
            }
            // Dropping the launch future aborts every chain it spawned
            _ = &mut shutdown => {
                warn!("external stop requested during launch, aborting");
                interrupted = true;
            }
        }

        let saved = collector.stop().await?;

        let completed = roster.count_in(AgentState::Done);
        let failed = roster.count_in(AgentState::Failed);
        info!(completed, failed, interrupted, "swarm finished");

        Ok(RunSummary {
            total_agents: roster.len(),
            completed,
            failed,
            events_recorded: collector.events().len(),
            launch,
            saved,
            interrupted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::event::{Event, EventBody};
    use std::time::Duration;

    fn config(dir: &std::path::Path) -> SwarmConfig {
        SwarmConfig {
            num_agents: 3,
            ttl_range: [1, 1],
            memory_range: [1, 2],
            stats_interval: 1.0,
            log_dir: dir.to_path_buf(),
            seed: Some(42),
            ..Default::default()
        }
    }

    fn load_log(saved: &crate::recording::exporter::SavedLog) -> Vec<Event> {
        let body = std::fs::read_to_string(&saved.json_path).unwrap();
        serde_json::from_str(&body).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_at_once_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SwarmRunner::new(config(dir.path())).unwrap();

        let summary = runner.run().await.unwrap();

        assert_eq!(summary.total_agents, 3);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.failed, 0);
        assert!(!summary.interrupted);
        assert_eq!(summary.launch.explicit_starts.len(), 3);
        assert_eq!(summary.launch.sleep_count, 0);

        let events = load_log(&summary.saved);
        assert_eq!(events.len(), summary.events_recorded);

        let starts: Vec<_> = events
            .iter()
            .filter(|e| matches!(e.body, EventBody::AgentStart { .. }))
            .collect();
        let stops: Vec<_> = events
            .iter()
            .filter(|e| matches!(e.body, EventBody::AgentStop { .. }))
            .collect();
        assert_eq!(starts.len(), 3);
        assert_eq!(stops.len(), 3);
        for start in &starts {
            assert_eq!(start.time_sec, Some(0.0));
        }
        for stop in &stops {
            match stop.body {
                EventBody::AgentStop { lived_sec, ttl, .. } => {
                    assert!(lived_sec >= ttl as f64);
                    assert!(lived_sec < ttl as f64 + 0.5);
                }
                _ => unreachable!(),
            }
        }

        // At least one sample, and the swarm drains to zero active agents
        let ticks: Vec<_> = events
            .iter()
            .filter_map(|e| match e.body {
                EventBody::StatsTick {
                    active_agents,
                    total_agents,
                    ..
                } => Some((active_agents, total_agents)),
                _ => None,
            })
            .collect();
        assert!(!ticks.is_empty());
        for (active, total) in &ticks {
            assert!(active <= total);
            assert_eq!(*total, 3);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_runs_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.pattern.kind = "linear".to_string();
        let runner = SwarmRunner::new(cfg).unwrap();

        let summary = runner.run().await.unwrap();

        assert_eq!(summary.completed, 3);
        assert_eq!(summary.launch.explicit_starts, vec![0]);

        // One chain: each start strictly follows its predecessor's stop
        let events = load_log(&summary.saved);
        let lifecycle: Vec<&'static str> = events
            .iter()
            .filter(|e| !matches!(e.body, EventBody::StatsTick { .. }))
            .map(|e| e.kind())
            .collect();
        assert_eq!(
            lifecycle,
            vec![
                "agent_start",
                "agent_stop",
                "agent_start",
                "agent_stop",
                "agent_start",
                "agent_stop",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_bursts_launch_accounting() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.num_agents = 10;
        cfg.pattern.kind = "bursts".to_string();
        cfg.pattern.params.agents_per_burst = 3;
        cfg.pattern.params.burst_interval = 1;
        let runner = SwarmRunner::new(cfg).unwrap();

        let summary = runner.run().await.unwrap();

        assert_eq!(summary.completed, 10);
        assert_eq!(summary.launch.explicit_starts, vec![0, 3, 6, 9]);
        assert_eq!(summary.launch.sleep_count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_stop_still_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.ttl_range = [600, 600];
        let runner = SwarmRunner::new(cfg).unwrap();

        let summary = runner
            .run_with_shutdown(tokio::time::sleep(Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.completed, 0);

        // Whatever was recorded before the stop made it to disk
        let events = load_log(&summary.saved);
        assert_eq!(events.len(), summary.events_recorded);
        let starts = events
            .iter()
            .filter(|e| matches!(e.body, EventBody::AgentStart { .. }))
            .count();
        assert_eq!(starts, 3);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_build() {
        let bad = SwarmConfig {
            num_agents: 0,
            ..Default::default()
        };
        assert!(SwarmRunner::new(bad).is_err());
    }
}
