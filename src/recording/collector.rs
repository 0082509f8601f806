// src/recording/collector.rs
//! Concurrent stats collector
//!
//! One background task owns the run log for the whole collection window.
//! Lifecycle events from concurrently executing agents arrive over an
//! unbounded channel and interleave with the task's own periodic resource
//! samples in real arrival order; nothing else touches the log until
//! `stop()` hands it back for persistence. Consumers needing a strict
//! timeline sort by `time_sec` afterwards.
//!
//! # Architecture
//!
//! ```text
//! Agent ─┐
//! Agent ─┼─ EventSink ──> mpsc ──> sampling task ──> EventLog
//! Agent ─┘                           │    ▲
//!                              SystemProbe │ interval tick
//! ```

use crate::recording::event::{round1, Event, EventLog};
use crate::recording::exporter::{self, SavedLog};
use crate::recording::probe::SystemProbe;
use crate::swarm::agent::EventSink;
use crate::swarm::roster::Roster;
use crate::utils::errors::{HarnessError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Collector configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Seconds between resource samples
    pub interval_secs: f64,

    /// Directory the JSON/CSV log pair is written into
    pub out_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5.0,
            out_dir: PathBuf::from("logs"),
        }
    }
}

/// Concurrent lifecycle-event and resource-sample collector
pub struct StatsCollector {
    config: CollectorConfig,
    roster: Arc<Roster>,
    tx: UnboundedSender<Event>,
    rx: Option<UnboundedReceiver<Event>>,
    cancel: CancellationToken,
    sampler: Option<JoinHandle<EventLog>>,

    /// Records retained after `stop()` so persistence can be retried
    events: EventLog,
}

impl StatsCollector {
    pub fn new(config: CollectorConfig, roster: Arc<Roster>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            roster,
            tx,
            rx: Some(rx),
            cancel: CancellationToken::new(),
            sampler: None,
            events: Vec::new(),
        }
    }

    /// Handle agents use to submit lifecycle events; wire this up before
    /// any agent starts
    pub fn sink(&self) -> EventSink {
        EventSink::new(self.tx.clone())
    }

    /// Record the time origin and launch the background sampling loop
    pub fn start(&mut self) -> Result<()> {
        let rx = self.rx.take().ok_or(HarnessError::AlreadyStarted)?;

        let interval = Duration::try_from_secs_f64(self.config.interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                HarnessError::ConfigValidation("stats_interval must be a positive number".to_string())
            })?;

        let t0 = Instant::now();
        let roster = Arc::clone(&self.roster);
        let cancel = self.cancel.clone();

        info!(interval_secs = self.config.interval_secs, "starting stats collector");
        self.sampler = Some(tokio::spawn(sampling_loop(rx, roster, cancel, interval, t0)));
        Ok(())
    }

    /// Stop sampling, drain in-flight events, persist the log
    ///
    /// The loop exits as soon as the stop signal lands, never waiting out a
    /// full interval. The collected records stay in memory even when
    /// persistence fails, so a caller may fix the output directory and call
    /// `persist()` again.
    pub async fn stop(&mut self) -> Result<SavedLog> {
        let sampler = self.sampler.take().ok_or(HarnessError::NotStarted)?;

        self.cancel.cancel();
        self.events = sampler.await.unwrap_or_else(|join_error| {
            error!(error = %join_error, "sampling task panicked, records lost");
            Vec::new()
        });

        info!(events = self.events.len(), "stats collector stopped");
        self.persist().await
    }

    /// Write the collected log to the configured output directory
    pub async fn persist(&self) -> Result<SavedLog> {
        exporter::persist(&self.events, &self.config.out_dir).await
    }

    /// The records collected so far (complete only after `stop()`)
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Background loop: absorbs lifecycle events as they arrive and samples
/// host resources on a fixed cadence until cancelled
async fn sampling_loop(
    mut rx: UnboundedReceiver<Event>,
    roster: Arc<Roster>,
    cancel: CancellationToken,
    interval: Duration,
    t0: Instant,
) -> EventLog {
    let mut probe = SystemProbe::new();
    let mut events: EventLog = Vec::new();

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            received = rx.recv() => match received {
                Some(event) => events.push(stamp(event, t0)),
                // Every sink dropped; nothing more can arrive
                None => break,
            },

            _ = ticker.tick() => {
                let sample = probe.sample();
                let elapsed = t0.elapsed().as_secs_f64();
                let active = roster.active_count();
                let total = roster.len();

                info!(
                    t_sec = round1(elapsed),
                    active,
                    total,
                    cpu_percent = sample.cpu_percent,
                    mem_percent = sample.mem_percent,
                    "stats tick"
                );
                events.push(Event::stats_tick(
                    elapsed,
                    active,
                    total,
                    sample.cpu_percent,
                    sample.mem_percent,
                ));
            }
        }
    }

    // Drain whatever was submitted before the stop signal landed
    while let Ok(event) = rx.try_recv() {
        events.push(stamp(event, t0));
    }

    events
}

/// Stamp an event's arrival time unless its emitter already timed it
fn stamp(mut event: Event, t0: Instant) -> Event {
    if event.time_sec.is_none() {
        event.time_sec = Some(round1(t0.elapsed().as_secs_f64()));
    }
    event
}
