// src/swarm/agent.rs
//! Agent lifecycle simulator
//!
//! A `StubAgent` does no real work: once started it pins a ballast
//! allocation of its configured size, waits out its TTL, then releases the
//! ballast and reports completion. Completion hands off to the agent's
//! successor when one is chained, which is the only coupling between agents.

use crate::recording::event::Event;
use crate::swarm::roster::Roster;
use crate::utils::errors::{HarnessError, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle states of a simulated agent
///
/// `Pending → Running → Done` is the only normal path; `Failed` is the
/// terminal state of an agent whose ballast allocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AgentState {
    Pending = 0,
    Running = 1,
    Done = 2,
    Failed = 3,
}

impl AgentState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => AgentState::Pending,
            1 => AgentState::Running,
            2 => AgentState::Done,
            _ => AgentState::Failed,
        }
    }

    /// Terminal states satisfy the orchestrator's completion wait and are
    /// excluded from the collector's active-agent count
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentState::Done | AgentState::Failed)
    }
}

/// Channel handle agents use to report lifecycle events
///
/// Clones share one unbounded channel into the collector's log-owning task,
/// so submission never blocks agent execution.
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<Event>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Submit one event; a closed channel means collection already stopped
    pub fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("event sink closed, dropping event");
        }
    }
}

/// Simulated memory footprint held for an agent's lifetime
///
/// Pages are written once so the footprint is resident and visible to the
/// resource probe, not just reserved address space.
struct Ballast {
    _bytes: Vec<u8>,
}

impl Ballast {
    fn allocate(memory_mb: u64) -> Option<Self> {
        let len = usize::try_from(memory_mb).ok()?.checked_mul(1024 * 1024)?;
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).ok()?;
        bytes.resize(len, 0xA5);
        Some(Self { _bytes: bytes })
    }
}

/// A single simulated unit of work
///
/// Identity and workload descriptor are fixed at roster-build time; only
/// the state word changes afterwards, and only from the agent's own
/// execution path.
pub struct StubAgent {
    id: usize,
    ttl_secs: u64,
    memory_mb: u64,
    successor: Option<usize>,
    state: AtomicU8,
}

impl StubAgent {
    pub(crate) fn new(id: usize, ttl_secs: u64, memory_mb: u64, successor: Option<usize>) -> Self {
        Self {
            id,
            ttl_secs,
            memory_mb,
            successor,
            state: AtomicU8::new(AgentState::Pending as u8),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn memory_mb(&self) -> u64 {
        self.memory_mb
    }

    /// Next agent in this handoff chain, if any
    pub fn successor(&self) -> Option<usize> {
        self.successor
    }

    /// Current lifecycle state, as seen at this instant
    pub fn state(&self) -> AgentState {
        AgentState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: AgentState, to: AgentState) -> Result<()> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| HarnessError::InvalidStateTransition {
                agent_id: self.id,
                from: AgentState::from_u8(actual),
                to,
            })
    }

    /// Begin execution: `Pending → Running`, pin ballast, report the start
    fn begin(&self, events: &EventSink) -> Result<Ballast> {
        self.transition(AgentState::Pending, AgentState::Running)?;

        let ballast = match Ballast::allocate(self.memory_mb) {
            Some(ballast) => ballast,
            None => {
                self.state.store(AgentState::Failed as u8, Ordering::Release);
                return Err(HarnessError::ResourceExhausted {
                    agent_id: self.id,
                    memory_mb: self.memory_mb,
                });
            }
        };

        info!(
            agent_id = self.id,
            ttl = self.ttl_secs,
            memory_mb = self.memory_mb,
            "agent start"
        );
        events.emit(Event::agent_start(self.id, self.ttl_secs, self.memory_mb));
        Ok(ballast)
    }

    /// Finish execution: `Running → Done`, report the measured lifetime
    fn finish(&self, lived_sec: f64, events: &EventSink) -> Result<()> {
        self.transition(AgentState::Running, AgentState::Done)?;

        info!(agent_id = self.id, lived_sec, "agent stop");
        events.emit(Event::agent_stop(
            self.id,
            self.ttl_secs,
            self.memory_mb,
            lived_sec,
        ));
        Ok(())
    }

    /// Run this agent to completion: start, hold ballast for its TTL,
    /// release and stop
    pub async fn run(&self, events: &EventSink) -> Result<()> {
        let ballast = self.begin(events)?;
        let started = Instant::now();

        tokio::time::sleep(Duration::from_secs(self.ttl_secs)).await;

        let lived_sec = started.elapsed().as_secs_f64();
        drop(ballast);
        self.finish(lived_sec, events)
    }
}

/// Run a handoff chain to completion, head first
///
/// Each completed agent triggers its successor before the task returns; a
/// failed agent ends its chain without starting the successor. Failures are
/// per-agent: they are logged and reflected in the agent's terminal state,
/// never propagated to other chains.
pub async fn run_chain(roster: Arc<Roster>, head: usize, events: EventSink) {
    let mut next = Some(head);

    while let Some(id) = next {
        let agent = roster.agent(id);
        next = agent.successor();

        if let Err(error) = agent.run(&events).await {
            warn!(agent_id = id, %error, "agent failed, chain stops here");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sink() -> (EventSink, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink::new(tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let agent = StubAgent::new(0, 5, 1, None);
        let (sink, mut rx) = sink();

        assert_eq!(agent.state(), AgentState::Pending);
        agent.run(&sink).await.unwrap();
        assert_eq!(agent.state(), AgentState::Done);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), "agent_start");
        assert_eq!(events[0].time_sec, Some(0.0));
        assert_eq!(events[1].kind(), "agent_stop");
        match events[1].body {
            crate::recording::event::EventBody::AgentStop { lived_sec, .. } => {
                assert!(lived_sec >= 5.0);
            }
            _ => panic!("expected agent_stop"),
        }
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let agent = StubAgent::new(1, 0, 0, None);
        let (sink, _rx) = sink();

        agent.run(&sink).await.unwrap();
        let err = agent.run(&sink).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::InvalidStateTransition {
                agent_id: 1,
                from: AgentState::Done,
                ..
            }
        ));
        // The second call must not re-enter Running
        assert_eq!(agent.state(), AgentState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_handoff_order() {
        let roster = Arc::new(Roster::from_agents(vec![
            StubAgent::new(0, 1, 0, Some(1)),
            StubAgent::new(1, 1, 0, None),
        ]));
        let (sink, mut rx) = sink();

        run_chain(Arc::clone(&roster), 0, sink).await;

        assert_eq!(roster.agent(0).state(), AgentState::Done);
        assert_eq!(roster.agent(1).state(), AgentState::Done);

        // Successor start strictly follows predecessor stop
        let kinds: Vec<_> = drain(&mut rx).iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec!["agent_start", "agent_stop", "agent_start", "agent_stop"]
        );
    }

    #[tokio::test]
    async fn test_allocation_failure_stops_chain() {
        // An absurd ballast size the allocator will refuse up front
        let huge = u64::MAX / (1024 * 1024);
        let roster = Arc::new(Roster::from_agents(vec![
            StubAgent::new(0, 0, huge, Some(1)),
            StubAgent::new(1, 0, 0, None),
        ]));
        let (sink, mut rx) = sink();

        run_chain(Arc::clone(&roster), 0, sink).await;

        assert_eq!(roster.agent(0).state(), AgentState::Failed);
        // Successor never started
        assert_eq!(roster.agent(1).state(), AgentState::Pending);
        assert!(drain(&mut rx).is_empty());
    }
}
