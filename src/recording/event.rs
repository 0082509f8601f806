// src/recording/event.rs
//! Event model for the run log
//!
//! Every record in a run's log is one `Event`: a shared `time_sec` base plus
//! a tagged body per kind. The tagged representation serializes to the same
//! shape as a loose dictionary (an `event` discriminator next to the kind's
//! own fields), so the persisted log stays schema-flexible while field
//! access in code is type-checked.

use serde::{Deserialize, Serialize};

/// The ordered, append-only record sequence of one run
pub type EventLog = Vec<Event>;

/// Seconds rounded to one decimal, the resolution of the run log
pub fn round1(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}

/// One record in the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since collector start; `None` until the collector stamps it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_sec: Option<f64>,

    /// Kind-specific payload, flattened beside `time_sec`
    #[serde(flatten)]
    pub body: EventBody,
}

/// Kind-specific event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventBody {
    /// An agent transitioned to `Running` and pinned its ballast
    AgentStart {
        agent_id: usize,
        ttl: u64,
        memory_mb: u64,
    },

    /// An agent released its ballast and transitioned to `Done`
    AgentStop {
        agent_id: usize,
        ttl: u64,
        memory_mb: u64,
        lived_sec: f64,
    },

    /// One periodic resource sample taken by the collector
    StatsTick {
        active_agents: usize,
        total_agents: usize,
        cpu_percent: f64,
        mem_percent: f64,
    },
}

impl Event {
    /// Start record; timed relative to the agent's own start, which is
    /// always zero
    pub fn agent_start(agent_id: usize, ttl: u64, memory_mb: u64) -> Self {
        Self {
            time_sec: Some(0.0),
            body: EventBody::AgentStart {
                agent_id,
                ttl,
                memory_mb,
            },
        }
    }

    /// Stop record; the collector stamps its arrival time
    pub fn agent_stop(agent_id: usize, ttl: u64, memory_mb: u64, lived_sec: f64) -> Self {
        Self {
            time_sec: None,
            body: EventBody::AgentStop {
                agent_id,
                ttl,
                memory_mb,
                lived_sec: round1(lived_sec),
            },
        }
    }

    /// Resource sample record, stamped by the sampling loop itself
    pub fn stats_tick(
        time_sec: f64,
        active_agents: usize,
        total_agents: usize,
        cpu_percent: f64,
        mem_percent: f64,
    ) -> Self {
        Self {
            time_sec: Some(round1(time_sec)),
            body: EventBody::StatsTick {
                active_agents,
                total_agents,
                cpu_percent,
                mem_percent,
            },
        }
    }

    /// The `event` discriminator this record serializes with
    pub fn kind(&self) -> &'static str {
        match self.body {
            EventBody::AgentStart { .. } => "agent_start",
            EventBody::AgentStop { .. } => "agent_stop",
            EventBody::StatsTick { .. } => "stats_tick",
        }
    }
}
