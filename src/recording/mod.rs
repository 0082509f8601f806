// src/recording/mod.rs
//! Event recording and persistence
//!
//! This module provides the measurement half of the harness:
//!
//! - **Event**: Tagged run-log record model
//! - **Probe**: Host CPU/memory utilization sampling
//! - **Collector**: Concurrent event capture plus periodic resource ticks
//! - **Exporter**: JSON and CSV persistence of the run log
//!
//! # Architecture
//!
//! ```text
//! Agent ──> EventSink ──> mpsc ──> sampling task ──> EventLog
//!                                      │                 │
//!                                 SystemProbe        exporter
//!                                 (every tick)     (JSON + CSV)
//! ```

pub mod collector;
pub mod event;
pub mod exporter;
pub mod probe;

// Re-export commonly used types
pub use collector::{CollectorConfig, StatsCollector};
pub use event::{Event, EventBody, EventLog};
pub use exporter::SavedLog;
pub use probe::{ResourceSample, SystemProbe};
