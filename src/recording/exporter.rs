// src/recording/exporter.rs
//! Run log persistence
//!
//! Writes one run's log in two shapes: a JSON document preserving every
//! event verbatim in insertion order, and a flat CSV whose header is the
//! sorted union of every field observed across all events, with absent
//! fields rendered empty. Filenames carry the save-time stamp so repeated
//! runs never clobber each other. The JSON document is staged to a temp
//! path and renamed, so a reader never observes a partial log.

use crate::recording::event::Event;
use crate::utils::errors::{HarnessError, Result};
use chrono::Local;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Paths of one persisted log pair
#[derive(Debug, Clone)]
pub struct SavedLog {
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Persist `events` under `out_dir`, stamped with the save time
pub async fn persist(events: &[Event], out_dir: &Path) -> Result<SavedLog> {
    fs::create_dir_all(out_dir)
        .await
        .map_err(|source| HarnessError::Persistence {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let json_path = out_dir.join(format!("stats_{stamp}.json"));
    let csv_path = out_dir.join(format!("stats_{stamp}.csv"));

    write_json(events, &json_path).await?;
    write_csv(events, &csv_path).await?;

    info!(
        json = %json_path.display(),
        csv = %csv_path.display(),
        "saved run log"
    );

    Ok(SavedLog {
        json_path,
        csv_path,
    })
}

async fn write_json(events: &[Event], path: &Path) -> Result<()> {
    let body = serde_json::to_vec_pretty(events)?;

    let staged = path.with_extension("json.tmp");
    fs::write(&staged, &body)
        .await
        .map_err(|source| HarnessError::Persistence {
            path: staged.clone(),
            source,
        })?;
    fs::rename(&staged, path)
        .await
        .map_err(|source| HarnessError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}

async fn write_csv(events: &[Event], path: &Path) -> Result<()> {
    let mut rows = Vec::with_capacity(events.len());
    for event in events {
        // Events always serialize to objects (tag + flattened fields)
        if let Value::Object(map) = serde_json::to_value(event)? {
            rows.push(map);
        }
    }

    let mut columns: BTreeSet<String> = BTreeSet::new();
    for row in &rows {
        columns.extend(row.keys().cloned());
    }
    let columns: Vec<String> = columns.into_iter().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in &rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).map(render_cell).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    let body = writer
        .into_inner()
        .map_err(|error| HarnessError::Persistence {
            path: path.to_path_buf(),
            source: error.into_error(),
        })?;

    fs::write(path, &body)
        .await
        .map_err(|source| HarnessError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}

/// CSV cell rendering: bare strings, JSON text for everything else
fn render_cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> Vec<Event> {
        vec![
            Event::agent_start(0, 2, 64),
            Event::stats_tick(1.0, 1, 2, 12.5, 40.0),
            Event {
                time_sec: Some(2.0),
                ..Event::agent_stop(0, 2, 64, 2.0)
            },
        ]
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let events = sample_log();

        let saved = persist(&events, dir.path()).await.unwrap();

        let body = std::fs::read_to_string(&saved.json_path).unwrap();
        let reloaded: Vec<Event> = serde_json::from_str(&body).unwrap();
        assert_eq!(reloaded, events);

        // No staging leftovers
        assert!(!saved.json_path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_csv_is_the_union_of_columns() {
        let dir = tempfile::tempdir().unwrap();
        let events = sample_log();

        let saved = persist(&events, dir.path()).await.unwrap();

        let mut reader = csv::Reader::from_path(&saved.csv_path).unwrap();
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();

        // Every field present on any event appears exactly once, sorted
        for column in [
            "active_agents",
            "agent_id",
            "cpu_percent",
            "event",
            "lived_sec",
            "mem_percent",
            "memory_mb",
            "time_sec",
            "total_agents",
            "ttl",
        ] {
            assert!(header.contains(&column.to_string()), "missing {column}");
        }
        let mut sorted = header.clone();
        sorted.sort();
        assert_eq!(header, sorted);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), events.len());

        // Fields absent on a given event render as empty cells
        let event_col = header.iter().position(|c| c == "event").unwrap();
        let lived_col = header.iter().position(|c| c == "lived_sec").unwrap();
        let start_row = rows
            .iter()
            .find(|r| &r[event_col] == "agent_start")
            .unwrap();
        assert_eq!(&start_row[lived_col], "");
        let stop_row = rows.iter().find(|r| &r[event_col] == "agent_stop").unwrap();
        assert_eq!(&stop_row[lived_col], "2.0");
    }

    #[tokio::test]
    async fn test_empty_log_still_persists() {
        let dir = tempfile::tempdir().unwrap();
        let saved = persist(&[], dir.path()).await.unwrap();

        let body = std::fs::read_to_string(&saved.json_path).unwrap();
        let reloaded: Vec<Event> = serde_json::from_str(&body).unwrap();
        assert!(reloaded.is_empty());
        assert!(saved.csv_path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = persist(&sample_log(), &blocker.join("logs")).await;
        assert!(matches!(result, Err(HarnessError::Persistence { .. })));
    }
}
