//! Interaction log: one JSONL line per output invocation.
//!
//! Records which output was computed, the control values it saw, how many
//! charts it produced, and how long it took. Writing is best-effort: a
//! failure to log never affects the response.
//!
//! Log file: `~/.chartboard/events.jsonl` by default.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::controls::ControlValues;
use crate::dashboard::OutputValue;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub timestamp: String,
    pub dashboard: String,
    pub output: String,
    /// Values of the output's declared inputs.
    pub values: ControlValues,
    /// Number of charts produced (0 for empty or non-chart outputs).
    pub charts: usize,
    /// The output had nothing to show.
    #[serde(default)]
    pub empty: bool,
    pub duration_us: u64,
}

impl InteractionEvent {
    /// Event for one computed output, stamped with the current time.
    pub fn now(
        dashboard: &str,
        output: &str,
        values: ControlValues,
        value: &OutputValue,
        duration_us: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            dashboard: dashboard.to_string(),
            output: output.to_string(),
            values,
            charts: value.chart_count(),
            empty: value.is_empty(),
            duration_us,
        }
    }
}

// ---------------------------------------------------------------------------
// Log file
// ---------------------------------------------------------------------------

/// Append-only JSONL log. Disabled logs accept and drop events.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn from_config(cfg: &LoggingConfig) -> Self {
        Self {
            path: cfg.enabled.then(|| cfg.resolved_path()),
        }
    }

    pub fn at(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event. Failures are silently ignored.
    pub fn record(&self, event: &InteractionEvent) {
        let _ = self.append(event);
    }

    fn append(&self, event: &InteractionEvent) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every event, skipping malformed lines. A missing file reads as
    /// an empty log.
    pub fn read_all(&self) -> Vec<InteractionEvent> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<InteractionEvent>(&line).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("chartboard-test-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn record_then_read_back() {
        let path = temp_log("events.jsonl");
        let log = EventLog::at(&path);

        let values = ControlValues::new().with("site-dropdown", "All Sites");
        log.record(&InteractionEvent::now("launches", "success-pie-chart", values.clone(), &OutputValue::Empty, 42));
        log.record(&InteractionEvent::now(
            "launches",
            "success-pie-chart",
            values,
            &OutputValue::Disabled(false),
            58,
        ));

        let events = log.read_all();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].output, "success-pie-chart");
        assert_eq!(events[1].duration_us, 58);
        assert!(events[0].empty);
        assert!(!events[1].empty);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_log("malformed.jsonl");
        create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json\n").unwrap();

        let log = EventLog::at(&path);
        log.record(&InteractionEvent::now("sales", "output-container", ControlValues::new(), &OutputValue::Empty, 1));
        assert_eq!(log.read_all().len(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn disabled_log_drops_events() {
        let log = EventLog::disabled();
        log.record(&InteractionEvent::now("sales", "x", ControlValues::new(), &OutputValue::Empty, 0));
        assert!(log.read_all().is_empty());
        assert!(log.path().is_none());
    }
}
