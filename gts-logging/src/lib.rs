//! gts-logging: append-only NDJSON logs for search run post-mortems.
//!
//! One JSON object per line. Readers are expected to be lenient: a crashed
//! run may leave a torn final line, which is skipped rather than rejected.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milliseconds since the Unix epoch, for event timestamps.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Emitted once when a run starts.
#[derive(Debug, Clone, Serialize)]
pub struct RunStartedEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub run_id: String,
    pub task_name: String,
    pub epsilon: f64,
    pub bound: i32,
    pub reopen_closed_nodes: bool,
    pub seed: u64,
}

/// Emitted once when a run reaches a terminal status or its step budget.
#[derive(Debug, Clone, Serialize)]
pub struct RunFinishedEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub run_id: String,
    /// "solved", "failed", or "budget".
    pub status: &'static str,
    pub steps: u64,
    pub plan_length: Option<usize>,
    pub plan_cost: Option<i32>,
    pub expanded: u64,
    pub evaluated: u64,
    pub generated: u64,
    pub reopened: u64,
    pub dead_ends: u64,
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for NdjsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "ndjson io error: {e}"),
            Self::Json(e) => write!(f, "ndjson encode error: {e}"),
        }
    }
}

impl std::error::Error for NdjsonError {}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append, creating it if needed. `flush_every_lines=0`
    /// disables periodic flushing.
    pub fn open_append(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use serde_json::Value;

    fn read_ndjson_lenient(path: &Path) -> Vec<Value> {
        let s = fs::read_to_string(path).expect("read");
        s.lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .collect()
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn writes_one_valid_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ndjson");
        let mut w = NdjsonWriter::open_append(&path, 0).unwrap();

        w.write_event(&RunStartedEventV1 {
            event: "run_started",
            ts_ms: 1,
            run_id: "r1".to_string(),
            task_name: "grid-4x4".to_string(),
            epsilon: 0.001,
            bound: i32::MAX,
            reopen_closed_nodes: false,
            seed: 0,
        })
        .unwrap();
        w.write_event(&RunFinishedEventV1 {
            event: "run_finished",
            ts_ms: 2,
            run_id: "r1".to_string(),
            status: "solved",
            steps: 12,
            plan_length: Some(6),
            plan_cost: Some(6),
            expanded: 12,
            evaluated: 20,
            generated: 24,
            reopened: 0,
            dead_ends: 1,
        })
        .unwrap();
        w.flush().unwrap();

        let vals = read_ndjson_lenient(&path);
        assert_eq!(vals.len(), 2);
        assert_eq!(vals[0]["event"], "run_started");
        assert_eq!(vals[1]["status"], "solved");
        assert_eq!(vals[1]["plan_cost"], 6);
    }

    #[test]
    fn periodic_flush_keeps_lines_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ndjson");
        let mut w = NdjsonWriter::open_append(&path, 2).unwrap();

        #[derive(Serialize)]
        struct E {
            n: u32,
        }
        w.write_event(&E { n: 1 }).unwrap();
        w.write_event(&E { n: 2 }).unwrap();
        // Two lines written, flush threshold reached: both on disk without
        // an explicit flush.
        let vals = read_ndjson_lenient(&path);
        assert_eq!(vals.len(), 2);
    }

    #[test]
    fn lenient_reader_tolerates_trailing_partial_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ndjson");

        {
            let mut w = NdjsonWriter::open_append(&path, 0).unwrap();
            #[derive(Serialize)]
            struct E {
                n: u32,
            }
            w.write_event(&E { n: 1 }).unwrap();
            w.flush().unwrap();
        }

        // Simulate a crash: a torn, newline-less final record.
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(br#"{"n":"#).unwrap();
        f.flush().unwrap();

        let vals = read_ndjson_lenient(&path);
        assert_eq!(vals.len(), 1);
        assert_eq!(vals[0]["n"], 1);
    }
}
