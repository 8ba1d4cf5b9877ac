//! JSONL file writer for vote events.
//!
//! Each [`VoteEvent`] is serialized as a single JSON line with a `type` field
//! and `timestamp`, appended to the file via a buffered writer. The file is
//! opened in append mode so the audit trail spans process runs.

use ledger_application::{VoteEvent, VoteEventLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL vote logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and on `Drop`.
pub struct JsonlVoteLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlVoteLogger {
    /// Open (or create) the log at `path` for appending.
    ///
    /// Creates parent directories if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create vote log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open vote log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VoteEventLogger for JsonlVoteLogger {
    fn log(&self, event: VoteEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Merge payload with type + timestamp
        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlVoteLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_domain::VoteChange;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_logger_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.jsonl");
        let logger = JsonlVoteLogger::new(&path).unwrap();

        let change = VoteChange::Cast {
            user: "u1".parse().unwrap(),
            quote: "q1".parse().unwrap(),
        };
        logger.log(VoteEvent::from_change(&change, 1));
        logger.log(VoteEvent::new(
            "quote_deleted",
            serde_json::json!({"user": "u1", "quote": "q1", "released_votes": 1}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
        }
        assert_eq!(lines[0]["type"], "vote_cast");
        assert_eq!(lines[0]["quote"], "q1");
        assert_eq!(lines[0]["votes"], 1);
        assert_eq!(lines[1]["type"], "quote_deleted");
    }

    #[test]
    fn test_jsonl_logger_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("votes.jsonl");

        for _ in 0..2 {
            let logger = JsonlVoteLogger::new(&path).unwrap();
            logger.log(VoteEvent::new("vote_withdrawn", serde_json::json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_jsonl_logger_handles_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.jsonl");
        let logger = JsonlVoteLogger::new(&path).unwrap();

        logger.log(VoteEvent::new(
            "simple_event",
            serde_json::json!("just a string"),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "simple_event");
        assert_eq!(lines[0]["data"], "just a string");
    }
}
