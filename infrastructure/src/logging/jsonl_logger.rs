//! JSONL file writer for transcript events.
//!
//! Each [`TranscriptEvent`] becomes one JSON line with `type`, `session`,
//! and `timestamp` fields merged over the event payload, appended through
//! a buffered writer.

use parley_application::ports::transcript_logger::{TranscriptEvent, TranscriptLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Transcript logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`; flushed after every record
/// so a crash loses at most the in-flight line.
pub struct JsonlTranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open (or create) the log file at `path`, appending to existing
    /// content. Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open transcript log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptLogger for JsonlTranscriptLogger {
    fn log(&self, event: TranscriptEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match event.payload {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), event.event_type.into());
        record.insert("session".to_string(), event.session_id.into());
        record.insert("timestamp".to_string(), timestamp.into());

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
            .trim()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");
        let logger = JsonlTranscriptLogger::new(&path).unwrap();

        logger.log(TranscriptEvent::new(
            "message_sent",
            "s1",
            serde_json::json!({ "content": "hello" }),
        ));
        logger.log(TranscriptEvent::new(
            "turn_completed",
            "s1",
            serde_json::json!({ "reply_bytes": 12 }),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "message_sent");
        assert_eq!(records[0]["session"], "s1");
        assert_eq!(records[0]["content"], "hello");
        assert!(records[0].get("timestamp").is_some());
        assert_eq!(records[1]["type"], "turn_completed");
        assert_eq!(records[1]["reply_bytes"], 12);
    }

    #[test]
    fn appends_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");

        {
            let logger = JsonlTranscriptLogger::new(&path).unwrap();
            logger.log(TranscriptEvent::new("message_sent", "s1", serde_json::json!({})));
        }
        {
            let logger = JsonlTranscriptLogger::new(&path).unwrap();
            logger.log(TranscriptEvent::new("message_sent", "s1", serde_json::json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");
        let logger = JsonlTranscriptLogger::new(&path).unwrap();

        logger.log(TranscriptEvent::new(
            "note",
            "s1",
            serde_json::json!("just a string"),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["data"], "just a string");
    }
}
