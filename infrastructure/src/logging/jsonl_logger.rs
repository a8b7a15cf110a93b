//! JSONL transcript writer for discussion events.
//!
//! Each [`ConversationEvent`] becomes one JSON object per line carrying a
//! `type`, the `round` when the event has one, and a `timestamp` next to the
//! event payload.

use agora_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Discussion transcript logger that appends one JSON object per line.
///
/// Lines are flushed as they are written so a crash leaves every completed
/// event on disk.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    write_failed: AtomicBool,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            write_failed: AtomicBool::new(false),
        })
    }

    /// Path of the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// Merge the event type, round and timestamp into the payload.
///
/// Object payloads are extended in place; any other payload is nested under
/// `data`.
fn to_record(event: ConversationEvent, at: DateTime<Utc>) -> Value {
    let timestamp = Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true));
    let event_type = Value::String(event.kind.as_str().to_string());

    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), event_type);
    if let Some(round) = event.round {
        map.insert("round".to_string(), Value::from(round));
    }
    map.insert("timestamp".to_string(), timestamp);
    Value::Object(map)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let kind = event.kind;
        let record = to_record(event, Utc::now());

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Err(e) = self.write_line(&line) {
            // Warn on the first failure only; the transcript is best effort.
            if !self.write_failed.swap(true, Ordering::Relaxed) {
                warn!(
                    "Could not write {} event to {}: {}",
                    kind,
                    self.path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_application::ports::conversation_logger::EventKind;
    use chrono::TimeZone;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcripts").join("debate.jsonl");
        let logger = JsonlConversationLogger::create(&path).unwrap();

        logger.log(ConversationEvent::in_round(
            EventKind::RoundStart,
            1,
            json!({ "points": ["Is ethics universal?"] }),
        ));
        logger.log(ConversationEvent::in_round(
            EventKind::AgentResponse,
            1,
            json!({ "author": "Claude", "content": "I agree", "degraded": false }),
        ));
        logger.log(ConversationEvent::session(
            EventKind::SessionTerminated,
            json!({ "rounds_completed": 1, "reason": "max_rounds" }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "round_start");
        assert_eq!(lines[0]["round"], 1);
        assert_eq!(lines[0]["points"][0], "Is ethics universal?");
        assert_eq!(lines[1]["type"], "agent_response");
        assert_eq!(lines[1]["author"], "Claude");
        assert_eq!(lines[2]["type"], "session_terminated");
        assert!(lines[2].get("round").is_none());
        assert!(lines.iter().all(|l| l["timestamp"].is_string()));
    }

    #[test]
    fn test_appends_to_existing_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate.jsonl");

        let first = JsonlConversationLogger::create(&path).unwrap();
        first.log(ConversationEvent::in_round(EventKind::RoundComplete, 1, json!({})));
        drop(first);

        let second = JsonlConversationLogger::create(&path).unwrap();
        second.log(ConversationEvent::in_round(EventKind::RoundComplete, 2, json!({})));
        drop(second);

        let rounds: Vec<_> = read_lines(&path).iter().map(|l| l["round"].clone()).collect();
        assert_eq!(rounds, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_record_nests_non_object_payload() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record = to_record(
            ConversationEvent::in_round(EventKind::NextPoints, 2, json!(["Why?", "How?"])),
            at,
        );

        assert_eq!(record["type"], "next_points");
        assert_eq!(record["round"], 2);
        assert_eq!(record["timestamp"], "2024-01-01T12:00:00.000Z");
        assert_eq!(record["data"], json!(["Why?", "How?"]));
    }

    #[test]
    fn test_create_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        assert!(JsonlConversationLogger::create(blocker.join("debate.jsonl")).is_err());
    }
}
