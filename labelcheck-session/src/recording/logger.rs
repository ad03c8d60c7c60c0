//! Background JSONL writer for recorded store traffic.
//!
//! The log file is opened before the writer starts, so a bad path fails at
//! startup instead of silently dropping every event. Several review
//! sessions may append to the same file; each line carries the id of the
//! session that wrote it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::RecordedEvent;

/// Metadata key holding the recording session id.
pub const SESSION_ID_KEY: &str = "session_id";

/// Events written per flush.
const BATCH_SIZE: usize = 64;

/// Handle to the writer task. Cheap to clone; all clones share one session id.
#[derive(Clone)]
pub struct RecordingLogger {
    session_id: Arc<str>,
    sender: mpsc::UnboundedSender<RecordedEvent>,
}

impl RecordingLogger {
    /// Open `path` for appending and start the writer task.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open recording log {}", path.display()))?;

        let session_id: Arc<str> = Uuid::new_v4().to_string().into();
        info!(
            "Recording store traffic for session {} to {}",
            session_id,
            path.display()
        );

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(write_events(BufWriter::new(file), receiver));

        Ok(Self { session_id, sender })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queue `event`, tagged with this session's id.
    pub fn record(&self, mut event: RecordedEvent) {
        event
            .metadata
            .entry(SESSION_ID_KEY.to_string())
            .or_insert_with(|| self.session_id.to_string());
        if self.sender.send(event).is_err() {
            warn!("Recording writer has stopped; dropping store event");
        }
    }
}

/// Drain the channel in batches, flushing after each batch.
async fn write_events(
    mut out: BufWriter<File>,
    mut receiver: mpsc::UnboundedReceiver<RecordedEvent>,
) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);
    while receiver.recv_many(&mut batch, BATCH_SIZE).await > 0 {
        for event in batch.drain(..) {
            let mut line = match serde_json::to_vec(&event) {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to serialize {} event: {}", event.operation, e);
                    continue;
                }
            };
            line.push(b'\n');
            if let Err(e) = out.write_all(&line).await {
                error!("Failed to write recording: {}", e);
                return;
            }
        }
        if let Err(e) = out.flush().await {
            error!("Failed to flush recording: {}", e);
            return;
        }
    }
    debug!("Recording writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Direction, EventType};
    use std::collections::HashMap;
    use std::time::Duration;

    fn event(operation: &str) -> RecordedEvent {
        RecordedEvent {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            correlation_id: "c-1".to_string(),
            event_type: EventType::StoreApiCall,
            direction: Direction::Request,
            operation: operation.to_string(),
            data: serde_json::Value::Null,
            metadata: HashMap::new(),
        }
    }

    /// Wait until the file holds `count` lines, then parse them.
    async fn read_events(path: &Path, count: usize) -> Vec<RecordedEvent> {
        let mut contents = String::new();
        for _ in 0..50 {
            contents = tokio::fs::read_to_string(path).await.unwrap_or_default();
            if contents.lines().count() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_events_are_tagged_with_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recordings.jsonl");
        let logger = RecordingLogger::open(&path).await.unwrap();

        logger.record(event("GET /api/files"));
        logger.record(event("POST /api/navigate"));

        let events = read_events(&path, 2).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].operation, "POST /api/navigate");
        for e in &events {
            assert_eq!(e.metadata[SESSION_ID_KEY], logger.session_id());
        }
    }

    #[tokio::test]
    async fn test_sessions_sharing_a_file_stay_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recordings.jsonl");
        let first = RecordingLogger::open(&path).await.unwrap();
        first.record(event("GET /api/files"));
        read_events(&path, 1).await;

        let second = RecordingLogger::open(&path).await.unwrap();
        second.record(event("GET /api/relabel/status"));

        let events = read_events(&path, 2).await;
        assert_eq!(events.len(), 2);
        assert_ne!(first.session_id(), second.session_id());
        assert_eq!(events[0].metadata[SESSION_ID_KEY], first.session_id());
        assert_eq!(events[1].metadata[SESSION_ID_KEY], second.session_id());
    }

    #[tokio::test]
    async fn test_unopenable_path_fails_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        tokio::fs::write(&blocker, b"").await.unwrap();

        let err = RecordingLogger::open(blocker.join("rec.jsonl"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to create"));
    }
}
