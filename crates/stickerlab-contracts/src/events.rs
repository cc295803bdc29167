//! Studio activity log. Each [`StudioEvent`] becomes one line of
//! `events.jsonl`, stamped with the session id and a UTC timestamp.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{AspectRatio, BrandId, StyleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    LibraryFull,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    GenerationStarted {
        brand: BrandId,
        style: StyleId,
        aspect_ratio: AspectRatio,
        size_label: String,
        edit: bool,
        enrich: bool,
        references: usize,
        transport: String,
    },
    GenerationFinished {
        brand: BrandId,
        enhanced_prompt: String,
        image_bytes: usize,
    },
    GenerationFailed {
        brand: BrandId,
        error: String,
    },
    LibraryAssetAdded {
        asset_id: String,
        brand: BrandId,
        name: String,
    },
    LibraryAssetRejected {
        brand: BrandId,
        name: String,
        reason: RejectReason,
    },
    PrintSheetWritten {
        path: String,
        format: String,
        items: usize,
        bytes: usize,
    },
}

/// One line as it lands on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: String,
    pub ts: String,
    #[serde(flatten)]
    pub event: StudioEvent,
}

/// Append-only writer for the studio's `events.jsonl`. Clones share the file
/// lock.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    session_id: String,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                session_id: session_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn emit(&self, event: StudioEvent) -> anyhow::Result<EventRecord> {
        let record = EventRecord {
            session_id: self.inner.session_id.clone(),
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            event,
        };
        let line = serde_json::to_string(&record)?;

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(record)
    }
}

/// Parses an `events.jsonl` file. Lines that are not studio events are
/// skipped.
pub fn read_events(path: impl AsRef<Path>) -> anyhow::Result<Vec<EventRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}
