//! Post-generation events handed to an external log.
//!
//! Logging happens after the document has been produced. A failing or slow
//! log must never affect the generation it describes, so callers dispatch
//! events on a detached task and only report failures.

use crate::error::PipelineError;
use crate::export::GenerationJob;
use chrono::{DateTime, Utc};
use quire_types::ViewMode;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEvent {
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub view_mode: ViewMode,
    pub unit_number: Option<String>,
    pub record_count: usize,
    pub page_count: usize,
    pub filename: String,
    pub duration_ms: u64,
}

impl GenerationEvent {
    pub fn new(job: &GenerationJob, page_count: usize, duration_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            title: job.header.title.clone(),
            view_mode: job.view_mode,
            unit_number: job.unit_number.clone(),
            record_count: job.records.len(),
            page_count,
            filename: job.filename(),
            duration_ms,
        }
    }
}

pub trait GenerationLog: Send + Sync {
    fn record(&self, event: &GenerationEvent) -> Result<(), PipelineError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl GenerationLog for NoopLog {
    fn record(&self, _event: &GenerationEvent) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Appends each event as one JSON line to a file.
#[derive(Debug)]
pub struct JsonlFileLog {
    path: PathBuf,
    // Serializes appends from concurrent dispatches.
    write_lock: Mutex<()>,
}

impl JsonlFileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GenerationLog for JsonlFileLog {
    fn record(&self, event: &GenerationEvent) -> Result<(), PipelineError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }
}
