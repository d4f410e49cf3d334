//! File export
//!
//! Exports run in two phases so the expensive part happens inside the stop
//! transition while the user-visible part is deferred: [`ExportSink::stage`]
//! takes the serialized session and prepares the artifact, and
//! [`ExportSink::finish`] — driven by the controller a beat later —
//! publishes it and releases whatever staging held. A finished or failed
//! ticket is gone either way; tickets are never reusable.

use crate::error::{MocapError, Result, ResultExt};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

/// MIME type attached to plain JSON exports
pub const MIME_JSON: &str = "application/json";
/// MIME type attached to exports marked as binary payloads
pub const MIME_BINARY: &str = "application/octet-binary";

/// One export artifact, ready to be staged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub file_name: String,
    pub mime: &'static str,
    pub body: String,
}

/// Claim on a staged export, redeemed by [`ExportSink::finish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportTicket(u64);

/// Destination for exported session files
pub trait ExportSink: Send {
    /// Prepare the artifact and return a ticket for publishing it
    fn stage(&mut self, request: ExportRequest) -> Result<ExportTicket>;

    /// Publish the staged artifact. The ticket's staging resources are
    /// released whether or not publishing succeeds.
    fn finish(&mut self, ticket: ExportTicket) -> Result<()>;
}

/// The MIME type for a session export
pub fn export_mime(binary_format: bool) -> &'static str {
    if binary_format {
        MIME_BINARY
    } else {
        MIME_JSON
    }
}

/// Build the export file name: `player-recording-<title>-<epoch-ms>.json`,
/// with the title reduced to filesystem-safe characters
pub fn export_file_name(title: &str, at: DateTime<Utc>) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("player-recording-{}-{}.json", safe, at.timestamp_millis())
}

#[derive(Debug)]
struct StagedFile {
    part_path: PathBuf,
    final_path: PathBuf,
}

/// Sink that stages into `<name>.part` files and publishes by rename
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    next_id: u64,
    staged: HashMap<ExportTicket, StagedFile>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_id: 0,
            staged: HashMap::new(),
        }
    }
}

impl ExportSink for DirectorySink {
    fn stage(&mut self, request: ExportRequest) -> Result<ExportTicket> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating export directory {}", self.dir.display()))?;
        let final_path = self.dir.join(&request.file_name);
        let part_path = self.dir.join(format!("{}.part", request.file_name));
        std::fs::write(&part_path, &request.body)
            .with_context(|| format!("staging export {}", part_path.display()))?;

        let ticket = ExportTicket(self.next_id);
        self.next_id += 1;
        self.staged.insert(
            ticket,
            StagedFile {
                part_path,
                final_path,
            },
        );
        Ok(ticket)
    }

    fn finish(&mut self, ticket: ExportTicket) -> Result<()> {
        let staged = self
            .staged
            .remove(&ticket)
            .ok_or_else(|| MocapError::Export(format!("unknown export ticket {ticket:?}")))?;
        let renamed = std::fs::rename(&staged.part_path, &staged.final_path);
        if renamed.is_err() {
            let _ = std::fs::remove_file(&staged.part_path);
        }
        renamed.map_err(MocapError::from).with_context(|| {
            format!("publishing export {}", staged.final_path.display())
        })
    }
}

/// Record of one staged request, as seen by [`CollectingSink`]
#[cfg(any(test, feature = "mock-scene"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub request: ExportRequest,
    pub finished: bool,
}

/// Observation window into a [`CollectingSink`]
#[cfg(any(test, feature = "mock-scene"))]
#[derive(Debug, Clone, Default)]
pub struct ExportLog {
    records: std::sync::Arc<std::sync::Mutex<Vec<ExportRecord>>>,
}

#[cfg(any(test, feature = "mock-scene"))]
impl ExportLog {
    pub fn staged_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn finished_count(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.finished)
            .count()
    }

    pub fn records(&self) -> Vec<ExportRecord> {
        self.records.lock().unwrap().clone()
    }
}

/// In-memory sink for tests and demos
#[cfg(any(test, feature = "mock-scene"))]
#[derive(Debug, Default)]
pub struct CollectingSink {
    log: ExportLog,
}

#[cfg(any(test, feature = "mock-scene"))]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> ExportLog {
        self.log.clone()
    }
}

#[cfg(any(test, feature = "mock-scene"))]
impl ExportSink for CollectingSink {
    fn stage(&mut self, request: ExportRequest) -> Result<ExportTicket> {
        let mut records = self.log.records.lock().unwrap();
        let ticket = ExportTicket(records.len() as u64);
        records.push(ExportRecord {
            request,
            finished: false,
        });
        Ok(ticket)
    }

    fn finish(&mut self, ticket: ExportTicket) -> Result<()> {
        let mut records = self.log.records.lock().unwrap();
        let record = records
            .get_mut(ticket.0 as usize)
            .ok_or_else(|| MocapError::Export(format!("unknown export ticket {ticket:?}")))?;
        if record.finished {
            return Err(MocapError::Export(format!(
                "export ticket {ticket:?} already finished"
            )));
        }
        record.finished = true;
        Ok(())
    }
}
