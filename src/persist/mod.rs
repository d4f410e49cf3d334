//! Session persistence
//!
//! Two independent destinations for a finished session: the transient
//! key/value store (latest session only, under one configurable key) and
//! the export sink (one file per session). [`PersistenceManager`] owns both
//! and keeps their failures isolated — the controller decides per its config
//! which paths run, and a failure on one never blocks the other.

pub mod export;
pub mod store;

pub use export::{DirectorySink, ExportRequest, ExportSink, ExportTicket};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::config::PersistenceConfig;
use crate::error::Result;
use crate::session::RecordingSession;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Owns the transient store and the export sink on the controller's behalf
pub struct PersistenceManager {
    config: PersistenceConfig,
    store: Box<dyn KeyValueStore>,
    sink: Box<dyn ExportSink>,
}

impl PersistenceManager {
    pub fn new(
        config: PersistenceConfig,
        store: Box<dyn KeyValueStore>,
        sink: Box<dyn ExportSink>,
    ) -> Self {
        Self {
            config,
            store,
            sink,
        }
    }

    /// In-memory store and a sink that writes to `export_dir`
    pub fn in_memory(config: PersistenceConfig, export_dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(
            config,
            Box::new(MemoryStore::new()),
            Box::new(DirectorySink::new(export_dir)),
        )
    }

    /// The store key sessions persist under
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Serialize `session` and store it under the configured key
    pub fn save_session(&mut self, session: &RecordingSession) -> Result<()> {
        let blob = session.to_json_string()?;
        debug!(key = %self.config.key, bytes = blob.len(), "storing session blob");
        self.store.set(&self.config.key, &blob)
    }

    /// Load the stored session.
    ///
    /// `None` means nothing is stored; `Some(Err(..))` means a blob exists
    /// but does not parse, which callers treat as absent after logging.
    pub fn load_session(&self) -> Option<Result<RecordingSession>> {
        let blob = self.store.get(&self.config.key)?;
        Some(RecordingSession::from_json_str(&blob))
    }

    /// Whether any blob is stored under the configured key
    pub fn has_stored_session(&self) -> bool {
        self.store.contains(&self.config.key)
    }

    /// Remove the stored session, if any
    pub fn clear_session(&mut self) -> Result<()> {
        self.store.remove(&self.config.key)
    }

    /// Stage a file export of `session`, named after the scene title and
    /// the moment `at`
    pub fn stage_export(
        &mut self,
        session: &RecordingSession,
        title: &str,
        binary_format: bool,
        at: DateTime<Utc>,
    ) -> Result<ExportTicket> {
        let request = ExportRequest {
            file_name: export::export_file_name(title, at),
            mime: export::export_mime(binary_format),
            body: session.to_json_string()?,
        };
        debug!(file = %request.file_name, mime = request.mime, "staging session export");
        self.sink.stage(request)
    }

    /// Publish a previously staged export
    pub fn finish_export(&mut self, ticket: ExportTicket) -> Result<()> {
        self.sink.finish(ticket)
    }
}

impl std::fmt::Debug for PersistenceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceManager")
            .field("key", &self.config.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::export::CollectingSink;
    use super::*;
    use crate::types::CapturePayload;
    use serde_json::json;

    fn session() -> RecordingSession {
        let mut session = RecordingSession::new();
        session.set_head(CapturePayload::from_value(json!([{ "t": 0 }])));
        session.insert_device("hand1", CapturePayload::from_value(json!([{ "t": 1 }])));
        session
    }

    fn manager() -> (PersistenceManager, export::ExportLog) {
        let sink = CollectingSink::new();
        let log = sink.log();
        let manager = PersistenceManager::new(
            PersistenceConfig::default(),
            Box::new(MemoryStore::new()),
            Box::new(sink),
        );
        (manager, log)
    }

    #[test]
    fn test_store_round_trip_under_default_key() {
        let (mut manager, _log) = manager();
        assert_eq!(manager.key(), "avatar-recording");
        assert!(manager.load_session().is_none());

        manager.save_session(&session()).unwrap();
        assert!(manager.has_stored_session());
        let loaded = manager.load_session().unwrap().unwrap();
        assert_eq!(loaded, session());

        manager.clear_session().unwrap();
        assert!(manager.load_session().is_none());
    }

    #[test]
    fn test_malformed_blob_surfaces_as_error() {
        let mut store = MemoryStore::new();
        store.set("avatar-recording", "{ corrupt").unwrap();
        let manager = PersistenceManager::new(
            PersistenceConfig::default(),
            Box::new(store),
            Box::new(CollectingSink::new()),
        );

        assert!(matches!(manager.load_session(), Some(Err(_))));
    }

    #[test]
    fn test_custom_key_is_respected() {
        let sink = CollectingSink::new();
        let mut manager = PersistenceManager::new(
            PersistenceConfig::with_key("player-one"),
            Box::new(MemoryStore::new()),
            Box::new(sink),
        );

        manager.save_session(&session()).unwrap();
        assert_eq!(manager.key(), "player-one");
        assert!(manager.has_stored_session());
    }

    #[test]
    fn test_stage_export_builds_request_from_title_and_format() {
        use chrono::TimeZone;

        let (mut manager, log) = manager();
        let at = Utc.timestamp_millis_opt(42_000).unwrap();

        let ticket = manager
            .stage_export(&session(), "demo room", true, at)
            .unwrap();
        manager.finish_export(ticket).unwrap();

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request.file_name, "player-recording-demo-room-42000.json");
        assert_eq!(records[0].request.mime, export::MIME_BINARY);
        assert!(records[0].finished);
        let body: RecordingSession =
            RecordingSession::from_json_str(&records[0].request.body).unwrap();
        assert_eq!(body, session());
    }
}
