//! Test data builders for creating test objects

use mocap_rs::config::{ControllerConfig, PersistenceConfig};
use mocap_rs::types::CapturePayload;
use mocap_rs::RecordingSession;
use serde_json::json;

/// Builder for controller configurations under test
pub struct ConfigBuilder {
    config: ControllerConfig,
}

impl ConfigBuilder {
    /// Start from the defaults with auto-replay off, so tests opt into it
    pub fn new() -> Self {
        Self {
            config: ControllerConfig {
                auto_play: false,
                ..ControllerConfig::default()
            },
        }
    }

    pub fn auto_play(mut self, on: bool) -> Self {
        self.config.auto_play = on;
        self
    }

    pub fn local_storage(mut self, on: bool) -> Self {
        self.config.local_storage = on;
        self
    }

    pub fn save_file(mut self, on: bool) -> Self {
        self.config.save_file = on;
        self
    }

    pub fn spectator_play(mut self, on: bool) -> Self {
        self.config.spectator_play = on;
        self
    }

    pub fn binary_format(mut self, on: bool) -> Self {
        self.config.binary_format = on;
        self
    }

    pub fn build(self) -> ControllerConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ready-made sessions to seed stores with
pub struct SessionBuilder {
    session: RecordingSession,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            session: RecordingSession::new(),
        }
    }

    pub fn with_head(mut self) -> Self {
        self.session
            .set_head(CapturePayload::from_value(json!([{ "t": 0, "y": 1.6 }])));
        self
    }

    pub fn with_device(mut self, id: &str) -> Self {
        self.session
            .insert_device(id, CapturePayload::from_value(json!([{ "t": 0 }])));
        self
    }

    pub fn build(self) -> RecordingSession {
        self.session
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn persistence_key() -> PersistenceConfig {
    PersistenceConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_builder_shapes_entries() {
        let session = SessionBuilder::new()
            .with_head()
            .with_device("hand1")
            .build();

        assert!(session.head().is_some());
        assert_eq!(session.device_ids().collect::<Vec<_>>(), vec!["hand1"]);
    }
}
