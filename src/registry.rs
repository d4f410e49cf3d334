//! Device registry
//!
//! Holds every motion-tracked device discovered so far, each paired with its
//! bound recorder. The registry is append-only for the lifetime of the
//! controller: a device that stops reporting keeps its entry, and re-inserting
//! a known id is a no-op. Iteration order is device-id order, so broadcast
//! operations (start, stop, export) run deterministically.

use crate::scene::DeviceRecorder;
use crate::session::RecordingSession;
use std::collections::BTreeMap;

/// One discovered device and its recorder
pub struct Device {
    id: String,
    recorder: Box<dyn DeviceRecorder>,
}

impl Device {
    pub fn new(id: impl Into<String>, recorder: Box<dyn DeviceRecorder>) -> Self {
        Self {
            id: id.into(),
            recorder,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn recorder_mut(&mut self) -> &mut dyn DeviceRecorder {
        self.recorder.as_mut()
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("id", &self.id).finish()
    }
}

/// Append-only collection of tracked devices, keyed by id
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a device with this id has already been admitted
    pub fn contains(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    /// Admit a new device. Returns false (and drops the recorder) when the
    /// id is already present; entries are never replaced.
    pub fn insert(&mut self, device: Device) -> bool {
        if self.devices.contains_key(device.id()) {
            return false;
        }
        self.devices.insert(device.id().to_string(), device);
        true
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Device ids in iteration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.values_mut()
    }

    /// Start capture on every registered device
    pub fn start_all(&mut self) {
        for device in self.devices.values_mut() {
            device.recorder.start();
        }
    }

    /// Stop capture on every registered device
    pub fn stop_all(&mut self) {
        for device in self.devices.values_mut() {
            device.recorder.stop();
        }
    }

    /// Export every device's captured payload into the session, keyed by id
    pub fn export_into(&mut self, session: &mut RecordingSession) {
        for (id, device) in self.devices.iter_mut() {
            session.insert_device(id.clone(), device.recorder.export());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mock::MockRecorder;
    use proptest::prelude::*;

    fn device(id: &str) -> Device {
        Device::new(id, Box::new(MockRecorder::new(id)))
    }

    #[test]
    fn test_insert_is_append_only() {
        let mut registry = DeviceRegistry::new();
        assert!(registry.insert(device("hand1")));
        assert!(!registry.insert(device("hand1")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_are_ordered() {
        let mut registry = DeviceRegistry::new();
        registry.insert(device("hand2"));
        registry.insert(device("hand1"));
        registry.insert(device("tracker-waist"));

        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec!["hand1", "hand2", "tracker-waist"]);
    }

    #[test]
    fn test_export_keys_match_ids() {
        let mut registry = DeviceRegistry::new();
        registry.insert(device("hand1"));
        registry.insert(device("hand2"));
        registry.start_all();
        registry.stop_all();

        let mut session = RecordingSession::new();
        registry.export_into(&mut session);
        let ids: Vec<_> = session.device_ids().collect();
        assert_eq!(ids, vec!["hand1", "hand2"]);
    }

    #[test]
    fn test_broadcasts_reach_every_recorder_exactly_once() {
        use crate::scene::MockDeviceRecorder;
        use crate::types::CapturePayload;

        let mut registry = DeviceRegistry::new();
        for id in ["hand1", "hand2"] {
            let mut mock = MockDeviceRecorder::new();
            mock.expect_start().times(1).return_const(());
            mock.expect_stop().times(1).return_const(());
            mock.expect_export()
                .times(1)
                .returning(|| CapturePayload::from_value(serde_json::json!([1])));
            registry.insert(Device::new(id, Box::new(mock)));
        }

        registry.start_all();
        registry.stop_all();
        let mut session = RecordingSession::new();
        registry.export_into(&mut session);
        assert_eq!(session.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_registry_deduplicates_ids(ids in proptest::collection::vec("[a-z][a-z0-9]{0,6}", 0..24)) {
            let mut registry = DeviceRegistry::new();
            for id in &ids {
                registry.insert(device(id));
            }

            let mut unique: Vec<_> = ids.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(registry.len(), unique.len());

            let ordered: Vec<_> = registry.ids().map(str::to_string).collect();
            prop_assert_eq!(ordered, unique);
        }
    }
}
