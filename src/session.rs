//! Recording sessions
//!
//! A [`RecordingSession`] is the aggregate produced by one complete record
//! cycle: every device's exported capture payload keyed by device id, with
//! the head device under the reserved [`HEAD_KEY`]. The session is immutable
//! once built; a later stop replaces it wholesale and only an explicit clear
//! command destroys it.
//!
//! The serialized form is the flat JSON object
//! `{ "head": <payload>, "<deviceId>": <payload>, ... }` — the same shape the
//! transient store and the exported file carry.

use crate::error::Result;
use crate::types::CapturePayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved session key for the head device's payload
pub const HEAD_KEY: &str = "head";

/// The aggregate capture of one record cycle.
///
/// Entries iterate in device-id order (head first, since `"head"` sorts
/// among the ids deterministically), which keeps serialized output and test
/// expectations stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingSession {
    entries: BTreeMap<String, CapturePayload>,
}

impl RecordingSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the head device's payload under the reserved key
    pub fn set_head(&mut self, payload: CapturePayload) {
        self.entries.insert(HEAD_KEY.to_string(), payload);
    }

    /// Record a limb device's payload under its id.
    ///
    /// Ids equal to the reserved head key are rejected upstream at discovery
    /// time, so this is a plain insert.
    pub fn insert_device(&mut self, id: impl Into<String>, payload: CapturePayload) {
        self.entries.insert(id.into(), payload);
    }

    /// The head payload, if one was captured
    pub fn head(&self) -> Option<&CapturePayload> {
        self.entries.get(HEAD_KEY)
    }

    /// A device payload by id
    pub fn get(&self, id: &str) -> Option<&CapturePayload> {
        self.entries.get(id)
    }

    /// Ids of the limb devices in the session (head excluded), in order
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter(|id| id.as_str() != HEAD_KEY)
            .map(String::as_str)
    }

    /// Iterate all entries, head included, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapturePayload)> {
        self.entries.iter().map(|(id, p)| (id.as_str(), p))
    }

    /// Total entry count, head included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no payload was captured at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the compact JSON blob shape
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON blob
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
