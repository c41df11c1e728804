//! Event Grid event payload for output bindings.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use uuid::Uuid;

/// One event in the Event Grid schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridEvent {
    pub subject: String,
    pub id: String,
    pub event_type: String,
    pub data: Box<RawValue>,
    pub data_version: String,
}

impl EventGridEvent {
    /// Build an event with a fresh id around the serialized `data`.
    pub fn new<T: Serialize + ?Sized>(
        subject: impl Into<String>,
        event_type: impl Into<String>,
        data_version: impl Into<String>,
        data: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            subject: subject.into(),
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            data: serde_json::value::to_raw_value(data)?,
            data_version: data_version.into(),
        })
    }
}
