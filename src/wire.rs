//! JSON envelope for mark events on a wall's broadcast channel.
//!
//! Events are scoped to one wall (`surface:<id>`). A `mark:create` event
//! carries the full mark including its timestamps, so a subscriber renders it
//! through the same pipeline as a locally drawn one without asking the store.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::SurfaceId;
use crate::error::RelayError;
use crate::mark::{Mark, MarkId};

/// A single message on a wall channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkEvent {
    /// Unique id of this event.
    pub id: Uuid,
    /// Epoch milliseconds when the event was published.
    pub ts: i64,
    pub surface_id: SurfaceId,
    #[serde(flatten)]
    pub body: EventBody,
}

/// Namespaced event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "syscall", content = "data")]
pub enum EventBody {
    #[serde(rename = "mark:create")]
    Created(Mark),
    #[serde(rename = "mark:delete")]
    Deleted { id: MarkId },
    #[serde(rename = "mark:clear")]
    Cleared,
}

impl MarkEvent {
    #[must_use]
    pub fn created(mark: Mark, ts: i64) -> Self {
        Self { id: Uuid::new_v4(), ts, surface_id: mark.surface_id, body: EventBody::Created(mark) }
    }

    #[must_use]
    pub fn deleted(surface_id: SurfaceId, id: MarkId, ts: i64) -> Self {
        Self { id: Uuid::new_v4(), ts, surface_id, body: EventBody::Deleted { id } }
    }

    #[must_use]
    pub fn cleared(surface_id: SurfaceId, ts: i64) -> Self {
        Self { id: Uuid::new_v4(), ts, surface_id, body: EventBody::Cleared }
    }

    /// The namespaced operation name.
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self.body {
            EventBody::Created(_) => "mark:create",
            EventBody::Deleted { .. } => "mark:delete",
            EventBody::Cleared => "mark:clear",
        }
    }

    /// Channel this event belongs on.
    #[must_use]
    pub fn channel(&self) -> String {
        self.surface_id.channel()
    }
}

/// Encode an event as JSON text.
///
/// # Errors
///
/// [`RelayError::Wire`] if serialization fails.
pub fn encode_event(event: &MarkEvent) -> Result<String, RelayError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode an event from JSON text.
///
/// # Errors
///
/// [`RelayError::Wire`] for malformed JSON or an unknown syscall.
pub fn decode_event(text: &str) -> Result<MarkEvent, RelayError> {
    Ok(serde_json::from_str(text)?)
}
