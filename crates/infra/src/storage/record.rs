//! Logical persisted shapes, independent of any particular backend encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use projector_core::{EntityId, EventId};
use projector_events::{Event, Projection};

use super::r#trait::StorageError;

/// A stored event: `{entity_id, event_id, event_type, created_at, payload}`.
///
/// Primary access is by `entity_id`, sorted ascending by `created_at` with
/// `event_id` as the tie-breaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub entity_id: EntityId,
    pub event_id: EventId,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub payload: JsonValue,
}

impl EventRecord {
    pub fn encode<E>(event: &Event<E>) -> Result<Self, StorageError>
    where
        E: Serialize,
    {
        let payload = serde_json::to_value(event.payload())
            .map_err(|e| StorageError::Encode(format!("event payload serialization failed: {e}")))?;

        Ok(Self {
            entity_id: event.entity_id().clone(),
            event_id: event.event_id().clone(),
            event_type: event.event_name().to_string(),
            created_at: event.created_at(),
            payload,
        })
    }

    /// Total order used for history and "latest event" lookups.
    pub fn sort_key(&self) -> (DateTime<Utc>, &EventId) {
        (self.created_at, &self.event_id)
    }
}

/// A cached projection: `{entity_id, last_event_id, last_event_time, ...derived}`,
/// keyed by `(entity_id, projection_kind)`.
///
/// `body` holds the full serialized projection, derived fields included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub entity_id: EntityId,
    pub projection_kind: String,
    pub last_event_id: Option<EventId>,
    pub last_event_time: Option<DateTime<Utc>>,
    pub body: JsonValue,
}

impl ProjectionRecord {
    pub fn encode<P>(projection: &P) -> Result<Self, StorageError>
    where
        P: Projection,
    {
        let body = serde_json::to_value(projection).map_err(|e| {
            StorageError::Encode(format!("{} projection serialization failed: {e}", P::KIND))
        })?;

        Ok(Self {
            entity_id: projection.entity_id().clone(),
            projection_kind: P::KIND.to_string(),
            last_event_id: projection.last_event_id().cloned(),
            last_event_time: projection.last_event_time(),
            body,
        })
    }

    pub fn decode<P>(&self) -> Result<P, StorageError>
    where
        P: Projection,
    {
        if self.projection_kind != P::KIND {
            return Err(StorageError::Decode(format!(
                "record holds projection kind '{}', expected '{}'",
                self.projection_kind,
                P::KIND
            )));
        }

        serde_json::from_value(self.body.clone()).map_err(|e| {
            StorageError::Decode(format!(
                "{} projection for entity '{}' could not be deserialized: {e}",
                P::KIND,
                self.entity_id
            ))
        })
    }
}
