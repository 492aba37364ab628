use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use projector_core::{now_monotonic, EntityId, EventId};

/// Domain payload carried by an [`Event`].
///
/// Concrete event kinds are usually variants of one enum per entity type;
/// `event_name` is the stable tag a storage adapter persists and decodes by.
pub trait EventPayload: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable tag for this variant (e.g. `"Created"`).
    fn event_name(&self) -> &'static str;
}

/// An immutable fact about one entity.
///
/// Events are:
/// - **immutable** (no setters; treat them as facts)
/// - **append-only** (never updated or deleted once stored)
/// - ordered per entity by `created_at`, ties broken by `event_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event<E> {
    entity_id: EntityId,
    event_id: EventId,
    event_name: String,
    created_at: DateTime<Utc>,
    payload: E,
}

impl<E> Event<E>
where
    E: EventPayload,
{
    /// Create a new event, assigning a fresh id and creation timestamp.
    ///
    /// The event name is taken from the payload variant.
    pub fn new(entity_id: impl Into<EntityId>, payload: E) -> Self {
        let event_name = payload.event_name().to_string();
        Self::with_name(entity_id, event_name, payload)
    }
}

impl<E> Event<E> {
    /// Create a new event with an explicitly supplied name tag.
    pub fn with_name(entity_id: impl Into<EntityId>, event_name: impl Into<String>, payload: E) -> Self {
        Self {
            entity_id: entity_id.into(),
            event_id: EventId::generate(),
            event_name: event_name.into(),
            created_at: now_monotonic(),
            payload,
        }
    }

    /// Reassemble an already-stored event. Intended for storage adapters.
    pub fn from_parts(
        entity_id: EntityId,
        event_id: EventId,
        event_name: impl Into<String>,
        created_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            entity_id,
            event_id,
            event_name: event_name.into(),
            created_at,
            payload,
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
