use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use projector_core::{EntityId, EventId};

use crate::{Event, EventPayload};

/// Bookkeeping shared by every projection: which entity it describes and the
/// most recent event folded into it.
///
/// Concrete projections embed this (typically with `#[serde(flatten)]`) next
/// to their derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionMeta {
    pub entity_id: EntityId,
    pub last_event_id: Option<EventId>,
    pub last_event_time: Option<DateTime<Utc>>,
}

impl ProjectionMeta {
    /// Advance the bookkeeping to `event`.
    pub fn record<E>(&mut self, event: &Event<E>) {
        self.entity_id = event.entity_id().clone();
        self.last_event_id = Some(event.event_id().clone());
        self.last_event_time = Some(event.created_at());
    }
}

/// A projection's dispatch did not recognise an event variant.
///
/// Non-fatal: the fold skips the event and continues, so new event kinds can
/// be introduced before every projection handles them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unhandled event kind: {event_name}")]
pub struct UnhandledEvent {
    pub event_name: String,
}

impl UnhandledEvent {
    pub fn of<E>(event: &Event<E>) -> Self {
        Self {
            event_name: event.event_name().to_string(),
        }
    }
}

/// A derived, replaceable read model for one entity.
///
/// A projection is always the result of folding some prefix of an entity's
/// events, in ascending time order, over `Default::default()`. It is never
/// patched in storage: every persisted update replaces the previous record.
///
/// ## Freshness
///
/// A stored projection is **fresh** when `last_event_id()` equals the id of the
/// newest stored event for its entity, and **stale** otherwise. Staleness is
/// detected lazily on read and repaired by a full rebuild.
///
/// ## Ordering
///
/// `apply` must be called exactly once per event, in ascending order. There is
/// no deduplication or reordering; feeding the same event twice corrupts the
/// derived state.
pub trait Projection:
    Default + Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Event: EventPayload;

    /// Projection-kind discriminator used for storage routing (table/collection name).
    const KIND: &'static str;

    fn meta(&self) -> &ProjectionMeta;

    fn meta_mut(&mut self) -> &mut ProjectionMeta;

    /// Update the derived fields from one event.
    ///
    /// Bookkeeping (`ProjectionMeta`) is advanced by the builder; implementations
    /// only dispatch on the payload. Return [`UnhandledEvent`] for variants this
    /// projection does not interpret.
    fn apply(&mut self, event: &Event<Self::Event>) -> Result<(), UnhandledEvent>;

    fn entity_id(&self) -> &EntityId {
        &self.meta().entity_id
    }

    fn last_event_id(&self) -> Option<&EventId> {
        self.meta().last_event_id.as_ref()
    }

    fn last_event_time(&self) -> Option<DateTime<Utc>> {
        self.meta().last_event_time
    }
}
