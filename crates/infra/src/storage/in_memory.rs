//! In-memory [`StorageProvider`] adapter.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use tracing::instrument;

use projector_core::{Context, EntityId, EventId};
use projector_events::{Event, EventPayload, Projection};

use super::record::{EventRecord, ProjectionRecord};
use super::registry::EventRegistry;
use super::r#trait::{StorageError, StorageProvider};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProjectionKey {
    projection_kind: String,
    entity_id: EntityId,
}

/// In-memory storage adapter.
///
/// Intended for tests/dev. Events and projections are kept in their encoded
/// record form, the way a document store would hold them, so every read goes
/// through the adapter's [`EventRegistry`] exactly as a persistent backend's would.
///
/// One instance serves every projection kind whose event type is `E`.
#[derive(Debug)]
pub struct InMemoryStorage<E> {
    events: RwLock<HashMap<EntityId, Vec<EventRecord>>>,
    projections: RwLock<HashMap<ProjectionKey, ProjectionRecord>>,
    registry: EventRegistry<E>,
}

impl<E> InMemoryStorage<E>
where
    E: EventPayload,
{
    pub fn new(registry: EventRegistry<E>) -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            projections: RwLock::new(HashMap::new()),
            registry,
        }
    }

    /// Number of stored events for `entity_id`.
    pub fn event_count(&self, entity_id: &EntityId) -> Result<usize, StorageError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.get(entity_id).map(Vec::len).unwrap_or(0))
    }

    /// Raw cached projection record, bypassing decoding.
    pub fn projection_record(
        &self,
        projection_kind: &str,
        entity_id: &EntityId,
    ) -> Result<Option<ProjectionRecord>, StorageError> {
        let key = ProjectionKey {
            projection_kind: projection_kind.to_string(),
            entity_id: entity_id.clone(),
        };
        let projections = self.projections.read().map_err(|_| poisoned())?;
        Ok(projections.get(&key).cloned())
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("lock poisoned".to_string())
}

impl<P> StorageProvider<P> for InMemoryStorage<P::Event>
where
    P: Projection,
    P::Event: Serialize,
{
    #[instrument(
        level = "debug",
        skip(self, ctx, event),
        fields(entity_id = %event.entity_id(), event_id = %event.event_id()),
        err(level = "warn")
    )]
    fn append(&self, ctx: &Context, event: &Event<P::Event>) -> Result<(), StorageError> {
        ctx.check()?;
        // The log is append-only: a tag the registry cannot decode would poison the stream.
        if !self.registry.is_registered(event.event_name()) {
            return Err(StorageError::Encode(format!(
                "event type '{}' is not registered",
                event.event_name()
            )));
        }
        let record = EventRecord::encode(event)?;

        let mut events = self.events.write().map_err(|_| poisoned())?;
        let stream = events.entry(record.entity_id.clone()).or_default();

        // Keep each stream sorted by (created_at, event_id); equal keys keep arrival order.
        let pos = stream.partition_point(|r| r.sort_key() <= record.sort_key());
        stream.insert(pos, record);
        Ok(())
    }

    #[instrument(
        level = "debug",
        skip(self, ctx, projection),
        fields(projection = P::KIND, entity_id = %projection.entity_id()),
        err(level = "warn")
    )]
    fn upsert_projection(&self, ctx: &Context, projection: &P) -> Result<(), StorageError> {
        ctx.check()?;
        let record = ProjectionRecord::encode(projection)?;
        let key = ProjectionKey {
            projection_kind: record.projection_kind.clone(),
            entity_id: record.entity_id.clone(),
        };

        let mut projections = self.projections.write().map_err(|_| poisoned())?;
        projections.insert(key, record);
        Ok(())
    }

    #[instrument(level = "debug", skip(self, ctx), fields(projection = P::KIND), err(level = "warn"))]
    fn fetch_projection(&self, ctx: &Context, entity_id: &EntityId) -> Result<Option<P>, StorageError> {
        ctx.check()?;
        self.projection_record(P::KIND, entity_id)?
            .map(|record| record.decode::<P>())
            .transpose()
    }

    #[instrument(level = "debug", skip(self, ctx), err(level = "warn"))]
    fn fetch_latest_event_id(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Option<EventId>, StorageError> {
        ctx.check()?;
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events
            .get(entity_id)
            .and_then(|stream| stream.last())
            .map(|record| record.event_id.clone()))
    }

    #[instrument(level = "debug", skip(self, ctx), err(level = "warn"))]
    fn fetch_ordered_events(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Vec<Event<P::Event>>, StorageError> {
        ctx.check()?;
        let events = self.events.read().map_err(|_| poisoned())?;
        let Some(stream) = events.get(entity_id) else {
            return Ok(vec![]);
        };

        stream.iter().map(|record| self.registry.decode(record)).collect()
    }
}
