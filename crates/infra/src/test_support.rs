//! Shared fixtures for unit and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use projector_core::{Context, EntityId, EventId};
use projector_events::{Event, EventPayload, Projection, ProjectionMeta, UnhandledEvent};

use crate::storage::{EventRegistry, InMemoryStorage, StorageError, StorageProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserEvent {
    Created { value: String },
    Updated { value: String },
    Archived,
}

impl EventPayload for UserEvent {
    fn event_name(&self) -> &'static str {
        match self {
            UserEvent::Created { .. } => "Created",
            UserEvent::Updated { .. } => "Updated",
            UserEvent::Archived => "Archived",
        }
    }
}

/// Current value plus every value the user has had.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(flatten)]
    pub meta: ProjectionMeta,
    pub value: String,
    pub history: Vec<String>,
}

impl Projection for UserView {
    type Event = UserEvent;
    const KIND: &'static str = "user_view";

    fn meta(&self) -> &ProjectionMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ProjectionMeta {
        &mut self.meta
    }

    fn apply(&mut self, event: &Event<UserEvent>) -> Result<(), UnhandledEvent> {
        match event.payload() {
            UserEvent::Created { value } | UserEvent::Updated { value } => {
                self.value = value.clone();
                self.history.push(value.clone());
                Ok(())
            }
            UserEvent::Archived => Err(UnhandledEvent::of(event)),
        }
    }
}

/// Second projection kind over the same events, sharing one adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    #[serde(flatten)]
    pub meta: ProjectionMeta,
    pub events_seen: u64,
    pub archived: bool,
}

impl Projection for UserActivity {
    type Event = UserEvent;
    const KIND: &'static str = "user_activity";

    fn meta(&self) -> &ProjectionMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ProjectionMeta {
        &mut self.meta
    }

    fn apply(&mut self, event: &Event<UserEvent>) -> Result<(), UnhandledEvent> {
        self.events_seen += 1;
        if matches!(event.payload(), UserEvent::Archived) {
            self.archived = true;
        }
        Ok(())
    }
}

pub fn user_registry() -> EventRegistry<UserEvent> {
    EventRegistry::new()
        .with_serde_event("Created")
        .with_serde_event("Updated")
        .with_serde_event("Archived")
}

pub fn user_storage() -> InMemoryStorage<UserEvent> {
    InMemoryStorage::new(user_registry())
}

/// Event with a fixed id and timestamp (seconds since epoch), for ordering tests.
pub fn event_at(entity_id: &str, event_id: &str, secs: i64, payload: UserEvent) -> Event<UserEvent> {
    let created_at = Utc.timestamp_opt(secs, 0).single().unwrap();
    let name = payload.event_name();
    Event::from_parts(EntityId::new(entity_id), EventId::from(event_id), name, created_at, payload)
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub append: AtomicUsize,
    pub upsert_projection: AtomicUsize,
    pub fetch_projection: AtomicUsize,
    pub fetch_latest_event_id: AtomicUsize,
    pub fetch_ordered_events: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Which operation a [`ScriptedStorage`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Append,
    UpsertProjection,
    FetchProjection,
    FetchLatestEventId,
    FetchOrderedEvents,
}

/// Wraps a storage provider, counting calls and optionally failing one operation.
#[derive(Debug)]
pub struct ScriptedStorage<S> {
    pub inner: S,
    pub calls: CallCounts,
    fail_on: Mutex<Option<(FailOn, StorageError)>>,
}

impl<S> ScriptedStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: CallCounts::default(),
            fail_on: Mutex::new(None),
        }
    }

    pub fn fail(&self, op: FailOn, err: StorageError) {
        *self.fail_on.lock().unwrap() = Some((op, err));
    }

    fn check(&self, op: FailOn, counter: &AtomicUsize) -> Result<(), StorageError> {
        counter.fetch_add(1, Ordering::SeqCst);
        match &*self.fail_on.lock().unwrap() {
            Some((failing, err)) if *failing == op => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

impl<P, S> StorageProvider<P> for ScriptedStorage<S>
where
    P: Projection,
    S: StorageProvider<P>,
{
    fn append(&self, ctx: &Context, event: &Event<P::Event>) -> Result<(), StorageError> {
        self.check(FailOn::Append, &self.calls.append)?;
        self.inner.append(ctx, event)
    }

    fn upsert_projection(&self, ctx: &Context, projection: &P) -> Result<(), StorageError> {
        self.check(FailOn::UpsertProjection, &self.calls.upsert_projection)?;
        self.inner.upsert_projection(ctx, projection)
    }

    fn fetch_projection(&self, ctx: &Context, entity_id: &EntityId) -> Result<Option<P>, StorageError> {
        self.check(FailOn::FetchProjection, &self.calls.fetch_projection)?;
        self.inner.fetch_projection(ctx, entity_id)
    }

    fn fetch_latest_event_id(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Option<EventId>, StorageError> {
        self.check(FailOn::FetchLatestEventId, &self.calls.fetch_latest_event_id)?;
        self.inner.fetch_latest_event_id(ctx, entity_id)
    }

    fn fetch_ordered_events(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Vec<Event<P::Event>>, StorageError> {
        self.check(FailOn::FetchOrderedEvents, &self.calls.fetch_ordered_events)?;
        self.inner.fetch_ordered_events(ctx, entity_id)
    }
}
