//! Storage port: the five operations every backend provides.

use std::sync::Arc;

use thiserror::Error;

use projector_core::{Context, ContextError, EntityId, EventId};
use projector_events::{Event, Projection};

/// Storage operation error (a `StorageFailure`).
///
/// These are **infrastructure errors**. The controller propagates them to the
/// caller verbatim and never retries.
///
/// ## Error Categories
///
/// - **Context**: the caller's context was cancelled or its deadline passed
/// - **Backend**: I/O or driver failure inside the adapter
/// - **Encode**: an event or projection could not be converted to the storage format
/// - **Decode**: a stored record could not be reconstructed (including unregistered event tags)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("failed to decode record: {0}")]
    Decode(String),
}

/// Storage port: the contract any backend implements for one projection kind.
///
/// All operations are blocking and receive the caller's [`Context`]; an
/// implementation must fail with [`StorageError::Context`] rather than start
/// work once the context is cancelled or expired.
///
/// ## Contracts
///
/// - `append` durably stores the event. It does **not** enforce `event_id`
///   uniqueness; producers guarantee it at construction.
/// - `upsert_projection` replaces the record keyed by
///   `(entity_id, P::KIND)` wholesale, creating it when absent.
/// - `fetch_projection` returns `None` (not an error) when nothing is cached.
/// - `fetch_latest_event_id` returns the id of the event with the greatest
///   `(created_at, event_id)`, or `None` when the entity has no events.
/// - `fetch_ordered_events` returns the full history ascending by `created_at`,
///   ties broken by ascending `event_id`. The newest event of this sequence is
///   the one `fetch_latest_event_id` reports.
pub trait StorageProvider<P>: Send + Sync
where
    P: Projection,
{
    fn append(&self, ctx: &Context, event: &Event<P::Event>) -> Result<(), StorageError>;

    fn upsert_projection(&self, ctx: &Context, projection: &P) -> Result<(), StorageError>;

    fn fetch_projection(&self, ctx: &Context, entity_id: &EntityId) -> Result<Option<P>, StorageError>;

    fn fetch_latest_event_id(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Option<EventId>, StorageError>;

    fn fetch_ordered_events(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Vec<Event<P::Event>>, StorageError>;
}

impl<P, S> StorageProvider<P> for Arc<S>
where
    P: Projection,
    S: StorageProvider<P> + ?Sized,
{
    fn append(&self, ctx: &Context, event: &Event<P::Event>) -> Result<(), StorageError> {
        (**self).append(ctx, event)
    }

    fn upsert_projection(&self, ctx: &Context, projection: &P) -> Result<(), StorageError> {
        (**self).upsert_projection(ctx, projection)
    }

    fn fetch_projection(&self, ctx: &Context, entity_id: &EntityId) -> Result<Option<P>, StorageError> {
        (**self).fetch_projection(ctx, entity_id)
    }

    fn fetch_latest_event_id(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Option<EventId>, StorageError> {
        (**self).fetch_latest_event_id(ctx, entity_id)
    }

    fn fetch_ordered_events(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Vec<Event<P::Event>>, StorageError> {
        (**self).fetch_ordered_events(ctx, entity_id)
    }
}
