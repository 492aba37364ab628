//! Write/read orchestration with a staleness-checked projection cache.
//!
//! ## Write Path
//!
//! ```text
//! save_event(event)
//!   ↓
//! 1. append(event)                       (abort on failure)
//!   ↓
//! 2. fetch_ordered_events(entity_id)     (full history)
//!   ↓
//! 3. builder.build(history)              (pure fold from zero state)
//!   ↓
//! 4. upsert_projection(result)           (single wholesale replace)
//! ```
//!
//! The cache is only ever written by step 4, once per rebuild. A crash before
//! it leaves the previous projection in place: stale, never corrupt.
//!
//! ## Read Path
//!
//! ```text
//! get_latest_projection(entity_id)
//!   ↓
//! fetch_projection ── None ──────────────────────────────→ rebuild
//!   ↓ Some(cached)
//! fetch_latest_event_id
//!   ↓
//! cached.last_event_id == latest ── yes → return cached (no fold, no write)
//!   ↓ no
//! rebuild (fetch history, fold, upsert) → return fresh projection
//! ```
//!
//! Freshness is an exact id comparison, not a timestamp window, so clock skew
//! between writers cannot make a stale cache look fresh.
//!
//! ## Concurrency
//!
//! No locks and no version tokens. Concurrent writers never corrupt the
//! append-only log, but the final upsert is last-writer-wins; a cache that
//! lost the race is detected as stale on the next read and rebuilt.
//!
//! Every storage call receives the caller's [`Context`] unchanged. Failures are
//! returned as-is: no retries, no partial projection writes.

use std::marker::PhantomData;

use tracing::{debug, instrument};

use projector_core::{Context, EntityId};
use projector_events::{Event, Projection, ProjectionBuilder, ReplayBuilder};

use crate::storage::{StorageError, StorageProvider};

/// Saves events and serves up-to-date projections of kind `P`.
///
/// ## Generic Parameters
///
/// - `S`: storage backend implementing [`StorageProvider<P>`]
/// - `P`: the projection kind this controller materializes
/// - `B`: fold strategy, full replay by default
pub struct Controller<S, P, B = ReplayBuilder> {
    storage: S,
    builder: B,
    _projection: PhantomData<fn() -> P>,
}

impl<S, P> Controller<S, P, ReplayBuilder>
where
    S: StorageProvider<P>,
    P: Projection,
{
    pub fn new(storage: S) -> Self {
        Self::with_builder(storage, ReplayBuilder)
    }
}

impl<S, P, B> Controller<S, P, B>
where
    S: StorageProvider<P>,
    P: Projection,
    B: ProjectionBuilder<P>,
{
    pub fn with_builder(storage: S, builder: B) -> Self {
        Self {
            storage,
            builder,
            _projection: PhantomData,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Append `event` and rebuild the entity's projection from its full history.
    ///
    /// Returns the projection that was written to the cache.
    ///
    /// # Errors
    ///
    /// Any storage failure, unchanged. If `append` fails nothing else runs.
    /// A backend that returns an empty history right after a successful
    /// append violates the port contract and yields [`StorageError::Backend`].
    #[instrument(
        skip(self, ctx, event),
        fields(
            projection = P::KIND,
            entity_id = %event.entity_id(),
            event_id = %event.event_id(),
            event_name = event.event_name()
        ),
        err(level = "warn")
    )]
    pub fn save_event(&self, ctx: &Context, event: Event<P::Event>) -> Result<P, StorageError> {
        self.storage.append(ctx, &event)?;

        self.rebuild(ctx, event.entity_id())?.ok_or_else(|| {
            StorageError::Backend(format!(
                "history for entity '{}' is empty after a successful append",
                event.entity_id()
            ))
        })
    }

    /// Return the current projection for `entity_id`, rebuilding it if the
    /// cached copy is missing or stale.
    ///
    /// `Ok(None)` means the entity has no events at all.
    ///
    /// # Errors
    ///
    /// Any storage failure, unchanged.
    #[instrument(skip(self, ctx), fields(projection = P::KIND), err(level = "warn"))]
    pub fn get_latest_projection(
        &self,
        ctx: &Context,
        entity_id: &EntityId,
    ) -> Result<Option<P>, StorageError> {
        let Some(cached) = self.storage.fetch_projection(ctx, entity_id)? else {
            debug!("no cached projection; rebuilding from history");
            return self.rebuild(ctx, entity_id);
        };

        let latest = self.storage.fetch_latest_event_id(ctx, entity_id)?;
        if cached.last_event_id() == latest.as_ref() {
            debug!(last_event_id = ?latest, "cached projection is fresh");
            return Ok(Some(cached));
        }

        debug!(
            cached_event_id = ?cached.last_event_id(),
            latest_event_id = ?latest,
            "cached projection is stale; rebuilding"
        );
        self.rebuild(ctx, entity_id)
    }

    /// Force a rebuild: fetch the full ordered history, fold it and replace the
    /// cached projection.
    ///
    /// An entity without events yields `Ok(None)` and nothing is written.
    ///
    /// # Errors
    ///
    /// Any storage failure, unchanged. The cache is untouched unless the fold
    /// result was produced.
    #[instrument(skip(self, ctx), fields(projection = P::KIND), err(level = "warn"))]
    pub fn rebuild(&self, ctx: &Context, entity_id: &EntityId) -> Result<Option<P>, StorageError> {
        let history = self.storage.fetch_ordered_events(ctx, entity_id)?;
        if history.is_empty() {
            debug!("entity has no events");
            return Ok(None);
        }

        let projection = self.builder.build(&history);
        self.storage.upsert_projection(ctx, &projection)?;

        debug!(
            event_count = history.len(),
            last_event_id = ?projection.last_event_id(),
            "projection rebuilt"
        );
        Ok(Some(projection))
    }
}

impl<S, P, B> core::fmt::Debug for Controller<S, P, B>
where
    S: core::fmt::Debug,
    P: Projection,
    B: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("projection", &P::KIND)
            .field("storage", &self.storage)
            .field("builder", &self.builder)
            .finish()
    }
}
