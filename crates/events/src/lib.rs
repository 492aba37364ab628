//! Events, projections and the replay fold that connects them.

pub mod builder;
pub mod event;
pub mod projection;

pub use builder::{replay, ProjectionBuilder, ReplayBuilder};
pub use event::{Event, EventPayload};
pub use projection::{Projection, ProjectionMeta, UnhandledEvent};
