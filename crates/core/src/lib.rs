//! `projector-core` — identifiers, time and call-context primitives.
//!
//! This crate has **no storage or domain knowledge**; every other crate in the
//! workspace builds on these types.

pub mod clock;
pub mod context;
pub mod error;
pub mod id;

pub use clock::now_monotonic;
pub use context::Context;
pub use error::{ContextError, IdError};
pub use id::{EntityId, EventId};
