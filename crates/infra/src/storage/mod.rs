//! Storage port and adapters.
//!
//! The controller depends only on [`StorageProvider`]; any backend that
//! implements its five operations with the documented contracts is
//! interchangeable. [`InMemoryStorage`] is the reference adapter.

pub mod in_memory;
pub mod record;
pub mod registry;
pub mod r#trait;

pub use in_memory::InMemoryStorage;
pub use record::{EventRecord, ProjectionRecord};
pub use registry::{DecodeFn, EventRegistry};
pub use r#trait::{StorageError, StorageProvider};
