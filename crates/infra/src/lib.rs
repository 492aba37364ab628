//! Infrastructure layer: storage port, reference adapter, controller, config.

pub mod config;
pub mod controller;
pub mod storage;

pub use config::{ConfigError, EngineConfig};
pub use controller::Controller;
pub use storage::{EventRegistry, InMemoryStorage, StorageError, StorageProvider};

#[cfg(test)]
mod test_support;
