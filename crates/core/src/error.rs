//! Core error model.

use thiserror::Error;

/// Failure raised by [`Context::check`](crate::Context::check).
///
/// Storage adapters surface this inside their own error type; it is never
/// retried by the engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The caller cancelled the context.
    #[error("context cancelled")]
    Cancelled,

    /// The context deadline passed before the call completed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// An identifier could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid identifier: {0}")]
pub struct IdError(pub String);

impl IdError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
