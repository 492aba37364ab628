//! Event-kind registry owned by a storage adapter.
//!
//! Maps a persisted event tag to the function that turns its payload back into
//! the domain type. Each adapter receives its registry at construction; there
//! is no process-wide registration.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use projector_events::{Event, EventPayload};

use super::record::EventRecord;
use super::r#trait::StorageError;

/// Callback decoding a stored payload into the domain event type.
pub type DecodeFn<E> = Arc<dyn Fn(&JsonValue) -> Result<E, String> + Send + Sync>;

pub struct EventRegistry<E> {
    decoders: BTreeMap<String, DecodeFn<E>>,
}

impl<E> EventRegistry<E>
where
    E: EventPayload,
{
    pub fn new() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    /// Register a decoder for `event_name`, replacing any previous one.
    pub fn with_event<F>(mut self, event_name: impl Into<String>, decode: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<E, String> + Send + Sync + 'static,
    {
        self.decoders.insert(event_name.into(), Arc::new(decode));
        self
    }

    /// Register `event_name` using `E`'s own `Deserialize` impl.
    pub fn with_serde_event(self, event_name: impl Into<String>) -> Self
    where
        E: DeserializeOwned,
    {
        self.with_event(event_name, |payload| {
            serde_json::from_value(payload.clone()).map_err(|e| e.to_string())
        })
    }

    pub fn is_registered(&self, event_name: &str) -> bool {
        self.decoders.contains_key(event_name)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Reconstruct an event from its stored record.
    ///
    /// Unregistered tags and payloads the decoder rejects are decode failures.
    pub fn decode(&self, record: &EventRecord) -> Result<Event<E>, StorageError> {
        let decode = self.decoders.get(&record.event_type).ok_or_else(|| {
            StorageError::Decode(format!(
                "event type '{}' is not registered with this storage adapter",
                record.event_type
            ))
        })?;

        let payload = decode(&record.payload).map_err(|e| {
            StorageError::Decode(format!(
                "event '{}' ({}) could not be decoded: {e}",
                record.event_id, record.event_type
            ))
        })?;

        Ok(Event::from_parts(
            record.entity_id.clone(),
            record.event_id.clone(),
            record.event_type.clone(),
            record.created_at,
            payload,
        ))
    }
}

impl<E> Default for EventRegistry<E>
where
    E: EventPayload,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            decoders: self.decoders.clone(),
        }
    }
}

impl<E> core::fmt::Debug for EventRegistry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("event_names", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
