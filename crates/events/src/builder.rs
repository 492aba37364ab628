//! Projection builders (ordered events → projection).
//!
//! Read models are **disposable**; events are the source of truth. A builder
//! is a pure function of the ordered history it is given.

use tracing::{debug, warn};

use crate::{Event, Projection};

/// Folds an entity's ordered history into a projection.
///
/// Implementations must be deterministic: the same sequence always yields an
/// identical projection.
pub trait ProjectionBuilder<P>: Send + Sync
where
    P: Projection,
{
    fn build(&self, events: &[Event<P::Event>]) -> P;
}

/// Full-replay builder: starts from `P::default()` and applies every event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayBuilder;

impl<P> ProjectionBuilder<P> for ReplayBuilder
where
    P: Projection,
{
    fn build(&self, events: &[Event<P::Event>]) -> P {
        replay(events)
    }
}

/// Rebuild a projection from scratch by replaying `events` in the order given.
///
/// Variants the projection does not handle are skipped; bookkeeping still
/// advances past them so the result's `last_event_id` matches the history.
/// Out-of-order or foreign-entity input is logged but not corrected.
pub fn replay<P>(events: &[Event<P::Event>]) -> P
where
    P: Projection,
{
    let mut projection = P::default();
    let mut previous: Option<&Event<P::Event>> = None;

    for event in events {
        if let Some(prev) = previous {
            if event.created_at() < prev.created_at() {
                warn!(
                    projection = P::KIND,
                    event_id = %event.event_id(),
                    previous_event_id = %prev.event_id(),
                    "events replayed out of order"
                );
            }
            if event.entity_id() != prev.entity_id() {
                warn!(
                    projection = P::KIND,
                    expected = %prev.entity_id(),
                    found = %event.entity_id(),
                    "history mixes entities"
                );
            }
        }

        projection.meta_mut().record(event);
        if let Err(unhandled) = projection.apply(event) {
            debug!(
                projection = P::KIND,
                entity_id = %event.entity_id(),
                event_id = %event.event_id(),
                event_name = %unhandled.event_name,
                "skipping event"
            );
        }
        previous = Some(event);
    }

    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventPayload, ProjectionMeta, UnhandledEvent};
    use chrono::{DateTime, TimeZone, Utc};
    use projector_core::{EntityId, EventId};
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    enum UserEvent {
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

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    struct UserView {
        #[serde(flatten)]
        meta: ProjectionMeta,
        value: String,
        revisions: u32,
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
                    self.revisions += 1;
                    Ok(())
                }
                UserEvent::Archived => Err(UnhandledEvent::of(event)),
            }
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn stored(id: &str, secs: i64, payload: UserEvent) -> Event<UserEvent> {
        let name = payload.event_name();
        Event::from_parts(EntityId::new("user-1"), EventId::from(id), name, at(secs), payload)
    }

    #[test]
    fn empty_history_yields_zero_state() {
        let view = replay::<UserView>(&[]);
        assert_eq!(view, UserView::default());
        assert!(view.last_event_id().is_none());
    }

    #[test]
    fn folds_events_in_order() {
        let events = vec![
            stored("e-1", 1, UserEvent::Created { value: "A".into() }),
            stored("e-2", 2, UserEvent::Updated { value: "B".into() }),
        ];

        let view: UserView = ProjectionBuilder::<UserView>::build(&ReplayBuilder, &events);
        assert_eq!(view.value, "B");
        assert_eq!(view.revisions, 2);
        assert_eq!(view.entity_id().as_str(), "user-1");
        assert_eq!(view.last_event_id(), Some(&EventId::from("e-2")));
        assert_eq!(view.last_event_time(), Some(at(2)));
    }

    #[test]
    fn unhandled_variants_are_skipped_but_tracked() {
        let events = vec![
            stored("e-1", 1, UserEvent::Created { value: "A".into() }),
            stored("e-2", 2, UserEvent::Archived),
        ];

        let view = replay::<UserView>(&events);
        assert_eq!(view.value, "A");
        assert_eq!(view.revisions, 1);
        assert_eq!(view.last_event_id(), Some(&EventId::from("e-2")));
    }

    fn arb_event() -> impl Strategy<Value = UserEvent> {
        prop_oneof![
            "[a-z]{0,8}".prop_map(|value| UserEvent::Created { value }),
            "[a-z]{0,8}".prop_map(|value| UserEvent::Updated { value }),
            Just(UserEvent::Archived),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: replaying the same ordered history always yields an identical projection.
        #[test]
        fn replay_is_deterministic(payloads in prop::collection::vec(arb_event(), 0..32)) {
            let events: Vec<_> = payloads
                .into_iter()
                .enumerate()
                .map(|(i, p)| stored(&format!("e-{i:04}"), i as i64, p))
                .collect();

            let first = replay::<UserView>(&events);
            let second = replay::<UserView>(&events);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                serde_json::to_vec(&first).unwrap(),
                serde_json::to_vec(&second).unwrap()
            );
            prop_assert_eq!(first.last_event_id(), events.last().map(|e| e.event_id()));
        }
    }
}
