//! Event dispatch system
//!
//! Notifications the widget emits outward to the host application.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Event type identifier
pub type EventType = u32;

/// Widget notification types
pub mod event_types {
    use super::EventType;

    /// Bottom sentinel reached while `has-next-page` is set
    pub const END_REACHED: EventType = 1;
    /// Top sentinel reached while `has-previous-page` is set
    pub const START_REACHED: EventType = 2;
    /// Pull-to-refresh committed (gesture or programmatic)
    pub const REFRESH: EventType = 3;
    /// Pull-to-refresh drag progress
    pub const REFRESH_PULLING: EventType = 4;

    /// Every notification type, in declaration order
    pub const ALL: [EventType; 4] = [END_REACHED, START_REACHED, REFRESH, REFRESH_PULLING];
}

/// DOM-style name of a notification type
pub fn event_name(event_type: EventType) -> &'static str {
    match event_type {
        event_types::END_REACHED => "end-reached",
        event_types::START_REACHED => "start-reached",
        event_types::REFRESH => "refresh",
        event_types::REFRESH_PULLING => "refresh-pulling",
        _ => "unknown",
    }
}

/// Look up a notification type by its DOM-style name
pub fn event_type_from_name(name: &str) -> Option<EventType> {
    event_types::ALL
        .into_iter()
        .find(|ty| event_name(*ty) == name)
}

/// Progress payload carried by `refresh-pulling`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PullProgress {
    /// Damped affordance height in pixels
    pub distance: f32,
    /// Commit threshold in pixels
    pub threshold: f32,
    /// `distance / threshold`, capped at 1
    pub progress: f32,
}

impl PullProgress {
    pub fn new(distance: f32, threshold: f32) -> Self {
        let progress = if threshold > 0.0 {
            (distance / threshold).min(1.0)
        } else {
            1.0
        };
        Self {
            distance,
            threshold,
            progress,
        }
    }
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    Pull(PullProgress),
    None,
}

/// A widget notification
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
    /// Host clock time at emission, in milliseconds
    pub timestamp_ms: f64,
    /// Propagates to ancestors
    pub bubbles: bool,
    /// Crosses shadow-root boundaries
    pub composed: bool,
}

impl Event {
    /// A bubbling, composed notification without payload
    pub fn new(event_type: EventType, timestamp_ms: f64) -> Self {
        Self {
            event_type,
            data: EventData::None,
            timestamp_ms,
            bubbles: true,
            composed: true,
        }
    }

    /// A bubbling, composed `refresh-pulling` notification
    pub fn pulling(progress: PullProgress, timestamp_ms: f64) -> Self {
        Self {
            data: EventData::Pull(progress),
            ..Self::new(event_types::REFRESH_PULLING, timestamp_ms)
        }
    }

    /// DOM-style name of this event
    pub fn name(&self) -> &'static str {
        event_name(self.event_type)
    }

    /// Pull payload, if this is a `refresh-pulling` event
    pub fn pull_progress(&self) -> Option<PullProgress> {
        match self.data {
            EventData::Pull(progress) => Some(progress),
            EventData::None => None,
        }
    }
}

/// Event handler function type
pub type EventHandler = Box<dyn Fn(&Event)>;

/// Dispatches notifications to registered handlers
pub struct EventDispatcher {
    handlers: FxHashMap<EventType, Vec<EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register a handler for an event type
    pub fn register<F>(&mut self, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + 'static,
    {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(Box::new(handler));
    }

    /// Dispatch an event to all handlers for its type, in registration order
    pub fn dispatch(&self, event: &Event) {
        tracing::trace!("dispatch {}", event.name());
        if let Some(handlers) = self.handlers.get(&event.event_type) {
            for handler in handlers {
                handler(event);
            }
        }
    }

    /// Number of handlers registered for an event type
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Remove every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_names_round_trip() {
        for ty in event_types::ALL {
            assert_eq!(event_type_from_name(event_name(ty)), Some(ty));
        }
        assert_eq!(event_type_from_name("endreached"), None);
    }

    #[test]
    fn test_pull_progress_caps_at_one() {
        let p = PullProgress::new(30.0, 60.0);
        assert_eq!(p.progress, 0.5);

        let p = PullProgress::new(90.0, 60.0);
        assert_eq!(p.progress, 1.0);
        assert_eq!(p.distance, 90.0);
    }

    #[test]
    fn test_events_bubble_and_compose() {
        let e = Event::new(event_types::END_REACHED, 0.0);
        assert!(e.bubbles);
        assert!(e.composed);
        assert_eq!(e.name(), "end-reached");
        assert!(e.pull_progress().is_none());

        let e = Event::pulling(PullProgress::new(10.0, 60.0), 5.0);
        assert_eq!(e.event_type, event_types::REFRESH_PULLING);
        assert!(e.bubbles && e.composed);
        assert_eq!(e.pull_progress().map(|p| p.distance), Some(10.0));
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();

        let first = log.clone();
        dispatcher.register(event_types::REFRESH, move |_| first.borrow_mut().push(1));
        let second = log.clone();
        dispatcher.register(event_types::REFRESH, move |_| second.borrow_mut().push(2));

        dispatcher.dispatch(&Event::new(event_types::REFRESH, 0.0));
        dispatcher.dispatch(&Event::new(event_types::END_REACHED, 0.0));

        assert_eq!(*log.borrow(), vec![1, 2]);
        assert_eq!(dispatcher.handler_count(event_types::REFRESH), 2);
        assert_eq!(dispatcher.handler_count(event_types::END_REACHED), 0);

        dispatcher.clear();
        assert_eq!(dispatcher.handler_count(event_types::REFRESH), 0);
    }
}
