//! Event types and dispatch
//!
//! Events are plain data: a `u32` event type, an opaque target, and a typed
//! payload. Hosts translate their native input (mouse, touch, dialog
//! results) into these events and feed them to widgets; widgets feed them to
//! their state machines.

use rustc_hash::FxHashMap;

/// Well-known event type constants
///
/// Widget state machines key their transitions on these. Values below 100
/// are pointer/input events produced by the host; values from 100 up are
/// widget-domain events (dialog outcomes).
pub mod event_types {
    /// Pointer entered the widget bounds
    pub const POINTER_ENTER: u32 = 1;
    /// Pointer left the widget bounds
    pub const POINTER_LEAVE: u32 = 2;
    /// Pointer (or touch) pressed down on the widget
    pub const POINTER_DOWN: u32 = 3;
    /// Pointer (or touch) released on the widget
    pub const POINTER_UP: u32 = 4;

    /// The date-selection dialog was confirmed
    pub const PICKER_CONFIRM: u32 = 100;
    /// The date-selection dialog was cancelled or dismissed
    pub const PICKER_CANCEL: u32 = 101;
}

/// Typed event payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventData {
    /// No payload
    None,
    /// Pointer position and button state
    Pointer {
        x: f32,
        y: f32,
        button: u8,
        pressure: f32,
    },
    /// A date confirmed in the selection dialog
    ///
    /// `month0` is zero-indexed (0 = January), matching the native dialog
    /// convention.
    DatePicked { year: i32, month0: u32, day: u32 },
}

/// A single event instance
#[derive(Clone, Debug)]
pub struct Event {
    /// Event type (see [`event_types`])
    pub event_type: u32,
    /// Opaque target identifier (widget key), 0 if untargeted
    pub target: u64,
    /// Typed payload
    pub data: EventData,
    /// Host-provided timestamp in milliseconds, 0 if unknown
    pub timestamp: u64,
    /// Set by handlers to stop further dispatch
    pub propagation_stopped: bool,
}

impl Event {
    /// Create an event with no payload
    pub fn new(event_type: u32) -> Self {
        Self {
            event_type,
            target: 0,
            data: EventData::None,
            timestamp: 0,
            propagation_stopped: false,
        }
    }

    /// Create a pointer event at a position
    pub fn pointer(event_type: u32, x: f32, y: f32) -> Self {
        Self {
            event_type,
            target: 0,
            data: EventData::Pointer {
                x,
                y,
                button: 0,
                pressure: 1.0,
            },
            timestamp: 0,
            propagation_stopped: false,
        }
    }

    /// Create a dialog-confirmed event carrying the selected date
    pub fn picker_confirmed(year: i32, month0: u32, day: u32) -> Self {
        Self {
            event_type: event_types::PICKER_CONFIRM,
            target: 0,
            data: EventData::DatePicked { year, month0, day },
            timestamp: 0,
            propagation_stopped: false,
        }
    }

    /// Create a dialog-cancelled event
    pub fn picker_cancelled() -> Self {
        Self::new(event_types::PICKER_CANCEL)
    }

    /// Stop further dispatch of this event
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

type Handler = Box<dyn Fn(&Event) + Send + Sync>;

/// Dispatches events to handlers registered per (target, event type)
#[derive(Default)]
pub struct EventDispatcher {
    handlers: FxHashMap<(u64, u32), Vec<Handler>>,
}

impl EventDispatcher {
    /// Create a new dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a (target, event type) pair
    pub fn register<F>(&mut self, target: u64, event_type: u32, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers
            .entry((target, event_type))
            .or_default()
            .push(Box::new(handler));
    }

    /// Remove all handlers for a target
    pub fn unregister_target(&mut self, target: u64) {
        self.handlers.retain(|(t, _), _| *t != target);
    }

    /// Dispatch an event to its target's handlers
    ///
    /// Handlers run in registration order until one stops propagation.
    pub fn dispatch(&self, event: &mut Event) {
        let Some(handlers) = self.handlers.get(&(event.target, event.event_type)) else {
            return;
        };

        for handler in handlers {
            if event.propagation_stopped {
                break;
            }
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispatch_to_registered_target() {
        let mut dispatcher = EventDispatcher::new();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_clone = calls.clone();
        dispatcher.register(7, event_types::POINTER_DOWN, move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Event::pointer(event_types::POINTER_DOWN, 1.0, 2.0);
        event.target = 7;
        dispatcher.dispatch(&mut event);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Different target: no dispatch
        event.target = 8;
        dispatcher.dispatch(&mut event);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stopped_event_is_not_dispatched() {
        let mut dispatcher = EventDispatcher::new();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_clone = calls.clone();
        dispatcher.register(3, event_types::POINTER_DOWN, move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Event::new(event_types::POINTER_DOWN);
        event.target = 3;
        event.stop_propagation();
        dispatcher.dispatch(&mut event);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregister_target() {
        let mut dispatcher = EventDispatcher::new();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_clone = calls.clone();
        dispatcher.register(1, event_types::POINTER_UP, move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        dispatcher.unregister_target(1);

        let mut event = Event::new(event_types::POINTER_UP);
        event.target = 1;
        dispatcher.dispatch(&mut event);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_picker_confirmed_payload() {
        let event = Event::picker_confirmed(2024, 2, 15);
        assert_eq!(event.event_type, event_types::PICKER_CONFIRM);
        assert_eq!(
            event.data,
            EventData::DatePicked {
                year: 2024,
                month0: 2,
                day: 15
            }
        );
    }
}
