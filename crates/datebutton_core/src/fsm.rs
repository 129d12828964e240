//! Widget interaction state machines
//!
//! A [`StateMachine`] is a flat transition table over `u32` states and event
//! types. Widgets declare their interaction states (idle, pressed, dialog
//! open, ...) and the events that move between them; events with no
//! transition from the current state are ignored, which is how widgets
//! express "this input means nothing right now".
//!
//! # Example
//!
//! ```rust
//! use datebutton_core::fsm::StateMachine;
//!
//! const IDLE: u32 = 0;
//! const PRESSED: u32 = 1;
//!
//! let mut fsm = StateMachine::builder(IDLE)
//!     .on(IDLE, 3, PRESSED)
//!     .on(PRESSED, 4, IDLE)
//!     .build();
//!
//! assert_eq!(fsm.current_state(), IDLE);
//! fsm.send(3);
//! assert_eq!(fsm.current_state(), PRESSED);
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A state identifier
pub type StateId = u32;

/// An event type identifier (see `events::event_types`)
pub type EventId = u32;

/// A single transition edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

/// A widget interaction state machine
pub struct StateMachine {
    initial: StateId,
    current: StateId,
    transitions: FxHashMap<(StateId, EventId), StateId>,
}

impl StateMachine {
    /// Start building a state machine with the given initial state
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            transitions: SmallVec::new(),
        }
    }

    /// Get the current state
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Send an event to the machine
    ///
    /// Returns true if a transition fired. Events with no transition from
    /// the current state leave the machine unchanged.
    pub fn send(&mut self, event: EventId) -> bool {
        match self.transitions.get(&(self.current, event)) {
            Some(&next) => {
                tracing::trace!(from = self.current, to = next, event, "fsm transition");
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// Reset to the initial state
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Builder for [`StateMachine`]
pub struct StateMachineBuilder {
    initial: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachineBuilder {
    /// Add a transition: in `from`, event `event` moves to `to`
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition { from, event, to });
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine {
        let mut transitions = FxHashMap::default();
        for t in self.transitions {
            transitions.insert((t.from, t.event), t.to);
        }
        StateMachine {
            initial: self.initial,
            current: self.initial,
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_types;

    const IDLE: u32 = 0;
    const HOVERED: u32 = 1;
    const PRESSED: u32 = 2;

    fn button_fsm() -> StateMachine {
        StateMachine::builder(IDLE)
            .on(IDLE, event_types::POINTER_ENTER, HOVERED)
            .on(HOVERED, event_types::POINTER_LEAVE, IDLE)
            .on(HOVERED, event_types::POINTER_DOWN, PRESSED)
            .on(PRESSED, event_types::POINTER_UP, HOVERED)
            .on(PRESSED, event_types::POINTER_LEAVE, IDLE)
            .build()
    }

    #[test]
    fn test_transitions() {
        let mut fsm = button_fsm();
        assert_eq!(fsm.current_state(), IDLE);

        assert!(fsm.send(event_types::POINTER_ENTER));
        assert_eq!(fsm.current_state(), HOVERED);

        assert!(fsm.send(event_types::POINTER_DOWN));
        assert_eq!(fsm.current_state(), PRESSED);

        assert!(fsm.send(event_types::POINTER_UP));
        assert_eq!(fsm.current_state(), HOVERED);
    }

    #[test]
    fn test_undefined_event_is_ignored() {
        let mut fsm = button_fsm();

        // POINTER_UP has no transition from IDLE
        assert!(!fsm.send(event_types::POINTER_UP));
        assert_eq!(fsm.current_state(), IDLE);
    }

    #[test]
    fn test_reset() {
        let mut fsm = button_fsm();
        fsm.send(event_types::POINTER_ENTER);
        assert_eq!(fsm.current_state(), HOVERED);

        fsm.reset();
        assert_eq!(fsm.current_state(), IDLE);
    }
}
