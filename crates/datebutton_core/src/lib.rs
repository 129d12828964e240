//! DateButton Core Runtime
//!
//! This crate provides the foundational primitives for the DateButton widget
//! stack:
//!
//! - **Reactive Signals**: Fine-grained reactivity for widget state
//! - **State Machines**: Interaction states (idle, pressed, picker open)
//! - **Event Dispatch**: Unified event handling across hosts
//! - **Color**: The value type widget styling is expressed in
//!
//! # Example
//!
//! ```rust
//! use datebutton_core::reactive::ReactiveGraph;
//!
//! let mut graph = ReactiveGraph::new();
//!
//! // Create a signal
//! let count = graph.create_signal(0i32);
//!
//! // Create a derived value
//! let doubled = graph.create_derived(move |g| {
//!     g.get(count).unwrap_or(0) * 2
//! });
//!
//! // Update the signal
//! graph.set(count, 5);
//! assert_eq!(graph.get_derived(doubled), Some(10));
//! ```

pub mod color;
pub mod events;
pub mod fsm;
pub mod reactive;

pub use color::Color;
pub use events::{event_types, Event, EventData, EventDispatcher};
pub use fsm::{EventId, StateId, StateMachine, Transition};
pub use reactive::{Derived, Effect, ReactiveGraph, Signal};
