//! Widget Context - manages widget state, FSM, and re-rendering
//!
//! The WidgetContext provides:
//! - Reactive state management via signals
//! - FSM-driven interaction states
//! - Event dispatch and handling
//! - Efficient re-rendering through dirty tracking
//!
//! There is no layout tree in this library (the host draws the widget's
//! [`view`](crate::date_button::DateButton::view) snapshot), so all storage
//! is keyed directly by [`WidgetId`].

use std::any::Any;
use std::sync::{Arc, Mutex};

use datebutton_core::events::{Event, EventDispatcher};
use datebutton_core::fsm::StateMachine;
use datebutton_core::reactive::{Derived, ReactiveGraph, Signal};
use rustc_hash::FxHashSet;
use slotmap::{Key, SlotMap};

use crate::widget::WidgetId;

/// Trait for widget state types
///
/// Any type stored as widget state must implement this trait; the `as_any`
/// methods enable type-safe downcasting. Blanket-implemented for every
/// `Send + 'static` type.
pub trait WidgetState: Send + 'static {
    /// Get self as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Get self as mutable Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Send + 'static> WidgetState for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-widget data stored in the context
#[derive(Default)]
struct WidgetData {
    /// Optional FSM for interaction states
    fsm: Option<StateMachine>,
    /// Custom state (type-erased)
    state: Option<Box<dyn WidgetState>>,
}

/// Dirty tracking for incremental re-renders
#[derive(Default)]
pub struct DirtyTracker {
    dirty: FxHashSet<WidgetId>,
}

impl DirtyTracker {
    /// Create a new dirty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a widget as dirty (needs re-render)
    pub fn mark(&mut self, id: WidgetId) {
        self.dirty.insert(id);
    }

    /// Check if a widget is dirty
    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.dirty.contains(&id)
    }

    /// Check if any widgets are dirty
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Take all dirty widget IDs (clears the set)
    pub fn take_dirty(&mut self) -> Vec<WidgetId> {
        self.dirty.drain().collect()
    }

    /// Clear all dirty flags
    pub fn clear_all(&mut self) {
        self.dirty.clear();
    }
}

/// Shared mutable state accessible from reactive callbacks
struct SharedContext {
    /// Widgets to mark dirty once control returns to the context
    pending_dirty: Vec<WidgetId>,
}

/// The central coordinator for widget state
///
/// Owns the reactive graph, the event dispatcher, per-widget FSMs and typed
/// state, and the dirty tracker.
pub struct WidgetContext {
    /// Per-widget data
    widgets: SlotMap<WidgetId, WidgetData>,
    /// Dirty tracker
    dirty: DirtyTracker,
    /// Reactive graph for signals, derived values, and effects
    pub reactive: ReactiveGraph,
    /// Event dispatcher
    pub events: EventDispatcher,
    /// Shared context for callbacks
    shared: Arc<Mutex<SharedContext>>,
}

impl Default for WidgetContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetContext {
    /// Create a new widget context
    pub fn new() -> Self {
        Self {
            widgets: SlotMap::with_key(),
            dirty: DirtyTracker::new(),
            reactive: ReactiveGraph::new(),
            events: EventDispatcher::new(),
            shared: Arc::new(Mutex::new(SharedContext {
                pending_dirty: Vec::new(),
            })),
        }
    }

    // =========================================================================
    // Widget Registration
    // =========================================================================

    /// Register a new widget and get its ID
    pub fn register_widget(&mut self) -> WidgetId {
        let id = self.widgets.insert(WidgetData::default());
        self.dirty.mark(id);
        id
    }

    /// Register a widget with a state machine
    pub fn register_widget_with_fsm(&mut self, fsm: StateMachine) -> WidgetId {
        let id = self.widgets.insert(WidgetData {
            fsm: Some(fsm),
            state: None,
        });
        self.dirty.mark(id);
        id
    }

    /// Unregister a widget, dropping its FSM, state, and event handlers
    pub fn unregister_widget(&mut self, id: WidgetId) {
        if self.widgets.remove(id).is_some() {
            self.events.unregister_target(id.data().as_ffi());
        }
    }

    /// Check if a widget is registered
    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    // =========================================================================
    // State Machine Integration
    // =========================================================================

    /// Send an event type to a widget's FSM
    ///
    /// Returns true if the FSM transitioned; the widget is marked dirty.
    pub fn send_fsm_event(&mut self, id: WidgetId, event_type: u32) -> bool {
        let Some(fsm) = self.widgets.get_mut(id).and_then(|d| d.fsm.as_mut()) else {
            return false;
        };
        if fsm.send(event_type) {
            self.dirty.mark(id);
            true
        } else {
            false
        }
    }

    /// Get a widget's current FSM state
    pub fn get_fsm_state(&self, id: WidgetId) -> Option<u32> {
        self.widgets
            .get(id)
            .and_then(|d| d.fsm.as_ref())
            .map(|fsm| fsm.current_state())
    }

    // =========================================================================
    // Reactive Signals
    // =========================================================================

    /// Create a signal that marks `id` dirty whenever it changes
    pub fn create_signal<T: Clone + Send + 'static>(
        &mut self,
        id: WidgetId,
        initial: T,
    ) -> Signal<T> {
        let signal = self.reactive.create_signal(initial);

        let shared = self.shared.clone();
        self.reactive.create_effect(move |graph| {
            // Read the signal to register it as a dependency
            let _ = graph.get(signal);
            if let Ok(mut shared) = shared.lock() {
                shared.pending_dirty.push(id);
            }
        });
        self.process_pending();

        signal
    }

    /// Get a signal's value
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.reactive.get_untracked(signal)
    }

    /// Set a signal's value
    pub fn set<T: Send + 'static>(&mut self, signal: Signal<T>, value: T) {
        self.reactive.set(signal, value);
        self.process_pending();
    }

    /// Update a signal's value with a function
    pub fn update<T: Clone + Send + 'static, F: FnOnce(T) -> T>(
        &mut self,
        signal: Signal<T>,
        f: F,
    ) {
        self.reactive.update(signal, f);
        self.process_pending();
    }

    /// Get a derived value, recomputing it if stale
    pub fn get_derived<T: Clone + 'static>(&mut self, derived: Derived<T>) -> Option<T> {
        self.reactive.get_derived(derived)
    }

    /// Batch multiple signal updates (effects run once at the end)
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.reactive.batch_start();
        let result = f(self);
        self.reactive.batch_end();
        self.process_pending();
        result
    }

    // =========================================================================
    // Widget State
    // =========================================================================

    /// Set custom state for a widget
    pub fn set_widget_state<S: WidgetState>(&mut self, id: WidgetId, state: S) {
        if let Some(data) = self.widgets.get_mut(id) {
            data.state = Some(Box::new(state));
            self.dirty.mark(id);
        }
    }

    /// Get custom state for a widget
    pub fn get_widget_state<S: 'static>(&self, id: WidgetId) -> Option<&S> {
        self.widgets
            .get(id)
            .and_then(|d| d.state.as_ref())
            .and_then(|s| (**s).as_any().downcast_ref())
    }

    /// Get mutable custom state for a widget
    pub fn get_widget_state_mut<S: 'static>(&mut self, id: WidgetId) -> Option<&mut S> {
        self.widgets
            .get_mut(id)
            .and_then(|d| d.state.as_mut())
            .and_then(|s| (**s).as_any_mut().downcast_mut())
    }

    // =========================================================================
    // Dirty Tracking
    // =========================================================================

    /// Mark a widget as needing re-render
    pub fn mark_dirty(&mut self, id: WidgetId) {
        self.dirty.mark(id);
    }

    /// Check if any widgets need re-rendering
    pub fn has_dirty(&self) -> bool {
        self.dirty.has_dirty()
    }

    /// Check if a specific widget needs re-rendering
    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.dirty.is_dirty(id)
    }

    /// Take all dirty widget IDs (clears the set)
    pub fn take_dirty(&mut self) -> Vec<WidgetId> {
        self.dirty.take_dirty()
    }

    /// Clear all dirty flags (call after rendering)
    pub fn clear_dirty(&mut self) {
        self.dirty.clear_all();
    }

    /// Get the dirty tracker
    pub fn dirty_tracker(&self) -> &DirtyTracker {
        &self.dirty
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Dispatch an event to a widget
    ///
    /// The event runs through the widget's FSM and then through any handlers
    /// registered for the widget via [`on_event`](Self::on_event).
    pub fn dispatch_event(&mut self, id: WidgetId, event: &Event) {
        self.send_fsm_event(id, event.event_type);

        let mut event_copy = event.clone();
        event_copy.target = id.data().as_ffi();
        self.events.dispatch(&mut event_copy);
    }

    /// Register an event handler for a widget
    pub fn on_event<F>(&mut self, id: WidgetId, event_type: u32, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.register(id.data().as_ffi(), event_type, handler);
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Apply dirty markers queued by reactive callbacks
    fn process_pending(&mut self) {
        let pending: Vec<WidgetId> = match self.shared.lock() {
            Ok(mut shared) => shared.pending_dirty.drain(..).collect(),
            Err(_) => return,
        };

        for id in pending {
            self.dirty.mark(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datebutton_core::events::event_types;

    #[derive(Debug)]
    struct TestState {
        value: i32,
    }

    #[test]
    fn test_widget_registration() {
        let mut ctx = WidgetContext::new();
        let id1 = ctx.register_widget();
        let id2 = ctx.register_widget();

        assert!(ctx.is_registered(id1));
        assert!(ctx.is_registered(id2));
        assert_ne!(id1, id2);

        ctx.unregister_widget(id1);
        assert!(!ctx.is_registered(id1));
        assert!(ctx.is_registered(id2));
    }

    #[test]
    fn test_widget_state_storage() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();

        ctx.set_widget_state(id, TestState { value: 42 });

        let state = ctx.get_widget_state::<TestState>(id);
        assert!(state.is_some(), "State should be retrievable");
        assert_eq!(state.unwrap().value, 42);

        let state_mut = ctx.get_widget_state_mut::<TestState>(id);
        assert!(state_mut.is_some(), "Mutable state should be retrievable");
        state_mut.unwrap().value = 100;

        let state = ctx.get_widget_state::<TestState>(id);
        assert_eq!(state.unwrap().value, 100);
    }

    #[test]
    fn test_fsm_integration() {
        let mut ctx = WidgetContext::new();
        let fsm = StateMachine::builder(0)
            .on(0, event_types::POINTER_ENTER, 1)
            .on(1, event_types::POINTER_LEAVE, 0)
            .build();
        let id = ctx.register_widget_with_fsm(fsm);

        assert_eq!(ctx.get_fsm_state(id), Some(0));
        ctx.clear_dirty();

        let transitioned = ctx.send_fsm_event(id, event_types::POINTER_ENTER);
        assert!(transitioned);
        assert_eq!(ctx.get_fsm_state(id), Some(1));
        assert!(ctx.is_dirty(id));

        // Undefined event: no transition, no dirty
        ctx.clear_dirty();
        let transitioned = ctx.send_fsm_event(id, event_types::POINTER_DOWN);
        assert!(!transitioned);
        assert!(!ctx.is_dirty(id));
    }

    #[test]
    fn test_dispatch_event_reaches_handlers() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        ctx.on_event(id, event_types::POINTER_UP, move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        ctx.dispatch_event(id, &Event::pointer(event_types::POINTER_UP, 0.0, 0.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_signal_marks_widget_dirty() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();
        let signal = ctx.create_signal(id, 0i64);

        ctx.clear_dirty();
        assert!(!ctx.is_dirty(id));

        ctx.set(signal, 42);
        assert!(ctx.is_dirty(id));
        assert_eq!(ctx.get(signal), Some(42));
    }

    #[test]
    fn test_update_and_batch() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();
        let a = ctx.create_signal(id, 1i32);
        let b = ctx.create_signal(id, 2i32);

        ctx.update(a, |x| x + 9);
        assert_eq!(ctx.get(a), Some(10));

        ctx.clear_dirty();
        ctx.batch(|ctx| {
            ctx.set(a, 100);
            ctx.set(b, 200);
        });
        assert!(ctx.is_dirty(id));
        assert_eq!(ctx.get(a), Some(100));
        assert_eq!(ctx.get(b), Some(200));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut ctx = WidgetContext::new();
        let id1 = ctx.register_widget();
        let id2 = ctx.register_widget();

        ctx.clear_dirty();
        assert!(!ctx.has_dirty());

        ctx.mark_dirty(id1);
        assert!(ctx.has_dirty());
        assert!(ctx.is_dirty(id1));
        assert!(!ctx.is_dirty(id2));

        let dirty = ctx.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert!(!ctx.has_dirty());
    }
}
