//! Fine-grained reactive signal system
//!
//! A push-pull hybrid: signals push invalidation to their subscribers,
//! derived values pull (lazily recompute) when read, and effects are queued
//! and batched. Dependency tracking is automatic — reading a signal inside a
//! derived computation or an effect records it as a dependency.
//!
//! The DateButton widget keeps its current date and display format in
//! signals and its rendered label in a derived value, so the label can never
//! disagree with the fields it is computed from.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::marker::PhantomData;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for a derived/computed value
    pub struct DerivedId;
    /// Unique identifier for an effect
    pub struct EffectId;
}

/// Subscriber types that can react to signal changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubscriberId {
    Derived(DerivedId),
    Effect(EffectId),
}

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: PhantomData<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    /// Get the signal's internal ID
    pub fn id(&self) -> SignalId {
        self.id
    }
}

/// A derived/computed value handle
#[derive(Debug)]
pub struct Derived<T> {
    id: DerivedId,
    _marker: PhantomData<T>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Derived<T> {}

impl<T> Derived<T> {
    pub fn id(&self) -> DerivedId {
        self.id
    }
}

/// An effect handle
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.id
    }
}

type ComputeFn = Box<dyn Fn(&ReactiveGraph) -> Box<dyn Any + Send> + Send>;
type EffectFn = Box<dyn FnMut(&ReactiveGraph) + Send>;

struct SignalNode {
    /// The signal value (type-erased)
    value: Box<dyn Any + Send>,
    /// Subscribers to notify on change
    subscribers: SmallVec<[SubscriberId; 4]>,
}

struct DerivedNode {
    /// Cached value, if computed and not stale
    value: Option<Box<dyn Any + Send>>,
    /// The compute function; taken out of the node while it runs
    compute: Option<ComputeFn>,
    /// Signals this derived reads from
    dependencies: SmallVec<[SignalId; 4]>,
    /// Whether the cached value is stale
    dirty: Cell<bool>,
}

struct EffectNode {
    /// The effect function; taken out of the node while it runs
    run: Option<EffectFn>,
    /// Signals this effect reads from
    dependencies: SmallVec<[SignalId; 4]>,
    /// Whether the effect needs to run
    dirty: Cell<bool>,
}

/// The reactive graph that manages all signals, derived values, and effects
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
    derived: SlotMap<DerivedId, DerivedNode>,
    effects: SlotMap<EffectId, EffectNode>,
    /// Effects waiting to run
    pending_effects: RefCell<VecDeque<EffectId>>,
    /// Current batch depth (> 0 means effects are held back)
    batch_depth: Cell<u32>,
    /// Dependency-tracking scratch for the computation currently running
    tracking: RefCell<Option<Vec<SignalId>>>,
}

impl ReactiveGraph {
    /// Create a new reactive graph
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            derived: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            pending_effects: RefCell::new(VecDeque::new()),
            batch_depth: Cell::new(0),
            tracking: RefCell::new(None),
        }
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Create a new signal with an initial value
    pub fn create_signal<T: Send + 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            subscribers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: PhantomData,
        }
    }

    /// Get the current value of a signal
    ///
    /// If called within a tracking context (effect or derived computation),
    /// the signal is recorded as a dependency.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        if let Some(ref mut deps) = *self.tracking.borrow_mut() {
            if !deps.contains(&signal.id) {
                deps.push(signal.id);
            }
        }

        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Get the current value without recording a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Set the value of a signal, invalidating subscribers
    pub fn set<T: Send + 'static>(&mut self, signal: Signal<T>, value: T) {
        let Some(node) = self.signals.get_mut(signal.id) else {
            return;
        };
        node.value = Box::new(value);

        let subscribers: SmallVec<[SubscriberId; 4]> = node.subscribers.clone();
        for sub in subscribers {
            self.mark_subscriber_dirty(sub);
        }

        if self.batch_depth.get() == 0 {
            self.flush_effects();
        }
    }

    /// Update a signal using a function
    pub fn update<T: Clone + Send + 'static, F: FnOnce(T) -> T>(
        &mut self,
        signal: Signal<T>,
        f: F,
    ) {
        if let Some(current) = self.get_untracked(signal) {
            self.set(signal, f(current));
        }
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// Create a derived (computed) value
    pub fn create_derived<T, F>(&mut self, compute: F) -> Derived<T>
    where
        T: Clone + Send + 'static,
        F: Fn(&ReactiveGraph) -> T + Send + 'static,
    {
        let compute_boxed: ComputeFn = Box::new(move |graph| Box::new(compute(graph)));

        let id = self.derived.insert(DerivedNode {
            value: None,
            compute: Some(compute_boxed),
            dependencies: SmallVec::new(),
            // Start dirty to force the initial computation
            dirty: Cell::new(true),
        });

        Derived {
            id,
            _marker: PhantomData,
        }
    }

    /// Get the value of a derived, recomputing if stale
    pub fn get_derived<T: Clone + 'static>(&mut self, derived: Derived<T>) -> Option<T> {
        {
            let node = self.derived.get(derived.id)?;
            if !node.dirty.get() {
                if let Some(ref cached) = node.value {
                    return cached.downcast_ref::<T>().cloned();
                }
            }
        }

        // Recompute: take the closure out of the node so no borrow is held
        // while it reads the graph
        let compute = self.derived.get_mut(derived.id)?.compute.take()?;
        self.tracking.replace(Some(Vec::new()));
        let value = compute(self);
        let deps = self.tracking.take().unwrap_or_default();

        self.resubscribe(SubscriberId::Derived(derived.id), &deps);

        let node = self.derived.get_mut(derived.id)?;
        node.compute = Some(compute);
        node.dependencies = deps.into_iter().collect();
        node.dirty.set(false);

        let result = value.downcast_ref::<T>().cloned();
        node.value = Some(value);
        result
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Create an effect that runs when its dependencies change
    ///
    /// The effect runs once immediately to establish its dependencies.
    pub fn create_effect<F>(&mut self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + Send + 'static,
    {
        let id = self.effects.insert(EffectNode {
            run: Some(Box::new(run)),
            dependencies: SmallVec::new(),
            dirty: Cell::new(true),
        });

        self.pending_effects.borrow_mut().push_back(id);

        if self.batch_depth.get() == 0 {
            self.flush_effects();
        }

        Effect { id }
    }

    /// Dispose of an effect, removing it from the graph
    pub fn dispose_effect(&mut self, effect: Effect) {
        if let Some(node) = self.effects.remove(effect.id) {
            for &dep_id in &node.dependencies {
                if let Some(sig) = self.signals.get_mut(dep_id) {
                    sig.subscribers
                        .retain(|s| *s != SubscriberId::Effect(effect.id));
                }
            }
        }
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    /// Start a batch - effects won't run until the batch ends
    pub fn batch_start(&self) {
        self.batch_depth.set(self.batch_depth.get() + 1);
    }

    /// End a batch and flush pending effects
    pub fn batch_end(&mut self) {
        let depth = self.batch_depth.get();
        if depth > 0 {
            self.batch_depth.set(depth - 1);
            if depth == 1 {
                self.flush_effects();
            }
        }
    }

    /// Run a function in a batch context
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.batch_start();
        let result = f(self);
        self.batch_end();
        result
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn mark_subscriber_dirty(&mut self, sub: SubscriberId) {
        match sub {
            SubscriberId::Derived(id) => {
                if let Some(node) = self.derived.get(id) {
                    node.dirty.set(true);
                }
            }
            SubscriberId::Effect(id) => {
                if let Some(node) = self.effects.get(id) {
                    if !node.dirty.get() {
                        node.dirty.set(true);
                        self.pending_effects.borrow_mut().push_back(id);
                    }
                }
            }
        }
    }

    /// Replace a subscriber's signal subscriptions with a new dependency set
    fn resubscribe(&mut self, sub: SubscriberId, deps: &[SignalId]) {
        let old: SmallVec<[SignalId; 4]> = match sub {
            SubscriberId::Derived(id) => self
                .derived
                .get(id)
                .map(|n| n.dependencies.clone())
                .unwrap_or_default(),
            SubscriberId::Effect(id) => self
                .effects
                .get(id)
                .map(|n| n.dependencies.clone())
                .unwrap_or_default(),
        };

        for &dep_id in &old {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                sig.subscribers.retain(|s| *s != sub);
            }
        }

        for &dep_id in deps {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                if !sig.subscribers.contains(&sub) {
                    sig.subscribers.push(sub);
                }
            }
        }
    }

    /// Run all pending effects
    fn flush_effects(&mut self) {
        // Effects may invalidate each other; drain one at a time
        loop {
            let next = self.pending_effects.borrow_mut().pop_front();
            let Some(effect_id) = next else { break };
            self.run_effect(effect_id);
        }
    }

    fn run_effect(&mut self, effect_id: EffectId) {
        let should_run = self
            .effects
            .get(effect_id)
            .map(|n| n.dirty.get())
            .unwrap_or(false);
        if !should_run {
            return;
        }

        // Take the closure out of the node so no borrow is held while it
        // reads the graph
        let Some(mut run) = self.effects.get_mut(effect_id).and_then(|n| {
            n.dirty.set(false);
            n.run.take()
        }) else {
            return;
        };

        self.tracking.replace(Some(Vec::new()));
        run(self);
        let deps = self.tracking.take().unwrap_or_default();

        self.resubscribe(SubscriberId::Effect(effect_id), &deps);

        if let Some(node) = self.effects.get_mut(effect_id) {
            node.run = Some(run);
            node.dependencies = deps.into_iter().collect();
        }
    }
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_signal_create_get_set() {
        let mut graph = ReactiveGraph::new();

        let count = graph.create_signal(0i32);
        assert_eq!(graph.get(count), Some(0));

        graph.set(count, 42);
        assert_eq!(graph.get(count), Some(42));
    }

    #[test]
    fn test_signal_update() {
        let mut graph = ReactiveGraph::new();

        let count = graph.create_signal(10i32);
        graph.update(count, |x| x + 5);
        assert_eq!(graph.get(count), Some(15));
    }

    #[test]
    fn test_derived_basic() {
        let mut graph = ReactiveGraph::new();

        let count = graph.create_signal(5i32);
        let doubled = graph.create_derived(move |g| g.get(count).unwrap_or(0) * 2);

        assert_eq!(graph.get_derived(doubled), Some(10));

        graph.set(count, 7);
        assert_eq!(graph.get_derived(doubled), Some(14));
    }

    #[test]
    fn test_derived_caching() {
        let mut graph = ReactiveGraph::new();
        let compute_count = Arc::new(Mutex::new(0));

        let count = graph.create_signal(5i32);
        let compute_count_clone = compute_count.clone();
        let doubled = graph.create_derived(move |g| {
            *compute_count_clone.lock().unwrap() += 1;
            g.get(count).unwrap_or(0) * 2
        });

        // First access computes
        assert_eq!(graph.get_derived(doubled), Some(10));
        assert_eq!(*compute_count.lock().unwrap(), 1);

        // Second access uses the cache
        assert_eq!(graph.get_derived(doubled), Some(10));
        assert_eq!(*compute_count.lock().unwrap(), 1);

        // After a signal change, recomputes
        graph.set(count, 7);
        assert_eq!(graph.get_derived(doubled), Some(14));
        assert_eq!(*compute_count.lock().unwrap(), 2);
    }

    #[test]
    fn test_effect_runs_on_change() {
        let mut graph = ReactiveGraph::new();
        let effect_runs = Arc::new(Mutex::new(Vec::new()));

        let count = graph.create_signal(0i32);
        let effect_runs_clone = effect_runs.clone();

        let _effect = graph.create_effect(move |g| {
            let val = g.get(count).unwrap_or(0);
            effect_runs_clone.lock().unwrap().push(val);
        });

        // Effect runs immediately
        assert_eq!(*effect_runs.lock().unwrap(), vec![0]);

        // And on every signal change
        graph.set(count, 1);
        graph.set(count, 2);
        assert_eq!(*effect_runs.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_batching() {
        let mut graph = ReactiveGraph::new();
        let effect_runs = Arc::new(Mutex::new(0));

        let a = graph.create_signal(1i32);
        let b = graph.create_signal(2i32);
        let effect_runs_clone = effect_runs.clone();

        let _effect = graph.create_effect(move |g| {
            let _a = g.get(a);
            let _b = g.get(b);
            *effect_runs_clone.lock().unwrap() += 1;
        });

        assert_eq!(*effect_runs.lock().unwrap(), 1);

        // Without batching, the effect runs per set
        *effect_runs.lock().unwrap() = 0;
        graph.set(a, 10);
        graph.set(b, 20);
        assert_eq!(*effect_runs.lock().unwrap(), 2);

        // With batching, once
        *effect_runs.lock().unwrap() = 0;
        graph.batch(|g| {
            g.set(a, 100);
            g.set(b, 200);
        });
        assert_eq!(*effect_runs.lock().unwrap(), 1);
    }

    #[test]
    fn test_dispose_effect() {
        let mut graph = ReactiveGraph::new();
        let effect_runs = Arc::new(Mutex::new(0));

        let count = graph.create_signal(0i32);
        let effect_runs_clone = effect_runs.clone();

        let effect = graph.create_effect(move |g| {
            let _val = g.get(count);
            *effect_runs_clone.lock().unwrap() += 1;
        });

        graph.set(count, 1);
        assert_eq!(*effect_runs.lock().unwrap(), 2);

        graph.dispose_effect(effect);

        graph.set(count, 2);
        assert_eq!(*effect_runs.lock().unwrap(), 2);
    }

    #[test]
    fn test_derived_over_two_signals() {
        let mut graph = ReactiveGraph::new();

        let a = graph.create_signal(1i32);
        let b = graph.create_signal(2i32);

        let sum = graph.create_derived(move |g| g.get(a).unwrap_or(0) + g.get(b).unwrap_or(0));

        assert_eq!(graph.get_derived(sum), Some(3));

        graph.set(b, 10);
        assert_eq!(graph.get_derived(sum), Some(11));
    }
}
