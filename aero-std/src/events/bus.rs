//! Priority-ordered publish/subscribe bus.
//!
//! Listeners are registered under an event name with a signed priority.
//! Higher priorities run first; equal priorities keep registration order.
//!
//! # Snapshots
//!
//! The sorted listener list of an event name is computed once and cached
//! until a listener for that name is added or removed. Each trigger clones the
//! cached snapshot (an `Arc`) and releases the registry lock before calling any
//! listener, so listeners may freely register, remove or trigger on the same
//! bus: the running trigger keeps the snapshot it started with.
//!
//! # Example
//!
//! ```rust,ignore
//! use aero_std::EventBus;
//!
//! let bus: EventBus<Params, &'static str> = EventBus::new();
//! bus.on_with_priority("save", 10, |_| Ok("validate"));
//! bus.on("save", |_| Ok("write"));
//!
//! let results = bus.trigger("save", Params::new())?;
//! assert_eq!(results.into_vec(), vec!["validate", "write"]);
//! ```

use crate::events::aggregate::ListenerAggregate;
use aero_core::{BoxError, DEFAULT_PRIORITY, Event, Listener, ListenerId, Params, ResultStack};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt,
    marker::PhantomData,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

type SharedListener<P, R> = Arc<dyn Listener<P, R>>;
type Snapshot<P, R> = Arc<[SharedListener<P, R>]>;

struct Entry<P, R> {
    id: ListenerId,
    listener: SharedListener<P, R>,
}

struct Registry<P, R> {
    default_priority: i32,
    /// event name -> priority -> listeners in registration order
    events: HashMap<String, BTreeMap<i32, Vec<Entry<P, R>>>>,
    sorted: HashMap<String, Snapshot<P, R>>,
}

impl<P, R> Registry<P, R> {
    fn invalidate(&mut self, name: &str) {
        self.sorted.remove(name);
    }
}

/// A named-channel event bus with priorities and propagation control.
///
/// `P` is the event payload type, `R` the listener return type.
pub struct EventBus<P = Params, R = ()> {
    registry: Mutex<Registry<P, R>>,
    next_id: AtomicU64,
}

impl<P: 'static, R: 'static> Default for EventBus<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static, R: 'static> EventBus<P, R> {
    /// Create an empty bus with the default priority of [`DEFAULT_PRIORITY`].
    pub fn new() -> Self {
        Self::with_default_priority(DEFAULT_PRIORITY)
    }

    /// Create a builder.
    pub fn builder() -> EventBusBuilder<P, R> {
        EventBusBuilder::default()
    }

    fn with_default_priority(default_priority: i32) -> Self {
        Self {
            registry: Mutex::new(Registry {
                default_priority,
                events: HashMap::new(),
                sorted: HashMap::new(),
            }),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry<P, R>> {
        // Listeners never run under this lock, so a poisoned registry is still consistent.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The priority given to listeners registered without one.
    pub fn default_priority(&self) -> i32 {
        self.lock().default_priority
    }

    /// Change the priority given to listeners registered without one.
    pub fn set_default_priority(&self, priority: i32) {
        self.lock().default_priority = priority;
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a closure at the default priority.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&mut Event<P>) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.add_listener(event, listener, None)
    }

    /// Register a closure at the given priority.
    pub fn on_with_priority<F>(&self, event: impl Into<String>, priority: i32, listener: F) -> ListenerId
    where
        F: Fn(&mut Event<P>) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.add_listener(event, listener, Some(priority))
    }

    /// Register a listener. `None` means the bus default priority.
    pub fn add_listener<L>(&self, event: impl Into<String>, listener: L, priority: Option<i32>) -> ListenerId
    where
        L: Listener<P, R>,
    {
        self.add_shared(event, Arc::new(listener), priority)
    }

    /// Register an already shared listener.
    ///
    /// The same listener may be registered under several names.
    pub fn add_shared(
        &self,
        event: impl Into<String>,
        listener: SharedListener<P, R>,
        priority: Option<i32>,
    ) -> ListenerId {
        let event = event.into();
        let id = ListenerId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut registry = self.lock();
        let priority = priority.unwrap_or(registry.default_priority);
        registry.invalidate(&event);

        #[cfg(feature = "tracing")]
        tracing::trace!(event = %event, priority, %id, "listener registered");

        registry
            .events
            .entry(event)
            .or_default()
            .entry(priority)
            .or_default()
            .push(Entry { id, listener });

        id
    }

    /// Replace every listener of `event` with a single one.
    pub fn set_listener<L>(&self, event: impl Into<String>, listener: L, priority: Option<i32>) -> ListenerId
    where
        L: Listener<P, R>,
    {
        let event = event.into();
        self.clear_listeners(&event);
        self.add_listener(event, listener, priority)
    }

    /// Remove a listener. Returns `true` if it was registered under `event`.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut registry = self.lock();
        let Some(buckets) = registry.events.get_mut(event) else {
            return false;
        };

        let mut removed = false;
        for entries in buckets.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            removed |= entries.len() < before;
        }
        buckets.retain(|_, entries| !entries.is_empty());
        if buckets.is_empty() {
            registry.events.remove(event);
        }

        if removed {
            registry.invalidate(event);

            #[cfg(feature = "tracing")]
            tracing::trace!(event, %id, "listener removed");
        }
        removed
    }

    /// Whether any listener is registered under `event`.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.lock().events.contains_key(event)
    }

    /// Whether any listener is registered at all.
    pub fn has_any_listeners(&self) -> bool {
        !self.lock().events.is_empty()
    }

    /// Number of listeners registered under `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock()
            .events
            .get(event)
            .map_or(0, |buckets| buckets.values().map(Vec::len).sum())
    }

    /// Names with at least one registered listener, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().events.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every listener of `event`.
    pub fn clear_listeners(&self, event: &str) {
        let mut registry = self.lock();
        registry.events.remove(event);
        registry.invalidate(event);
    }

    /// Remove every listener of every event.
    pub fn clear_all(&self) {
        let mut registry = self.lock();
        registry.events.clear();
        registry.sorted.clear();
    }

    /// Attach a listener aggregate.
    pub fn add_aggregate<A>(&self, aggregate: &mut A)
    where
        A: ListenerAggregate<P, R> + ?Sized,
    {
        aggregate.attach(self);
    }

    /// Detach a listener aggregate.
    pub fn remove_aggregate<A>(&self, aggregate: &mut A)
    where
        A: ListenerAggregate<P, R> + ?Sized,
    {
        aggregate.detach(self);
    }

    fn snapshot(&self, event: &str) -> Snapshot<P, R> {
        let mut registry = self.lock();
        if let Some(sorted) = registry.sorted.get(event) {
            return Arc::clone(sorted);
        }

        let sorted: Snapshot<P, R> = registry
            .events
            .get(event)
            .map(|buckets| {
                buckets
                    .values()
                    .rev()
                    .flatten()
                    .map(|e| Arc::clone(&e.listener))
                    .collect()
            })
            .unwrap_or_else(|| Arc::from(Vec::new()));

        registry.sorted.insert(event.to_string(), Arc::clone(&sorted));
        sorted
    }

    // ------------------------------------------------------------------------
    // Triggering
    // ------------------------------------------------------------------------

    /// Trigger `event` with a fresh event carrying `params`.
    pub fn trigger(&self, event: impl Into<Cow<'static, str>>, params: P) -> Result<ResultStack<R>, BoxError> {
        let mut event = Event::new(event, params);
        self.trigger_event(&mut event)
    }

    /// Trigger a caller-supplied event.
    ///
    /// The caller keeps the event afterwards, including every change listeners
    /// made to its payload.
    pub fn trigger_event(&self, event: &mut Event<P>) -> Result<ResultStack<R>, BoxError> {
        self.dispatch(event, |_| false, true)
    }

    /// Trigger until `selector` accepts a listener result.
    ///
    /// The accepted result is the last one in the returned stack, and the stack
    /// is marked stopped.
    pub fn trigger_until<S>(&self, event: &mut Event<P>, selector: S) -> Result<ResultStack<R>, BoxError>
    where
        S: FnMut(&R) -> bool,
    {
        self.dispatch(event, selector, true)
    }

    /// Trigger without collecting results.
    ///
    /// Returns whether a listener stopped propagation.
    pub fn notify(&self, event: &mut Event<P>) -> Result<bool, BoxError> {
        self.dispatch(event, |_| false, false)
            .map(|results| results.stopped())
    }

    fn dispatch<S>(&self, event: &mut Event<P>, mut selector: S, collect: bool) -> Result<ResultStack<R>, BoxError>
    where
        S: FnMut(&R) -> bool,
    {
        let listeners = self.snapshot(event.name());
        let mut results = ResultStack::new();

        #[cfg(feature = "tracing")]
        tracing::trace!(event = event.name(), listeners = listeners.len(), "triggering event");

        for listener in listeners.iter() {
            let result = listener.on_event(event)?;
            let halt = event.is_propagation_stopped() || selector(&result);

            if collect {
                results.push(result);
            }
            if halt {
                results.set_stopped(true);

                #[cfg(feature = "tracing")]
                tracing::trace!(event = event.name(), collected = results.len(), "propagation stopped");

                break;
            }
        }

        Ok(results)
    }
}

impl<P, R> fmt::Debug for EventBus<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let mut events: Vec<(&str, usize)> = registry
            .events
            .iter()
            .map(|(name, buckets)| (name.as_str(), buckets.values().map(Vec::len).sum()))
            .collect();
        events.sort();
        f.debug_struct("EventBus")
            .field("default_priority", &registry.default_priority)
            .field("events", &events)
            .finish()
    }
}

/// Builder for [`EventBus`].
///
/// Carries the payload and result types of the bus it builds, so
/// `EventBus::builder()` infers them from where the bus ends up.
pub struct EventBusBuilder<P = Params, R = ()> {
    default_priority: i32,
    _types: PhantomData<fn() -> (P, R)>,
}

impl<P, R> Default for EventBusBuilder<P, R> {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            _types: PhantomData,
        }
    }
}

impl<P, R> Clone for EventBusBuilder<P, R> {
    fn clone(&self) -> Self {
        Self {
            default_priority: self.default_priority,
            _types: PhantomData,
        }
    }
}

impl<P, R> fmt::Debug for EventBusBuilder<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBusBuilder")
            .field("default_priority", &self.default_priority)
            .finish()
    }
}

impl<P: 'static, R: 'static> EventBusBuilder<P, R> {
    /// Priority given to listeners registered without one.
    pub fn default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Build the bus.
    pub fn build(self) -> EventBus<P, R> {
        EventBus::with_default_priority(self.default_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(
        order: &Arc<Mutex<Vec<i32>>>,
        tag: i32,
    ) -> impl Fn(&mut Event<Params>) -> Result<i32, BoxError> + Send + Sync + 'static {
        let order = Arc::clone(order);
        move |_| {
            order.lock().unwrap().push(tag);
            Ok(tag)
        }
    }

    #[test]
    fn test_priority_order_descending() {
        let bus: EventBus<Params, i32> = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        bus.on_with_priority("e", 5, recorder(&order, 5));
        bus.on_with_priority("e", 1, recorder(&order, 1));
        bus.on_with_priority("e", 10, recorder(&order, 10));

        let results = bus.trigger("e", Params::new()).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![10, 5, 1]);
        assert_eq!(results.into_vec(), vec![10, 5, 1]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let bus: EventBus<Params, i32> = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        bus.on("e", recorder(&order, 1));
        bus.on("e", recorder(&order, 2));
        bus.on_with_priority("e", DEFAULT_PRIORITY, recorder(&order, 3));

        bus.trigger("e", Params::new()).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_cache_invalidated_on_registration() {
        let bus: EventBus<Params, i32> = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        bus.on("e", recorder(&order, 1));
        bus.trigger("e", Params::new()).unwrap();

        let id = bus.on_with_priority("e", 100, recorder(&order, 100));
        bus.trigger("e", Params::new()).unwrap();

        assert!(bus.remove_listener("e", id));
        assert!(!bus.remove_listener("e", id));
        bus.trigger("e", Params::new()).unwrap();

        assert_eq!(*order.lock().unwrap(), vec![1, 100, 1, 1]);
    }

    #[test]
    fn test_propagation_stop_halts_remaining_listeners() {
        let bus: EventBus<Params, i32> = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        bus.on_with_priority("e", 3, recorder(&order, 3));
        bus.on_with_priority("e", 2, |e: &mut Event<Params>| {
            e.stop_propagation();
            Ok(2)
        });
        bus.on_with_priority("e", 1, recorder(&order, 1));

        let results = bus.trigger("e", Params::new()).unwrap();
        assert!(results.stopped());
        assert_eq!(results.into_vec(), vec![3, 2]);
        assert_eq!(*order.lock().unwrap(), vec![3]);
    }

    #[test]
    fn test_selector_short_circuits() {
        let bus: EventBus<Params, i32> = EventBus::new();
        bus.on_with_priority("e", 3, |_: &mut Event<Params>| Ok(0));
        bus.on_with_priority("e", 2, |_: &mut Event<Params>| Ok(7));
        bus.on_with_priority("e", 1, |_: &mut Event<Params>| Ok(9));

        let mut event = Event::named("e");
        let results = bus.trigger_until(&mut event, |r| *r > 5).unwrap();
        assert!(results.stopped());
        assert_eq!(results.last(), Some(&7));
        assert_eq!(results.len(), 2);

        let results = bus.trigger_until(&mut event, |r| *r > 100).unwrap();
        assert!(!results.stopped());
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_notify_does_not_collect() {
        let bus: EventBus<Params, i32> = EventBus::new();
        bus.on("e", |e: &mut Event<Params>| {
            e.params_mut().set("seen", true);
            Ok(1)
        });

        let mut event = Event::named("e");
        assert!(!bus.notify(&mut event).unwrap());
        assert_eq!(event.params().get::<bool>("seen"), Some(&true));
    }

    #[test]
    fn test_listener_error_propagates() {
        let bus: EventBus<Params, i32> = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        bus.on_with_priority("e", 2, |_: &mut Event<Params>| Err("boom".into()));
        bus.on_with_priority("e", 1, recorder(&order, 1));

        let err = bus.trigger("e", Params::new()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(order.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_listeners_yields_empty_stack() {
        let bus: EventBus<Params, i32> = EventBus::new();
        let results = bus.trigger("nothing", Params::new()).unwrap();
        assert!(results.is_empty());
        assert!(!results.stopped());
        assert!(!bus.has_listeners("nothing"));
        assert!(!bus.has_any_listeners());
    }

    #[test]
    fn test_set_and_clear_listeners() {
        let bus: EventBus<Params, i32> = EventBus::builder().default_priority(7).build();
        assert_eq!(bus.default_priority(), 7);

        bus.on("a", |_: &mut Event<Params>| Ok(1));
        bus.on("a", |_: &mut Event<Params>| Ok(2));
        bus.on("b", |_: &mut Event<Params>| Ok(3));
        assert_eq!(bus.listener_count("a"), 2);
        assert_eq!(bus.events(), vec!["a".to_string(), "b".to_string()]);

        bus.set_listener("a", |_: &mut Event<Params>| Ok(4), None);
        assert_eq!(bus.trigger("a", Params::new()).unwrap().into_vec(), vec![4]);

        bus.clear_listeners("a");
        assert!(!bus.has_listeners("a"));
        assert!(bus.has_listeners("b"));

        bus.clear_all();
        assert!(!bus.has_any_listeners());
    }
}
