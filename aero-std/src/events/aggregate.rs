//! Groups of listeners attached and detached as one unit.

use crate::events::bus::EventBus;
use aero_core::{BoxError, Event, Listener, ListenerId};
use std::{fmt, sync::Arc};

/// A component that registers several listeners on a bus.
///
/// `detach` must remove exactly what `attach` registered.
pub trait ListenerAggregate<P, R> {
    /// Register this aggregate's listeners.
    fn attach(&mut self, bus: &EventBus<P, R>);

    /// Remove the listeners registered by the last `attach`.
    fn detach(&mut self, bus: &EventBus<P, R>);
}

struct Pending<P, R> {
    event: String,
    listener: Arc<dyn Listener<P, R>>,
    priority: Option<i32>,
}

/// A ready-made [`ListenerAggregate`] that remembers its handles.
///
/// ```rust,ignore
/// let mut subs = Subscriptions::new()
///     .listen("save", AuditListener, Some(100))
///     .listen("delete", AuditListener, None);
///
/// bus.add_aggregate(&mut subs);
/// // ...
/// bus.remove_aggregate(&mut subs);
/// ```
pub struct Subscriptions<P, R> {
    pending: Vec<Pending<P, R>>,
    handles: Vec<(String, ListenerId)>,
}

impl<P: 'static, R: 'static> Default for Subscriptions<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static, R: 'static> Subscriptions<P, R> {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Add a listener to the group.
    pub fn listen<L>(self, event: impl Into<String>, listener: L, priority: Option<i32>) -> Self
    where
        L: Listener<P, R>,
    {
        self.listen_shared(event, Arc::new(listener), priority)
    }

    /// Add a closure to the group.
    pub fn on<F>(self, event: impl Into<String>, priority: Option<i32>, listener: F) -> Self
    where
        F: Fn(&mut Event<P>) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.listen(event, listener, priority)
    }

    /// Add an already shared listener to the group.
    pub fn listen_shared(
        mut self,
        event: impl Into<String>,
        listener: Arc<dyn Listener<P, R>>,
        priority: Option<i32>,
    ) -> Self {
        self.pending.push(Pending {
            event: event.into(),
            listener,
            priority,
        });
        self
    }

    /// Whether the group is currently attached to a bus.
    pub fn is_attached(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Handles of the currently attached listeners.
    pub fn handles(&self) -> &[(String, ListenerId)] {
        &self.handles
    }
}

impl<P: 'static, R: 'static> ListenerAggregate<P, R> for Subscriptions<P, R> {
    fn attach(&mut self, bus: &EventBus<P, R>) {
        for pending in &self.pending {
            let id = bus.add_shared(
                pending.event.clone(),
                Arc::clone(&pending.listener),
                pending.priority,
            );
            self.handles.push((pending.event.clone(), id));
        }
    }

    fn detach(&mut self, bus: &EventBus<P, R>) {
        for (event, id) in self.handles.drain(..) {
            bus.remove_listener(&event, id);
        }
    }
}

impl<P, R> fmt::Debug for Subscriptions<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<&str> = self.pending.iter().map(|p| p.event.as_str()).collect();
        f.debug_struct("Subscriptions")
            .field("events", &events)
            .field("attached", &self.handles.len())
            .finish()
    }
}
