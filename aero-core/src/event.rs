//! # Event Envelope
//!
//! An [`Event`] lives for exactly one trigger: it is created (or supplied by
//! the caller), handed by `&mut` to each listener in priority order, and then
//! discarded or handed back to the caller. Nothing about it is shared between
//! triggers, which keeps nested triggers from interfering with each other.
//!
//! # Payload
//!
//! The payload type `P` is chosen by the bus owner:
//!
//! - [`Params`] - a string-keyed bag of typed values, for ad-hoc events
//! - any struct - named fields, for events with a fixed shape
//!
//! ```rust,ignore
//! let mut event = Event::new("user.created", Params::new().with("id", 42_u64));
//! assert_eq!(event.params().get::<u64>("id"), Some(&42));
//! event.stop_propagation();
//! ```

use crate::error::ParamsError;
use std::{
    any::{Any, type_name},
    borrow::Cow,
    collections::HashMap,
    fmt,
};

/// A named event with a mutable payload and a propagation-stop flag.
pub struct Event<P = Params> {
    name: Cow<'static, str>,
    params: P,
    propagation_stopped: bool,
}

impl<P> Event<P> {
    /// Create a new event.
    pub fn new(name: impl Into<Cow<'static, str>>, params: P) -> Self {
        Self {
            name: name.into(),
            params,
            propagation_stopped: false,
        }
    }

    /// The event name listeners are registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the event.
    pub fn set_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.name = name.into();
    }

    /// Shared access to the payload.
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Mutable access to the payload.
    pub fn params_mut(&mut self) -> &mut P {
        &mut self.params
    }

    /// Replace the payload, returning the previous one.
    pub fn replace_params(&mut self, params: P) -> P {
        std::mem::replace(&mut self.params, params)
    }

    /// Consume the event, returning its payload.
    pub fn into_params(self) -> P {
        self.params
    }

    /// Stop propagation: no further listener runs for the current trigger.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Set or clear the propagation-stop flag.
    pub fn set_propagation_stopped(&mut self, stopped: bool) {
        self.propagation_stopped = stopped;
    }

    /// Whether a listener stopped propagation.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

impl<P: Default> Event<P> {
    /// Create an event with an empty payload.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, P::default())
    }
}

impl<P: fmt::Debug> fmt::Debug for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("propagation_stopped", &self.propagation_stopped)
            .finish()
    }
}

/// A string-keyed bag of typed values.
///
/// Values are stored type-erased and read back with [`get`](Params::get),
/// which returns `None` both for missing keys and for type mismatches. Use
/// [`require`](Params::require) when the difference matters.
#[derive(Default)]
pub struct Params {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Params {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Params::set).
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.set(name, value);
        self
    }

    /// Store a value, replacing any previous value under the same key.
    pub fn set<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Box::new(value));
    }

    /// Read a value if present and of type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    /// Mutable access to a value if present and of type `T`.
    pub fn get_mut<T: Any>(&mut self, name: &str) -> Option<&mut T> {
        self.values.get_mut(name).and_then(|v| v.downcast_mut::<T>())
    }

    /// Read a value, distinguishing a missing key from a type mismatch.
    pub fn require<T: Any>(&self, name: &str) -> Result<&T, ParamsError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ParamsError::Missing(name.to_string()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| ParamsError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Remove a value and return it if it has type `T`.
    ///
    /// A value of another type is removed as well.
    pub fn remove<T: Any>(&mut self, name: &str) -> Option<T> {
        self.values
            .remove(name)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    /// Whether a value is stored under the key.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The stored keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Params").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_typed_access() {
        let mut params = Params::new().with("id", 42_u64).with("name", "alice".to_string());

        assert_eq!(params.get::<u64>("id"), Some(&42));
        assert_eq!(params.get::<String>("id"), None);
        assert_eq!(
            params.require::<String>("id"),
            Err(ParamsError::TypeMismatch {
                name: "id".into(),
                expected: type_name::<String>(),
            })
        );
        assert_eq!(
            params.require::<u64>("missing"),
            Err(ParamsError::Missing("missing".into()))
        );

        if let Some(name) = params.get_mut::<String>("name") {
            name.push_str("!");
        }
        assert_eq!(params.remove::<String>("name").as_deref(), Some("alice!"));
        assert!(!params.contains("name"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_event_propagation_flag() {
        let mut event: Event = Event::named("test");
        assert!(!event.is_propagation_stopped());

        event.stop_propagation();
        assert!(event.is_propagation_stopped());

        event.set_propagation_stopped(false);
        assert!(!event.is_propagation_stopped());

        event.set_name("renamed");
        assert_eq!(event.name(), "renamed");
    }
}
