//! Testing utilities.
//!
//! - [`RecordingListener`]: records the names of the events it sees and
//!   returns a programmed value, optionally stopping propagation or failing
//! - [`CountingListener`]: counts invocations
//!
//! Both are cheap to clone; clones share their state, so keep one clone for
//! assertions and register the other.

use aero_core::{BoxError, Event, Listener};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that records every event name it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingListener::returning(7).stopping();
/// bus.add_listener("save", recorder.clone(), Some(10));
///
/// bus.trigger("save", Params::new())?;
/// assert_eq!(recorder.events(), vec!["save"]);
/// ```
pub struct RecordingListener<R> {
    events: Arc<Mutex<Vec<String>>>,
    output: R,
    stop: bool,
    error: Option<String>,
}

impl<R: Clone> RecordingListener<R> {
    /// Create a recorder returning `output`.
    pub fn returning(output: R) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            output,
            stop: false,
            error: None,
        }
    }

    /// Also stop propagation.
    pub fn stopping(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Fail with `message` instead of returning.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Names of the recorded events, oldest first.
    pub fn events(&self) -> Vec<String> {
        lock(&self.events).clone()
    }

    /// Number of recorded events.
    pub fn count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl<R: Clone + Default> Default for RecordingListener<R> {
    fn default() -> Self {
        Self::returning(R::default())
    }
}

impl<R: Clone> Clone for RecordingListener<R> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            output: self.output.clone(),
            stop: self.stop,
            error: self.error.clone(),
        }
    }
}

impl<P, R> Listener<P, R> for RecordingListener<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut Event<P>) -> Result<R, BoxError> {
        lock(&self.events).push(event.name().to_string());

        if let Some(message) = &self.error {
            return Err(message.clone().into());
        }
        if self.stop {
            event.stop_propagation();
        }
        Ok(self.output.clone())
    }
}

// ============================================================================
// Counting Listener
// ============================================================================

/// A listener that counts invocations and returns `R::default()`.
#[derive(Clone, Default)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<P, R: Default> Listener<P, R> for CountingListener {
    fn on_event(&self, _event: &mut Event<P>) -> Result<R, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(R::default())
    }
}
