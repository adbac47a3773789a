//! # Listener
//!
//! The one calling convention of the event system.
//!
//! Whatever reacts to an event (a closure, a struct, the router, the
//! controller dispatcher) is a [`Listener`]: it receives the event by `&mut`,
//! may read and write its payload or stop propagation, and returns a value
//! that is collected into the trigger's [`ResultStack`](crate::ResultStack).
//!
//! Errors are not caught by the bus. A listener that fails aborts the trigger
//! and the error reaches the caller of `trigger`.

use crate::{error::BoxError, event::Event};
use std::fmt;

/// Priority used when a listener is registered without one.
///
/// Higher priorities run first.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Something that reacts to an event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener` for `Event<{P}>` returning `{R}`",
    label = "missing `Listener` implementation",
    note = "Listeners implement `on_event(&self, &mut Event<{P}>) -> Result<{R}, BoxError>`; closures with that signature work too."
)]
pub trait Listener<P, R>: Send + Sync + 'static {
    /// Called when an event this listener is registered for is triggered.
    fn on_event(&self, event: &mut Event<P>) -> Result<R, BoxError>;
}

// Blanket impl for closures
impl<F, P, R> Listener<P, R> for F
where
    F: Fn(&mut Event<P>) -> Result<R, BoxError> + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut Event<P>) -> Result<R, BoxError> {
        (self)(event)
    }
}

/// Handle returned on registration, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw id. Ids are allocated by the bus; this is for bus implementations.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}
