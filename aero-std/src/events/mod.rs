//! Event bus and listener aggregates.
//!
//! The bus is the publish/subscribe mechanism every pipeline stage goes
//! through. Use [`Subscriptions`] when a component owns a group of listeners
//! that must be attached and detached together.

pub mod aggregate;
pub mod bus;

pub use aggregate::{ListenerAggregate, Subscriptions};
pub use bus::{EventBus, EventBusBuilder};
