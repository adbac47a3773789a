//! # aero-std
//!
//! Standard implementations for the Aero dispatch pipeline.
//!
//! This crate provides:
//! - **Event bus**: [`EventBus`] with priority ordering, propagation control and
//!   short-circuit selection, plus [`ListenerAggregate`] / [`Subscriptions`]
//! - **Routing**: the pattern compiler, [`Route`], the ordered [`Router`] table,
//!   [`MatchedRoute`] and TOML route configuration
//! - **Testing**: recording and counting listeners

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core primitives
pub use aero_core;

// Modules
pub mod events;
pub mod routing;
pub mod testing;

pub use events::{EventBus, EventBusBuilder, ListenerAggregate, Subscriptions};
pub use routing::{
    CompiledRoute, ConfigError, MatchedRoute, Route, RouteParams, Router, RouterBuilder,
    RoutingConfig, RoutingError, Token,
};
