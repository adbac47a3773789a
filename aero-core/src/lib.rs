//! # aero-core
//!
//! Core event primitives for the Aero dispatch pipeline.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and extensions that only need to write listeners, without pulling
//! in the event bus or the router from `aero-std`.
//!
//! # Building Blocks
//!
//! ## Event ([`Event`])
//!
//! A named, mutable envelope handed to every listener of one trigger. It carries
//! a parameter payload (`P`) and the propagation-stop flag. The payload is either
//! the dynamic [`Params`] bag or any struct with named fields.
//!
//! ## Listener ([`Listener`])
//!
//! The single calling convention for everything that reacts to an event:
//! `on_event(&mut Event<P>) -> Result<R, BoxError>`. Closures implement it
//! through a blanket impl, so a listener is resolved once at registration time
//! instead of being branched on at every dispatch.
//!
//! ## Results ([`ResultStack`])
//!
//! The ordered list of listener return values produced by one trigger, plus
//! the flag telling whether the trigger stopped early.
//!
//! # Error Types
//!
//! - [`BoxError`] - Errors raised by listeners
//! - [`ParamsError`] - Typed access to the [`Params`] bag failed

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod listener;
mod results;

// Re-exports
pub use error::{BoxError, ParamsError};
pub use event::{Event, Params};
pub use listener::{DEFAULT_PRIORITY, Listener, ListenerId};
pub use results::{ResultStack, Truthy};
