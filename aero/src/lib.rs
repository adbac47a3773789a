//! # aero - Event-Driven Front Controller
//!
//! `aero` threads an HTTP request through a fixed sequence of stages, each
//! one an event on a priority-ordered bus. Any listener may observe a stage,
//! change the request context or answer with a response that skips the rest
//! of the pipeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aero::prelude::*;
//!
//! #[aero::action(name = "user:show")]
//! fn show_user(id: u64) -> Response {
//!     Response::text(StatusCode::OK, format!("user {id}"))
//! }
//!
//! let mut controllers = ControllerRegistry::new();
//! controllers.register("user:show", show_user);
//!
//! let app = Application::builder()
//!     .router(Router::builder()
//!         .route("user", Route::new("/user/{id}")
//!             .with_default("controller", "user:show")
//!             .with_requirement("id", r"\d+"))
//!         .build())
//!     .controllers(controllers)
//!     .build()?;
//!
//! let response = app.run(Request::get("/user/42")?)?;
//! ```
//!
//! ## Crates
//!
//! - `aero-core`: events, listeners and result stacks
//! - `aero-std`: the event bus and the router
//! - `aero-macros`: `#[action]`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod application;
pub mod controller;
pub mod http;
pub mod view;

pub use aero_core::{BoxError, Event, Listener, ListenerId, Params, ResultStack, Truthy};
pub use aero_std::{EventBus, MatchedRoute, Route, RouteParams, Router, RoutingError};
pub use application::{Application, ApplicationBuilder, ApplicationError, Outcome, Stage};
pub use http::{Request, Response};

/// Routing: pattern compiler, route table and configuration.
pub mod routing {
    pub use aero_std::routing::{
        CompiledRoute, ConfigError, MatchedRoute, Route, RouteDef, RouteParams, Router,
        RouterBuilder, RoutingConfig, RoutingError, Token, compile, generate_name,
        normalize_template,
    };
}

/// Event bus and listener aggregates.
pub mod events {
    pub use aero_std::events::{EventBus, EventBusBuilder, ListenerAggregate, Subscriptions};
}

/// Testing utilities.
pub mod testing {
    pub use aero_std::testing::{CountingListener, RecordingListener};
}

/// Prelude module - common imports for Aero.
///
/// # Usage
///
/// ```rust,ignore
/// use aero::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        application::{
            Application, ApplicationContext, ApplicationError, ApplicationEvent, Outcome, Stage,
        },
        controller::{
            Action, ActionDescriptor, ActionOutput, Arguments, ContextPool, ControllerRegistry,
            ControllerResolver, FnAction, ParamSpec, StandardResolver,
        },
        http::{Request, Response},
        view::JsonView,
    };
    pub use aero_core::{BoxError, Event, Listener};
    pub use aero_std::{MatchedRoute, Route, Router};
    pub use ::http::StatusCode;
}

#[cfg(feature = "macros")]
pub use aero_macros::action;
