//! # Application
//!
//! The front controller and its stage protocol.
//!
//! | Stage            | Event name               | Fired when                                   |
//! |------------------|--------------------------|----------------------------------------------|
//! | `Request`        | `application.request`    | always, first                                |
//! | `Route`          | `application.route`      | REQUEST gave no response                     |
//! | `RouteNotFound`  | `application.no.route`   | ROUTE gave neither a route nor a response    |
//! | `RoutePost`      | `application.route.post` | a route is known                             |
//! | `Dispatch`       | `application.dispatch`   | ROUTE_POST gave no response                  |
//! | `View`           | `application.view`       | the controller result is not a response      |
//! | `Response`       | `application.response`   | before any response leaves the pipeline      |
//! | `Exception`      | `application.exception`  | any of the above failed                      |
//!
//! Every stage listener receives the same [`ApplicationEvent`]; its payload
//! is the [`ApplicationContext`] of the request.

mod context;
mod error;
mod listeners;
mod pipeline;
mod stage;

pub use context::{ApplicationContext, ApplicationEvent, Outcome};
pub use error::{ApplicationError, SharedError};
pub use listeners::{DispatchListener, RouteListener};
pub use pipeline::{Application, ApplicationBuilder};
pub use stage::Stage;
