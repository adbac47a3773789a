//! Pipeline errors.

use crate::controller::NameError;
use aero_core::BoxError;
use aero_std::RoutingError;
use std::{error::Error as StdError, sync::Arc};
use thiserror::Error;

/// A listener error shared between the pipeline and the EXCEPTION stage.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Everything [`Application::run`](crate::Application::run) can fail with.
///
/// Cheap to clone, so the EXCEPTION stage can see the fault while the
/// pipeline keeps the original to return unchanged.
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    /// A route in the table does not compile.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// No route matched and no listener supplied one.
    #[error("no route found for path `{path}`")]
    RouteNotFound {
        /// The path that was matched against.
        path: String,
    },

    /// The matched route has no `controller` parameter.
    #[error("route `{route}` does not name a controller")]
    MissingController {
        /// The matched route's name.
        route: String,
    },

    /// No action is registered under the controller name.
    #[error("controller `{name}` does not exist")]
    ControllerNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// The controller name could not be parsed.
    #[error(transparent)]
    InvalidControllerName(#[from] NameError),

    /// No route parameter, context value or default for a parameter.
    #[error("no value found for parameter `{parameter}` in controller `{controller}`")]
    MissingArgument {
        /// The unbound parameter.
        parameter: String,
        /// The action's name.
        controller: String,
    },

    /// A bound value does not have the parameter's type.
    #[error("parameter `{parameter}` of controller `{controller}` expects `{expected}`")]
    ArgumentMismatch {
        /// The parameter.
        parameter: String,
        /// The action's name.
        controller: String,
        /// The declared type.
        expected: &'static str,
    },

    /// The controller returned something no VIEW listener turned into a response.
    #[error("controller `{controller}` must return a response")]
    ContractViolation {
        /// The controller name, or the route name when there is none.
        controller: String,
    },

    /// A RESPONSE listener took the response out of the context.
    #[error("the response was removed while being filtered")]
    ResponseRemoved,

    /// A listener failed with an error of its own.
    #[error(transparent)]
    Listener(SharedError),
}

impl From<BoxError> for ApplicationError {
    /// Recover framework errors that travelled through a listener as `BoxError`.
    fn from(error: BoxError) -> Self {
        match error.downcast::<ApplicationError>() {
            Ok(error) => *error,
            Err(error) => match error.downcast::<RoutingError>() {
                Ok(error) => Self::Routing(*error),
                Err(error) => Self::Listener(Arc::from(error)),
            },
        }
    }
}
