//! State threaded through the pipeline stages.

use crate::{
    application::ApplicationError,
    controller::ActionOutput,
    http::{Request, Response},
};
use aero_core::{Event, Params, Truthy};
use aero_std::{MatchedRoute, Router};
use std::sync::Arc;

/// The payload of every stage event.
///
/// One context lives for one request. Each stage sees what earlier stages
/// stored: the matched route after ROUTE, the controller result after
/// DISPATCH, the response during RESPONSE and the fault during EXCEPTION.
#[derive(Debug)]
pub struct ApplicationContext {
    /// The request being handled.
    pub request: Request,
    /// The route table.
    pub router: Arc<Router>,
    /// Set once a route is known.
    pub matched_route: Option<MatchedRoute>,
    /// The controller result, set after DISPATCH when it was not a response.
    pub dispatch: Option<ActionOutput>,
    /// The response being filtered during RESPONSE.
    pub response: Option<Response>,
    /// The fault being handled during EXCEPTION.
    pub exception: Option<ApplicationError>,
    /// Free-form values listeners pass to each other.
    pub params: Params,
}

impl ApplicationContext {
    /// A fresh context for `request`.
    pub fn new(request: Request, router: Arc<Router>) -> Self {
        Self {
            request,
            router,
            matched_route: None,
            dispatch: None,
            response: None,
            exception: None,
            params: Params::new(),
        }
    }
}

/// A stage event.
pub type ApplicationEvent = Event<ApplicationContext>;

/// What a stage listener returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
    /// Nothing to report; later listeners run.
    #[default]
    Continue,
    /// A response. Stops the stage and, before RESPONSE, skips to RESPONSE.
    Response(Response),
    /// A route, from ROUTE or ROUTE_NOT_FOUND listeners.
    Route(MatchedRoute),
    /// A controller result, from DISPATCH listeners.
    Dispatched(ActionOutput),
}

impl Outcome {
    /// Whether this is a response.
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }
}

impl Truthy for Outcome {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Continue => false,
            Self::Dispatched(output) => output.is_truthy(),
            Self::Response(_) | Self::Route(_) => true,
        }
    }
}

impl From<Response> for Outcome {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<MatchedRoute> for Outcome {
    fn from(route: MatchedRoute) -> Self {
        Self::Route(route)
    }
}
