//! The result of a successful match.

use crate::routing::{RouteParams, route::Route};
use std::sync::Arc;

/// A route that matched a path, with its merged parameters.
///
/// Immutable once created.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    route: Arc<Route>,
    name: String,
    params: RouteParams,
}

impl MatchedRoute {
    /// Wrap a match result.
    pub fn new(route: Arc<Route>, name: impl Into<String>, params: RouteParams) -> Self {
        Self {
            route,
            name: name.into(),
            params,
        }
    }

    /// The route that matched.
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// The name the route is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defaults overlaid with captured values.
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// One parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Consume the match, returning its parameters.
    pub fn into_params(self) -> RouteParams {
        self.params
    }
}

impl PartialEq for MatchedRoute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.route.template() == other.route.template()
    }
}

impl Eq for MatchedRoute {}
