//! Ordered table of named routes.

use crate::routing::{
    RouteParams,
    error::RoutingError,
    matched::MatchedRoute,
    route::{Route, generate_name},
};
use std::sync::Arc;

const DEFAULT_INDEX_ROUTE_NAME: &str = "index";

/// Named routes, matched in registration order.
///
/// Registration order is the only tie-break: when two routes match a path the
/// one added first wins, however specific the other one is.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<(String, Arc<Route>)>,
    index_route_name: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            index_route_name: DEFAULT_INDEX_ROUTE_NAME.to_string(),
        }
    }

    /// Create a builder.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// The name used for routes registered with an empty name.
    pub fn index_route_name(&self) -> &str {
        &self.index_route_name
    }

    /// Change the name used for routes registered with an empty name.
    pub fn set_index_route_name(&mut self, name: impl Into<String>) {
        self.index_route_name = name.into();
    }

    /// Register a route.
    ///
    /// An empty name becomes the index route name. A route already registered
    /// under the same name is replaced and keeps its position.
    pub fn add(&mut self, name: impl Into<String>, route: Route) -> &mut Self {
        let mut name = name.into();
        if name.is_empty() {
            name.clone_from(&self.index_route_name);
        }

        let route = Arc::new(route);
        match self.routes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = route,
            None => self.routes.push((name, route)),
        }
        self
    }

    /// Register a route under a name derived from its template.
    ///
    /// Returns the name used.
    pub fn push(&mut self, route: Route) -> String {
        let mut name = generate_name(route.template());
        if name.is_empty() {
            name.clone_from(&self.index_route_name);
        }
        self.add(name.clone(), route);
        name
    }

    /// Look up a route by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Whether a route is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a route, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Route>> {
        let at = self.routes.iter().position(|(n, _)| n == name)?;
        Some(self.routes.remove(at).1)
    }

    /// Remove every route.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Routes in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Route>)> {
        self.routes.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Route names in match order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(n, _)| n.as_str())
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compile every route now instead of on first match.
    pub fn compile_all(&self) -> Result<(), RoutingError> {
        self.routes
            .iter()
            .try_for_each(|(_, route)| route.compiled().map(|_| ()))
    }

    /// Match a path against the table. The first matching route wins.
    ///
    /// Routes whose static prefix rules the path out are skipped without
    /// being compiled.
    pub fn match_path(&self, path: &str) -> Result<Option<MatchedRoute>, RoutingError> {
        self.find(path, |_| true)
    }

    /// Like [`match_path`](Self::match_path), considering only routes in `namespace`.
    pub fn match_in_namespace(
        &self,
        path: &str,
        namespace: &str,
    ) -> Result<Option<MatchedRoute>, RoutingError> {
        self.find(path, |route| route.in_namespace(namespace))
    }

    fn find<F>(&self, path: &str, filter: F) -> Result<Option<MatchedRoute>, RoutingError>
    where
        F: Fn(&Route) -> bool,
    {
        for (name, route) in &self.routes {
            if !route.may_match(path) || !filter(route) {
                continue;
            }
            if let Some(params) = route.matches(path)? {
                #[cfg(feature = "tracing")]
                tracing::debug!(path, route = %name, "route matched");

                return Ok(Some(MatchedRoute::new(Arc::clone(route), name.clone(), params)));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(path, "no route matched");

        Ok(None)
    }

    /// Build the path of a named route.
    pub fn assemble(&self, name: &str, params: &RouteParams) -> Result<String, RoutingError> {
        self.get(name)
            .ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))?
            .assemble(params)
    }
}

/// Builder for [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Add a named route.
    pub fn route(mut self, name: impl Into<String>, route: Route) -> Self {
        self.router.add(name, route);
        self
    }

    /// Add a route named after its template.
    pub fn unnamed(mut self, route: Route) -> Self {
        self.router.push(route);
        self
    }

    /// Name used for routes registered with an empty name.
    pub fn index_route_name(mut self, name: impl Into<String>) -> Self {
        self.router.set_index_route_name(name);
        self
    }

    /// Build the table.
    pub fn build(self) -> Router {
        self.router
    }
}
