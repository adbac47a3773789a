//! Controller lookup.

use crate::{
    application::ApplicationError,
    controller::{
        action::Action,
        arguments::{Arguments, ContextPool, bind_arguments},
        name::{NameParser, StandardNameParser},
    },
};
use aero_core::{Event, Params};
use aero_std::{EventBus, MatchedRoute};
use std::{collections::HashMap, fmt, sync::Arc};

/// Notification published by [`StandardResolver`] after a controller is resolved.
///
/// Params: `"controller"` (`String`, the registry key) and `"action"`
/// (`Arc<dyn Action>`).
pub const CONTROLLER_RESOLVED: &str = "controller.resolved";

/// Finds the action for a matched route and binds its arguments.
pub trait ControllerResolver: Send + Sync + 'static {
    /// The action the route points at.
    fn controller(&self, matched: &MatchedRoute) -> Result<Arc<dyn Action>, ApplicationError>;

    /// Bind the action's parameters from the route and the context pool.
    fn arguments(
        &self,
        matched: &MatchedRoute,
        action: &dyn Action,
        pool: &ContextPool,
    ) -> Result<Arguments, ApplicationError> {
        bind_arguments(action.descriptor(), matched.params(), pool)
    }
}

/// Actions by name.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ControllerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under `name`, replacing any previous one.
    pub fn register<A: Action>(&mut self, name: impl Into<String>, action: A) -> &mut Self {
        self.register_shared(name, Arc::new(action))
    }

    /// Register a shared action.
    pub fn register_shared(&mut self, name: impl Into<String>, action: Arc<dyn Action>) -> &mut Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Look an action up.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

/// Resolves the route's `controller` parameter through a name parser and a registry.
///
/// Names in `module:controller:action` notation are looked up under their
/// canonical key; other names are looked up as written.
///
/// ```rust,ignore
/// let mut resolver = StandardResolver::new();
/// resolver.register("site:user:show", ShowUser);
/// // a route with `controller = "site:user:show"` now dispatches to ShowUser
/// ```
pub struct StandardResolver<N = StandardNameParser> {
    registry: ControllerRegistry,
    parser: N,
    events: EventBus<Params, ()>,
}

impl Default for StandardResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardResolver {
    /// A resolver with an empty registry and the standard name parser.
    pub fn new() -> Self {
        Self::with_parser(StandardNameParser)
    }
}

impl<N: NameParser> StandardResolver<N> {
    /// A resolver with an empty registry and a custom name parser.
    pub fn with_parser(parser: N) -> Self {
        Self {
            registry: ControllerRegistry::new(),
            parser,
            events: EventBus::new(),
        }
    }

    /// Replace the registry.
    pub fn with_registry(mut self, registry: ControllerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register an action. `a:b:c` names are stored under their canonical key.
    pub fn register<A: Action>(&mut self, name: &str, action: A) -> Result<&mut Self, ApplicationError> {
        let key = self.key(name)?;
        self.registry.register(key, action);
        Ok(self)
    }

    /// The registry.
    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// The bus [`CONTROLLER_RESOLVED`] is published on.
    pub fn events(&self) -> &EventBus<Params, ()> {
        &self.events
    }

    fn key(&self, name: &str) -> Result<String, ApplicationError> {
        Ok(match self.parser.parse(name)? {
            Some(parsed) => parsed.key(),
            None => name.to_string(),
        })
    }
}

impl<N: NameParser> ControllerResolver for StandardResolver<N> {
    fn controller(&self, matched: &MatchedRoute) -> Result<Arc<dyn Action>, ApplicationError> {
        let name = matched
            .param("controller")
            .ok_or_else(|| ApplicationError::MissingController {
                route: matched.name().to_string(),
            })?;

        let key = self.key(name)?;
        let action = self
            .registry
            .get(&key)
            .or_else(|| self.registry.get(name))
            .cloned()
            .ok_or(ApplicationError::ControllerNotFound { name: key.clone() })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(controller = %key, route = matched.name(), "controller resolved");

        let mut event = Event::new(
            CONTROLLER_RESOLVED,
            Params::new()
                .with("controller", key)
                .with("action", Arc::clone(&action)),
        );
        self.events.notify(&mut event)?;

        Ok(action)
    }
}

impl<N: fmt::Debug> fmt::Debug for StandardResolver<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardResolver")
            .field("registry", &self.registry)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}
