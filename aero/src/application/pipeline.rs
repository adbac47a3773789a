//! The request pipeline.

use crate::{
    application::{
        ApplicationError, Stage,
        context::{ApplicationContext, ApplicationEvent, Outcome},
        listeners::{DispatchListener, RouteListener},
    },
    controller::{ContextPool, ControllerRegistry, ControllerResolver, StandardResolver},
    http::{Request, Response},
};
use aero_core::{BoxError, DEFAULT_PRIORITY, Event, Listener, ListenerId};
use aero_std::{EventBus, MatchedRoute, Router, Subscriptions};
use std::{any::Any, fmt, sync::Arc};

type StageListener = Arc<dyn Listener<ApplicationContext, Outcome>>;

/// What one stage produced.
enum Fired {
    /// A listener answered with a response; the stage stopped there.
    Response(Response),
    /// Everything else, in invocation order.
    Results(Vec<Outcome>),
}

/// The front controller.
///
/// Threads each request through
/// REQUEST → ROUTE → (NO_ROUTE) → ROUTE_POST → DISPATCH → VIEW → RESPONSE,
/// with EXCEPTION as the single recovery point for a failed stage. A response
/// returned by a REQUEST, ROUTE, NO_ROUTE, ROUTE_POST, DISPATCH or VIEW
/// listener skips the remaining stages and goes straight to RESPONSE.
///
/// ```rust,ignore
/// let app = Application::builder()
///     .router(Router::builder().route("index", Route::new("/").with_default("controller", "home")).build())
///     .controllers(registry)
///     .build()?;
///
/// let response = app.run(Request::get("/")?)?;
/// ```
pub struct Application {
    events: EventBus<ApplicationContext, Outcome>,
    router: Arc<Router>,
    defaults: Subscriptions<ApplicationContext, Outcome>,
}

impl Application {
    /// Start configuring an application.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    /// An application with the given route table and controller resolver.
    pub fn new(router: Router, resolver: impl ControllerResolver) -> Self {
        Self::assemble(
            router,
            Arc::new(resolver),
            ContextPool::new(),
            EventBus::new(),
        )
    }

    fn assemble(
        router: Router,
        resolver: Arc<dyn ControllerResolver>,
        services: ContextPool,
        events: EventBus<ApplicationContext, Outcome>,
    ) -> Self {
        let mut defaults = Subscriptions::new()
            .listen(Stage::Route, RouteListener, Some(DEFAULT_PRIORITY))
            .listen(
                Stage::Dispatch,
                DispatchListener::new(resolver, services),
                Some(DEFAULT_PRIORITY),
            );
        events.add_aggregate(&mut defaults);

        Self {
            events,
            router: Arc::new(router),
            defaults,
        }
    }

    /// The stage event bus.
    pub fn events(&self) -> &EventBus<ApplicationContext, Outcome> {
        &self.events
    }

    /// The route table.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Register a closure for a stage at the default priority.
    pub fn on<F>(&self, stage: Stage, listener: F) -> ListenerId
    where
        F: Fn(&mut ApplicationEvent) -> Result<Outcome, BoxError> + Send + Sync + 'static,
    {
        self.events.add_listener(stage, listener, None)
    }

    /// Register a listener for a stage. `None` means the bus default priority.
    pub fn add_listener<L>(&self, stage: Stage, listener: L, priority: Option<i32>) -> ListenerId
    where
        L: Listener<ApplicationContext, Outcome>,
    {
        self.events.add_listener(stage, listener, priority)
    }

    /// Remove a stage listener.
    pub fn remove_listener(&self, stage: Stage, id: ListenerId) -> bool {
        self.events.remove_listener(stage.name(), id)
    }

    /// Remove the built-in ROUTE and DISPATCH listeners.
    pub fn detach_default_listeners(&mut self) {
        self.events.remove_aggregate(&mut self.defaults);
    }

    /// Handle one request.
    ///
    /// Returns the filtered response, or the fault that no EXCEPTION listener
    /// turned into a response.
    pub fn run(&self, request: Request) -> Result<Response, ApplicationError> {
        let context = ApplicationContext::new(request, Arc::clone(&self.router));
        let mut event = Event::new(Stage::Request.name(), context);

        match self.process(&mut event) {
            Ok(response) => Ok(response),
            Err(error) => self.handle_exception(&mut event, error),
        }
    }

    fn process(&self, event: &mut ApplicationEvent) -> Result<Response, ApplicationError> {
        if let Fired::Response(response) = self.fire(Stage::Request, event)? {
            return self.short_circuit(Stage::Request, event, response);
        }

        let mut matched = match self.fire(Stage::Route, event)? {
            Fired::Response(response) => return self.short_circuit(Stage::Route, event, response),
            Fired::Results(results) => first_route(results),
        };
        if matched.is_none() {
            matched = match self.fire(Stage::RouteNotFound, event)? {
                Fired::Response(response) => {
                    return self.short_circuit(Stage::RouteNotFound, event, response);
                }
                Fired::Results(results) => first_route(results),
            };
        }
        let matched = matched.ok_or_else(|| ApplicationError::RouteNotFound {
            path: event.params().request.path_info().into_owned(),
        })?;
        event.params_mut().matched_route = Some(matched);

        if let Fired::Response(response) = self.fire(Stage::RoutePost, event)? {
            return self.short_circuit(Stage::RoutePost, event, response);
        }

        let output = match self.fire(Stage::Dispatch, event)? {
            Fired::Response(response) => return self.filter_response(event, response),
            Fired::Results(results) => results.into_iter().find_map(|outcome| match outcome {
                Outcome::Dispatched(output) => Some(output),
                _ => None,
            }),
        };
        event.params_mut().dispatch = output;

        match self.fire(Stage::View, event)? {
            Fired::Response(response) => self.filter_response(event, response),
            Fired::Results(_) => Err(ApplicationError::ContractViolation {
                controller: controller_label(event.params()),
            }),
        }
    }

    fn fire(&self, stage: Stage, event: &mut ApplicationEvent) -> Result<Fired, ApplicationError> {
        event.set_name(stage.name());
        event.set_propagation_stopped(false);

        #[cfg(feature = "tracing")]
        tracing::debug!(stage = %stage, "entering stage");

        // A response halts the trigger, so it can only be the last result.
        let mut outcomes = self
            .events
            .trigger_until(event, Outcome::is_response)?
            .into_vec();
        match outcomes.pop() {
            Some(Outcome::Response(response)) => Ok(Fired::Response(response)),
            last => {
                outcomes.extend(last);
                Ok(Fired::Results(outcomes))
            }
        }
    }

    fn short_circuit(
        &self,
        _stage: Stage,
        event: &mut ApplicationEvent,
        response: Response,
    ) -> Result<Response, ApplicationError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(stage = %_stage, status = %response.status(), "stage answered with a response");

        self.filter_response(event, response)
    }

    fn filter_response(
        &self,
        event: &mut ApplicationEvent,
        response: Response,
    ) -> Result<Response, ApplicationError> {
        event.params_mut().response = Some(response);
        if let Fired::Response(replacement) = self.fire(Stage::Response, event)? {
            event.params_mut().response = Some(replacement);
        }
        event
            .params_mut()
            .response
            .take()
            .ok_or(ApplicationError::ResponseRemoved)
    }

    fn handle_exception(
        &self,
        event: &mut ApplicationEvent,
        error: ApplicationError,
    ) -> Result<Response, ApplicationError> {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %error, stage = event.name(), "stage failed");

        event.params_mut().exception = Some(error.clone());

        let response = match self.fire(Stage::Exception, event) {
            Ok(Fired::Response(response)) => response,
            Ok(Fired::Results(_)) => return Err(error),
            Err(_listener_error) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %_listener_error, "exception listener failed");
                return Err(error);
            }
        };

        match self.filter_response(event, response.clone()) {
            Ok(filtered) => Ok(filtered),
            Err(_filter_error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_filter_error, "filtering the exception response failed");
                Ok(response)
            }
        }
    }
}

fn first_route(results: Vec<Outcome>) -> Option<MatchedRoute> {
    results.into_iter().find_map(|outcome| match outcome {
        Outcome::Route(matched) => Some(matched),
        _ => None,
    })
}

fn controller_label(ctx: &ApplicationContext) -> String {
    ctx.matched_route
        .as_ref()
        .map(|matched| {
            matched
                .param("controller")
                .unwrap_or_else(|| matched.name())
                .to_string()
        })
        .unwrap_or_default()
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("events", &self.events)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Application`].
#[derive(Default)]
pub struct ApplicationBuilder {
    router: Router,
    resolver: Option<Arc<dyn ControllerResolver>>,
    services: ContextPool,
    default_priority: Option<i32>,
    listeners: Vec<(Stage, StageListener, Option<i32>)>,
}

impl ApplicationBuilder {
    /// Use `router` as the route table.
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Resolve controllers with `resolver`.
    pub fn resolver(mut self, resolver: impl ControllerResolver) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Resolve controllers from `registry` with the standard resolver.
    pub fn controllers(self, registry: ControllerRegistry) -> Self {
        self.resolver(StandardResolver::new().with_registry(registry))
    }

    /// Offer `value` to every action by type.
    pub fn service<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.services.provide(value);
        self
    }

    /// Offer every value in `pool` to actions.
    pub fn services(mut self, pool: ContextPool) -> Self {
        self.services = pool;
        self
    }

    /// The priority of listeners registered without one.
    pub fn default_priority(mut self, priority: i32) -> Self {
        self.default_priority = Some(priority);
        self
    }

    /// Register a stage listener. `None` means the bus default priority.
    pub fn listener<L>(mut self, stage: Stage, listener: L, priority: Option<i32>) -> Self
    where
        L: Listener<ApplicationContext, Outcome>,
    {
        self.listeners.push((stage, Arc::new(listener), priority));
        self
    }

    /// Register a closure for a stage at the default priority.
    pub fn on<F>(self, stage: Stage, listener: F) -> Self
    where
        F: Fn(&mut ApplicationEvent) -> Result<Outcome, BoxError> + Send + Sync + 'static,
    {
        self.listener(stage, listener, None)
    }

    /// Compile the route table and wire the default listeners.
    pub fn build(self) -> Result<Application, ApplicationError> {
        self.router.compile_all()?;

        let events: EventBus<ApplicationContext, Outcome> = EventBus::builder()
            .default_priority(self.default_priority.unwrap_or(DEFAULT_PRIORITY))
            .build();
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(StandardResolver::new()));
        let app = Application::assemble(self.router, resolver, self.services, events);

        for (stage, listener, priority) in self.listeners {
            app.events.add_shared(stage, listener, priority);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(routes = app.router.len(), "application built");

        Ok(app)
    }
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("router", &self.router)
            .field("services", &self.services)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ActionDescriptor, Arguments, FnAction};
    use aero_std::Route;
    use http::StatusCode;
    use std::sync::Mutex;

    fn app_with_home() -> Application {
        let mut registry = ControllerRegistry::new();
        registry.register(
            "home",
            FnAction::new(ActionDescriptor::new("home"), |_: Arguments| {
                Ok::<_, BoxError>(Response::text(StatusCode::OK, "home"))
            }),
        );
        Application::builder()
            .router(
                Router::builder()
                    .route("index", Route::new("/").with_default("controller", "home"))
                    .build(),
            )
            .controllers(registry)
            .build()
            .unwrap()
    }

    #[test]
    fn test_stages_fire_in_order() {
        let app = app_with_home();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for stage in Stage::ALL {
            let seen = Arc::clone(&seen);
            app.add_listener(
                stage,
                move |e: &mut ApplicationEvent| {
                    seen.lock().unwrap().push(e.name().to_string());
                    Ok::<_, BoxError>(Outcome::Continue)
                },
                Some(100),
            );
        }

        app.run(Request::get("/").unwrap()).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            [
                "application.request",
                "application.route",
                "application.route.post",
                "application.dispatch",
                "application.response",
            ]
        );
    }

    #[test]
    fn test_propagation_flag_is_reset_between_stages() {
        let app = app_with_home();
        app.on(Stage::Request, |e| {
            e.stop_propagation();
            Ok(Outcome::Continue)
        });

        let response = app.run(Request::get("/").unwrap()).unwrap();
        assert_eq!(response.body_text(), "home");
    }

    #[test]
    fn test_detached_defaults_leave_no_route() {
        let mut app = app_with_home();
        app.detach_default_listeners();
        assert!(matches!(
            app.run(Request::get("/").unwrap()),
            Err(ApplicationError::RouteNotFound { path }) if path == "/"
        ));
    }

    #[test]
    fn test_empty_output_is_contract_violation() {
        let mut registry = ControllerRegistry::new();
        registry.register("noop", FnAction::new(ActionDescriptor::new("noop"), |_: Arguments| {}));
        let app = Application::builder()
            .router(
                Router::builder()
                    .route("index", Route::new("/").with_default("controller", "noop"))
                    .build(),
            )
            .controllers(registry)
            .build()
            .unwrap();

        let error = app.run(Request::get("/").unwrap()).unwrap_err();
        assert!(matches!(
            error,
            ApplicationError::ContractViolation { controller } if controller == "noop"
        ));
    }
}
