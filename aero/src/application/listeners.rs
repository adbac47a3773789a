//! The listeners every application attaches at construction.

use crate::{
    application::{
        ApplicationError,
        context::{ApplicationContext, Outcome},
    },
    controller::{ActionOutput, ContextPool, ControllerResolver},
    http::Response,
};
use aero_core::{BoxError, Event, Listener};
use std::{fmt, sync::Arc};

/// ROUTE listener: matches the request's path info against the router.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteListener;

impl Listener<ApplicationContext, Outcome> for RouteListener {
    fn on_event(&self, event: &mut Event<ApplicationContext>) -> Result<Outcome, BoxError> {
        let ctx = event.params();
        let path = ctx.request.path_info();
        Ok(match ctx.router.match_path(&path)? {
            Some(matched) => Outcome::Route(matched),
            None => Outcome::Continue,
        })
    }
}

/// DISPATCH listener: resolves the controller, binds its arguments and calls it.
///
/// The context pool offered to the action holds the application services,
/// then the request, a default response, the matched route and the router.
pub struct DispatchListener {
    resolver: Arc<dyn ControllerResolver>,
    services: ContextPool,
}

impl DispatchListener {
    /// Dispatch through `resolver`, offering `services` to actions.
    pub fn new(resolver: Arc<dyn ControllerResolver>, services: ContextPool) -> Self {
        Self { resolver, services }
    }

    fn pool(&self, ctx: &ApplicationContext) -> ContextPool {
        let mut pool = self.services.clone();
        pool.provide(ctx.request.clone());
        pool.provide(Response::default());
        if let Some(matched) = &ctx.matched_route {
            pool.provide(matched.clone());
        }
        pool.provide_shared(Arc::clone(&ctx.router));
        pool
    }
}

impl Listener<ApplicationContext, Outcome> for DispatchListener {
    fn on_event(&self, event: &mut Event<ApplicationContext>) -> Result<Outcome, BoxError> {
        let ctx = event.params();
        let matched = ctx
            .matched_route
            .as_ref()
            .ok_or_else(|| ApplicationError::RouteNotFound {
                path: ctx.request.path_info().into_owned(),
            })?;

        let action = self.resolver.controller(matched)?;
        let args = self
            .resolver
            .arguments(matched, action.as_ref(), &self.pool(ctx))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(action = action.descriptor().name(), route = matched.name(), "calling action");

        Ok(match action.call(args)? {
            ActionOutput::Response(response) => Outcome::Response(response),
            output => Outcome::Dispatched(output),
        })
    }
}

impl fmt::Debug for DispatchListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchListener")
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}
