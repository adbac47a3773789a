#![allow(dead_code)]

use aero::{
    BoxError, Request, Response, Route, Router,
    application::{ApplicationEvent, Outcome},
    controller::{ActionDescriptor, ActionOutput, Arguments, ControllerRegistry, FnAction, ParamSpec},
};
use http::StatusCode;
use std::sync::{Arc, Mutex};

// ============================================================================
// Requests
// ============================================================================

pub fn get(path: &str) -> Request {
    Request::get(path).unwrap()
}

// ============================================================================
// Routes and controllers
// ============================================================================

/// `index -> /`, `user -> /user/{id}` (digits), `boom -> /boom`, `data -> /data`.
pub fn site_router() -> Router {
    Router::builder()
        .route("index", Route::new("/").with_default("controller", "home"))
        .route(
            "user",
            Route::new("/user/{id}")
                .with_default("controller", "site:user:show")
                .with_requirement("id", r"\d+"),
        )
        .route("boom", Route::new("/boom").with_default("controller", "boom"))
        .route("data", Route::new("/data").with_default("controller", "data"))
        .build()
}

pub fn site_controllers() -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry
        .register(
            "home",
            FnAction::new(ActionDescriptor::new("home"), |_: Arguments| {
                Ok::<_, BoxError>(Response::text(StatusCode::OK, "home"))
            }),
        )
        .register(
            "site:user:show",
            FnAction::new(
                ActionDescriptor::new("site:user:show").param(ParamSpec::named("id")),
                |args: Arguments| {
                    let id: u64 = args.value(0)?;
                    Ok::<_, BoxError>(Response::text(StatusCode::OK, format!("user {id}")))
                },
            ),
        )
        .register(
            "boom",
            FnAction::new(ActionDescriptor::new("boom"), |_: Arguments| {
                Err::<Response, BoxError>("controller exploded".into())
            }),
        )
        .register(
            "data",
            FnAction::new(ActionDescriptor::new("data"), |_: Arguments| {
                ActionOutput::View(serde_json::json!({ "items": [1, 2, 3] }))
            }),
        );
    registry
}

// ============================================================================
// Stage listeners
// ============================================================================

pub type Trail = Arc<Mutex<Vec<String>>>;

pub fn trail() -> Trail {
    Arc::new(Mutex::new(Vec::new()))
}

/// A stage listener that records the stage name and continues.
pub fn recording(
    trail: &Trail,
) -> impl Fn(&mut ApplicationEvent) -> Result<Outcome, BoxError> + Send + Sync + 'static {
    let trail = Arc::clone(trail);
    move |event| {
        trail.lock().unwrap().push(event.name().to_string());
        Ok(Outcome::Continue)
    }
}

/// A stage listener that answers with `status`.
pub fn answering(
    status: StatusCode,
) -> impl Fn(&mut ApplicationEvent) -> Result<Outcome, BoxError> + Send + Sync + 'static {
    move |_| Ok(Outcome::Response(Response::new(status)))
}

pub fn seen(trail: &Trail) -> Vec<String> {
    trail.lock().unwrap().clone()
}
