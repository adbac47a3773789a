//! View rendering.

use crate::{
    application::{ApplicationContext, Outcome},
    controller::ActionOutput,
    http::Response,
};
use aero_core::{BoxError, Event, Listener};
use http::StatusCode;

/// VIEW listener rendering [`ActionOutput::View`] as a JSON response.
///
/// Other outputs are left to later listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonView;

impl Listener<ApplicationContext, Outcome> for JsonView {
    fn on_event(&self, event: &mut Event<ApplicationContext>) -> Result<Outcome, BoxError> {
        match &event.params().dispatch {
            Some(ActionOutput::View(value)) => Ok(Outcome::Response(Response::json(StatusCode::OK, value)?)),
            _ => Ok(Outcome::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use aero_std::Router;
    use serde_json::json;
    use std::sync::Arc;

    fn view_event(output: Option<ActionOutput>) -> Event<ApplicationContext> {
        let mut ctx = ApplicationContext::new(Request::get("/").unwrap(), Arc::new(Router::new()));
        ctx.dispatch = output;
        Event::new("application.view", ctx)
    }

    #[test]
    fn test_view_value_becomes_json() {
        let mut event = view_event(Some(ActionOutput::View(json!({"id": 7}))));
        let Outcome::Response(response) = JsonView.on_event(&mut event).unwrap() else {
            panic!("expected a response");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.body(), br#"{"id":7}"#);
    }

    #[test]
    fn test_other_outputs_are_ignored() {
        for output in [None, Some(ActionOutput::Empty)] {
            let mut event = view_event(output);
            assert_eq!(JsonView.on_event(&mut event).unwrap(), Outcome::Continue);
        }
    }
}
