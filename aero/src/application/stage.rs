use std::fmt;

/// A named point in the request pipeline.
///
/// The names are the event names listeners register under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// First stage; a response here skips routing and dispatch.
    Request,
    /// Route matching.
    Route,
    /// Fired only when ROUTE produced neither a route nor a response.
    RouteNotFound,
    /// A route is known; dispatch has not run yet.
    RoutePost,
    /// Controller resolution and invocation.
    Dispatch,
    /// Turns a non-response controller result into a response.
    View,
    /// Last look at the response before it leaves the pipeline.
    Response,
    /// Recovery point for any failed stage.
    Exception,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Stage; 8] = [
        Stage::Request,
        Stage::Route,
        Stage::RouteNotFound,
        Stage::RoutePost,
        Stage::Dispatch,
        Stage::View,
        Stage::Response,
        Stage::Exception,
    ];

    /// The event name.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Request => "application.request",
            Stage::Route => "application.route",
            Stage::RouteNotFound => "application.no.route",
            Stage::RoutePost => "application.route.post",
            Stage::Dispatch => "application.dispatch",
            Stage::View => "application.view",
            Stage::Response => "application.response",
            Stage::Exception => "application.exception",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_stage_names_are_distinct() {
        let names: HashSet<_> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Stage::ALL.len());
        assert_eq!(Stage::RouteNotFound.to_string(), "application.no.route");
        assert_eq!(String::from(Stage::RoutePost), "application.route.post");
    }
}
