//! Routing errors.

use thiserror::Error;

/// Errors raised while compiling, matching or assembling routes.
///
/// Every variant except [`RouteNotFound`](Self::RouteNotFound) and
/// [`MissingParameter`](Self::MissingParameter) is a programming error in
/// the route table, not something a request can trigger by itself.
#[derive(Error, Debug, Clone)]
pub enum RoutingError {
    /// The synthesized matching expression was rejected by the regex engine.
    #[error("route `{template}` does not compile: {source}")]
    Compile {
        /// The route template.
        template: String,
        /// The regex engine's complaint.
        #[source]
        source: regex::Error,
    },

    /// A placeholder name is used twice in one template.
    #[error("route `{template}` declares variable `{name}` more than once")]
    DuplicateVariable {
        /// The route template.
        template: String,
        /// The repeated variable.
        name: String,
    },

    /// A requirement fragment is not a valid expression on its own.
    #[error("requirement `{requirement}` for variable `{name}` is invalid: {source}")]
    InvalidRequirement {
        /// The constrained variable.
        name: String,
        /// The fragment as registered.
        requirement: String,
        /// The regex engine's complaint.
        #[source]
        source: regex::Error,
    },

    /// `assemble` was asked for a route that is not in the table.
    #[error("route `{0}` does not exist")]
    RouteNotFound(String),

    /// `assemble` lacks a value for a required variable.
    #[error("route `{route}` requires parameter `{parameter}`")]
    MissingParameter {
        /// The route template.
        route: String,
        /// The variable without a value.
        parameter: String,
    },
}

/// Errors raised while loading a route table from configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or does not have the expected shape.
    #[error("invalid routing configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A route entry has a blank pattern.
    #[error("route #{index} has an empty pattern")]
    EmptyPattern {
        /// Position of the entry in the `routes` array.
        index: usize,
    },

    /// A default value is not a scalar.
    #[error("route #{index}: default `{key}` must be a string, number or boolean")]
    InvalidDefault {
        /// Position of the entry in the `routes` array.
        index: usize,
        /// The offending key.
        key: String,
    },

    /// A configured route does not compile.
    #[error(transparent)]
    Routing(#[from] RoutingError),
}
