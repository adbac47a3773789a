//! # Routing
//!
//! Path templates compiled to anchored regular expressions, and an ordered
//! route table.
//!
//! | Type | Role |
//! |------|------|
//! | [`Route`] | Template, defaults, requirements, namespaces; compiles lazily |
//! | [`Router`] | Named routes in registration order; first match wins |
//! | [`MatchedRoute`] | Route, name and merged parameters of a match |
//! | [`RoutingConfig`] | TOML route table |
//!
//! # Template syntax
//!
//! Literal text with `{name}` placeholders, names made of ASCII letters,
//! digits and `_`. The character before a placeholder is its separator.
//! A run of trailing placeholders that all have defaults is optional.

pub mod config;
pub mod error;
pub mod matched;
pub mod pattern;
pub mod route;
pub mod router;

pub use config::{RouteDef, RoutingConfig};
pub use error::{ConfigError, RoutingError};
pub use matched::MatchedRoute;
pub use pattern::{CompiledRoute, Token, compile};
pub use route::{Route, generate_name, normalize_template};
pub use router::{Router, RouterBuilder};

/// Route parameters: defaults and captured values, by name.
pub type RouteParams = std::collections::BTreeMap<String, String>;
