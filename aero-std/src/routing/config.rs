//! Route tables loaded from TOML.
//!
//! ```toml
//! index_route = "home"
//!
//! [[routes]]
//! name = "user"
//! pattern = "/user/{id}"
//! defaults = { controller = "site:user:show" }
//! requirements = { id = "\\d+" }
//! namespaces = ["site"]
//! ```
//!
//! The array order of `routes` is the match order.

use crate::routing::{
    error::ConfigError,
    route::{Route, generate_name},
    router::Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A whole route table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Name for routes whose name is empty.
    #[serde(default)]
    pub index_route: Option<String>,
    /// Routes in match order.
    #[serde(default)]
    pub routes: Vec<RouteDef>,
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDef {
    /// Route name; derived from the pattern when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// The path template.
    pub pattern: String,
    /// Default values. Strings, numbers and booleans are accepted.
    #[serde(default)]
    pub defaults: BTreeMap<String, toml::Value>,
    /// Per-variable fragments.
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
    /// Namespace tags.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// A single extra namespace tag, merged into `namespaces`.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl RoutingConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Build the router. Every route is compiled, so a bad pattern fails here.
    pub fn into_router(self) -> Result<Router, ConfigError> {
        let mut router = Router::new();
        if let Some(index) = self.index_route {
            router.set_index_route_name(index);
        }

        for (index, def) in self.routes.into_iter().enumerate() {
            if def.pattern.trim().is_empty() {
                return Err(ConfigError::EmptyPattern { index });
            }

            let mut defaults = Vec::with_capacity(def.defaults.len());
            for (key, value) in def.defaults {
                let value = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    _ => return Err(ConfigError::InvalidDefault { index, key }),
                };
                defaults.push((key, value));
            }

            let mut route = Route::new(&def.pattern)
                .with_defaults(defaults)
                .with_requirements(def.requirements);
            route.set_namespaces(def.namespaces.iter().chain(def.namespace.iter()));

            let name = def.name.unwrap_or_else(|| generate_name(route.template()));
            router.add(name, route);
        }

        router.compile_all()?;
        Ok(router)
    }
}

impl Router {
    /// Load a route table from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        RoutingConfig::from_toml_str(source)?.into_router()
    }
}
