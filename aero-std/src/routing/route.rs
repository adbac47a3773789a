//! A single route: template, defaults, requirements and namespace tags.

use crate::routing::{
    RouteParams,
    error::RoutingError,
    pattern::{self, CompiledRoute, Token},
};
use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::Write as _,
    sync::OnceLock,
};

/// Collapse slash runs, trim spaces and slashes, and prepend one slash.
///
/// The root template stays `/`.
pub fn normalize_template(template: &str) -> String {
    let collapsed = collapse_slashes(template);
    format!("/{}", collapsed.trim_matches(|c| c == ' ' || c == '/'))
}

fn normalize_namespace(namespace: &str) -> String {
    collapse_slashes(namespace.trim_matches(|c| c == ' ' || c == '/' || c == '\\'))
}

/// Replace every run of `/` and `\` with a single `/`.
fn collapse_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if c == '/' || c == '\\' {
            if !in_run {
                out.push('/');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Derive a route name from a template.
///
/// `/user/{id}` becomes `user/id`. May return an empty string, which the
/// router replaces with its index route name.
pub fn generate_name(template: &str) -> String {
    let replaced: String = template
        .chars()
        .map(|c| match c {
            ':' | '|' | '-' | '{' | '}' => '_',
            other => other,
        })
        .collect();
    let replaced = replaced.replace("/_", "/").replace("_/", "/");

    let mut name = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && name.ends_with('_') {
            continue;
        }
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/') {
            name.push(c);
        }
    }

    name.trim_matches(|c| c == ' ' || c == '/' || c == '_')
        .to_string()
}

/// A route template with its defaults, requirements and namespaces.
///
/// The template is compiled on first use and cached for the lifetime of the
/// route. Compilation is pure, so two threads racing on the first match both
/// compute the same value and one of them is kept.
///
/// ```rust,ignore
/// let route = Route::new("/blog/{page}")
///     .with_default("page", "1")
///     .with_requirement("page", r"\d+");
///
/// assert_eq!(route.matches("/blog")?.unwrap()["page"], "1");
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    template: String,
    defaults: RouteParams,
    requirements: BTreeMap<String, String>,
    namespaces: Vec<String>,
    compiled: OnceLock<CompiledRoute>,
}

impl Route {
    /// Create a route. The template is normalized.
    pub fn new(template: impl AsRef<str>) -> Self {
        Self {
            template: normalize_template(template.as_ref()),
            defaults: RouteParams::new(),
            requirements: BTreeMap::new(),
            namespaces: Vec::new(),
            compiled: OnceLock::new(),
        }
    }

    /// Add a default value. A trailing variable with a default is optional.
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self.compiled = OnceLock::new();
        self
    }

    /// Add several default values.
    pub fn with_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.compiled = OnceLock::new();
        self
    }

    /// Constrain a variable. Leading `^` and trailing `$` are stripped.
    pub fn with_requirement(mut self, name: impl Into<String>, fragment: impl AsRef<str>) -> Self {
        self.requirements.insert(
            name.into(),
            pattern::trim_anchors(fragment.as_ref()).to_string(),
        );
        self.compiled = OnceLock::new();
        self
    }

    /// Add several requirements.
    pub fn with_requirements<K, V>(self, requirements: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        requirements
            .into_iter()
            .fold(self, |route, (k, v)| route.with_requirement(k, v))
    }

    /// Tag the route with a namespace.
    pub fn with_namespace(mut self, namespace: impl AsRef<str>) -> Self {
        self.add_namespace(namespace);
        self
    }

    /// Add a namespace tag. Duplicates are ignored.
    pub fn add_namespace(&mut self, namespace: impl AsRef<str>) {
        let namespace = normalize_namespace(namespace.as_ref());
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
    }

    /// Remove a namespace tag.
    pub fn remove_namespace(&mut self, namespace: impl AsRef<str>) {
        let namespace = normalize_namespace(namespace.as_ref());
        self.namespaces.retain(|ns| *ns != namespace);
    }

    /// Replace all namespace tags.
    pub fn set_namespaces<S: AsRef<str>>(&mut self, namespaces: impl IntoIterator<Item = S>) {
        self.namespaces.clear();
        for namespace in namespaces {
            self.add_namespace(namespace);
        }
    }

    /// Whether some tag of this route starts with `namespace`.
    ///
    /// A route without tags belongs to no namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        let namespace = normalize_namespace(namespace);
        self.namespaces.iter().any(|ns| ns.starts_with(&namespace))
    }

    /// The normalized template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Default values.
    pub fn defaults(&self) -> &RouteParams {
        &self.defaults
    }

    /// The default value of one parameter.
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.defaults.get(name).map(String::as_str)
    }

    /// Requirement fragments, anchors stripped.
    pub fn requirements(&self) -> &BTreeMap<String, String> {
        &self.requirements
    }

    /// Namespace tags in insertion order.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Literal text before the first placeholder's separator.
    ///
    /// Used to reject paths without compiling the route. A literal template
    /// is its own prefix.
    pub fn static_prefix(&self) -> &str {
        pattern::literal_prefix(&self.template).unwrap_or(&self.template)
    }

    /// Cheap pre-check: `false` means the route cannot match `path`.
    ///
    /// Templates with a placeholder require the path to start with the static
    /// prefix; literal templates require equality.
    pub fn may_match(&self, path: &str) -> bool {
        match pattern::literal_prefix(&self.template) {
            Some(prefix) => path.starts_with(prefix),
            None => self.template == path,
        }
    }

    /// The compiled form, built on first use.
    pub fn compiled(&self) -> Result<&CompiledRoute, RoutingError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        let compiled = pattern::compile(&self.template, &self.requirements, &self.defaults)?;
        Ok(self.compiled.get_or_init(|| compiled))
    }

    /// Match a path.
    ///
    /// On success, returns the defaults overlaid with the captured values.
    /// Captures are percent-decoded; a capture that does not decode to UTF-8
    /// is kept as captured.
    pub fn matches(&self, path: &str) -> Result<Option<RouteParams>, RoutingError> {
        let compiled = self.compiled()?;
        let Some(captures) = compiled.regex().captures(path) else {
            return Ok(None);
        };

        let mut params = self.defaults.clone();
        for name in compiled.variables() {
            if let Some(value) = captures.name(name) {
                params.insert(name.clone(), decode(value.as_str()));
            }
        }
        Ok(Some(params))
    }

    /// Build a path from parameters.
    ///
    /// Trailing optional variables whose value is missing or equal to the
    /// default are left out. Parameters that are not template variables and
    /// differ from the defaults go into the query string, sorted by name.
    pub fn assemble(&self, params: &RouteParams) -> Result<String, RoutingError> {
        let compiled = self.compiled()?;

        let mut segments: Vec<Cow<'_, str>> = Vec::new();
        let mut optional = true;
        for token in compiled.tokens() {
            match token {
                Token::Text(text) => {
                    segments.push(Cow::Borrowed(text));
                    optional = false;
                }
                Token::Variable { separator, name, .. } => {
                    let given = params.get(name);
                    let default = self.defaults.get(name);
                    let is_default = match (given, default) {
                        (None, Some(_)) => true,
                        (Some(v), Some(d)) => v == d,
                        _ => false,
                    };
                    if optional && is_default {
                        continue;
                    }

                    let Some(value) = given.or(default) else {
                        return Err(RoutingError::MissingParameter {
                            route: self.template.clone(),
                            parameter: name.clone(),
                        });
                    };
                    segments.push(urlencoding::encode(value));
                    segments.push(Cow::Owned(separator.to_string()));
                    optional = false;
                }
            }
        }

        let mut path: String = segments.iter().rev().map(|s| s.as_ref()).collect();
        if path.is_empty() {
            path.push('/');
        }

        let mut separator = '?';
        for (key, value) in params {
            if compiled.variables().contains(key) || self.defaults.get(key) == Some(value) {
                continue;
            }
            // Writing into a String cannot fail.
            let _ = write!(
                path,
                "{separator}{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            );
            separator = '&';
        }

        Ok(path)
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RouteParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_template() {
        assert_eq!(normalize_template(""), "/");
        assert_eq!(normalize_template("/"), "/");
        assert_eq!(normalize_template("user//{id}/"), "/user/{id}");
        assert_eq!(normalize_template(" \\a\\\\b "), "/a/b");
    }

    #[test]
    fn test_generate_name() {
        assert_eq!(generate_name("/user/{id}"), "user/id");
        assert_eq!(generate_name("/blog-post/{slug}.html"), "blog_post/slug_.html");
        assert_eq!(generate_name("/"), "");
        assert_eq!(generate_name("/{page}"), "page");
    }

    #[test]
    fn test_variable_capture() {
        let route = Route::new("/user/{id}");
        assert_eq!(route.matches("/user/42").unwrap(), Some(params(&[("id", "42")])));
        assert_eq!(route.matches("/user/").unwrap(), None);
        assert_eq!(route.matches("/user").unwrap(), None);
    }

    #[test]
    fn test_optional_trailing_segment() {
        let route = Route::new("/blog/{page}").with_default("page", "1");
        assert_eq!(route.matches("/blog").unwrap(), Some(params(&[("page", "1")])));
        assert_eq!(route.matches("/blog/3").unwrap(), Some(params(&[("page", "3")])));
    }

    #[test]
    fn test_defaults_merge_under_captures() {
        let route = Route::new("/user/{id}")
            .with_defaults([("controller", "users:show"), ("id", "0")]);
        let matched = route.matches("/user/7").unwrap().unwrap();
        assert_eq!(matched, params(&[("controller", "users:show"), ("id", "7")]));
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        let route = Route::new("/tag/{name}");
        let matched = route.matches("/tag/hello%20world").unwrap().unwrap();
        assert_eq!(matched["name"], "hello world");

        let matched = route.matches("/tag/%FF").unwrap().unwrap();
        assert_eq!(matched["name"], "%FF");
    }

    #[test]
    fn test_requirement_anchors_trimmed() {
        let route = Route::new("/user/{id}").with_requirement("id", r"^\d+$");
        assert_eq!(route.requirements()["id"], r"\d+");
        assert!(route.matches("/user/12").unwrap().is_some());
        assert!(route.matches("/user/ab").unwrap().is_none());
    }

    #[test]
    fn test_static_prefix_and_prefilter() {
        let route = Route::new("/blog/{page}");
        assert_eq!(route.static_prefix(), "/blog");
        assert!(route.may_match("/blog"));
        assert!(!route.may_match("/news/1"));

        let literal = Route::new("/about");
        assert!(literal.may_match("/about"));
        assert!(!literal.may_match("/about/team"));

        assert_eq!(Route::new("/{page}").static_prefix(), "");
        assert_eq!(Route::new("/report.{format}").static_prefix(), "/report");
    }

    #[test]
    fn test_prefilter_admits_omitted_optional_separator() {
        let route = Route::new("/report.{format}").with_default("format", "html");
        assert!(route.may_match("/report"));
        assert_eq!(route.matches("/report").unwrap(), Some(params(&[("format", "html")])));
        assert_eq!(route.matches("/report.pdf").unwrap(), Some(params(&[("format", "pdf")])));
    }

    #[test]
    fn test_path_is_matched_undecoded() {
        let route = Route::new("/hello world");
        assert!(route.matches("/hello world").unwrap().is_some());
        assert!(route.matches("/hello%20world").unwrap().is_none());
        assert!(!route.may_match("/hello%20world"));

        let route = Route::new("/tag/{name}");
        assert_eq!(route.matches("/tag/a%2Fb").unwrap().unwrap()["name"], "a/b");
    }

    #[test]
    fn test_compiled_once() {
        let route = Route::new("/a/{b}");
        let first = route.compiled().unwrap() as *const CompiledRoute;
        let second = route.compiled().unwrap() as *const CompiledRoute;
        assert_eq!(first, second);
    }

    #[test]
    fn test_namespaces() {
        let mut route = Route::new("/admin")
            .with_namespace("/admin/users/")
            .with_namespace("admin\\\\users");
        assert_eq!(route.namespaces(), &["admin/users".to_string()]);
        assert!(route.in_namespace("admin"));
        assert!(route.in_namespace("/admin/users"));
        assert!(!route.in_namespace("site"));

        route.remove_namespace("admin/users");
        assert!(!route.in_namespace("admin"));
    }

    #[test]
    fn test_assemble_omits_default_trailing_variables() {
        let route = Route::new("/archive/{year}/{month}")
            .with_defaults([("year", "2024"), ("month", "01")]);

        assert_eq!(route.assemble(&params(&[])).unwrap(), "/archive");
        assert_eq!(route.assemble(&params(&[("year", "2023")])).unwrap(), "/archive/2023");
        assert_eq!(
            route.assemble(&params(&[("month", "05")])).unwrap(),
            "/archive/2024/05"
        );
    }

    #[test]
    fn test_assemble_encodes_and_appends_query() {
        let route = Route::new("/tag/{name}").with_default("controller", "tags");
        let path = route
            .assemble(&params(&[
                ("name", "a b/c"),
                ("sort", "desc"),
                ("controller", "tags"),
                ("page", "2"),
            ]))
            .unwrap();
        assert_eq!(path, "/tag/a%20b%2Fc?page=2&sort=desc");
    }

    #[test]
    fn test_assemble_missing_parameter() {
        let err = Route::new("/user/{id}").assemble(&params(&[])).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::MissingParameter { parameter, .. } if parameter == "id"
        ));
    }

    #[test]
    fn test_assemble_lone_optional_variable() {
        let route = Route::new("/{page}").with_default("page", "1");
        assert_eq!(route.assemble(&params(&[])).unwrap(), "/");
        assert_eq!(route.assemble(&params(&[("page", "4")])).unwrap(), "/4");
    }
}
