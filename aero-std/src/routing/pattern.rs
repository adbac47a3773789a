//! Route template compiler.
//!
//! A template is literal text interleaved with `{name}` placeholders. The
//! character right before a placeholder is its *separator*: it belongs to the
//! variable, so an optional trailing variable can drop its separator together
//! with its value (`/blog/{page}` matches `/blog`).
//!
//! Unconstrained variables get the fragment `[^<seps>]+?`, where `<seps>` is
//! the variable's own separator plus the character right after the
//! placeholder. `/file/{name}.{ext}` therefore gives `name` the fragment
//! `[^/.]+?` and it stops before the dot.

use crate::routing::error::RoutingError;
use regex::Regex;
use std::{collections::BTreeMap, fmt};

/// One element of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, matched verbatim.
    Text(String),
    /// A `{name}` placeholder.
    Variable {
        /// The character right before the placeholder.
        separator: char,
        /// The fragment the value must match.
        pattern: String,
        /// The variable name.
        name: String,
    },
}

/// The compiled form of a route template.
#[derive(Clone)]
pub struct CompiledRoute {
    static_prefix: String,
    regex: Regex,
    tokens: Vec<Token>,
    variables: Vec<String>,
}

impl CompiledRoute {
    /// Leading literal text, empty when the template starts with a variable.
    pub fn static_prefix(&self) -> &str {
        &self.static_prefix
    }

    /// The anchored matching expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Tokens in reverse template order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Variable names in template order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

impl PartialEq for CompiledRoute {
    fn eq(&self, other: &Self) -> bool {
        self.static_prefix == other.static_prefix
            && self.regex.as_str() == other.regex.as_str()
            && self.tokens == other.tokens
            && self.variables == other.variables
    }
}

impl Eq for CompiledRoute {}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("static_prefix", &self.static_prefix)
            .field("regex", &self.regex.as_str())
            .field("tokens", &self.tokens)
            .field("variables", &self.variables)
            .finish()
    }
}

/// Strip one leading `^` and one unescaped trailing `$` from a requirement fragment.
pub fn trim_anchors(requirement: &str) -> &str {
    let fragment = requirement.strip_prefix('^').unwrap_or(requirement);
    match fragment.strip_suffix('$') {
        Some(rest) if (rest.len() - rest.trim_end_matches('\\').len()) % 2 == 0 => rest,
        _ => fragment,
    }
}

/// Literal text before the separator of the first placeholder.
///
/// `None` when the template has no placeholder. The separator is left out
/// because a trailing optional variable makes it optional too.
pub fn literal_prefix(template: &str) -> Option<&str> {
    placeholders(template)
        .first()
        .map(|placeholder| &template[..placeholder.start])
}

struct Placeholder<'a> {
    /// Byte offset of the separator.
    start: usize,
    /// Byte offset right after the closing brace.
    end: usize,
    separator: char,
    name: &'a str,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Find `<sep>{name}` occurrences, left to right, without overlap.
///
/// A separator already consumed by the previous placeholder is not reused, so
/// in `/{a}{b}` only `{a}` is a placeholder.
fn placeholders(template: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut scanned_to = 0;
    let mut prev: Option<(usize, char)> = None;

    for (at, c) in template.char_indices() {
        if at < scanned_to {
            continue;
        }
        if c == '{'
            && let Some((sep_at, separator)) = prev.filter(|(sep_at, _)| *sep_at >= scanned_to)
        {
            let rest = &template[at + 1..];
            let len = rest.find(|ch: char| !is_name_char(ch)).unwrap_or(rest.len());
            if len > 0 && rest[len..].starts_with('}') {
                let end = at + 1 + len + 1;
                found.push(Placeholder {
                    start: sep_at,
                    end,
                    separator,
                    name: &rest[..len],
                });
                scanned_to = end;
                prev = None;
                continue;
            }
        }
        prev = Some((at, c));
    }

    found
}

fn escape_char(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

/// Compile a template.
///
/// A variable is optional when it has an entry in `defaults` and every token
/// after it is an optional variable as well. Compiling the same inputs always
/// yields an equal [`CompiledRoute`].
pub fn compile(
    template: &str,
    requirements: &BTreeMap<String, String>,
    defaults: &BTreeMap<String, String>,
) -> Result<CompiledRoute, RoutingError> {
    let mut tokens = Vec::new();
    let mut variables: Vec<String> = Vec::new();
    let mut pos = 0;

    for placeholder in placeholders(template) {
        if placeholder.start > pos {
            tokens.push(Token::Text(template[pos..placeholder.start].to_string()));
        }
        pos = placeholder.end;

        let name = placeholder.name;
        if variables.iter().any(|v| v == name) {
            return Err(RoutingError::DuplicateVariable {
                template: template.to_string(),
                name: name.to_string(),
            });
        }

        let pattern = match requirements.get(name) {
            Some(requirement) => {
                let fragment = trim_anchors(requirement);
                Regex::new(&format!("^(?:{fragment})$")).map_err(|source| {
                    RoutingError::InvalidRequirement {
                        name: name.to_string(),
                        requirement: requirement.clone(),
                        source,
                    }
                })?;
                fragment.to_string()
            }
            None => {
                let mut seps = escape_char(placeholder.separator);
                if let Some(next) = template[pos..].chars().next()
                    && next != placeholder.separator
                {
                    seps.push_str(&escape_char(next));
                }
                format!("[^{seps}]+?")
            }
        };

        tokens.push(Token::Variable {
            separator: placeholder.separator,
            pattern,
            name: name.to_string(),
        });
        variables.push(name.to_string());
    }

    if pos < template.len() {
        tokens.push(Token::Text(template[pos..].to_string()));
    }

    // Longest run of trailing variables with a default.
    let mut first_optional = tokens.len();
    for (i, token) in tokens.iter().enumerate().rev() {
        match token {
            Token::Variable { name, .. } if defaults.contains_key(name) => first_optional = i,
            _ => break,
        }
    }

    let mut source = String::from("(?s)^");
    let mut open = 0;
    match tokens.as_slice() {
        // A lone optional variable keeps its separator mandatory, so `/{page}` still matches `/`.
        [Token::Variable { separator, pattern, name }] if first_optional == 0 => {
            source.push_str(&escape_char(*separator));
            source.push_str(&format!("(?:(?P<{name}>{pattern})"));
            open = 1;
        }
        _ => {
            for (i, token) in tokens.iter().enumerate() {
                match token {
                    Token::Text(text) => source.push_str(&regex::escape(text)),
                    Token::Variable { separator, pattern, name } => {
                        if i >= first_optional {
                            source.push_str("(?:");
                            open += 1;
                        }
                        source.push_str(&escape_char(*separator));
                        source.push_str(&format!("(?P<{name}>{pattern})"));
                    }
                }
            }
        }
    }
    for _ in 0..open {
        source.push_str(")?");
    }
    source.push('$');

    let regex = Regex::new(&source).map_err(|source| RoutingError::Compile {
        template: template.to_string(),
        source,
    })?;

    let static_prefix = match tokens.first() {
        Some(Token::Text(text)) => text.clone(),
        _ => String::new(),
    };
    tokens.reverse();

    #[cfg(feature = "tracing")]
    tracing::debug!(template, regex = regex.as_str(), "route compiled");

    Ok(CompiledRoute {
        static_prefix,
        regex,
        tokens,
        variables,
    })
}
