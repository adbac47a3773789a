//! Controller name notation.
//!
//! `module:controller:action` names are expanded to the canonical key
//! `Module\Controller\ControllerController::actionAction`, the form actions
//! are registered under.

use thiserror::Error;

/// A name that looks like `a:b:c` but is not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Not exactly three non-empty `:`-separated parts.
    #[error("`{0}` is not a valid module:controller:action name")]
    Malformed(String),
}

/// Turns a short controller name into a registry key.
pub trait NameParser: Send + Sync + 'static {
    /// Parse `name`.
    ///
    /// `Ok(None)` means the name is not in this parser's notation and should
    /// be used as it is.
    fn parse(&self, name: &str) -> Result<Option<ControllerName>, NameError>;
}

/// The parts of a `module:controller:action` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerName {
    module: String,
    controller: String,
    action: String,
}

impl ControllerName {
    /// The module part.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The controller part.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// The action part, as written.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// `Module\Controller\NameController`. `/` in the controller part become `\`.
    pub fn class(&self) -> String {
        format!(
            "{}\\Controller\\{}Controller",
            upper_first(&self.module),
            upper_first(&self.controller.replace('/', "\\"))
        )
    }

    /// The action method name, see [`action_method_name`].
    pub fn method(&self) -> String {
        action_method_name(&self.action)
    }

    /// `class::method`, the key actions are registered under.
    pub fn key(&self) -> String {
        format!("{}::{}", self.class(), self.method())
    }
}

/// The `module:controller:action` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNameParser;

impl NameParser for StandardNameParser {
    fn parse(&self, name: &str) -> Result<Option<ControllerName>, NameError> {
        if !name.contains(':') || name.contains("::") {
            return Ok(None);
        }

        let parts: Vec<&str> = name.split(':').collect();
        match parts.as_slice() {
            [module, controller, action]
                if !module.is_empty() && !controller.is_empty() && !action.is_empty() =>
            {
                Ok(Some(ControllerName {
                    module: module.to_string(),
                    controller: controller.to_string(),
                    action: action.to_string(),
                }))
            }
            _ => Err(NameError::Malformed(name.to_string())),
        }
    }
}

/// `show-user`, `show_user` and `show.user` all become `showUserAction`.
///
/// Names already ending in `Action` are returned unchanged.
pub fn action_method_name(action: &str) -> String {
    if action.ends_with("Action") {
        return action.to_string();
    }

    let camel: String = action
        .split(['.', '-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(upper_first)
        .collect();

    format!("{}Action", lower_first(&camel))
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_method_name() {
        assert_eq!(action_method_name("show"), "showAction");
        assert_eq!(action_method_name("show-user"), "showUserAction");
        assert_eq!(action_method_name("show_user"), "showUserAction");
        assert_eq!(action_method_name("show.user.profile"), "showUserProfileAction");
        assert_eq!(action_method_name("ShowUser"), "showUserAction");
        assert_eq!(action_method_name("listAction"), "listAction");
    }

    #[test]
    fn test_parse_three_part_name() {
        let name = StandardNameParser.parse("blog:admin/post:edit-draft").unwrap().unwrap();
        assert_eq!(name.module(), "blog");
        assert_eq!(name.class(), "Blog\\Controller\\Admin\\postController");
        assert_eq!(name.key(), "Blog\\Controller\\Admin\\postController::editDraftAction");
    }

    #[test]
    fn test_names_outside_the_notation() {
        assert_eq!(StandardNameParser.parse("home").unwrap(), None);
        assert_eq!(StandardNameParser.parse("Site\\Controller\\Page::homeAction").unwrap(), None);
    }

    #[test]
    fn test_malformed_names() {
        for name in ["a:b", "a:b:c:d", ":b:c", "a:b:"] {
            assert_eq!(
                StandardNameParser.parse(name),
                Err(NameError::Malformed(name.to_string()))
            );
        }
    }
}
