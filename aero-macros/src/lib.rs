//! Procedural macros for `aero`.

use proc_macro::TokenStream;

mod action;

/// Turn a function into a controller action.
///
/// The function is replaced by a unit struct of the same name implementing
/// `aero::controller::Action`. Parameters are bound as follows:
///
/// - `id: u64`: the route parameter `id`, parsed with `FromStr`
/// - `store: &UserStore`: the context value of type `UserStore`, borrowed
/// - `#[context] request: Request`: the context value of type `Request`, cloned
/// - `#[default(expr)]` on any parameter: the value used when nothing else binds
///
/// A route parameter with the same name always wins over a context value.
///
/// # Arguments
///
/// - `name = "..."`: the action name used in error messages (defaults to the
///   function name)
///
/// # Example
///
/// ```rust,ignore
/// #[aero::action(name = "blog:post:list")]
/// fn list_posts(#[default(1)] page: u32, posts: &PostStore) -> serde_json::Value {
///     posts.page(page)
/// }
///
/// registry.register("blog:post:list", list_posts);
/// ```
#[proc_macro_attribute]
pub fn action(attr: TokenStream, item: TokenStream) -> TokenStream {
    action::action_impl(attr, item)
}
