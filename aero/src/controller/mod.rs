//! # Controllers
//!
//! An [`Action`] is the code a route dispatches to. It declares its
//! parameters in an [`ActionDescriptor`]; the DISPATCH stage binds them with
//! [`bind_arguments`] from the route parameters, the [`ContextPool`] and the
//! declared defaults, then calls the action.
//!
//! Which action a route points at is decided by a [`ControllerResolver`].
//! [`StandardResolver`] reads the route's `controller` parameter and looks it
//! up in a [`ControllerRegistry`], accepting `module:controller:action`
//! shorthand through a [`NameParser`].

mod action;
mod arguments;
mod name;
mod resolver;

pub use action::{
    Action, ActionDescriptor, ActionOutput, DeclaredType, FnAction, IntoActionOutput, ParamSpec,
};
pub use arguments::{Argument, Arguments, ContextPool, Provided, bind_arguments};
pub use name::{ControllerName, NameError, NameParser, StandardNameParser, action_method_name};
pub use resolver::{CONTROLLER_RESOLVED, ControllerRegistry, ControllerResolver, StandardResolver};
