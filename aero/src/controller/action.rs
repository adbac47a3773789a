//! Actions and their parameter metadata.

use crate::{controller::arguments::Arguments, http::Response};
use aero_core::{BoxError, Truthy};
use std::{
    any::{Any, TypeId},
    borrow::Cow,
    fmt,
    sync::Arc,
};

/// A type a parameter is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    id: TypeId,
    name: &'static str,
}

impl DeclaredType {
    /// The declared type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, for messages.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// One declared action parameter.
#[derive(Clone)]
pub struct ParamSpec {
    name: Cow<'static, str>,
    declared: Option<DeclaredType>,
    default: Option<Arc<dyn Any + Send + Sync>>,
}

impl ParamSpec {
    /// A parameter bound by route parameter name only.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            default: None,
        }
    }

    /// A parameter that may also be bound from the context pool by type.
    pub fn typed<T: Any + Send + Sync>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            declared: Some(DeclaredType::of::<T>()),
            default: None,
        }
    }

    /// Declare the value used when nothing else binds.
    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(Arc::new(value));
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, for typed parameters.
    pub fn declared(&self) -> Option<DeclaredType> {
        self.declared
    }

    /// The declared default.
    pub fn default_value(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.default.as_ref()
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("name", &self.name)
            .field("declared", &self.declared.map(|d| d.name()))
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// Static description of an action: its name and parameters in call order.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    name: Cow<'static, str>,
    params: Vec<ParamSpec>,
}

impl ActionDescriptor {
    /// An action without parameters.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// The action name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in call order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }
}

/// What an action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    /// A finished response; VIEW is skipped.
    Response(Response),
    /// Data for a VIEW listener to render.
    View(serde_json::Value),
    /// Nothing.
    Empty,
}

impl Truthy for ActionOutput {
    fn is_truthy(&self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// Conversion of action return values.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from an action",
    label = "not convertible to `ActionOutput`",
    note = "Actions may return `Response`, `serde_json::Value`, `ActionOutput`, `()`, or `Option`/`Result` of those."
)]
pub trait IntoActionOutput {
    /// Convert.
    fn into_action_output(self) -> Result<ActionOutput, BoxError>;
}

impl IntoActionOutput for ActionOutput {
    fn into_action_output(self) -> Result<ActionOutput, BoxError> {
        Ok(self)
    }
}

impl IntoActionOutput for Response {
    fn into_action_output(self) -> Result<ActionOutput, BoxError> {
        Ok(ActionOutput::Response(self))
    }
}

impl IntoActionOutput for serde_json::Value {
    fn into_action_output(self) -> Result<ActionOutput, BoxError> {
        Ok(ActionOutput::View(self))
    }
}

impl IntoActionOutput for () {
    fn into_action_output(self) -> Result<ActionOutput, BoxError> {
        Ok(ActionOutput::Empty)
    }
}

impl<T: IntoActionOutput> IntoActionOutput for Option<T> {
    fn into_action_output(self) -> Result<ActionOutput, BoxError> {
        match self {
            Some(value) => value.into_action_output(),
            None => Ok(ActionOutput::Empty),
        }
    }
}

impl<T, E> IntoActionOutput for Result<T, E>
where
    T: IntoActionOutput,
    E: Into<BoxError>,
{
    fn into_action_output(self) -> Result<ActionOutput, BoxError> {
        match self {
            Ok(value) => value.into_action_output(),
            Err(error) => Err(error.into()),
        }
    }
}

/// A controller action.
///
/// Implemented by `#[action]` functions and by [`FnAction`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Action`",
    label = "missing `Action` implementation",
    note = "Annotate a function with `#[aero::action]` or wrap a closure in `FnAction::new`."
)]
pub trait Action: Send + Sync + 'static {
    /// Name and parameters.
    fn descriptor(&self) -> &ActionDescriptor;

    /// Invoke with bound arguments.
    fn call(&self, args: Arguments) -> Result<ActionOutput, BoxError>;
}

/// An action made from a closure and an explicit descriptor.
///
/// ```rust,ignore
/// let show = FnAction::new(
///     ActionDescriptor::new("users:show").param(ParamSpec::named("id")),
///     |args| {
///         let id: u64 = args.value(0)?;
///         Ok::<_, BoxError>(Response::text(StatusCode::OK, format!("user {id}")))
///     },
/// );
/// ```
pub struct FnAction<F> {
    descriptor: ActionDescriptor,
    f: F,
}

impl<F> FnAction<F> {
    /// Wrap `f`.
    pub fn new(descriptor: ActionDescriptor, f: F) -> Self {
        Self { descriptor, f }
    }
}

impl<F, O> Action for FnAction<F>
where
    F: Fn(Arguments) -> O + Send + Sync + 'static,
    O: IntoActionOutput,
{
    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    fn call(&self, args: Arguments) -> Result<ActionOutput, BoxError> {
        (self.f)(args).into_action_output()
    }
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
