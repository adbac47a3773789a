//! Controller argument binding.
//!
//! Each declared parameter is bound from the first source that has a value:
//!
//! 1. the route parameter with the same name
//! 2. for typed parameters, a context value of the declared type (exact type
//!    first, then registered views in insertion order)
//! 3. the declared default
//!
//! A parameter none of these can satisfy fails the call with
//! [`ApplicationError::MissingArgument`].

use crate::{application::ApplicationError, controller::action::ActionDescriptor};
use aero_std::RouteParams;
use std::{
    any::{Any, TypeId, type_name},
    borrow::Cow,
    fmt,
    str::FromStr,
    sync::Arc,
};

type Shared = Arc<dyn Any + Send + Sync>;

/// Typed context values offered to controllers.
///
/// ```rust,ignore
/// let mut pool = ContextPool::new();
/// pool.provide(PgUsers::connect(url)?)
///     .also_as(|users| users as Arc<dyn UserStore>);
/// ```
#[derive(Clone, Default)]
pub struct ContextPool {
    exact: Vec<(TypeId, Shared)>,
    views: Vec<(TypeId, Shared)>,
}

impl ContextPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a value. A later value of the same type shadows earlier ones.
    pub fn provide<T: Any + Send + Sync>(&mut self, value: T) -> Provided<'_, T> {
        self.provide_shared(Arc::new(value))
    }

    /// Offer an already shared value.
    pub fn provide_shared<T: Any + Send + Sync>(&mut self, value: Arc<T>) -> Provided<'_, T> {
        self.exact.push((TypeId::of::<T>(), Arc::clone(&value) as Shared));
        Provided { pool: self, value }
    }

    /// Look a value up by type id.
    pub fn find(&self, id: TypeId) -> Option<&Shared> {
        self.exact
            .iter()
            .rev()
            .find(|(ty, _)| *ty == id)
            .or_else(|| self.views.iter().find(|(ty, _)| *ty == id))
            .map(|(_, value)| value)
    }

    /// Look a value up by type.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.find(TypeId::of::<T>())
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Whether a value of type `T` is available.
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.find(TypeId::of::<T>()).is_some()
    }

    /// Number of values and views.
    pub fn len(&self) -> usize {
        self.exact.len() + self.views.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.views.is_empty()
    }
}

impl fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPool")
            .field("values", &self.exact.len())
            .field("views", &self.views.len())
            .finish()
    }
}

/// Handle returned by [`ContextPool::provide`].
pub struct Provided<'a, T> {
    pool: &'a mut ContextPool,
    value: Arc<T>,
}

impl<T: Any + Send + Sync> Provided<'_, T> {
    /// Also offer the value as `V`, typically a trait object it implements.
    ///
    /// Views are found only when no value has exactly the requested type.
    pub fn also_as<V, F>(self, view: F) -> Self
    where
        V: Any + Send + Sync,
        F: FnOnce(Arc<T>) -> V,
    {
        let converted = view(Arc::clone(&self.value));
        self.pool
            .views
            .push((TypeId::of::<V>(), Arc::new(converted) as Shared));
        self
    }
}

/// Where a bound argument came from.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A route parameter, as text.
    Route(String),
    /// A value from the context pool.
    Context(Shared),
    /// The declared default.
    Default(Shared),
}

/// The arguments bound for one action call, in parameter order.
#[derive(Debug, Clone)]
pub struct Arguments {
    controller: Cow<'static, str>,
    bound: Vec<(Cow<'static, str>, Argument)>,
}

impl Arguments {
    /// The raw argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.bound.get(index).map(|(_, arg)| arg)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    fn slot(&self, index: usize) -> Result<(&str, &Argument), ApplicationError> {
        self.bound
            .get(index)
            .map(|(name, arg)| (name.as_ref(), arg))
            .ok_or_else(|| ApplicationError::MissingArgument {
                parameter: format!("#{index}"),
                controller: self.controller.to_string(),
            })
    }

    fn mismatch<T: ?Sized>(&self, parameter: &str) -> ApplicationError {
        ApplicationError::ArgumentMismatch {
            parameter: parameter.to_string(),
            controller: self.controller.to_string(),
            expected: type_name::<T>(),
        }
    }

    /// The argument at `index` as a value.
    ///
    /// Route parameters are parsed with [`FromStr`]. Context values and
    /// defaults are cloned when they have type `T`, and parsed when they are
    /// text.
    pub fn value<T>(&self, index: usize) -> Result<T, ApplicationError>
    where
        T: FromStr + Clone + Any,
    {
        let (name, arg) = self.slot(index)?;
        let parse = |raw: &str| raw.parse::<T>().map_err(|_| self.mismatch::<T>(name));

        match arg {
            Argument::Route(raw) => parse(raw.as_str()),
            Argument::Context(value) | Argument::Default(value) => {
                if let Some(value) = value.downcast_ref::<T>() {
                    Ok(value.clone())
                } else if let Some(raw) = value.downcast_ref::<String>() {
                    parse(raw.as_str())
                } else if let Some(raw) = value.downcast_ref::<&'static str>() {
                    parse(*raw)
                } else {
                    Err(self.mismatch::<T>(name))
                }
            }
        }
    }

    /// The argument at `index` as a shared context value.
    ///
    /// A route parameter can only be taken as `String`.
    pub fn context<T>(&self, index: usize) -> Result<Arc<T>, ApplicationError>
    where
        T: Any + Send + Sync,
    {
        let (name, arg) = self.slot(index)?;
        let shared = match arg {
            Argument::Route(raw) => Arc::new(raw.clone()) as Shared,
            Argument::Context(value) | Argument::Default(value) => Arc::clone(value),
        };
        shared.downcast::<T>().map_err(|_| self.mismatch::<T>(name))
    }
}

/// Bind the parameters of `descriptor`.
pub fn bind_arguments(
    descriptor: &ActionDescriptor,
    route_params: &RouteParams,
    pool: &ContextPool,
) -> Result<Arguments, ApplicationError> {
    let mut bound = Vec::with_capacity(descriptor.params().len());

    for param in descriptor.params() {
        let argument = if let Some(value) = route_params.get(param.name()) {
            Argument::Route(value.clone())
        } else if let Some(value) = param
            .declared()
            .and_then(|declared| pool.find(declared.id()))
        {
            Argument::Context(Arc::clone(value))
        } else if let Some(value) = param.default_value() {
            Argument::Default(Arc::clone(value))
        } else {
            return Err(ApplicationError::MissingArgument {
                parameter: param.name().to_string(),
                controller: descriptor.name().to_string(),
            });
        };
        bound.push((Cow::Owned(param.name().to_string()), argument));
    }

    Ok(Arguments {
        controller: Cow::Owned(descriptor.name().to_string()),
        bound,
    })
}
