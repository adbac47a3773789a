//! Error types shared by every Aero crate.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
///
/// Listeners and actions return this so that application code can raise any
/// error type without the bus knowing about it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from typed access to a [`Params`](crate::Params) bag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// No value is stored under the key.
    #[error("parameter \"{0}\" is not set")]
    Missing(String),

    /// A value is stored under the key, but with another type.
    #[error("parameter \"{name}\" is not a `{expected}`")]
    TypeMismatch {
        /// The parameter key.
        name: String,
        /// The type the caller asked for.
        expected: &'static str,
    },
}
