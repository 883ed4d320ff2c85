//! Error types for Poridhi.
//!
//! Two kinds of failure exist and they never mix:
//!
//! - [`ConfigurationError`] is raised while building the application (bad
//!   templates, duplicate routes, resources missing a verb). It is fatal to
//!   startup.
//! - [`HandlerError`] is a per-request fault raised by a handler or a
//!   middleware hook. It is recoverable through the exception handler.
//!
//! "Not found" and "method not allowed" are neither: they are routing outcomes
//! answered directly with 404 and 405.

use http::Method;
use poridhi_router::RouteError;
use thiserror::Error;

use crate::template::TemplateError;

/// Result type returned by handlers and middleware hooks.
pub type HandlerResult = Result<(), HandlerError>;

/// A fault raised while serving one request.
///
/// Application code usually returns `anyhow` errors, which convert through
/// `?`:
///
/// ```
/// use poridhi_core::{HandlerError, HandlerResult};
///
/// fn check(stock: u32) -> HandlerResult {
///     if stock == 0 {
///         return Err(anyhow::anyhow!("out of stock").into());
///     }
///     Ok(())
/// }
///
/// let err = check(0).unwrap_err();
/// assert_eq!(err.to_string(), "out of stock");
/// assert!(matches!(err, HandlerError::Failed(_)));
/// ```
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler returned an application error.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// The handler panicked.
    #[error("handler panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },

    /// A resource was dispatched a verb it has no method for.
    #[error("{handler} does not implement {method}")]
    MethodNotImplemented {
        /// Handler type name.
        handler: &'static str,
        /// The requested method.
        method: Method,
    },

    /// A middleware hook failed.
    #[error("middleware '{middleware}' failed: {source}")]
    Middleware {
        /// Middleware name.
        middleware: &'static str,
        /// The underlying fault.
        source: Box<HandlerError>,
    },

    /// Rendering a template failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// JSON encoding or decoding failed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A header name or value was not valid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The request body or query string could not be decoded.
    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl HandlerError {
    /// Creates an application error from a message.
    pub fn msg<M>(message: M) -> Self
    where
        M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Self::Failed(anyhow::Error::msg(message))
    }

    /// Wraps a fault raised inside a middleware hook.
    #[must_use]
    pub fn in_middleware(middleware: &'static str, source: Self) -> Self {
        Self::Middleware {
            middleware,
            source: Box::new(source),
        }
    }

    /// Builds a panic fault from a `catch_unwind` payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked { message }
    }

    /// Returns the innermost fault, looking through middleware wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Middleware { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A registration-time failure. Fatal to startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The route could not be registered.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Templates could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A route was started with the builder but never given a handler.
    #[error("route '{0}' has no handler")]
    MissingHandler(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anyhow_converts() {
        let err: HandlerError = anyhow::anyhow!("This handler should not be used.").into();
        assert_eq!(err.to_string(), "This handler should not be used.");
    }

    #[test]
    fn test_msg() {
        let err = HandlerError::msg("boom");
        assert!(matches!(err, HandlerError::Failed(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_method_not_implemented_display() {
        let err = HandlerError::MethodNotImplemented {
            handler: "BooksResource",
            method: Method::DELETE,
        };
        assert_eq!(err.to_string(), "BooksResource does not implement DELETE");
    }

    #[test]
    fn test_middleware_wrapping_and_root() {
        let err = HandlerError::in_middleware("timing", HandlerError::msg("clock skew"));
        assert_eq!(err.to_string(), "middleware 'timing' failed: clock skew");
        assert_eq!(err.root().to_string(), "clock skew");
    }

    #[test]
    fn test_from_panic_payloads() {
        let static_str: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);

        assert_eq!(
            HandlerError::from_panic(static_str.as_ref()).to_string(),
            "handler panicked: static"
        );
        assert_eq!(
            HandlerError::from_panic(owned.as_ref()).to_string(),
            "handler panicked: owned"
        );
        assert!(HandlerError::from_panic(other.as_ref())
            .to_string()
            .contains("non-string"));
    }

    #[test]
    fn test_configuration_error_from_route_error() {
        let err: ConfigurationError = RouteError::DuplicateRoute {
            template: "/home".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "route '/home' is already registered");
    }
}
