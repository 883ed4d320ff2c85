//! The exception registry.
//!
//! An application has at most one exception handler. When a request faults
//! (a handler error or panic, or a failing middleware hook), the response is
//! reset and the handler writes a replacement. Without a handler the fault
//! escapes the dispatcher.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use poridhi_core::{HandlerError, HandlerResult, Request, Response};

/// Callback that turns a request fault into a response.
pub type ExceptionHandler = dyn Fn(&Request, &mut Response, &HandlerError) + Send + Sync;

/// Holds the application's exception handler, if any.
///
/// # Example
///
/// ```
/// use http::Method;
/// use poridhi_core::{HandlerError, Request, Response};
/// use poridhi_server::ExceptionRegistry;
///
/// let mut registry = ExceptionRegistry::new();
/// registry.set(|_req, res, err| res.set_text(format!("Error occurred: {err}")));
///
/// let req = Request::new(Method::GET, "/exception");
/// let mut res = Response::new();
/// res.set_text("partial output");
///
/// registry.recover(&req, &mut res, HandlerError::msg("boom")).unwrap();
/// assert_eq!(res.text(), "Error occurred: boom");
/// ```
#[derive(Clone, Default)]
pub struct ExceptionRegistry {
    handler: Option<Arc<ExceptionHandler>>,
}

impl ExceptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the exception handler, replacing any earlier one.
    pub fn set<F>(&mut self, handler: F)
    where
        F: Fn(&Request, &mut Response, &HandlerError) + Send + Sync + 'static,
    {
        if self.handler.is_some() {
            tracing::debug!("exception handler replaced");
        }
        self.handler = Some(Arc::new(handler));
    }

    /// Returns true if a handler is installed.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.handler.is_some()
    }

    /// Converts a fault into a response.
    ///
    /// The response is reset before the handler runs, so its writes alone
    /// decide the result. Returns the fault unchanged when no handler is
    /// installed, and a [`HandlerError::Panicked`] if the handler panics.
    pub fn recover(
        &self,
        request: &Request,
        response: &mut Response,
        fault: HandlerError,
    ) -> HandlerResult {
        let Some(handler) = &self.handler else {
            return Err(fault);
        };

        tracing::warn!(
            method = %request.method(),
            path = request.path(),
            error = %fault,
            "request fault passed to exception handler"
        );

        response.reset();
        catch_unwind(AssertUnwindSafe(|| handler(request, response, &fault)))
            .map_err(|payload| HandlerError::from_panic(payload.as_ref()))
    }
}

impl fmt::Debug for ExceptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionRegistry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    fn request() -> Request {
        Request::new(Method::GET, "/exception")
    }

    #[test]
    fn test_empty_registry_returns_fault() {
        let registry = ExceptionRegistry::new();
        let mut res = Response::new();
        res.set_text("untouched");

        let err = registry
            .recover(&request(), &mut res, HandlerError::msg("boom"))
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(res.text(), "untouched");
    }

    #[test]
    fn test_response_reset_before_handler() {
        let mut registry = ExceptionRegistry::new();
        registry.set(|_req, _res, _err| {});

        let mut res = Response::with_status(StatusCode::CREATED);
        res.set_header("x-partial", "1").unwrap();
        res.set_text("half written");

        registry
            .recover(&request(), &mut res, HandlerError::msg("boom"))
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.header("x-partial").is_none());
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_handler_sets_status() {
        let mut registry = ExceptionRegistry::new();
        registry.set(|_req, res, err| {
            res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            res.set_text(format!("Error occurred: {err}"));
        });

        let mut res = Response::new();
        registry
            .recover(&request(), &mut res, HandlerError::msg("disk full"))
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.text(), "Error occurred: disk full");
    }

    #[test]
    fn test_later_handler_replaces_earlier() {
        let mut registry = ExceptionRegistry::new();
        registry.set(|_req, res, _err| res.set_text("first"));
        registry.set(|_req, res, _err| res.set_text("second"));

        let mut res = Response::new();
        registry
            .recover(&request(), &mut res, HandlerError::msg("x"))
            .unwrap();
        assert_eq!(res.text(), "second");
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let mut registry = ExceptionRegistry::new();
        registry.set(|_req, _res, _err| panic!("handler broke"));

        let mut res = Response::new();
        let err = registry
            .recover(&request(), &mut res, HandlerError::msg("x"))
            .unwrap_err();

        assert!(matches!(err, HandlerError::Panicked { ref message } if message == "handler broke"));
    }

    #[test]
    fn test_debug() {
        let mut registry = ExceptionRegistry::new();
        assert_eq!(
            format!("{registry:?}"),
            "ExceptionRegistry { registered: false }"
        );
        registry.set(|_req, _res, _err| {});
        assert!(format!("{registry:?}").contains("true"));
    }
}
