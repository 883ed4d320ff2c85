//! The middleware trait.
//!
//! A middleware is a pair of hooks wrapped around every dispatch. The
//! request hook runs before routing and may stash values in the request's
//! scratch map; the response hook runs after the handler (or the exception
//! handler) and sees the final response.
//!
//! # Example
//!
//! ```
//! use poridhi_core::{BoxFuture, HandlerResult, Request, Response};
//! use poridhi_middleware::Middleware;
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn name(&self) -> &'static str {
//!         "powered_by"
//!     }
//!
//!     fn process_response<'a>(
//!         &'a self,
//!         _request: &'a Request,
//!         response: &'a mut Response,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move { response.set_header("x-powered-by", "poridhi") })
//!     }
//! }
//! ```

use poridhi_core::{BoxFuture, HandlerResult, Request, Response};

/// A pre/post hook pair wrapping every request.
///
/// Both hooks default to no-ops, so a middleware only overrides the phase it
/// cares about. Neither hook can short-circuit the chain: every registered
/// middleware sees every request, including requests whose handler failed.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name used in logs and in wrapped errors.
    fn name(&self) -> &'static str;

    /// Runs before routing, in registration order.
    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, HandlerResult> {
        let _ = request;
        Box::pin(async { Ok(()) })
    }

    /// Runs after the handler, in reverse registration order.
    fn process_response<'a>(
        &'a self,
        request: &'a Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        let _ = (request, response);
        Box::pin(async { Ok(()) })
    }
}

type RequestHook = Box<dyn Fn(&mut Request) -> HandlerResult + Send + Sync>;
type ResponseHook = Box<dyn Fn(&Request, &mut Response) -> HandlerResult + Send + Sync>;

/// A middleware built from plain synchronous closures.
///
/// ```
/// use poridhi_middleware::FnMiddleware;
///
/// let tag = FnMiddleware::new("tag")
///     .on_response(|_req, res| res.set_header("x-tag", "1"));
/// # let _ = tag;
/// ```
pub struct FnMiddleware {
    name: &'static str,
    on_request: Option<RequestHook>,
    on_response: Option<ResponseHook>,
}

impl FnMiddleware {
    /// Creates a middleware with no hooks.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            on_request: None,
            on_response: None,
        }
    }

    /// Sets the request hook.
    #[must_use]
    pub fn on_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_request = Some(Box::new(f));
        self
    }

    /// Sets the response hook.
    #[must_use]
    pub fn on_response<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_response = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for FnMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .field("on_request", &self.on_request.is_some())
            .field("on_response", &self.on_response.is_some())
            .finish()
    }
}

impl Middleware for FnMiddleware {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            match &self.on_request {
                Some(hook) => hook(request),
                None => Ok(()),
            }
        })
    }

    fn process_response<'a>(
        &'a self,
        request: &'a Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            match &self.on_response {
                Some(hook) => hook(request, response),
                None => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    struct Noop;

    impl Middleware for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }
    }

    #[tokio::test]
    async fn test_default_hooks_do_nothing() {
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();

        Noop.process_request(&mut req).await.unwrap();
        Noop.process_response(&req, &mut res).await.unwrap();

        assert!(req.scratch().is_empty());
        assert!(res.headers().is_empty());
    }

    #[tokio::test]
    async fn test_fn_middleware_hooks() {
        let mw = FnMiddleware::new("tagger")
            .on_request(|req| {
                req.scratch_mut().insert(7_u32);
                Ok(())
            })
            .on_response(|req, res| {
                let n = req.scratch().get::<u32>().copied().unwrap_or_default();
                res.set_header("x-seen", &n.to_string())
            });

        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();
        mw.process_request(&mut req).await.unwrap();
        mw.process_response(&req, &mut res).await.unwrap();

        assert_eq!(mw.name(), "tagger");
        assert_eq!(res.header("x-seen"), Some("7"));
    }

    #[tokio::test]
    async fn test_fn_middleware_propagates_failure() {
        let mw = FnMiddleware::new("broken").on_request(|_| Err(anyhow::anyhow!("nope").into()));
        let mut req = Request::new(Method::GET, "/");

        let err = mw.process_request(&mut req).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
