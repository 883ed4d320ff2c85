//! Onion-ordered middleware chain.
//!
//! Stages are kept in registration order. Request hooks run first to last
//! before routing; response hooks run last to first after the handler, so the
//! first registered middleware is the outermost wrapper and sees the final
//! response last.
//!
//! ```text
//! request ─▶ A.req ─▶ B.req ─▶ C.req ─▶ handler
//!                                          │
//! response ◀─ A.res ◀─ B.res ◀─ C.res ◀────┘
//! ```
//!
//! Every hook runs inside [`contain_panic`], and its failure is wrapped in
//! [`HandlerError::Middleware`] naming the stage.

use std::sync::Arc;

use poridhi_core::{contain_panic, HandlerError, HandlerResult, Request, Response};

use crate::middleware::Middleware;

/// A type-erased middleware that can be stored in the chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The ordered middleware list of an application.
///
/// Built during startup and read-only afterwards; it is shared by every
/// request without locking.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. It becomes the innermost wrapper.
    pub fn push<M: Middleware>(&mut self, middleware: M) {
        self.push_arc(Arc::new(middleware));
    }

    /// Appends an already shared middleware.
    pub fn push_arc(&mut self, middleware: BoxedMiddleware) {
        tracing::debug!(
            middleware = middleware.name(),
            position = self.stages.len(),
            "middleware registered"
        );
        self.stages.push(middleware);
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if no middleware is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns stage names in registration order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Runs every request hook in registration order.
    ///
    /// A failing hook does not stop the remaining ones. The first failure is
    /// returned; later ones are logged and dropped.
    pub async fn run_request(&self, request: &mut Request) -> HandlerResult {
        let mut first_failure = None;

        for stage in &self.stages {
            let result =
                contain_panic(async { stage.process_request(request).await }).await;
            if let Err(err) = result {
                let err = HandlerError::in_middleware(stage.name(), err);
                if first_failure.is_none() {
                    first_failure = Some(err);
                } else {
                    tracing::error!(error = %err, "additional request hook failure");
                }
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    /// Runs every response hook in reverse registration order.
    ///
    /// A failing hook is handed to `recover`, which may rewrite the response
    /// and return `Ok` to let the remaining hooks run, or return the fault to
    /// abort the chain.
    ///
    /// A `recover` that resets the response also drops headers written by
    /// hooks that already ran, such as an inner `x-request-id`. Only hooks
    /// outside the failing one write to the recovered response.
    pub async fn run_response<F>(
        &self,
        request: &Request,
        response: &mut Response,
        mut recover: F,
    ) -> HandlerResult
    where
        F: FnMut(&Request, &mut Response, HandlerError) -> HandlerResult,
    {
        for stage in self.stages.iter().rev() {
            let result =
                contain_panic(async { stage.process_response(request, response).await }).await;
            if let Err(err) = result {
                recover(request, response, HandlerError::in_middleware(stage.name(), err))?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}
