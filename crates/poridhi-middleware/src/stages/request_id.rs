//! Request ID middleware.
//!
//! Gives every request a UUID v7 identifier. The ID is stored in the
//! request's scratch map, so handlers and later middleware can log it, and is
//! echoed back in the `x-request-id` response header.

use poridhi_core::{BoxFuture, HandlerResult, Request, RequestId, Response};

use crate::middleware::Middleware;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or propagates request IDs.
///
/// # Example
///
/// ```
/// use poridhi_middleware::stages::RequestIdMiddleware;
///
/// let edge = RequestIdMiddleware::new();
/// let internal = RequestIdMiddleware::trust_incoming();
/// # let _ = (edge, internal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to reuse a valid incoming `x-request-id`.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses a valid incoming `x-request-id`.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        request.header(REQUEST_ID_HEADER).and_then(RequestId::parse)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let id = self.incoming(request).unwrap_or_default();
            request.scratch_mut().insert(id);
            Ok(())
        })
    }

    fn process_response<'a>(
        &'a self,
        request: &'a Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            // A request hook failure upstream can leave no ID behind.
            let id = request.scratch().get::<RequestId>().copied().unwrap_or_default();
            response.set_header(REQUEST_ID_HEADER, &id.to_string())
        })
    }
}
