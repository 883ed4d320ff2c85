//! Request logging middleware.
//!
//! Emits one `tracing` event when a request enters the chain and one when
//! its response leaves it. Events carry the method, URL, status and the
//! request ID when [`RequestIdMiddleware`](super::RequestIdMiddleware) runs
//! before this stage.

use std::time::Instant;

use poridhi_core::{BoxFuture, HandlerResult, Request, RequestId, Response};

use crate::middleware::Middleware;

/// Middleware that logs every request and response.
#[derive(Debug, Clone)]
pub struct RequestLoggingMiddleware {
    service_name: String,
}

/// Private start marker, separate from the timing stage's.
#[derive(Clone, Copy)]
struct LoggedAt(Instant);

impl RequestLoggingMiddleware {
    /// Creates a logging middleware labelling events with `service_name`.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Returns the service label.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Default for RequestLoggingMiddleware {
    fn default() -> Self {
        Self::new("poridhi")
    }
}

fn request_id(request: &Request) -> String {
    request
        .scratch()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl Middleware for RequestLoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            request.scratch_mut().insert(LoggedAt(Instant::now()));
            tracing::info!(
                service = %self.service_name,
                request_id = %request_id(request),
                method = %request.method(),
                url = %request.url(),
                "processing request"
            );
            Ok(())
        })
    }

    fn process_response<'a>(
        &'a self,
        request: &'a Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let duration_ms = request
                .scratch()
                .get::<LoggedAt>()
                .map(|LoggedAt(start)| start.elapsed().as_secs_f64() * 1000.0);
            tracing::info!(
                service = %self.service_name,
                request_id = %request_id(request),
                method = %request.method(),
                url = %request.url(),
                status = response.status().as_u16(),
                duration_ms,
                "processing response"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn test_logging_leaves_response_untouched() {
        let mw = RequestLoggingMiddleware::new("bookstore");
        let mut req = Request::new(Method::GET, "/books?page=1");
        let mut res = Response::with_status(StatusCode::CREATED);
        res.set_text("created");

        mw.process_request(&mut req).await.unwrap();
        mw.process_response(&req, &mut res).await.unwrap();

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.text(), "created");
        assert_eq!(res.headers().len(), 1);
        assert!(req.scratch().contains::<LoggedAt>());
    }

    #[test]
    fn test_default_service_name() {
        assert_eq!(RequestLoggingMiddleware::default().service_name(), "poridhi");
    }
}
