//! Response timing middleware.
//!
//! Records when the request hook ran and reports the elapsed wall time in an
//! `X-Response-Time` header, formatted as seconds with four decimals
//! (`0.0123s`). Register it first to time the whole chain.

use std::time::{Duration, Instant};

use poridhi_core::{BoxFuture, HandlerResult, Request, Response};

use crate::middleware::Middleware;

/// The header carrying the measured duration.
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// The instant a request entered the timing middleware.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

/// Middleware that measures request duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTimingMiddleware;

impl RequestTimingMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Formats a duration the way the `X-Response-Time` header carries it.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    format!("{:.4}s", elapsed.as_secs_f64())
}

impl Middleware for RequestTimingMiddleware {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            request.scratch_mut().insert(RequestStart(Instant::now()));
            Ok(())
        })
    }

    fn process_response<'a>(
        &'a self,
        request: &'a Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let Some(RequestStart(start)) = request.scratch().get::<RequestStart>().copied() else {
                tracing::warn!(path = %request.path(), "no start time recorded");
                return Ok(());
            };
            response.set_header(RESPONSE_TIME_HEADER, &format_duration(start.elapsed()))
        })
    }
}
