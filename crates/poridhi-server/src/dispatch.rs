//! Per-request dispatch.
//!
//! ```text
//! RECEIVED -> MIDDLEWARE_IN -> ROUTING -> HANDLING -> MIDDLEWARE_OUT -> FINALIZED
//!                   |                         |
//!                   +-------> FAULTED <-------+
//! ```
//!
//! A fault is passed to the exception handler, whose response then flows
//! through the response hooks like any other. With no exception handler the
//! fault escapes as a [`DispatchError`] and the response hooks are skipped.
//! Unmatched paths and disallowed methods are ordinary 404/405 responses and
//! never reach the exception handler.

use std::fmt;
use std::time::Instant;

use http::header::{HeaderValue, ALLOW};
use http::StatusCode;
use poridhi_core::{contain_panic, HandlerError, HandlerResult, Request, Response};
use poridhi_router::Resolution;
use poridhi_telemetry::{record_request, record_unhandled_fault};
use thiserror::Error;

use crate::app::App;

/// Body of the response to a path no route matches.
pub const NOT_FOUND_BODY: &str = "Not found.";

/// Body of the response to a method the matched route does not accept.
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method not allowed.";

/// Where in the dispatch a fault was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A middleware request hook.
    MiddlewareIn,
    /// The route handler.
    Handling,
    /// A middleware response hook.
    MiddlewareOut,
}

impl Stage {
    /// Returns the stage name used in logs and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MiddlewareIn => "middleware_in",
            Self::Handling => "handling",
            Self::MiddlewareOut => "middleware_out",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request fault that no exception handler recovered.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The fault escaped the dispatcher.
    #[error("unhandled fault during {stage}: {source}")]
    Unhandled {
        /// Where the fault was raised.
        stage: Stage,
        /// The fault.
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns the stage that raised the fault.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Unhandled { stage, .. } => *stage,
        }
    }

    /// Returns the fault.
    #[must_use]
    pub fn fault(&self) -> &HandlerError {
        match self {
            Self::Unhandled { source, .. } => source,
        }
    }
}

impl App {
    /// Dispatches one request to a finalized response.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unhandled`] when a handler or middleware hook
    /// faults and no exception handler is installed, or when the exception
    /// handler itself panics. The transport decides how to report it.
    pub async fn dispatch(&self, mut request: Request) -> Result<Response, DispatchError> {
        let started = Instant::now();
        let mut response = Response::new();

        let (route, outcome) = match self.middleware.run_request(&mut request).await {
            Ok(()) => {
                let (route, result) = self.handle(&request, &mut response).await;
                (route, result.map_err(|err| (Stage::Handling, err)))
            }
            Err(err) => (None, Err((Stage::MiddlewareIn, err))),
        };

        if let Err((stage, fault)) = outcome {
            self.exceptions
                .recover(&request, &mut response, fault)
                .map_err(|source| unhandled(&request, stage, source))?;
        }

        self.middleware
            .run_response(&request, &mut response, |req, res, fault| {
                self.exceptions.recover(req, res, fault)
            })
            .await
            .map_err(|source| unhandled(&request, Stage::MiddlewareOut, source))?;

        let elapsed = started.elapsed();
        record_request(
            route,
            request.method().as_str(),
            response.status().as_u16(),
            elapsed,
        );
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            route = route.unwrap_or("-"),
            status = response.status().as_u16(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "request dispatched"
        );

        Ok(response)
    }

    /// Resolves the request and runs the matched handler.
    ///
    /// Returns the matched template, if any, for metric labels.
    async fn handle(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> (Option<&str>, HandlerResult) {
        match self.routes.resolve(request.method(), request.path()) {
            Resolution::Matched { route, params } => {
                let handler = route.handler();
                tracing::trace!(route = route.template(), handler = handler.name(), "route matched");
                let result =
                    contain_panic(async { handler.invoke(request, response, &params).await }).await;
                (Some(route.template()), result)
            }
            Resolution::MethodNotAllowed { route } => {
                response.set_status(StatusCode::METHOD_NOT_ALLOWED);
                response.set_text(METHOD_NOT_ALLOWED_BODY);
                if let Ok(allow) = HeaderValue::from_str(&route.allowed_methods().allow_header()) {
                    response.insert_header(ALLOW, allow);
                }
                (Some(route.template()), Ok(()))
            }
            Resolution::NotFound => {
                response.set_status(StatusCode::NOT_FOUND);
                response.set_text(NOT_FOUND_BODY);
                (None, Ok(()))
            }
        }
    }
}

fn unhandled(request: &Request, stage: Stage, source: HandlerError) -> DispatchError {
    tracing::error!(
        method = %request.method(),
        path = request.path(),
        stage = stage.name(),
        error = %source,
        "unhandled request fault"
    );
    record_unhandled_fault(stage.name());
    DispatchError::Unhandled { stage, source }
}
