//! # Poridhi
//!
//! A small async web framework. An [`App`](server::App) owns a route table,
//! a middleware chain and at most one exception handler, and turns each
//! request into a response:
//!
//! ```text
//! request → middleware (in) → route → handler ─┐
//!                                              ↓ fault?
//!                                   exception handler
//!                                              ↓
//! response ← middleware (out, reversed) ←──────┘
//! ```
//!
//! Routes use `{name}` for any segment and `{name:d}` for an integer:
//!
//! ```rust
//! use poridhi::prelude::*;
//!
//! let mut app = App::new();
//! app.route("/users/{id:d}")
//!     .methods(["GET"])
//!     .to_sync(|_req, res, params| {
//!         let id = params.int("id").unwrap_or_default();
//!         res.set_text(format!("Get user {id}"));
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let res = tokio_test::block_on(app.dispatch(Request::new(Method::GET, "/users/42"))).unwrap();
//! assert_eq!(res.text(), "Get user 42");
//! ```
//!
//! See `examples/demo_app.rs` for a complete server with resources,
//! templates, middleware and configuration.

#![doc(html_root_url = "https://docs.rs/poridhi/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use poridhi_core as core;

// Re-export router types
pub use poridhi_router as router;

// Re-export middleware types
pub use poridhi_middleware as middleware;

// Re-export server types
pub use poridhi_server as server;

// Re-export telemetry setup
pub use poridhi_telemetry as telemetry;

// Re-export configuration types
pub use poridhi_config as config;

/// Prelude module for convenient imports.
///
/// ```rust
/// use poridhi::prelude::*;
/// ```
pub mod prelude {
    pub use poridhi_core::{
        BoxFuture, ConfigurationError, Handler, HandlerError, HandlerResult, ParamValue, Params,
        Request, Resource, ResourceBuilder, Response, Templates,
    };

    pub use poridhi_router::AllowedMethods;

    pub use poridhi_middleware::stages::{
        RequestIdMiddleware, RequestLoggingMiddleware, RequestTimingMiddleware,
    };
    pub use poridhi_middleware::{FnMiddleware, Middleware};

    pub use poridhi_server::{App, DispatchError, Server, ServerConfig, ShutdownSignal, Stage};

    pub use poridhi_config::{ConfigLoader, PoridhiConfig};

    pub use http::{Method, StatusCode};
}
