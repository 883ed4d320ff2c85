//! # Poridhi Server
//!
//! The application object, the per-request dispatcher and the HTTP
//! transport for the Poridhi framework.
//!
//! - [`App`] - route, middleware and exception handler registration
//! - [`App::dispatch`] - runs one request through middleware, routing and
//!   the handler, recovering faults through the [`ExceptionRegistry`]
//! - [`adapter`] - conversion to and from `http` types
//! - [`Server`] - hyper HTTP/1.1 server with graceful shutdown
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use poridhi_core::Request;
//! use poridhi_server::App;
//!
//! let mut app = App::new();
//! app.route("/hello/{name}").to_sync(|_req, res, params| {
//!     res.set_text(format!("Hello, {}!", params.str("name").unwrap_or("")));
//!     Ok(())
//! })?;
//!
//! let res = tokio_test::block_on(app.dispatch(Request::new(Method::GET, "/hello/ada")))?;
//! assert_eq!(res.status(), StatusCode::OK);
//! assert_eq!(res.text(), "Hello, ada!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![doc(html_root_url = "https://docs.rs/poridhi-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod adapter;
mod app;
pub mod config;
mod dispatch;
mod exception;
mod server;
pub mod shutdown;

pub use app::{App, AppRoute, RouteBuilder};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use dispatch::{DispatchError, Stage, METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY};
pub use exception::{ExceptionHandler, ExceptionRegistry};
pub use server::{Server, ServerError};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
