//! Built-in middleware stages.
//!
//! None of these are installed by default. A typical order is:
//!
//! 1. [`RequestTimingMiddleware`] - outermost, so it times everything
//! 2. [`RequestIdMiddleware`] - tags the request before anything logs it
//! 3. [`RequestLoggingMiddleware`] - logs entry and exit with the request ID

pub mod logging;
pub mod request_id;
pub mod timing;

pub use logging::RequestLoggingMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use timing::{RequestStart, RequestTimingMiddleware, RESPONSE_TIME_HEADER};
