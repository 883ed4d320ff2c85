//! # Poridhi Middleware
//!
//! Onion-ordered middleware for the Poridhi web framework.
//!
//! A [`Middleware`] is a pair of hooks. Every request hook runs in
//! registration order before routing, and every response hook runs in reverse
//! order after the handler, so the first registered middleware is the
//! outermost wrapper:
//!
//! ```text
//! Request  → A.process_request → B.process_request → route + handler
//!                                                          ↓
//! Response ← A.process_response ← B.process_response ←─────┘
//! ```
//!
//! Hooks cannot short-circuit. Both phases of every middleware run on every
//! request, including requests whose handler failed and was recovered by the
//! exception handler.
//!
//! ## Example
//!
//! ```
//! use poridhi_middleware::stages::{RequestIdMiddleware, RequestTimingMiddleware};
//! use poridhi_middleware::MiddlewareChain;
//!
//! let mut chain = MiddlewareChain::new();
//! chain.push(RequestTimingMiddleware::new());
//! chain.push(RequestIdMiddleware::new());
//!
//! assert_eq!(chain.stage_names(), vec!["timing", "request_id"]);
//! ```

#![doc(html_root_url = "https://docs.rs/poridhi-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod stages;

pub use chain::{BoxedMiddleware, MiddlewareChain};
pub use middleware::{FnMiddleware, Middleware};
