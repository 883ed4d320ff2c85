//! # Poridhi Core
//!
//! Core types for the Poridhi web framework.
//!
//! - [`Request`] - parsed, read-only request with a per-request [`Scratch`] map
//! - [`Response`] - mutable status/headers/body accumulator
//! - [`Handler`] - function or resource handler, invoked by HTTP method
//! - [`HandlerError`] / [`ConfigurationError`] - per-request faults vs. startup failures
//! - [`Templates`] - the template rendering collaborator

#![doc(html_root_url = "https://docs.rs/poridhi-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod request;
mod request_id;
mod response;
mod scratch;
pub mod template;

pub use error::{ConfigurationError, HandlerError, HandlerResult};
pub use handler::{
    contain_panic, BoxFuture, Endpoint, FunctionHandler, Handler, Resource, ResourceBuilder,
    ResourceHandler, Verb,
};
pub use request::Request;
pub use request_id::RequestId;
pub use response::Response;
pub use scratch::Scratch;
pub use template::{HandlebarsTemplates, TemplateError, TemplateRenderer, Templates};

pub use poridhi_router::{ParamValue, Params};
