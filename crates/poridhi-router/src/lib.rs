//! Ordered route table with typed path parameters for Poridhi.
//!
//! Templates are compiled once at registration time and matched segment by
//! segment in registration order. The first route whose pattern matches the
//! path decides the outcome: either it accepts the method, or the request is
//! answered with "method not allowed". Later routes are never consulted.
//!
//! # Example
//!
//! ```rust
//! use poridhi_router::{AllowedMethods, Resolution, RouteTable, RouteTarget};
//! use http::Method;
//!
//! #[derive(Debug, PartialEq)]
//! struct Op(&'static str);
//!
//! impl RouteTarget for Op {
//!     fn supported_methods(&self) -> Option<Vec<Method>> {
//!         None
//!     }
//! }
//!
//! let mut table = RouteTable::new();
//! table.add("/", Op("home"), AllowedMethods::Any).unwrap();
//! table
//!     .add("/api/products", Op("products"), AllowedMethods::only([Method::GET, Method::POST]))
//!     .unwrap();
//!
//! assert!(table.resolve(&Method::GET, "/").is_matched());
//! assert!(matches!(
//!     table.resolve(&Method::PUT, "/api/products"),
//!     Resolution::MethodNotAllowed { .. }
//! ));
//! assert_eq!(table.resolve(&Method::GET, "/missing"), Resolution::NotFound);
//! ```
//!
//! # Template grammar
//!
//! ```text
//! /literal/{name}/{id:d}/{token:uuid}/{rest:path}
//! ```
//!
//! See [`PathPattern`] for the full list of type tags.

#![doc(html_root_url = "https://docs.rs/poridhi-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod methods;
mod params;
mod pattern;
mod table;

pub use error::RouteError;
pub use methods::AllowedMethods;
pub use params::{ParamValue, Params};
pub use pattern::{ParamKind, PathPattern, Segment};
pub use table::{Resolution, Route, RouteTable, RouteTarget};
