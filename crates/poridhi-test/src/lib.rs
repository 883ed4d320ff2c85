//! # Poridhi Test
//!
//! In-memory testing for Poridhi applications. Requests go straight to
//! [`App::dispatch`](poridhi_server::App::dispatch) with no socket, through
//! the same middleware chain, route table and exception handler the server
//! uses.
//!
//! ## Example
//!
//! ```rust
//! use http::StatusCode;
//! use poridhi_server::App;
//! use poridhi_test::TestClient;
//!
//! let mut app = App::new();
//! app.route("/hello/{name}")
//!     .to_sync(|_req, res, params| {
//!         res.set_text(format!("Hello, {}!", params.str("name").unwrap_or_default()));
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let client = TestClient::new(app);
//! tokio_test::block_on(async {
//!     client
//!         .get("/hello/Matthew")
//!         .send()
//!         .await
//!         .assert_status(StatusCode::OK)
//!         .assert_text("Hello, Matthew!");
//!
//!     client
//!         .get("/nowhere")
//!         .send()
//!         .await
//!         .assert_status(StatusCode::NOT_FOUND);
//! });
//! ```

#![doc(html_root_url = "https://docs.rs/poridhi-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
