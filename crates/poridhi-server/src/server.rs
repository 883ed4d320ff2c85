//! HTTP/1.1 transport.
//!
//! The server accepts connections with tokio, serves them with hyper,
//! collects each request body under a size limit and a timeout, and hands
//! the request to [`App::dispatch`] through the adapter.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::adapter::{self, HttpResponse};
use crate::app::App;
use crate::config::ServerConfig;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The bind address could not be parsed.
    #[error("invalid address '{addr}': {message}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parser message.
        message: String,
    },

    /// Failed to bind to the configured address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves an [`App`] over HTTP/1.1.
///
/// # Example
///
/// ```rust,no_run
/// use poridhi_server::{App, Server, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut app = App::new();
///     app.route("/home").to_sync(|_req, res, _p| {
///         res.set_text("Hello from the HOME page");
///         Ok(())
///     })?;
///
///     let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
///     Server::new(config, app).run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    app: Arc<App>,
}

impl Server {
    /// Creates a server for `app`.
    #[must_use]
    pub fn new(config: ServerConfig, app: App) -> Self {
        Self {
            config,
            app: Arc::new(app),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the served application.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address cannot be parsed or bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address cannot be parsed or bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                message: e.to_string(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires, then drains open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, routes = self.app.routes().len(), "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let Some(token) = tracker.try_acquire(server.config.max_connections()) else {
                                tracing::warn!(%remote_addr, "connection limit reached, dropping connection");
                                continue;
                            };

                            let server = Arc::clone(&server);
                            let shutdown = shutdown.clone();
                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, shutdown).await {
                                    tracing::debug!(%remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout_secs = timeout.as_secs(),
            "waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_idle() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);

        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new()
            .keep_alive(self.config.keep_alive())
            .serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: http::Request<Incoming>) -> HttpResponse {
        let (parts, body) = req.into_parts();
        let limit = self.config.max_body_bytes();
        let timeout = self.config.request_timeout();

        let body = match tokio::time::timeout(timeout, Limited::new(body, limit).collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::warn!(path = parts.uri.path(), limit, "request body too large");
                return adapter::status_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large.");
            }
            Ok(Err(e)) => {
                tracing::warn!(path = parts.uri.path(), error = %e, "failed to read request body");
                return adapter::status_response(StatusCode::BAD_REQUEST, "Bad request.");
            }
            Err(_) => {
                tracing::warn!(path = parts.uri.path(), "request body timed out");
                return adapter::status_response(StatusCode::REQUEST_TIMEOUT, "Request timeout.");
            }
        };

        let method = parts.method.clone();
        let path = parts.uri.path().to_string();
        let request = http::Request::from_parts(parts, body);

        match tokio::time::timeout(timeout, adapter::serve(&self.app, request)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(%method, %path, "request dispatch timed out");
                adapter::status_response(StatusCode::GATEWAY_TIMEOUT, "Gateway timeout.")
            }
        }
    }
}
