//! In-memory test client.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use poridhi_server::{adapter, App};
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;

/// Sends requests straight to [`App::dispatch`], without a socket.
///
/// Requests pass through the full middleware chain, the route table and the
/// exception handler, exactly as they would behind the server.
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Arc<App>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `app`.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self::from_arc(Arc::new(app))
    }

    /// Creates a client for an application that is already shared.
    #[must_use]
    pub fn from_arc(app: Arc<App>) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request unless the request sets it.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the application under test.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Starts a GET request.
    pub fn get(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, target)
    }

    /// Starts a POST request.
    pub fn post(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, target)
    }

    /// Starts a PUT request.
    pub fn put(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, target)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, target)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, target)
    }

    /// Starts a HEAD request.
    pub fn head(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::HEAD, target)
    }

    /// Starts an OPTIONS request.
    pub fn options(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, target)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, target: impl Into<String>) -> TestClientRequest<'_> {
        TestClientRequest {
            client: self,
            request: TestRequest::new(method, target),
        }
    }

    /// Dispatches a prepared request.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be built or a fault escapes the dispatcher.
    pub async fn dispatch(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let request = request.with_defaults(&self.default_headers).build()?;
        let response = self.app.dispatch(request).await?;
        Ok(TestResponse::from(response))
    }
}

/// A request being built on a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    request: TestRequest,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.request = self.request.content_type(content_type);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.request = self.request.bearer_token(token);
        self
    }

    /// Appends query parameters.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.request = self.request.query(query);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.json(value);
        self
    }

    /// Sets a form body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.form(value);
        self
    }

    /// Sends the request and returns what a client on the wire would see.
    ///
    /// A fault that escapes the dispatcher becomes `500 Internal Server
    /// Error`, as it does behind the server.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built, e.g. an invalid header.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(TestError::Unhandled(_)) => {
                TestResponse::from_http(adapter::status_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    adapter::INTERNAL_ERROR_BODY,
                ))
                .await
            }
            Err(e) => panic!("failed to send test request: {e}"),
        }
    }

    /// Sends the request, surfacing build errors and unhandled faults.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Unhandled`] when no exception handler recovered
    /// a fault.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        self.client.dispatch(self.request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poridhi_core::{HandlerError, Params, Request, Response};
    use poridhi_server::Stage;
    use serde_json::json;

    fn echo(req: &Request, res: &mut Response, _p: &Params) -> poridhi_core::HandlerResult {
        res.set_json(&json!({
            "method": req.method().as_str(),
            "path": req.path(),
            "query": req.query_string(),
            "auth": req.header("authorization"),
            "custom": req.header("x-custom"),
            "type": req.header("content-type"),
            "body": req.text()?,
        }))
    }

    fn app() -> App {
        let mut app = App::new();
        app.route("/echo").to_sync(echo).unwrap();
        app.route("/echo/{rest}").to_sync(echo).unwrap();
        app.route("/books")
            .methods(["GET", "POST"])
            .to_sync(|_req, res, _p| {
                res.set_text("books");
                Ok(())
            })
            .unwrap();
        app.route("/exception")
            .to_sync(|_req, _res, _p| Err(HandlerError::msg("boom")))
            .unwrap();
        app
    }

    #[tokio::test]
    async fn test_all_methods() {
        let client = TestClient::new(app());

        for (method, res) in [
            ("GET", client.get("/echo").send().await),
            ("POST", client.post("/echo").send().await),
            ("PUT", client.put("/echo").send().await),
            ("PATCH", client.patch("/echo").send().await),
            ("DELETE", client.delete("/echo").send().await),
            ("HEAD", client.head("/echo").send().await),
            ("OPTIONS", client.options("/echo").send().await),
        ] {
            res.assert_success().assert_json_field("method", &json!(method));
        }
    }

    #[tokio::test]
    async fn test_headers_query_and_body() {
        let client = TestClient::new(app());
        let res = client
            .post("/echo/x")
            .bearer_token("my_token")
            .query(&[("page", "2")])
            .json(&json!({"name": "Alice"}))
            .send()
            .await;

        res.assert_json_field("path", &json!("/echo/x"))
            .assert_json_field("query", &json!("page=2"))
            .assert_json_field("auth", &json!("Bearer my_token"))
            .assert_json_field("type", &json!("application/json"))
            .assert_json_field("body", &json!(r#"{"name":"Alice"}"#));
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = TestClient::new(app()).with_default_header("x-custom", "default-value");

        let res = client.get("/echo").send().await;
        res.assert_json_field("custom", &json!("default-value"));

        let res = client.get("/echo").header("x-custom", "mine").send().await;
        res.assert_json_field("custom", &json!("mine"));
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let client = TestClient::new(app());

        client
            .get("/missing")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .assert_text("Not found.");

        let res = client.delete("/books").send().await;
        res.assert_status(StatusCode::METHOD_NOT_ALLOWED)
            .assert_text("Method not allowed.");
        assert_eq!(res.allowed_methods(), vec!["GET", "POST"]);
    }

    #[tokio::test]
    async fn test_unhandled_fault() {
        let client = TestClient::new(app());

        client
            .get("/exception")
            .send()
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
            .assert_text("Internal Server Error");

        match client.get("/exception").try_send().await {
            Err(TestError::Unhandled(err)) => {
                assert_eq!(err.stage(), Stage::Handling);
                assert_eq!(err.fault().to_string(), "boom");
            }
            other => panic!("expected an unhandled fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_header_is_an_error() {
        let client = TestClient::new(app());
        let err = client
            .get("/echo")
            .header("bad header", "x")
            .try_send()
            .await
            .unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_shared_app() {
        let app = Arc::new(app());
        let client = TestClient::from_arc(Arc::clone(&app));
        assert_eq!(client.app().routes().len(), 4);
        assert_eq!(Arc::strong_count(&app), 2);
    }
}
