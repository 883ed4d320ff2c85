//! Test response wrapper.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use poridhi_core::Response;
use poridhi_server::adapter::HttpResponse;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A finished response with accessors and chainable assertions.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Collects an `http` response produced by the adapter.
    pub async fn from_http(response: HttpResponse) -> Self {
        let (parts, body) = response.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self::new(parts.status, parts.headers, body)
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the status is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Returns true if the status is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the `Allow` header of a 405 response split into method names.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<&str> {
        self.header_str(header::ALLOW.as_str())
            .map(|v| v.split(',').map(str::trim).filter(|m| !m.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text.
    pub fn text(&self) -> Result<&str, TestError> {
        Ok(std::str::from_utf8(&self.body)?)
    }

    /// Deserializes the body as JSON.
    ///
    /// ```ignore
    /// let user: User = client.get("/users/7").send().await.json().unwrap();
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {:?}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that the response is successful (2xx).
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(self.is_success(), "expected success status, got {}", self.status);
        self
    }

    /// Asserts that a header is present with the given value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self.header_str(name);
        assert_eq!(
            actual,
            Some(expected.as_ref()),
            "header '{name}' mismatch"
        );
        self
    }

    /// Asserts that a header is present, whatever its value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing.
    pub fn assert_has_header(&self, name: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert!(self.headers.contains_key(name), "header '{name}' is missing");
        self
    }

    /// Asserts the exact body text.
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    pub fn assert_text(&self, expected: impl AsRef<str>) -> &Self {
        assert_eq!(String::from_utf8_lossy(&self.body), expected.as_ref());
        self
    }

    /// Asserts that the body contains `needle`.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain it.
    pub fn assert_text_contains(&self, needle: impl AsRef<str>) -> &Self {
        let body = String::from_utf8_lossy(&self.body);
        let needle = needle.as_ref();
        assert!(body.contains(needle), "body {body:?} does not contain {needle:?}");
        self
    }

    /// Asserts that a JSON field equals `expected`. Paths use dots and
    /// array indices, e.g. `items.0.name`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or the field is missing or differs.
    pub fn assert_json_field(&self, path: &str, expected: &serde_json::Value) -> &Self {
        let json: serde_json::Value = match self.json() {
            Ok(json) => json,
            Err(e) => panic!("body is not JSON: {e}"),
        };
        let Some(actual) = json_path(&json, path) else {
            panic!("JSON path '{path}' not found in {json}");
        };
        assert_eq!(actual, expected, "JSON field '{path}' mismatch");
        self
    }
}

impl From<Response> for TestResponse {
    fn from(response: Response) -> Self {
        let (status, headers, body) = response.into_parts();
        Self::new(status, headers, body)
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: StatusCode, body: &'static str) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        TestResponse::new(status, headers, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_status_classes() {
        assert!(response(StatusCode::OK, "").is_success());
        assert!(response(StatusCode::NOT_FOUND, "").is_client_error());
        assert!(response(StatusCode::INTERNAL_SERVER_ERROR, "").is_server_error());
        assert_eq!(response(StatusCode::CREATED, "").status_code(), 201);
    }

    #[test]
    fn test_from_framework_response() {
        let mut res = Response::new();
        res.set_text("List all books");
        let res = TestResponse::from(res);

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().unwrap(), "List all books");
        assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_from_http() {
        let http = poridhi_server::adapter::status_response(StatusCode::NOT_FOUND, "Not found.");
        let res = TestResponse::from_http(http).await;
        res.assert_status(StatusCode::NOT_FOUND).assert_text("Not found.");
    }

    #[test]
    fn test_allowed_methods() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ALLOW, HeaderValue::from_static("GET, POST"));
        let res = TestResponse::new(StatusCode::METHOD_NOT_ALLOWED, headers, Bytes::new());
        assert_eq!(res.allowed_methods(), vec!["GET", "POST"]);
        assert!(response(StatusCode::OK, "").allowed_methods().is_empty());
    }

    #[test]
    fn test_json() {
        let res = response(StatusCode::OK, r#"{"items":[{"name":"Dune"}]}"#);
        let value: serde_json::Value = res.json().unwrap();
        assert_eq!(value["items"][0]["name"], "Dune");
        res.assert_json_field("items.0.name", &json!("Dune"));
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let res = TestResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(&[0xff]));
        assert!(matches!(res.text(), Err(TestError::Utf8(_))));
    }

    #[test]
    fn test_chained_assertions() {
        response(StatusCode::OK, r#"{"ok":true}"#)
            .assert_success()
            .assert_status(StatusCode::OK)
            .assert_header("content-type", "application/json")
            .assert_has_header("content-type")
            .assert_text_contains("ok");
    }

    #[test]
    #[should_panic(expected = "expected status 200 OK")]
    fn test_assert_status_panics() {
        response(StatusCode::NOT_FOUND, "Not found.").assert_status(StatusCode::OK);
    }

    #[test]
    #[should_panic(expected = "JSON path 'missing' not found")]
    fn test_assert_json_field_missing() {
        response(StatusCode::OK, "{}").assert_json_field("missing", &json!(1));
    }
}
