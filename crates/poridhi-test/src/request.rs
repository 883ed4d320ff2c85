//! Test request building.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use poridhi_core::Request;
use serde::Serialize;

use crate::error::TestError;

/// Builder for a request sent through [`TestClient`](crate::TestClient).
///
/// Builder methods never fail. The first invalid header or query is kept and
/// reported by [`TestRequest::build`].
#[must_use]
#[derive(Debug)]
pub struct TestRequest {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequest {
    /// Creates a request for `method` and `target` (`/path` or `/path?query`).
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Creates a GET request.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    /// Creates a POST request.
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Creates a PUT request.
    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::PUT, target)
    }

    /// Creates a DELETE request.
    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match (
            HeaderName::try_from(name),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(format!("{name}: {e}"))),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(format!("{name}: {e}"))),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.headers.remove(header::CONTENT_TYPE);
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Appends `query` to the target's query string.
    ///
    /// ```rust
    /// use poridhi_test::TestRequest;
    ///
    /// let request = TestRequest::get("/books?sort=title")
    ///     .query(&[("page", "2")])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(request.query_string(), Some("sort=title&page=2"));
    /// ```
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        match serde_urlencoded::to_string(query) {
            Ok(encoded) if encoded.is_empty() => {}
            Ok(encoded) => {
                let sep = if self.target.contains('?') { '&' } else { '?' };
                self.target.push(sep);
                self.target.push_str(&encoded);
            }
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.body = body.into();
                self.content_type("application/json")
            }
            Err(e) => {
                self.fail(e.into());
                self
            }
        }
    }

    /// Sets a form body and `Content-Type: application/x-www-form-urlencoded`.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(body) => {
                self.body = body.into();
                self.content_type("application/x-www-form-urlencoded")
            }
            Err(e) => {
                self.fail(e.into());
                self
            }
        }
    }

    /// Builds the framework [`Request`].
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a builder method.
    pub fn build(self) -> Result<Request, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Request::new(self.method, &self.target)
            .with_headers(self.headers)
            .with_body(self.body))
    }

    pub(crate) fn with_defaults(mut self, defaults: &[(String, String)]) -> Self {
        for (name, value) in defaults {
            if !self.headers.contains_key(name.as_str()) {
                self = self.header(name, value);
            }
        }
        self
    }

    fn fail(&mut self, err: TestError) {
        self.error.get_or_insert(err);
    }
}
