//! The incoming request.
//!
//! A [`Request`] is built once by the transport adapter (or a test client)
//! and is read-only afterwards. The only mutable part is its [`Scratch`]
//! map, which middleware uses to pass values between its two phases.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use http::Method;
use serde::de::DeserializeOwned;

use crate::error::HandlerError;
use crate::scratch::Scratch;

/// A parsed HTTP request.
///
/// # Example
///
/// ```
/// use poridhi_core::Request;
/// use http::Method;
///
/// let req = Request::new(Method::GET, "/search?q=rust&page=2")
///     .with_header("host", "example.com")
///     .unwrap();
///
/// assert_eq!(req.path(), "/search");
/// assert_eq!(req.query_string(), Some("q=rust&page=2"));
/// assert_eq!(req.url(), "http://example.com/search?q=rust&page=2");
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    scratch: Scratch,
}

impl Request {
    /// Creates a request from a method and a request target
    /// (`/path` or `/path?query`).
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            scratch: Scratch::new(),
        }
    }

    /// Creates a request from already separated parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        path: impl Into<String>,
        query: Option<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            headers,
            body,
            scratch: Scratch::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, HandlerError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HandlerError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HandlerError::InvalidHeader(format!("{name}: {e}")))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Replaces the header map.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Decodes the query string into `(key, value)` pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default()
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Deserializes the query string into `T`.
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_urlencoded::from_str(self.query.as_deref().unwrap_or_default())
            .map_err(|e| HandlerError::BadRequest(format!("query string: {e}")))
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as text, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> Result<&str, HandlerError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| HandlerError::BadRequest(format!("body is not UTF-8: {e}")))
    }

    /// Deserializes a JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Reconstructs the request URL.
    ///
    /// Uses the `Host` header when present; otherwise returns the path and query.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = match self.header(HOST.as_str()) {
            Some(host) => format!("http://{host}{}", self.path),
            None => self.path.clone(),
        };
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Returns the per-request scratch map.
    #[must_use]
    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Returns the per-request scratch map mutably.
    pub fn scratch_mut(&mut self) -> &mut Scratch {
        &mut self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_new_splits_query() {
        let req = Request::new(Method::GET, "/books?sort=title");
        assert_eq!(req.path(), "/books");
        assert_eq!(req.query_string(), Some("sort=title"));

        let req = Request::new(Method::GET, "/books");
        assert_eq!(req.query_string(), None);
    }

    #[test]
    fn test_empty_target_is_root() {
        let req = Request::new(Method::GET, "");
        assert_eq!(req.path(), "/");
        let req = Request::new(Method::GET, "?x=1");
        assert_eq!(req.path(), "/");
    }

    #[test]
    fn test_query_pairs_decoded() {
        let req = Request::new(Method::GET, "/s?q=hello+world&tag=a%26b&tag=c");
        let pairs = req.query_pairs();
        assert_eq!(pairs[0], ("q".to_string(), "hello world".to_string()));
        assert_eq!(req.query_param("tag"), Some("a&b".to_string()));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_typed_query() {
        #[derive(Deserialize)]
        struct Page {
            page: u32,
            size: Option<u32>,
        }

        let req = Request::new(Method::GET, "/items?page=3");
        let page: Page = req.query().unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.size, None);

        let req = Request::new(Method::GET, "/items?page=abc");
        assert!(matches!(
            req.query::<Page>(),
            Err(HandlerError::BadRequest(_))
        ));
    }

    #[test]
    fn test_headers_case_insensitive() {
        let req = Request::new(Method::GET, "/")
            .with_header("X-Trace", "abc")
            .unwrap();
        assert_eq!(req.header("x-trace"), Some("abc"));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = Request::new(Method::GET, "/")
            .with_header("bad header", "x")
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidHeader(_)));
    }

    #[test]
    fn test_json_body() {
        #[derive(Deserialize)]
        struct Book {
            title: String,
        }

        let req = Request::new(Method::POST, "/books").with_body(r#"{"title":"Dune"}"#);
        let book: Book = req.json().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(req.text().unwrap(), r#"{"title":"Dune"}"#);

        let req = Request::new(Method::POST, "/books").with_body("not json");
        assert!(matches!(req.json::<Book>(), Err(HandlerError::Json(_))));
    }

    #[test]
    fn test_url_without_host() {
        let req = Request::new(Method::GET, "/home?x=1");
        assert_eq!(req.url(), "/home?x=1");
    }

    #[test]
    fn test_scratch_is_per_request() {
        let mut req = Request::new(Method::GET, "/");
        req.scratch_mut().insert(5_u8);
        assert_eq!(req.scratch().get::<u8>(), Some(&5));

        let other = Request::new(Method::GET, "/");
        assert!(other.scratch().is_empty());
    }
}
