//! The outgoing response accumulator.

use std::borrow::Cow;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;

use crate::error::HandlerError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// A mutable response that handlers and middleware write into.
///
/// The status defaults to `200 OK`. Header names are case-insensitive and
/// setting a header replaces any earlier value. The body is plain bytes; the
/// text helpers encode into it, so whichever write comes last wins.
///
/// # Example
///
/// ```
/// use poridhi_core::Response;
/// use http::StatusCode;
///
/// let mut res = Response::new();
/// res.set_text("Hello from the HOME page");
/// assert_eq!(res.status(), StatusCode::OK);
/// assert_eq!(res.text(), "Hello from the HOME page");
///
/// res.set_body(b"raw".to_vec());
/// assert_eq!(res.text(), "raw");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates an empty `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty response with a status.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns a header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Sets a header from strings, replacing any earlier value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), HandlerError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HandlerError::InvalidHeader(format!("{name}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| HandlerError::InvalidHeader(format!("{name}: {e}")))?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    /// Sets a typed header, replacing any earlier value.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Sets raw body bytes. The content type is left as it is.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Sets a plain text body.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.body = Bytes::from(text.into());
        self.set_content_type(TEXT_PLAIN);
    }

    /// Sets an HTML body.
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.body = Bytes::from(html.into());
        self.set_content_type(TEXT_HTML);
    }

    /// Serializes `value` as a JSON body.
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), HandlerError> {
        self.body = Bytes::from(serde_json::to_vec(value)?);
        self.set_content_type(APPLICATION_JSON);
        Ok(())
    }

    fn set_content_type(&mut self, content_type: &'static str) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    /// Discards everything written so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Splits the response into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let res = Response::new();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().is_empty());
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_set_text_sets_content_type() {
        let mut res = Response::new();
        res.set_text("hi");
        assert_eq!(res.header("content-type"), Some(TEXT_PLAIN));
        assert_eq!(res.text(), "hi");
    }

    #[test]
    fn test_last_write_wins() {
        let mut res = Response::new();
        res.set_text("first");
        res.set_body(Bytes::from_static(b"second"));
        assert_eq!(res.text(), "second");

        res.set_text("third");
        assert_eq!(res.text(), "third");
    }

    #[test]
    fn test_headers_replace_case_insensitively() {
        let mut res = Response::new();
        res.set_header("X-Response-Time", "0.1000s").unwrap();
        res.set_header("x-response-time", "0.2000s").unwrap();
        assert_eq!(res.headers().get_all("X-RESPONSE-TIME").iter().count(), 1);
        assert_eq!(res.header("x-response-time"), Some("0.2000s"));
    }

    #[test]
    fn test_invalid_header() {
        let mut res = Response::new();
        assert!(res.set_header("x-ok", "line\nbreak").is_err());
        assert!(res.set_header("no spaces", "v").is_err());
    }

    #[test]
    fn test_set_json() {
        let mut res = Response::new();
        res.set_json(&json!({"id": 42})).unwrap();
        assert_eq!(res.header("content-type"), Some(APPLICATION_JSON));
        assert_eq!(res.text(), r#"{"id":42}"#);
    }

    #[test]
    fn test_reset() {
        let mut res = Response::with_status(StatusCode::CREATED);
        res.set_html("<p>x</p>");
        res.reset();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().is_empty());
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_into_parts() {
        let mut res = Response::with_status(StatusCode::ACCEPTED);
        res.set_text("queued");
        let (status, headers, body) = res.into_parts();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(headers.contains_key(CONTENT_TYPE));
        assert_eq!(&body[..], b"queued");
    }
}
