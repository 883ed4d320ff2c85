//! Test error types.

use poridhi_server::DispatchError;
use thiserror::Error;

/// Errors that can occur while building or sending a test request.
#[derive(Debug, Error)]
pub enum TestError {
    /// A header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The query could not be encoded.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] serde_urlencoded::ser::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body is not UTF-8.
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The fault escaped the dispatcher because no exception handler took it.
    #[error(transparent)]
    Unhandled(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TestError::InvalidHeader("bad name".to_string());
        assert_eq!(err.to_string(), "invalid header: bad name");
    }

    #[test]
    fn test_from_json_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TestError::from(source);
        assert!(matches!(err, TestError::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
