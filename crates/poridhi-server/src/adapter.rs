//! Conversion between `http` types and the framework's request/response.
//!
//! The dispatcher works on an already-collected body. The transport turns a
//! wire request into a [`Request`] with [`from_http`], dispatches it, and
//! writes the result back with [`into_http`]. A fault that escapes the
//! dispatcher becomes a bare `500 Internal Server Error` here.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use poridhi_core::{Request, Response};

use crate::app::App;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = http::Response<ResponseBody>;

/// Body sent when a fault escapes the dispatcher.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Builds a [`Request`] from an `http` request whose body is collected.
#[must_use]
pub fn from_http(request: http::Request<Bytes>) -> Request {
    let (parts, body) = request.into_parts();
    Request::from_parts(
        parts.method,
        parts.uri.path(),
        parts.uri.query().map(str::to_string),
        parts.headers,
        body,
    )
}

/// Converts a finalized [`Response`] into an `http` response.
#[must_use]
pub fn into_http(response: Response) -> HttpResponse {
    let (status, headers, body) = response.into_parts();
    let mut out = http::Response::new(Full::new(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out
}

/// A plain text response for failures outside the dispatcher.
#[must_use]
pub fn status_response(status: StatusCode, message: &'static str) -> HttpResponse {
    let mut out = http::Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *out.status_mut() = status;
    out.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    out
}

/// Dispatches `request` through `app` and converts the outcome.
///
/// An unhandled fault is already logged by the dispatcher; the client only
/// sees a generic 500.
pub async fn serve(app: &App, request: http::Request<Bytes>) -> HttpResponse {
    match app.dispatch(from_http(request)).await {
        Ok(response) => into_http(response),
        Err(_) => status_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use poridhi_core::{Handler, HandlerError, Params};

    fn app() -> App {
        let mut app = App::new();
        app.add_route(
            "/echo/{word}",
            Handler::sync(|req: &Request, res: &mut Response, params: &Params| {
                let word = params.str("word").unwrap_or_default();
                let loud = req.query_param("loud").is_some();
                res.set_text(if loud { word.to_uppercase() } else { word.to_string() });
                res.set_header("x-echo", "1")?;
                Ok(())
            }),
        )
        .unwrap();
        app.add_route(
            "/exception",
            Handler::sync(|_req: &Request, _res: &mut Response, _p: &Params| {
                Err(HandlerError::msg("boom"))
            }),
        )
        .unwrap();
        app
    }

    #[test]
    fn test_from_http_splits_target() {
        let http_req = http::Request::builder()
            .method(Method::POST)
            .uri("/books?page=2")
            .header("x-token", "abc")
            .body(Bytes::from_static(b"payload"))
            .unwrap();

        let req = from_http(http_req);
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/books");
        assert_eq!(req.query_param("page").as_deref(), Some("2"));
        assert_eq!(req.header("x-token"), Some("abc"));
        assert_eq!(req.body().as_ref(), b"payload");
    }

    #[test]
    fn test_into_http_keeps_parts() {
        let mut res = Response::with_status(StatusCode::CREATED);
        res.set_text("made");
        res.set_header("x-id", "7").unwrap();

        let out = into_http(res);
        assert_eq!(out.status(), StatusCode::CREATED);
        assert_eq!(out.headers()["x-id"], "7");
        assert_eq!(out.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_serve_matched() {
        let req = http::Request::get("/echo/hi?loud=1")
            .body(Bytes::new())
            .unwrap();
        let out = serve(&app(), req).await;

        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.headers()["x-echo"], "1");
        let body = http_body_util::BodyExt::collect(out.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(body.as_ref(), b"HI");
    }

    #[tokio::test]
    async fn test_serve_unhandled_fault_is_500() {
        let req = http::Request::get("/exception").body(Bytes::new()).unwrap();
        let out = serve(&app(), req).await;
        assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
