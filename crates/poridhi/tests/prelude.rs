//! The prelude is enough to build, wire and exercise an application.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use poridhi::prelude::*;
use poridhi_test::TestClient;

fn app(hits: &Arc<AtomicUsize>) -> App {
    let mut app = App::new();

    let counter = Arc::clone(hits);
    app.add_middleware(FnMiddleware::new("counter").on_request(move |_req| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    app.add_middleware(RequestTimingMiddleware::new());

    app.route("/orders/{id:d}")
        .allow([Method::GET, Method::DELETE])
        .to_sync(|req, res, params| {
            let id = params.int("id").unwrap_or_default();
            res.set_text(format!("{} order {id}", req.method()));
            Ok(())
        })
        .unwrap();

    app.route("/fail")
        .to_sync(|_req, _res, _p| Err(HandlerError::msg("kaput")))
        .unwrap();

    app.add_exception_handler(|_req, res, err| {
        res.set_status(StatusCode::SERVICE_UNAVAILABLE);
        res.set_text(format!("recovered: {err}"));
    });

    app
}

#[tokio::test]
async fn test_prelude_application() {
    let hits = Arc::new(AtomicUsize::new(0));
    let client = TestClient::new(app(&hits));

    client
        .get("/orders/12")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_text("GET order 12")
        .assert_has_header("x-response-time");

    let res = client.post("/orders/12").send().await;
    res.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.allowed_methods(), vec!["GET", "DELETE"]);

    client
        .get("/orders/twelve")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    client
        .get("/fail")
        .send()
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_text("recovered: kaput");

    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[test]
fn test_modules_are_reexported() {
    let pattern = poridhi::router::PathPattern::compile("/users/{id:d}").unwrap();
    assert_eq!(pattern.template(), "/users/{id:d}");

    let config = poridhi::config::PoridhiConfig::default();
    let server = poridhi::server::ServerConfig::from(&config.server);
    assert_eq!(server.http_addr(), config.server.http_addr);
}
