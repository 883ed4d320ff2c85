//! Demo application.
//!
//! ```text
//! cargo run -p poridhi --example demo_app
//! curl localhost:8080/hello/Matthew
//! curl -X PUT localhost:8080/users/7
//! curl -i -X DELETE localhost:8080/api/products
//! ```

use std::path::Path;

use poridhi::prelude::*;
use poridhi::telemetry::init_telemetry;
use serde_json::json;

const DEMO_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

struct BooksResource;

impl Resource for BooksResource {
    fn methods(methods: ResourceBuilder<Self>) -> ResourceBuilder<Self> {
        methods
            .get(|_this, _req, res, _p| {
                Box::pin(async move {
                    res.set_text("List all books");
                    Ok(())
                })
            })
            .post(|_this, _req, res, _p| {
                Box::pin(async move {
                    res.set_text("Create a new book");
                    Ok(())
                })
            })
    }
}

struct UserResource;

impl Resource for UserResource {
    fn methods(methods: ResourceBuilder<Self>) -> ResourceBuilder<Self> {
        methods
            .get(|_this, _req, res, params| Box::pin(async move { user(res, params, "Get") }))
            .put(|_this, _req, res, params| Box::pin(async move { user(res, params, "Update") }))
            .delete(|_this, _req, res, params| Box::pin(async move { user(res, params, "Delete") }))
    }
}

fn user(res: &mut Response, params: &Params, verb: &str) -> HandlerResult {
    let id = params
        .int("id")
        .ok_or_else(|| HandlerError::msg("missing user id"))?;
    res.set_text(format!("{verb} user {id}"));
    Ok(())
}

fn sample(_req: &Request, res: &mut Response, _p: &Params) -> HandlerResult {
    res.set_text("Explicitly registered route");
    Ok(())
}

fn build_app(config: &PoridhiConfig) -> anyhow::Result<App> {
    let mut app = App::from_config(config)?;

    app.add_middleware(RequestTimingMiddleware::new());
    app.add_middleware(RequestIdMiddleware::new());
    app.add_middleware(RequestLoggingMiddleware::new("demo"));

    app.add_exception_handler(|_req, res, err| {
        res.set_text(format!("Error occurred: {err}"));
    });

    app.route("/home").to_sync(|_req, res, _p| {
        res.set_text("Hello from the HOME page");
        Ok(())
    })?;

    app.route("/hello/{name}").to(|_req, res, params| {
        Box::pin(async move {
            let name = params.str("name").unwrap_or_default();
            res.set_text(format!("Hello, {name}!"));
            Ok(())
        })
    })?;

    app.route("/books").resource(BooksResource)?;
    app.route("/users/{id:d}").resource(UserResource)?;
    app.add_route("/sample", Handler::sync(sample))?;

    let templates = app.templates();
    app.route("/template").methods(["GET"]).to_sync(move |_req, res, _p| {
        let html = templates.render(
            "index.html",
            &json!({"name": "PoridhiFrame", "title": "Best Framework"}),
        )?;
        res.set_html(html);
        Ok(())
    })?;

    app.route("/exception")
        .to_sync(|_req, _res, _p| Err(HandlerError::msg("This handler should not be used.")))?;

    app.route("/api/products")
        .methods(["GET", "POST"])
        .to_sync(|req, res, _p| {
            let text = if req.method() == Method::POST {
                "Create product"
            } else {
                "List products"
            };
            res.set_text(text);
            Ok(())
        })?;

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = ConfigLoader::new()
        .with_development()
        .with_optional_file("poridhi.toml")?
        .with_env_prefix("PORIDHI")
        .load()?;

    if !Path::new(&config.templates.directory).is_dir() {
        config.templates.directory = DEMO_TEMPLATES.to_string();
    }

    init_telemetry(&config.telemetry())?;

    let app = build_app(&config)?;
    for route in app.routes().iter() {
        tracing::info!(
            route = route.template(),
            methods = %route.allowed_methods().allow_header(),
            "registered route"
        );
    }

    Server::new(ServerConfig::from(&config.server), app)
        .run()
        .await?;
    Ok(())
}
