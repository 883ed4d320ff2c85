//! The application object and its registration API.
//!
//! An [`App`] owns the route table, the middleware chain, the exception
//! registry and the template renderer. Everything is registered up front;
//! after that the app is only read, so one `Arc<App>` serves every request.
//!
//! # Example
//!
//! ```
//! use poridhi_core::{Handler, Params, Request, Response, Resource, ResourceBuilder, HandlerResult};
//! use poridhi_server::App;
//!
//! struct Books;
//!
//! impl Books {
//!     async fn list(&self, _req: &Request, res: &mut Response, _p: &Params) -> HandlerResult {
//!         res.set_text("List all books");
//!         Ok(())
//!     }
//! }
//!
//! impl Resource for Books {
//!     fn methods(methods: ResourceBuilder<Self>) -> ResourceBuilder<Self> {
//!         methods.get(|this, req, res, p| Box::pin(this.list(req, res, p)))
//!     }
//! }
//!
//! let mut app = App::new();
//! app.route("/home").to_sync(|_req, res, _p| {
//!     res.set_text("Hello from the HOME page");
//!     Ok(())
//! })?;
//! app.route("/books").resource(Books)?;
//! app.route("/api/orders").methods(["GET"]).to_sync(|_req, res, _p| {
//!     res.set_text("List orders");
//!     Ok(())
//! })?;
//!
//! assert_eq!(app.routes().len(), 3);
//! # Ok::<(), poridhi_core::ConfigurationError>(())
//! ```

use std::fmt;
use std::path::Path;

use poridhi_config::PoridhiConfig;
use poridhi_core::{
    BoxFuture, ConfigurationError, HandlebarsTemplates, Handler, HandlerError, HandlerResult,
    Params, Request, Resource, Response, TemplateError, TemplateRenderer, Templates,
};
use poridhi_middleware::{Middleware, MiddlewareChain};
use poridhi_router::{AllowedMethods, Route, RouteError, RouteTable};
use serde::Serialize;

use crate::exception::ExceptionRegistry;

/// A registered route.
pub type AppRoute = Route<Handler>;

/// A web application: routes, middleware, exception handler and templates.
pub struct App {
    pub(crate) routes: RouteTable<Handler>,
    pub(crate) middleware: MiddlewareChain,
    pub(crate) exceptions: ExceptionRegistry,
    templates: Templates,
}

impl App {
    /// Creates an empty application with no templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            middleware: MiddlewareChain::new(),
            exceptions: ExceptionRegistry::new(),
            templates: Templates::new(HandlebarsTemplates::new()),
        }
    }

    /// Creates an application configured by the `templates` section.
    ///
    /// A missing template directory is an error only when the section marks
    /// it as required; otherwise the app starts with no templates.
    pub fn from_config(config: &PoridhiConfig) -> Result<Self, ConfigurationError> {
        let dir = Path::new(&config.templates.directory);
        if dir.is_dir() {
            return Self::new().with_template_dir(dir);
        }

        if config.templates.required {
            return Err(TemplateError::NotFound(config.templates.directory.clone()).into());
        }

        tracing::warn!(
            dir = %config.templates.directory,
            "template directory not found, starting without templates"
        );
        Ok(Self::new())
    }

    /// Loads every template under `dir`, replacing the current renderer.
    pub fn with_template_dir(self, dir: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let engine = HandlebarsTemplates::from_dir(dir)?;
        Ok(self.with_templates(engine))
    }

    /// Replaces the template renderer.
    #[must_use]
    pub fn with_templates(mut self, renderer: impl TemplateRenderer) -> Self {
        self.templates = Templates::new(renderer);
        self
    }

    /// Returns a handle to the renderer that handlers can capture.
    #[must_use]
    pub fn templates(&self) -> Templates {
        self.templates.clone()
    }

    /// Renders a template.
    pub fn template<C: Serialize + ?Sized>(
        &self,
        name: &str,
        context: &C,
    ) -> Result<String, TemplateError> {
        self.templates.render(name, context)
    }

    /// Starts registering a route at `template`.
    ///
    /// Finish with [`RouteBuilder::to`], [`RouteBuilder::to_sync`],
    /// [`RouteBuilder::resource`] or [`RouteBuilder::handler`].
    pub fn route(&mut self, template: &str) -> RouteBuilder<'_> {
        RouteBuilder {
            app: self,
            template: template.to_string(),
            methods: Ok(AllowedMethods::Any),
        }
    }

    /// Registers a handler that accepts every method it implements.
    pub fn add_route(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<&AppRoute, ConfigurationError> {
        self.add_route_with_methods(template, handler, AllowedMethods::Any)
    }

    /// Registers a handler restricted to `allowed` methods.
    pub fn add_route_with_methods(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
        allowed: impl Into<AllowedMethods>,
    ) -> Result<&AppRoute, ConfigurationError> {
        let handler = handler.into();
        let name = handler.name();
        let route = self.routes.add(template, handler, allowed.into())?;
        tracing::debug!(route = template, handler = name, "handler registered");
        Ok(route)
    }

    /// Appends a middleware. Registration order is onion order: the first
    /// middleware sees the request first and the response last.
    pub fn add_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Installs the exception handler, replacing any earlier one.
    pub fn add_exception_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response, &HandlerError) + Send + Sync + 'static,
    {
        self.exceptions.set(handler);
        self
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable<Handler> {
        &self.routes
    }

    /// Returns the middleware chain.
    #[must_use]
    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    /// Returns true if an exception handler is installed.
    #[must_use]
    pub fn has_exception_handler(&self) -> bool {
        self.exceptions.is_registered()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field(
                "routes",
                &self.routes.iter().map(Route::template).collect::<Vec<_>>(),
            )
            .field("middleware", &self.middleware)
            .field("exceptions", &self.exceptions)
            .finish_non_exhaustive()
    }
}

/// Registers one route. Created by [`App::route`].
#[must_use = "a route is only registered once a handler is given"]
pub struct RouteBuilder<'a> {
    app: &'a mut App,
    template: String,
    methods: Result<AllowedMethods, RouteError>,
}

impl<'a> RouteBuilder<'a> {
    /// Restricts the route to the named methods (case-insensitive).
    ///
    /// An invalid name is reported when the handler is attached.
    pub fn methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = AllowedMethods::parse(names);
        self
    }

    /// Restricts the route to an already built method set.
    pub fn allow(mut self, allowed: impl Into<AllowedMethods>) -> Self {
        self.methods = Ok(allowed.into());
        self
    }

    /// Attaches an async function handler.
    pub fn to<F>(self, f: F) -> Result<&'a AppRoute, ConfigurationError>
    where
        F: for<'r> Fn(&'r Request, &'r mut Response, &'r Params) -> BoxFuture<'r, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.handler(Handler::function(f))
    }

    /// Attaches a synchronous function handler.
    pub fn to_sync<F>(self, f: F) -> Result<&'a AppRoute, ConfigurationError>
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler(Handler::sync(f))
    }

    /// Attaches a resource. Unless restricted, the route accepts exactly the
    /// verbs the resource implements.
    pub fn resource<R: Resource>(self, instance: R) -> Result<&'a AppRoute, ConfigurationError> {
        self.handler(Handler::resource(instance))
    }

    /// Attaches a prepared handler.
    pub fn handler(self, handler: impl Into<Handler>) -> Result<&'a AppRoute, ConfigurationError> {
        let Self {
            app,
            template,
            methods,
        } = self;
        app.add_route_with_methods(&template, handler, methods?)
    }
}

impl fmt::Debug for RouteBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("template", &self.template)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
