//! Handler adapter.
//!
//! Every route points at a [`Handler`], which is one of two shapes:
//!
//! - a **function** handler: one [`Endpoint`] that serves every method and can
//!   branch on [`Request::method`] itself;
//! - a **resource** handler: one shared instance with a bound method per HTTP
//!   verb, stored in a fixed slot table built once at registration.
//!
//! Both are invoked the same way, through [`Handler::invoke`].
//!
//! # Example
//!
//! ```
//! use poridhi_core::{Handler, Params, Request, Resource, ResourceBuilder, Response, HandlerResult};
//! use http::Method;
//!
//! struct Books;
//!
//! impl Books {
//!     async fn list(&self, _req: &Request, res: &mut Response, _params: &Params) -> HandlerResult {
//!         res.set_text("List all books");
//!         Ok(())
//!     }
//! }
//!
//! impl Resource for Books {
//!     fn methods(methods: ResourceBuilder<Self>) -> ResourceBuilder<Self> {
//!         methods.get(|this, req, res, params| Box::pin(this.list(req, res, params)))
//!     }
//! }
//!
//! let handler = Handler::resource(Books);
//! assert_eq!(handler.implemented_methods(), Some(vec![Method::GET]));
//!
//! tokio_test::block_on(async {
//!     let req = Request::new(Method::GET, "/books");
//!     let mut res = Response::new();
//!     handler.invoke(&req, &mut res, &Params::new()).await.unwrap();
//!     assert_eq!(res.text(), "List all books");
//! });
//! ```

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;
use http::Method;
use poridhi_router::{Params, RouteTarget};

use crate::error::{HandlerError, HandlerResult};
use crate::request::Request;
use crate::response::Response;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can serve a request.
///
/// Implemented for every closure of the shape
/// `for<'a> Fn(&'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>`.
pub trait Endpoint: Send + Sync + 'static {
    /// Serves one request, writing into `res`.
    fn call<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut Response,
        params: &'a Params,
    ) -> BoxFuture<'a, HandlerResult>;
}

impl<F> Endpoint for F
where
    F: for<'a> Fn(&'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut Response,
        params: &'a Params,
    ) -> BoxFuture<'a, HandlerResult> {
        self(req, res, params)
    }
}

/// Adapts a synchronous closure into an [`Endpoint`].
struct SyncFn<F>(F);

impl<F> Endpoint for SyncFn<F>
where
    F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut Response,
        params: &'a Params,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move { (self.0)(req, res, params) })
    }
}

/// The HTTP verbs a resource can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl Verb {
    /// All verbs, in slot order.
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
    ];

    /// Maps an HTTP method to a verb. Extension methods have none.
    #[must_use]
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::DELETE => Some(Self::Delete),
            Method::PATCH => Some(Self::Patch),
            Method::HEAD => Some(Self::Head),
            Method::OPTIONS => Some(Self::Options),
            _ => None,
        }
    }

    /// Returns the HTTP method for this verb.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Patch => Method::PATCH,
            Self::Head => Method::HEAD,
            Self::Options => Method::OPTIONS,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// A handler that serves every method with one endpoint.
#[derive(Clone)]
pub struct FunctionHandler {
    name: &'static str,
    endpoint: Arc<dyn Endpoint>,
}

impl FunctionHandler {
    /// Wraps an async closure.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        Self::from_endpoint(f)
    }

    /// Wraps any [`Endpoint`] implementation.
    pub fn from_endpoint<E: Endpoint>(endpoint: E) -> Self {
        Self {
            name: std::any::type_name::<E>(),
            endpoint: Arc::new(endpoint),
        }
    }

    /// Wraps a synchronous closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<F>(),
            endpoint: Arc::new(SyncFn(f)),
        }
    }

    /// Overrides the name used in logs and errors.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

/// A method of `R` bound to a shared instance.
struct BoundMethod<R, F> {
    instance: Arc<R>,
    method: F,
}

impl<R, F> Endpoint for BoundMethod<R, F>
where
    R: Send + Sync + 'static,
    F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a Request,
        res: &'a mut Response,
        params: &'a Params,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.method)(&self.instance, req, res, params)
    }
}

/// Builds the verb slot table of a resource.
///
/// Binding a verb twice replaces the earlier method.
pub struct ResourceBuilder<R> {
    name: &'static str,
    instance: Arc<R>,
    slots: [Option<Arc<dyn Endpoint>>; 7],
}

impl<R: Send + Sync + 'static> ResourceBuilder<R> {
    /// Starts a table for `instance`.
    pub fn new(instance: R) -> Self {
        Self {
            name: short_type_name::<R>(),
            instance: Arc::new(instance),
            slots: Default::default(),
        }
    }

    /// Binds `method` to `verb`.
    #[must_use]
    pub fn on<F>(mut self, verb: Verb, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.slots[verb.slot()] = Some(Arc::new(BoundMethod {
            instance: Arc::clone(&self.instance),
            method,
        }));
        self
    }

    /// Binds the `GET` method.
    #[must_use]
    pub fn get<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Get, method)
    }

    /// Binds the `POST` method.
    #[must_use]
    pub fn post<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Post, method)
    }

    /// Binds the `PUT` method.
    #[must_use]
    pub fn put<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Put, method)
    }

    /// Binds the `DELETE` method.
    #[must_use]
    pub fn delete<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Delete, method)
    }

    /// Binds the `PATCH` method.
    #[must_use]
    pub fn patch<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Patch, method)
    }

    /// Binds the `HEAD` method.
    #[must_use]
    pub fn head<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Head, method)
    }

    /// Binds the `OPTIONS` method.
    #[must_use]
    pub fn options<F>(self, method: F) -> Self
    where
        F: for<'a> Fn(&'a R, &'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.on(Verb::Options, method)
    }

    /// Finishes the table.
    #[must_use]
    pub fn build(self) -> ResourceHandler {
        ResourceHandler {
            name: self.name,
            slots: self.slots,
        }
    }
}

/// A type that declares its own verb table.
///
/// Register it with [`Handler::resource`].
pub trait Resource: Send + Sync + Sized + 'static {
    /// Binds this type's methods to verbs.
    fn methods(methods: ResourceBuilder<Self>) -> ResourceBuilder<Self>;
}

/// A handler with one bound method per implemented verb.
#[derive(Clone)]
pub struct ResourceHandler {
    name: &'static str,
    slots: [Option<Arc<dyn Endpoint>>; 7],
}

impl ResourceHandler {
    /// Returns the endpoint bound to a method.
    #[must_use]
    pub fn endpoint(&self, method: &Method) -> Option<&dyn Endpoint> {
        let verb = Verb::from_method(method)?;
        self.slots[verb.slot()].as_deref()
    }

    /// Returns the implemented verbs in slot order.
    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        Verb::ALL
            .into_iter()
            .filter(|verb| self.slots[verb.slot()].is_some())
    }
}

/// A route's handler: a function or a resource.
#[derive(Clone)]
pub enum Handler {
    /// Serves every method with one endpoint.
    Function(FunctionHandler),
    /// Dispatches by verb to bound methods.
    Resource(ResourceHandler),
}

impl Handler {
    /// Creates a function handler from an async closure.
    pub fn function<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Response, &'a Params) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        Self::Function(FunctionHandler::new(f))
    }

    /// Creates a function handler from a synchronous closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Function(FunctionHandler::sync(f))
    }

    /// Creates a resource handler from a type implementing [`Resource`].
    pub fn resource<R: Resource>(instance: R) -> Self {
        Self::Resource(R::methods(ResourceBuilder::new(instance)).build())
    }

    /// Returns the handler's name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Function(f) => f.name,
            Self::Resource(r) => r.name,
        }
    }

    /// Returns the implemented methods, or `None` if every method is served.
    #[must_use]
    pub fn implemented_methods(&self) -> Option<Vec<Method>> {
        match self {
            Self::Function(_) => None,
            Self::Resource(r) => Some(r.verbs().map(Verb::method).collect()),
        }
    }

    /// Selects the endpoint for a method.
    ///
    /// Fails with [`HandlerError::MethodNotImplemented`] when a resource has no
    /// method for the verb.
    pub fn endpoint_for(&self, method: &Method) -> Result<&dyn Endpoint, HandlerError> {
        match self {
            Self::Function(f) => Ok(f.endpoint.as_ref()),
            Self::Resource(r) => r
                .endpoint(method)
                .ok_or_else(|| HandlerError::MethodNotImplemented {
                    handler: r.name,
                    method: method.clone(),
                }),
        }
    }

    /// Invokes the endpoint selected by the request method.
    pub async fn invoke(
        &self,
        req: &Request,
        res: &mut Response,
        params: &Params,
    ) -> HandlerResult {
        self.endpoint_for(req.method())?
            .call(req, res, params)
            .await
    }
}

impl RouteTarget for Handler {
    fn supported_methods(&self) -> Option<Vec<Method>> {
        self.implemented_methods()
    }
}

impl From<FunctionHandler> for Handler {
    fn from(handler: FunctionHandler) -> Self {
        Self::Function(handler)
    }
}

impl From<ResourceHandler> for Handler {
    fn from(handler: ResourceHandler) -> Self {
        Self::Resource(handler)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(h) => f.debug_tuple("Function").field(&h.name).finish(),
            Self::Resource(h) => f
                .debug_struct("Resource")
                .field("name", &h.name)
                .field("verbs", &h.verbs().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Runs a handler or hook future, turning a panic into [`HandlerError::Panicked`].
pub async fn contain_panic<F>(future: F) -> HandlerResult
where
    F: Future<Output = HandlerResult>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::from_panic(payload.as_ref())),
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
