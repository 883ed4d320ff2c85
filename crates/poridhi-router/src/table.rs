//! The ordered route table.
//!
//! Routes are evaluated in registration order and the first structural path
//! match decides the outcome. Once a path matches, later routes are never
//! consulted, even if the matched route rejects the method.

use http::Method;

use crate::error::RouteError;
use crate::methods::AllowedMethods;
use crate::params::Params;
use crate::pattern::PathPattern;

/// Something that can be stored behind a route.
pub trait RouteTarget {
    /// The methods this target can serve, or `None` if it serves any method.
    fn supported_methods(&self) -> Option<Vec<Method>>;
}

/// A registered route. Immutable once added to a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<H> {
    pattern: PathPattern,
    handler: H,
    allowed: AllowedMethods,
}

impl<H> Route<H> {
    /// Returns the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the template string the route was registered with.
    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the effective allowed methods.
    #[must_use]
    pub fn allowed_methods(&self) -> &AllowedMethods {
        &self.allowed
    }
}

/// The outcome of resolving a request against the table.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a, H> {
    /// A route matched the path and accepts the method.
    Matched {
        /// The matched route.
        route: &'a Route<H>,
        /// Typed parameters extracted from the path.
        params: Params,
    },
    /// A route matched the path but does not accept the method.
    MethodNotAllowed {
        /// The matched route.
        route: &'a Route<H>,
    },
    /// No route matched the path.
    NotFound,
}

impl<H> Resolution<'_, H> {
    /// Returns true for [`Resolution::Matched`].
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// An ordered collection of routes.
///
/// # Example
///
/// ```rust
/// use poridhi_router::{AllowedMethods, Resolution, RouteTable, RouteTarget};
/// use http::Method;
///
/// #[derive(Debug, PartialEq)]
/// struct Op(&'static str);
///
/// impl RouteTarget for Op {
///     fn supported_methods(&self) -> Option<Vec<Method>> {
///         None
///     }
/// }
///
/// let mut table = RouteTable::new();
/// table.add("/users/{id:d}", Op("getUser"), AllowedMethods::Any).unwrap();
///
/// match table.resolve(&Method::GET, "/users/42") {
///     Resolution::Matched { route, params } => {
///         assert_eq!(route.handler().0, "getUser");
///         assert_eq!(params.int("id"), Some(42));
///     }
///     _ => panic!("expected a match"),
/// }
///
/// assert_eq!(table.resolve(&Method::GET, "/users/abc"), Resolution::NotFound);
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTable<H> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Resolves a request method and path.
    ///
    /// The result depends only on the arguments and the registered routes.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_, H> {
        for route in &self.routes {
            if let Some(params) = route.pattern.matches(path) {
                return if route.allowed.permits(method) {
                    Resolution::Matched { route, params }
                } else {
                    Resolution::MethodNotAllowed { route }
                };
            }
        }

        Resolution::NotFound
    }

    /// Returns the route registered under an exact template string.
    #[must_use]
    pub fn get(&self, template: &str) -> Option<&Route<H>> {
        self.routes.iter().find(|r| r.template() == template)
    }

    /// Returns the routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter()
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H: RouteTarget> RouteTable<H> {
    /// Registers a route.
    ///
    /// `AllowedMethods::Any` narrows to the handler's supported methods when
    /// the handler declares them.
    ///
    /// # Errors
    ///
    /// - [`RouteError::DuplicateRoute`] if the template string is already registered
    /// - any compilation error from [`PathPattern::compile`]
    /// - [`RouteError::UnsupportedMethod`] if an allowed method is not implemented
    /// - [`RouteError::EmptyHandler`] if the handler implements nothing
    /// - [`RouteError::NoMethods`] if an explicit method list is empty
    pub fn add(
        &mut self,
        template: &str,
        handler: H,
        allowed: AllowedMethods,
    ) -> Result<&Route<H>, RouteError> {
        if self.get(template).is_some() {
            return Err(RouteError::DuplicateRoute {
                template: template.to_string(),
            });
        }

        let pattern = PathPattern::compile(template)?;
        let allowed = Self::effective_methods(template, &handler, allowed)?;

        if let Some(earlier) = self.routes.iter().find(|r| r.pattern.same_shape(&pattern)) {
            tracing::warn!(
                route = template,
                shadowed_by = earlier.template(),
                "route has the same shape as an earlier route and will never match"
            );
        }

        tracing::debug!(route = template, methods = %allowed.allow_header(), "route registered");

        self.routes.push(Route {
            pattern,
            handler,
            allowed,
        });
        let index = self.routes.len() - 1;
        Ok(&self.routes[index])
    }

    fn effective_methods(
        template: &str,
        handler: &H,
        allowed: AllowedMethods,
    ) -> Result<AllowedMethods, RouteError> {
        let supported = handler.supported_methods();

        match (allowed, supported) {
            (AllowedMethods::Only(methods), _) if methods.is_empty() => Err(RouteError::NoMethods {
                template: template.to_string(),
            }),
            (_, Some(supported)) if supported.is_empty() => Err(RouteError::EmptyHandler {
                template: template.to_string(),
            }),
            (AllowedMethods::Any, None) => Ok(AllowedMethods::Any),
            (AllowedMethods::Any, Some(supported)) => Ok(AllowedMethods::only(supported)),
            (AllowedMethods::Only(methods), None) => Ok(AllowedMethods::Only(methods)),
            (AllowedMethods::Only(methods), Some(supported)) => {
                if let Some(missing) = methods.iter().find(|m| !supported.contains(m)) {
                    return Err(RouteError::UnsupportedMethod {
                        template: template.to_string(),
                        method: missing.to_string(),
                    });
                }
                Ok(AllowedMethods::Only(methods))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Target {
        Func(&'static str),
        Res(&'static str, Vec<Method>),
    }

    impl RouteTarget for Target {
        fn supported_methods(&self) -> Option<Vec<Method>> {
            match self {
                Self::Func(_) => None,
                Self::Res(_, methods) => Some(methods.clone()),
            }
        }
    }

    fn name_of(resolution: &Resolution<'_, Target>) -> Option<&'static str> {
        match resolution {
            Resolution::Matched { route, .. } => match route.handler() {
                Target::Func(n) | Target::Res(n, _) => Some(n),
            },
            _ => None,
        }
    }

    #[test]
    fn test_literal_routes_any_method() {
        let mut table = RouteTable::new();
        table.add("/home", Target::Func("home"), AllowedMethods::Any).unwrap();
        table.add("/sample", Target::Func("sample"), AllowedMethods::Any).unwrap();

        for method in [Method::GET, Method::POST, Method::DELETE] {
            assert_eq!(name_of(&table.resolve(&method, "/home")), Some("home"));
            assert_eq!(name_of(&table.resolve(&method, "/sample")), Some("sample"));
        }
    }

    #[test]
    fn test_typed_param_resolution() {
        let mut table = RouteTable::new();
        table
            .add(
                "/users/{id:d}",
                Target::Res("UserResource", vec![Method::GET, Method::PUT, Method::DELETE]),
                AllowedMethods::Any,
            )
            .unwrap();

        match table.resolve(&Method::GET, "/users/42") {
            Resolution::Matched { route, params } => {
                assert_eq!(route.template(), "/users/{id:d}");
                assert_eq!(params.int("id"), Some(42));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(table.resolve(&Method::GET, "/users/abc"), Resolution::NotFound);
    }

    #[test]
    fn test_method_not_allowed_is_not_not_found() {
        let mut table = RouteTable::new();
        table
            .add(
                "/api/products",
                Target::Func("products"),
                AllowedMethods::only([Method::GET, Method::POST]),
            )
            .unwrap();

        assert!(table.resolve(&Method::GET, "/api/products").is_matched());
        assert!(table.resolve(&Method::POST, "/api/products").is_matched());
        assert!(matches!(
            table.resolve(&Method::PUT, "/api/products"),
            Resolution::MethodNotAllowed { .. }
        ));
        assert_eq!(table.resolve(&Method::PUT, "/api/missing"), Resolution::NotFound);
    }

    #[test]
    fn test_resource_defaults_to_implemented_methods() {
        let mut table = RouteTable::new();
        let route = table
            .add(
                "/books",
                Target::Res("BooksResource", vec![Method::GET, Method::POST]),
                AllowedMethods::Any,
            )
            .unwrap();
        assert_eq!(
            route.allowed_methods(),
            &AllowedMethods::Only(vec![Method::GET, Method::POST])
        );

        assert!(matches!(
            table.resolve(&Method::DELETE, "/books"),
            Resolution::MethodNotAllowed { .. }
        ));
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let mut table = RouteTable::new();
        table.add("/home", Target::Func("a"), AllowedMethods::Any).unwrap();
        let err = table
            .add("/home", Target::Func("b"), AllowedMethods::Any)
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicateRoute {
                template: "/home".to_string()
            }
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let mut table = RouteTable::new();
        let err = table
            .add(
                "/books",
                Target::Res("BooksResource", vec![Method::GET]),
                AllowedMethods::only([Method::GET, Method::DELETE]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::UnsupportedMethod {
                template: "/books".to_string(),
                method: "DELETE".to_string(),
            }
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_resource_rejected() {
        let mut table = RouteTable::new();
        let err = table
            .add("/empty", Target::Res("Empty", vec![]), AllowedMethods::Any)
            .unwrap_err();
        assert!(matches!(err, RouteError::EmptyHandler { .. }));
    }

    #[test]
    fn test_empty_method_list_rejected() {
        let mut table = RouteTable::new();
        let err = table
            .add("/none", Target::Func("none"), AllowedMethods::Only(vec![]))
            .unwrap_err();
        assert!(matches!(err, RouteError::NoMethods { .. }));
    }

    #[test]
    fn test_malformed_template_rejected_at_registration() {
        let mut table = RouteTable::new();
        assert!(matches!(
            table.add("/users/{id:q}", Target::Func("x"), AllowedMethods::Any),
            Err(RouteError::UnknownParamType { .. })
        ));
    }

    #[test]
    fn test_first_registered_wins_on_same_shape() {
        let mut table = RouteTable::new();
        table.add("/users/{id:d}", Target::Func("first"), AllowedMethods::Any).unwrap();
        table
            .add("/users/{user_id:d}", Target::Func("second"), AllowedMethods::Any)
            .unwrap();

        assert_eq!(name_of(&table.resolve(&Method::GET, "/users/1")), Some("first"));
    }

    #[test]
    fn test_first_structural_match_decides_method_outcome() {
        let mut table = RouteTable::new();
        table
            .add("/items/{id}", Target::Func("get-only"), AllowedMethods::only([Method::GET]))
            .unwrap();
        table.add("/items/special", Target::Func("any"), AllowedMethods::Any).unwrap();

        // The earlier, broader route matches the path first and rejects POST.
        assert!(matches!(
            table.resolve(&Method::POST, "/items/special"),
            Resolution::MethodNotAllowed { .. }
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut table = RouteTable::new();
        table.add("/hello/{name}", Target::Func("greet"), AllowedMethods::Any).unwrap();

        let first = table.resolve(&Method::GET, "/hello/world");
        let second = table.resolve(&Method::GET, "/hello/world");
        assert_eq!(first, second);
    }

    #[test]
    fn test_iter_in_registration_order() {
        let mut table = RouteTable::new();
        table.add("/b", Target::Func("b"), AllowedMethods::Any).unwrap();
        table.add("/a", Target::Func("a"), AllowedMethods::Any).unwrap();

        let templates: Vec<_> = table.iter().map(Route::template).collect();
        assert_eq!(templates, vec!["/b", "/a"]);
        assert!(table.get("/a").is_some());
        assert!(table.get("/c").is_none());
    }
}
