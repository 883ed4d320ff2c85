//! Allowed-method sets for routes.

use http::Method;

use crate::error::RouteError;

/// Which HTTP methods a route accepts.
///
/// `Any` on registration means "whatever the handler supports"; the route
/// table narrows it for handlers that only implement some verbs.
///
/// # Example
///
/// ```rust
/// use poridhi_router::AllowedMethods;
/// use http::Method;
///
/// let allowed = AllowedMethods::parse(["get", "POST"]).unwrap();
/// assert!(allowed.permits(&Method::GET));
/// assert!(allowed.permits(&Method::POST));
/// assert!(!allowed.permits(&Method::PUT));
/// assert_eq!(allowed.allow_header(), "GET, POST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedMethods {
    /// Every method is accepted.
    #[default]
    Any,
    /// Only the listed methods are accepted.
    Only(Vec<Method>),
}

impl AllowedMethods {
    /// Builds a restricted set from methods, dropping duplicates.
    #[must_use]
    pub fn only(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut list: Vec<Method> = Vec::new();
        for method in methods {
            if !list.contains(&method) {
                list.push(method);
            }
        }
        Self::Only(list)
    }

    /// Parses method names, upper-casing them first.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidMethod`] for names that are not valid
    /// HTTP method tokens.
    pub fn parse<I, S>(names: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let methods = names
            .into_iter()
            .map(|name| {
                let upper = name.as_ref().trim().to_ascii_uppercase();
                Method::from_bytes(upper.as_bytes())
                    .map_err(|_| RouteError::InvalidMethod(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::only(methods))
    }

    /// Returns true if the method is accepted.
    #[must_use]
    pub fn permits(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(method),
        }
    }

    /// Returns the explicit method list, or `None` for [`AllowedMethods::Any`].
    #[must_use]
    pub fn methods(&self) -> Option<&[Method]> {
        match self {
            Self::Any => None,
            Self::Only(methods) => Some(methods),
        }
    }

    /// Renders the set as an `Allow` header value.
    #[must_use]
    pub fn allow_header(&self) -> String {
        match self {
            Self::Any => String::new(),
            Self::Only(methods) => methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<Vec<Method>> for AllowedMethods {
    fn from(methods: Vec<Method>) -> Self {
        Self::only(methods)
    }
}

impl<const N: usize> From<[Method; N]> for AllowedMethods {
    fn from(methods: [Method; N]) -> Self {
        Self::only(methods)
    }
}
