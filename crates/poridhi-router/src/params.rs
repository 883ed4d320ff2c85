//! Typed path parameter storage.
//!
//! Parameters are kept in template order as `(name, value)` pairs, with
//! small-vector storage so that the common case of 1-4 parameters never
//! touches the heap for the container itself.

use std::fmt;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::pattern::ParamKind;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// A single extracted parameter value, already converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    /// A single path segment (`{name}` or `{name:s}`).
    Str(String),
    /// A base-10 integer segment (`{name:d}`).
    Int(i64),
    /// A UUID segment (`{name:uuid}`).
    Uuid(Uuid),
    /// The remainder of the path (`{name:path}`).
    Path(String),
}

impl ParamValue {
    /// Returns the kind this value was extracted as.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Str(_) => ParamKind::Str,
            Self::Int(_) => ParamKind::Int,
            Self::Uuid(_) => ParamKind::Uuid,
            Self::Path(_) => ParamKind::Path,
        }
    }

    /// Returns the textual value for string and path parameters.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Path(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value for integer parameters.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the UUID for uuid parameters.
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) | Self::Path(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uuid(id) => write!(f, "{id}"),
        }
    }
}

/// Extracted path parameters from a route match.
///
/// # Example
///
/// ```rust
/// use poridhi_router::{ParamValue, Params};
///
/// let mut params = Params::new();
/// params.push("id", ParamValue::Int(42));
/// params.push("name", ParamValue::Str("alice".to_string()));
///
/// assert_eq!(params.int("id"), Some(42));
/// assert_eq!(params.str("name"), Some("alice"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, ParamValue); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a params set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns a string or path parameter.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Returns an integer parameter.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Returns a uuid parameter.
    #[must_use]
    pub fn uuid(&self, name: &str) -> Option<Uuid> {
        self.get(name).and_then(ParamValue::as_uuid)
    }

    /// Returns the parameter names in template order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|(n, _)| n.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a ParamValue);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, ParamValue)>,
        fn(&'a (String, ParamValue)) -> (&'a str, &'a ParamValue),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_typed_accessors() {
        let id = Uuid::nil();
        let mut params = Params::new();
        params.push("id", ParamValue::Int(7));
        params.push("slug", ParamValue::Str("intro".to_string()));
        params.push("token", ParamValue::Uuid(id));
        params.push("rest", ParamValue::Path("a/b/c".to_string()));

        assert_eq!(params.int("id"), Some(7));
        assert_eq!(params.str("slug"), Some("intro"));
        assert_eq!(params.uuid("token"), Some(id));
        assert_eq!(params.str("rest"), Some("a/b/c"));

        // Wrong-kind lookups do not coerce
        assert_eq!(params.str("id"), None);
        assert_eq!(params.int("slug"), None);
    }

    #[test]
    fn test_names_keep_order() {
        let mut params = Params::new();
        params.push("org", ParamValue::Str("acme".to_string()));
        params.push("user", ParamValue::Int(1));

        let names: Vec<_> = params.names().collect();
        assert_eq!(names, vec!["org", "user"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::Int(42).to_string(), "42");
        assert_eq!(ParamValue::Str("x".to_string()).to_string(), "x");
        assert_eq!(
            ParamValue::Uuid(Uuid::nil()).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_params_many_params() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), ParamValue::Int(i));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.int("key5"), Some(5));
    }
}
