//! Route template compilation and matching.
//!
//! A template such as `/users/{id:d}/posts/{slug}` compiles into an ordered
//! list of [`Segment`]s. Matching is a segment-by-segment comparison against
//! the request path; empty segments are ignored on both sides, so a trailing
//! slash (or a doubled slash) never changes the outcome.
//!
//! | Placeholder | Kind | Matches |
//! |-------------|------|---------|
//! | `{name}`, `{name:s}` | [`ParamKind::Str`] | one non-empty segment, no `/` once decoded |
//! | `{name:d}` | [`ParamKind::Int`] | one segment of ASCII digits |
//! | `{name:uuid}` | [`ParamKind::Uuid`] | one segment holding a UUID |
//! | `{name:path}` | [`ParamKind::Path`] | every remaining segment (last only) |

use std::fmt;

use uuid::Uuid;

use crate::error::RouteError;
use crate::params::{ParamValue, Params};

/// The declared type of a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A single segment kept as text.
    Str,
    /// A single segment of digits, converted to `i64`.
    Int,
    /// A single segment parsed as a UUID.
    Uuid,
    /// The rest of the path, segments re-joined with `/`.
    Path,
}

impl ParamKind {
    /// Maps a template type tag to a kind. A missing tag means [`ParamKind::Str`].
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Option<Self> {
        match tag {
            None | Some("s") => Some(Self::Str),
            Some("d") => Some(Self::Int),
            Some("uuid") => Some(Self::Uuid),
            Some("path") => Some(Self::Path),
            Some(_) => None,
        }
    }

    /// Returns the canonical tag for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Str => "s",
            Self::Int => "d",
            Self::Uuid => "uuid",
            Self::Path => "path",
        }
    }

    /// Converts one raw segment into a typed value, or `None` if it does not fit.
    fn capture(self, raw: &str) -> Option<ParamValue> {
        match self {
            Self::Str => decode(raw)
                .filter(|value| !value.contains('/'))
                .map(ParamValue::Str),
            Self::Int => {
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                raw.parse().ok().map(ParamValue::Int)
            }
            Self::Uuid => Uuid::parse_str(raw).ok().map(ParamValue::Uuid),
            Self::Path => decode(raw).map(ParamValue::Path),
        }
    }
}

fn decode(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(std::borrow::Cow::into_owned)
}

/// One compiled segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly (case-sensitive).
    Literal(String),
    /// Captures the request segment(s) as a typed parameter.
    Param {
        /// Parameter name as declared in the template.
        name: String,
        /// Declared type.
        kind: ParamKind,
    },
}

impl Segment {
    /// Whether two segments accept exactly the same request segments.
    fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Param { kind: a, .. }, Self::Param { kind: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.write_str(s),
            Self::Param { name, kind: ParamKind::Str } => write!(f, "{{{name}}}"),
            Self::Param { name, kind } => write!(f, "{{{name}:{}}}", kind.tag()),
        }
    }
}

/// A compiled route template.
///
/// # Example
///
/// ```rust
/// use poridhi_router::PathPattern;
///
/// let pattern = PathPattern::compile("/users/{id:d}").unwrap();
/// assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id"]);
///
/// let params = pattern.matches("/users/42").unwrap();
/// assert_eq!(params.int("id"), Some(42));
///
/// assert!(pattern.matches("/users/abc").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    param_count: usize,
}

impl PathPattern {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the template does not start with `/`,
    /// contains a partial or malformed placeholder, repeats a parameter name,
    /// uses an unknown type tag, or places a `path` parameter anywhere but last.
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        if !template.starts_with('/') {
            return Err(RouteError::invalid_template(template, "must start with '/'"));
        }

        let raw_segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut param_count = 0;

        for (index, raw) in raw_segments.iter().enumerate() {
            let segment = Self::compile_segment(template, raw)?;

            if let Segment::Param { name, kind } = &segment {
                let seen = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Param { name: n, .. } if n == name));
                if seen {
                    return Err(RouteError::DuplicateParam {
                        template: template.to_string(),
                        name: name.clone(),
                    });
                }
                if *kind == ParamKind::Path && index + 1 != raw_segments.len() {
                    return Err(RouteError::invalid_template(
                        template,
                        format!("path parameter '{name}' must be the last segment"),
                    ));
                }
                param_count += 1;
            }

            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
            param_count,
        })
    }

    fn compile_segment(template: &str, raw: &str) -> Result<Segment, RouteError> {
        let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            if raw.contains('{') || raw.contains('}') {
                return Err(RouteError::invalid_template(
                    template,
                    format!("segment '{raw}' mixes literal text and a placeholder"),
                ));
            }
            return Ok(Segment::Literal(raw.to_string()));
        };

        let (name, tag) = match inner.split_once(':') {
            Some((name, tag)) => (name, Some(tag)),
            None => (inner, None),
        };

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RouteError::invalid_template(
                template,
                format!("invalid parameter name in '{raw}'"),
            ));
        }

        let kind = ParamKind::from_tag(tag).ok_or_else(|| RouteError::UnknownParamType {
            template: template.to_string(),
            name: name.to_string(),
            tag: tag.unwrap_or_default().to_string(),
        })?;

        Ok(Segment::Param {
            name: name.to_string(),
            kind,
        })
    }

    /// Returns the template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the declared parameter names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether both patterns accept exactly the same set of paths.
    ///
    /// Parameter names are ignored; only literals and kinds count.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Matches a request path, returning the typed parameters on success.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut actual = path.split('/').filter(|s| !s.is_empty());
        let mut params = Params::with_capacity(self.param_count);

        for segment in &self.segments {
            match segment {
                Segment::Literal(expected) => {
                    if actual.next()? != expected {
                        return None;
                    }
                }
                Segment::Param {
                    name,
                    kind: ParamKind::Path,
                } => {
                    let rest: Vec<&str> = actual.by_ref().collect();
                    if rest.is_empty() {
                        return None;
                    }
                    params.push(name.clone(), ParamKind::Path.capture(&rest.join("/"))?);
                }
                Segment::Param { name, kind } => {
                    let value = kind.capture(actual.next()?)?;
                    params.push(name.clone(), value);
                }
            }
        }

        if actual.next().is_some() {
            return None;
        }

        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_literal() {
        let pattern = PathPattern::compile("/api/products").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("api".to_string()),
                Segment::Literal("products".to_string())
            ]
        );
        assert_eq!(pattern.param_names().count(), 0);
    }

    #[test]
    fn test_compile_typed_params() {
        let pattern = PathPattern::compile("/orgs/{org}/users/{id:d}/files/{rest:path}").unwrap();
        let names: Vec<_> = pattern.param_names().collect();
        assert_eq!(names, vec!["org", "id", "rest"]);
        assert_eq!(
            pattern.segments()[3],
            Segment::Param {
                name: "id".to_string(),
                kind: ParamKind::Int
            }
        );
    }

    #[test]
    fn test_compile_rejects_unknown_tag() {
        let err = PathPattern::compile("/users/{id:x}").unwrap_err();
        assert_eq!(
            err,
            RouteError::UnknownParamType {
                template: "/users/{id:x}".to_string(),
                name: "id".to_string(),
                tag: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_compile_rejects_empty_tag() {
        assert!(matches!(
            PathPattern::compile("/users/{id:}"),
            Err(RouteError::UnknownParamType { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_malformed() {
        assert!(PathPattern::compile("users").is_err());
        assert!(PathPattern::compile("/users/{id").is_err());
        assert!(PathPattern::compile("/users/user-{id}").is_err());
        assert!(PathPattern::compile("/users/{}").is_err());
        assert!(PathPattern::compile("/users/{first name}").is_err());
    }

    #[test]
    fn test_compile_rejects_duplicate_param() {
        assert!(matches!(
            PathPattern::compile("/a/{id}/b/{id:d}"),
            Err(RouteError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_path_not_last() {
        assert!(PathPattern::compile("/files/{rest:path}/meta").is_err());
    }

    #[test]
    fn test_match_literal_is_case_sensitive() {
        let pattern = PathPattern::compile("/home").unwrap();
        assert!(pattern.matches("/home").is_some());
        assert!(pattern.matches("/Home").is_none());
        assert!(pattern.matches("/home/extra").is_none());
        assert!(pattern.matches("/").is_none());
    }

    #[test]
    fn test_match_trailing_slash_normalized() {
        let pattern = PathPattern::compile("/books").unwrap();
        assert!(pattern.matches("/books/").is_some());
        assert!(pattern.matches("//books").is_some());

        let pattern = PathPattern::compile("/books/").unwrap();
        assert!(pattern.matches("/books").is_some());
    }

    #[test]
    fn test_match_root() {
        let pattern = PathPattern::compile("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("/x").is_none());
    }

    #[test]
    fn test_match_string_param() {
        let pattern = PathPattern::compile("/hello/{name}").unwrap();
        let params = pattern.matches("/hello/matt").unwrap();
        assert_eq!(params.str("name"), Some("matt"));
        assert!(pattern.matches("/hello").is_none());
        assert!(pattern.matches("/hello/matt/more").is_none());
    }

    #[test]
    fn test_match_string_param_is_percent_decoded() {
        let pattern = PathPattern::compile("/hello/{name}").unwrap();
        let params = pattern.matches("/hello/Jane%20Doe").unwrap();
        assert_eq!(params.str("name"), Some("Jane Doe"));
    }

    #[test]
    fn test_match_string_param_rejects_encoded_slash() {
        let pattern = PathPattern::compile("/hello/{name}").unwrap();
        assert!(pattern.matches("/hello/a%2Fb").is_none());
        assert!(pattern.matches("/hello/a%2fb").is_none());

        let tagged = PathPattern::compile("/hello/{name:s}").unwrap();
        assert!(tagged.matches("/hello/a%2Fb").is_none());
    }

    #[test]
    fn test_match_int_param() {
        let pattern = PathPattern::compile("/users/{id:d}").unwrap();
        assert_eq!(pattern.matches("/users/42").unwrap().int("id"), Some(42));
        assert_eq!(pattern.matches("/users/007").unwrap().int("id"), Some(7));
        assert!(pattern.matches("/users/abc").is_none());
        assert!(pattern.matches("/users/-1").is_none());
        assert!(pattern.matches("/users/+1").is_none());
        assert!(pattern.matches("/users/4x").is_none());
    }

    #[test]
    fn test_match_int_overflow_is_no_match() {
        let pattern = PathPattern::compile("/users/{id:d}").unwrap();
        assert!(pattern.matches("/users/99999999999999999999999").is_none());
    }

    #[test]
    fn test_match_uuid_param() {
        let pattern = PathPattern::compile("/tokens/{token:uuid}").unwrap();
        let params = pattern
            .matches("/tokens/67e55044-10b1-426f-9247-bb680e5fe0c8")
            .unwrap();
        assert_eq!(
            params.uuid("token").map(|u| u.to_string()),
            Some("67e55044-10b1-426f-9247-bb680e5fe0c8".to_string())
        );
        assert!(pattern.matches("/tokens/not-a-uuid").is_none());
    }

    #[test]
    fn test_match_path_remainder() {
        let pattern = PathPattern::compile("/static/{file:path}").unwrap();
        let params = pattern.matches("/static/css/site/main.css").unwrap();
        assert_eq!(params.str("file"), Some("css/site/main.css"));
        assert!(pattern.matches("/static").is_none());
        assert!(pattern.matches("/static/").is_none());
    }

    #[test]
    fn test_same_shape_ignores_names() {
        let a = PathPattern::compile("/users/{id:d}").unwrap();
        let b = PathPattern::compile("/users/{user_id:d}").unwrap();
        let c = PathPattern::compile("/users/{id}").unwrap();
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn test_display_canonical() {
        let pattern = PathPattern::compile("/users/{id:d}/{name:s}/").unwrap();
        assert_eq!(pattern.to_string(), "/users/{id:d}/{name}");
        assert_eq!(PathPattern::compile("/").unwrap().to_string(), "/");
    }
}
