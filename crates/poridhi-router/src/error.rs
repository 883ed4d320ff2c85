//! Registration-time routing errors.

use thiserror::Error;

/// Errors raised while compiling templates or registering routes.
///
/// All of these surface at startup. Request-time outcomes such as
/// "not found" are not errors; see [`Resolution`](crate::Resolution).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The template is syntactically malformed.
    #[error("invalid route template '{template}': {reason}")]
    InvalidTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A placeholder carries a type tag that is not recognized.
    #[error("unknown parameter type '{tag}' for '{name}' in route template '{template}'")]
    UnknownParamType {
        /// The offending template.
        template: String,
        /// Parameter name.
        name: String,
        /// The unrecognized tag.
        tag: String,
    },

    /// The same parameter name appears twice in one template.
    #[error("duplicate parameter '{name}' in route template '{template}'")]
    DuplicateParam {
        /// The offending template.
        template: String,
        /// Parameter name.
        name: String,
    },

    /// The exact template string is already registered.
    #[error("route '{template}' is already registered")]
    DuplicateRoute {
        /// The duplicated template.
        template: String,
    },

    /// An explicitly allowed method is not implemented by the handler.
    #[error("route '{template}' allows {method} but its handler does not implement it")]
    UnsupportedMethod {
        /// Route template.
        template: String,
        /// The unimplemented method.
        method: String,
    },

    /// The handler implements no methods at all.
    #[error("route '{template}' has a handler that implements no methods")]
    EmptyHandler {
        /// Route template.
        template: String,
    },

    /// An explicit method list was empty.
    #[error("route '{template}' allows no methods")]
    NoMethods {
        /// Route template.
        template: String,
    },

    /// A method name could not be parsed.
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
}

impl RouteError {
    /// Creates an invalid template error.
    pub fn invalid_template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            reason: reason.into(),
        }
    }
}
