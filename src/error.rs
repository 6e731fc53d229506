//! Error taxonomy shared by every endpoint call.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FebosError>;

#[derive(Debug, Error)]
pub enum FebosError {
    /// A `{placeholder}` in a path template had no bound value. Raised before any I/O.
    #[error("no value bound for placeholder {{{placeholder}}} in {template}")]
    TemplateBinding { placeholder: String, template: String },

    /// An authenticated endpoint was invoked before a successful login.
    #[error("endpoint {endpoint} requires a bearer token; log in first")]
    NotAuthenticated { endpoint: &'static str },

    /// Login was rejected or its response carried no token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("http {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid {entity} at {field}: {reason}")]
    Validation {
        entity: &'static str,
        field: String,
        reason: String,
    },

    /// A list argument that must be non-empty was empty. Raised before any I/O.
    #[error("{field} must not be empty")]
    EmptyInput { field: &'static str },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FebosError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FebosError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
