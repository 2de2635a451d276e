//! HTTP boundary error types
//!
//! Engine failures pass through unchanged as [`HttpError::Relation`]; the
//! remaining variants are raised by the boundary itself.

use admin_relations::RelationError;
use thiserror::Error;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// HTTP server errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Server startup failed: {message}")]
    StartupFailed { message: String },

    #[error("Unknown resource: {resource}")]
    UnknownResource { resource: String },

    #[error("Unknown action '{action}' on {resource}")]
    UnknownAction { resource: String, action: String },

    #[error("Action '{action}' does not accept {method}; use {allowed}")]
    MethodNotAllowed {
        action: String,
        method: String,
        allowed: String,
    },

    #[error("Internal server error: {message}")]
    InternalError { message: String },

    #[error(transparent)]
    Relation(#[from] RelationError),
}

impl HttpError {
    /// Create a startup error
    pub fn startup<T: Into<String>>(message: T) -> Self {
        HttpError::StartupFailed {
            message: message.into(),
        }
    }

    /// Create an unknown resource error
    pub fn unknown_resource<T: Into<String>>(resource: T) -> Self {
        HttpError::UnknownResource {
            resource: resource.into(),
        }
    }

    /// Create an unknown action error
    pub fn unknown_action<R: Into<String>, A: Into<String>>(resource: R, action: A) -> Self {
        HttpError::UnknownAction {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Create a method mismatch error
    pub fn method_not_allowed<A, M, E>(action: A, method: M, allowed: E) -> Self
    where
        A: Into<String>,
        M: Into<String>,
        E: Into<String>,
    {
        HttpError::MethodNotAllowed {
            action: action.into(),
            method: method.into(),
            allowed: allowed.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::StartupFailed { .. } => "SERVER_STARTUP_FAILED",
            HttpError::UnknownResource { .. } => "RESOURCE_NOT_FOUND",
            HttpError::UnknownAction { .. } => "ACTION_NOT_FOUND",
            HttpError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            HttpError::InternalError { .. } => "INTERNAL_ERROR",
            HttpError::Relation(err) => err.error_code(),
        }
    }
}
