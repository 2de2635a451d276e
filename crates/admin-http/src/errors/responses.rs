//! HTTP error response formatting

use super::HttpError;
use admin_relations::RelationError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

impl HttpError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::StartupFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::UnknownResource { .. } => StatusCode::NOT_FOUND,
            HttpError::UnknownAction { .. } => StatusCode::NOT_FOUND,
            HttpError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Relation(err) => relation_status(err),
        }
    }

    /// Get error hint for user guidance
    pub fn error_hint(&self) -> Option<&'static str> {
        match self {
            HttpError::MethodNotAllowed { .. } => Some("Use the method listed in the Allow header"),
            HttpError::Relation(RelationError::EmptyOperand { .. }) => {
                Some("Send a JSON body of the form {\"ids\": [...]} with at least one id")
            }
            HttpError::Relation(RelationError::InvalidPayload { .. }) => {
                Some("Send a JSON body of the form {\"ids\": [...]}")
            }
            HttpError::Relation(err) if err.is_shape_violation() => {
                Some("The relation descriptor does not match the record's fields")
            }
            _ => None,
        }
    }
}

fn relation_status(err: &RelationError) -> StatusCode {
    match err {
        RelationError::EmptyOperand { .. }
        | RelationError::RelationNotFound { .. }
        | RelationError::FieldNotFound { .. }
        | RelationError::NotASequence { .. }
        | RelationError::Unsettable { .. }
        | RelationError::UnsupportedRelationType { .. }
        | RelationError::InvalidPayload { .. }
        | RelationError::MissingParentId { .. } => StatusCode::BAD_REQUEST,
        RelationError::NotFound { .. } => StatusCode::NOT_FOUND,
        RelationError::Upstream { .. }
        | RelationError::UnknownResource { .. }
        | RelationError::Serialization(_)
        | RelationError::Configuration { .. }
        | RelationError::Io(_)
        | RelationError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(target: "admin::http", code = self.error_code(), error = %message, "request failed");
        } else {
            tracing::debug!(target: "admin::http", code = self.error_code(), error = %message, "request rejected");
        }

        let body = json!({
            "success": false,
            "message": message,
            "error": {
                "code": self.error_code(),
                "message": message,
                "hint": self.error_hint()
            }
        });

        let mut response = (status, Json(body)).into_response();
        if let HttpError::MethodNotAllowed { allowed, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(allowed) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }
}
