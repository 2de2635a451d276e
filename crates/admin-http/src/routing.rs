//! Route table binding relation actions to HTTP verbs
//!
//! - `GET {prefix}/:resource/:id/relations/:relation` lists a relation
//! - `ANY {prefix}/:resource/:id/relations/:relation/:action` runs a named action
//! - `GET /health` reports liveness

use admin_relations::{ActionContext, ActionOutput, ListResponse, RelationError, RequestContext};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AdminConfig, AdminDefaults};
use crate::errors::{HttpError, HttpResult};
use crate::state::AdminState;

const REQUEST_ID_HEADER: &str = "x-request-id";
const LIST_ACTION: &str = "list";

/// Build the admin router for a configuration
pub fn admin_router(state: AdminState, config: &AdminConfig) -> Router {
    let relation_path = format!("{}/:resource/:id/relations/:relation", config.api_prefix);
    let action_path = format!("{}/:action", relation_path);

    Router::new()
        .route(AdminDefaults::HEALTH_CHECK_PATH, get(health))
        .route(&relation_path, get(list_relation))
        .route(&action_path, any(run_action))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AdminState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "resources": state.catalog().len(),
    }))
}

async fn list_relation(
    State(state): State<AdminState>,
    headers: HeaderMap,
    Path((resource, id, relation)): Path<(String, String, String)>,
) -> HttpResult<Response> {
    let request = ActionRequest {
        method: Method::GET,
        resource,
        id,
        relation,
        action: LIST_ACTION.to_string(),
    };
    dispatch(&state, &headers, request, Bytes::new()).await
}

async fn run_action(
    State(state): State<AdminState>,
    method: Method,
    headers: HeaderMap,
    Path((resource, id, relation, action)): Path<(String, String, String, String)>,
    body: Bytes,
) -> HttpResult<Response> {
    let request = ActionRequest {
        method,
        resource,
        id,
        relation,
        action,
    };
    dispatch(&state, &headers, request, body).await
}

struct ActionRequest {
    method: Method,
    resource: String,
    id: String,
    relation: String,
    action: String,
}

async fn dispatch(
    state: &AdminState,
    headers: &HeaderMap,
    request: ActionRequest,
    body: Bytes,
) -> HttpResult<Response> {
    let definition = state.resource(&request.resource)?;
    let action = state.action(&request.resource, &request.action)?;

    if request.method.as_str() != action.method.as_str() {
        return Err(HttpError::method_not_allowed(
            action.name.as_str(),
            request.method.as_str(),
            action.method.as_str(),
        ));
    }

    let payload = decode_payload(&body)?;
    let repository = state.repository(&request.resource)?;
    let ctx = ActionContext::new(request_context(headers))
        .with_parent(request.id)
        .with_relation(request.relation)
        .with_payload(payload);

    tracing::debug!(
        target: "admin::http",
        request_id = %ctx.request.request_id,
        resource = %request.resource,
        action = %action.name,
        "dispatching action"
    );

    let response = match action.invoke(&ctx, definition, repository).await? {
        ActionOutput::Outcome(outcome) => Json(outcome).into_response(),
        ActionOutput::Data(data) => Json(ListResponse { data }).into_response(),
    };
    Ok(response)
}

fn decode_payload(body: &Bytes) -> HttpResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| HttpError::from(RelationError::invalid_payload(format!("body is not valid JSON: {}", e))))
}

fn request_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(RequestContext::with_request_id)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_empty_body_decodes_to_null() {
        assert_eq!(decode_payload(&Bytes::new()).unwrap(), Value::Null);
        assert_eq!(decode_payload(&Bytes::from_static(b"  \n")).unwrap(), Value::Null);
        assert_eq!(
            decode_payload(&Bytes::from_static(br#"{"ids":[1]}"#)).unwrap(),
            json!({"ids": [1]})
        );
    }

    #[test]
    fn test_malformed_body_is_invalid_payload() {
        let err = decode_payload(&Bytes::from_static(b"{ids:")).unwrap_err();
        assert!(matches!(err, HttpError::Relation(RelationError::InvalidPayload { .. })));
    }

    #[test]
    fn test_request_id_header_is_propagated() {
        let mut headers = HeaderMap::new();
        assert!(!request_context(&headers).request_id.is_empty());

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        assert_eq!(request_context(&headers).request_id, "req-42");
    }
}
