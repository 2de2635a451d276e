//! Wire shapes exchanged with the boundary layer

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelationError, RelationResult};

/// Body of an attach or detach request: `{"ids": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationIdsRequest {
    #[serde(default)]
    pub ids: Vec<Value>,
}

impl RelationIdsRequest {
    /// Decode a request payload; a missing body reads as no ids
    pub fn from_payload(payload: &Value) -> RelationResult<Self> {
        if payload.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(payload.clone())
            .map_err(|e| RelationError::invalid_payload(format!("expected {{\"ids\": [...]}}: {}", e)))
    }
}

/// Result of a mutation: `{"success": true, "message": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Framing of listed relation content: `{"data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Value,
}
