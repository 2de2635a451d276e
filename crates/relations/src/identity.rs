//! Identifier helpers
//!
//! Ids arrive from the transport as JSON scalars: a numeric id decoded from a
//! request body may be a float while the matching record field is an integer.
//! `canonical_id` gives both the same string form. It is only ever used for
//! comparisons and repository lookups, never stored.

use serde_json::Value;
use uuid::Uuid;

/// Conventional name of the identity field on related records
pub const IDENTITY_FIELD: &str = "ID";

/// Suffix appended to a ManyToOne relation name to form its foreign key field
pub const FOREIGN_KEY_SUFFIX: &str = "ID";

// Integral floats beyond this lose precision when cast to i64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Render an id value in its canonical string form
pub fn canonical_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
                        (f as i64).to_string()
                    }
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Check whether an id value is the zero value of its type
pub fn is_zero_id(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => {
            s.is_empty() || Uuid::parse_str(s).map(|id| id.is_nil()).unwrap_or(false)
        }
        Value::Bool(b) => !b,
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Read the identity of a related record element, if it has one
pub fn element_identity(element: &Value) -> Option<String> {
    element
        .as_object()
        .and_then(|object| object.get(IDENTITY_FIELD))
        .map(canonical_id)
}
