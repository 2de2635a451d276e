//! Map-shaped records: an ordered string-keyed map of JSON values

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{FieldAccess, FieldKind};
use crate::error::{RelationError, RelationResult};

/// Generic record whose shape is only known at runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapRecord {
    fields: Map<String, Value>,
}

impl MapRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<Map<String, Value>> for MapRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for MapRecord {
    type Error = RelationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RelationError::invalid_payload(format!(
                "expected a JSON object for a map record, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl FieldAccess for MapRecord {
    fn get_field(&self, name: &str) -> RelationResult<Value> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| RelationError::field_not_found(name))
    }

    // Map records accept any key, so setting never fails.
    fn set_field(&mut self, name: &str, value: Value) -> RelationResult<()> {
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    fn reset_field(&mut self, name: &str) -> RelationResult<()> {
        let zero = match self.fields.get(name) {
            Some(current) => zero_like(current),
            None => Value::Null,
        };
        self.fields.insert(name.to_string(), zero);
        Ok(())
    }

    fn field_kind(&self, name: &str) -> RelationResult<FieldKind> {
        match self.fields.get(name) {
            Some(Value::Array(_)) => Ok(FieldKind::Sequence),
            Some(Value::Null) | Some(Value::Object(_)) => Ok(FieldKind::Nullable),
            Some(_) => Ok(FieldKind::Scalar),
            None => Err(RelationError::field_not_found(name)),
        }
    }
}

/// Zero value of the same JSON type as `value`
fn zero_like(value: &Value) -> Value {
    match value {
        Value::Number(_) => Value::from(0),
        Value::String(_) => Value::String(String::new()),
        Value::Bool(_) => Value::Bool(false),
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(_) | Value::Null => Value::Null,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
