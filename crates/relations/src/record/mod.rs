//! Record Accessor - uniform field access over native and map-shaped records
//!
//! Parent records reach the engine either as a generic ordered map or as a
//! native Rust type registered in an [`AccessorRegistry`]. Both implement
//! [`FieldAccess`], which is the only surface the resolver and the mutation
//! engine depend on.

pub mod map;
pub mod native;
pub mod registry;

pub use map::MapRecord;
pub use native::{Entity, FieldTable, FieldTableBuilder, NativeAccess, NativeRecord};
pub use registry::AccessorRegistry;

use serde_json::Value;

use crate::error::{RelationError, RelationResult};

/// Shape of a record field as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain value with a non-null zero value
    Scalar,
    /// A value that can be cleared to null
    Nullable,
    /// An ordered sequence of values
    Sequence,
}

/// Capability to read and write named fields on a record.
///
/// Mutations happen in place; nothing here persists.
pub trait FieldAccess {
    /// Read the field's current value
    fn get_field(&self, name: &str) -> RelationResult<Value>;

    /// Write a value into the field
    fn set_field(&mut self, name: &str, value: Value) -> RelationResult<()>;

    /// Reset the field to the zero value of its type
    fn reset_field(&mut self, name: &str) -> RelationResult<()>;

    /// Report the shape of the field
    fn field_kind(&self, name: &str) -> RelationResult<FieldKind>;

    /// Read a field that must hold a sequence
    fn get_slice_field(&self, name: &str) -> RelationResult<Vec<Value>> {
        if self.field_kind(name)? != FieldKind::Sequence {
            return Err(RelationError::not_a_sequence(name));
        }

        match self.get_field(name)? {
            Value::Array(items) => Ok(items),
            _ => Err(RelationError::not_a_sequence(name)),
        }
    }
}

/// A parent or related record of either shape
#[derive(Debug)]
pub enum Record {
    Map(MapRecord),
    Native(Box<dyn NativeAccess>),
}

impl Record {
    /// Build a map record from a JSON object
    pub fn from_value(value: Value) -> RelationResult<Self> {
        Ok(Record::Map(MapRecord::try_from(value)?))
    }

    /// Serialize the whole record to JSON
    pub fn to_value(&self) -> RelationResult<Value> {
        match self {
            Record::Map(map) => Ok(map.to_value()),
            Record::Native(native) => native.to_value(),
        }
    }

    /// Borrow the native value if this record wraps a `T`
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        match self {
            Record::Native(native) => native
                .as_any()
                .downcast_ref::<NativeRecord<T>>()
                .map(NativeRecord::value),
            Record::Map(_) => None,
        }
    }

    /// Borrow the map if this is a map record
    pub fn as_map(&self) -> Option<&MapRecord> {
        match self {
            Record::Map(map) => Some(map),
            Record::Native(_) => None,
        }
    }

    /// Short description of the record shape, used in logs
    pub fn shape(&self) -> &str {
        match self {
            Record::Map(_) => "map",
            Record::Native(native) => native.entity_name(),
        }
    }
}

impl Clone for Record {
    fn clone(&self) -> Self {
        match self {
            Record::Map(map) => Record::Map(map.clone()),
            Record::Native(native) => Record::Native(native.clone_box()),
        }
    }
}

impl From<MapRecord> for Record {
    fn from(map: MapRecord) -> Self {
        Record::Map(map)
    }
}

impl FieldAccess for Record {
    fn get_field(&self, name: &str) -> RelationResult<Value> {
        match self {
            Record::Map(map) => map.get_field(name),
            Record::Native(native) => native.get_field(name),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> RelationResult<()> {
        match self {
            Record::Map(map) => map.set_field(name, value),
            Record::Native(native) => native.set_field(name, value),
        }
    }

    fn reset_field(&mut self, name: &str) -> RelationResult<()> {
        match self {
            Record::Map(map) => map.reset_field(name),
            Record::Native(native) => native.reset_field(name),
        }
    }

    fn field_kind(&self, name: &str) -> RelationResult<FieldKind> {
        match self {
            Record::Map(map) => map.field_kind(name),
            Record::Native(native) => native.field_kind(name),
        }
    }
}
