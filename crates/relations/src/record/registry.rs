//! Accessor Registry - builds each entity's field table once and shares it

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

use super::native::{Entity, FieldTable, FieldTableBuilder, NativeRecord};
use super::Record;
use crate::error::{RelationError, RelationResult};

/// Thread-safe store of per-type accessor tables
#[derive(Debug, Clone, Default)]
pub struct AccessorRegistry {
    tables: Arc<DashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl AccessorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type, building its table on first use
    pub fn register<T: Entity>(&self) -> RelationResult<Arc<FieldTable<T>>> {
        if let Some(table) = self.table::<T>() {
            return Ok(table);
        }

        let table = Arc::new(T::describe(FieldTableBuilder::new(T::entity_name())).build()?);
        tracing::debug!(
            target: "admin::relations",
            entity = T::entity_name(),
            fields = table.field_names().len(),
            "registered accessor table"
        );

        let stored = self
            .tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| table.clone() as Arc<dyn Any + Send + Sync>)
            .clone();

        Self::downcast::<T>(stored)
    }

    /// Get the table of an already registered entity type
    pub fn table<T: Entity>(&self) -> Option<Arc<FieldTable<T>>> {
        let stored = self.tables.get(&TypeId::of::<T>())?.clone();
        Self::downcast::<T>(stored).ok()
    }

    /// Check whether an entity type has been registered
    pub fn is_registered<T: Entity>(&self) -> bool {
        self.tables.contains_key(&TypeId::of::<T>())
    }

    /// Wrap a native value into a record
    pub fn record<T: Entity>(&self, value: T) -> RelationResult<Record> {
        let table = self.register::<T>()?;
        Ok(Record::Native(Box::new(NativeRecord::new(value, table))))
    }

    fn downcast<T: Entity>(stored: Arc<dyn Any + Send + Sync>) -> RelationResult<Arc<FieldTable<T>>> {
        stored.downcast::<FieldTable<T>>().map_err(|_| {
            RelationError::configuration(format!(
                "accessor table for '{}' has an unexpected type",
                T::entity_name()
            ))
        })
    }
}
