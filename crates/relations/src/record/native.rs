//! Native records - typed Rust values accessed through per-type field tables
//!
//! A type opts in by implementing [`Entity`] and declaring its fields once.
//! The declared getters and setters convert through `serde_json::Value`, so a
//! value that does not fit the field's type is rejected as `Unsettable`
//! instead of corrupting the record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use super::{FieldAccess, FieldKind};
use crate::error::{RelationError, RelationResult};

/// A native record type the engine can mutate by field name
pub trait Entity: Serialize + Clone + Debug + Send + Sync + 'static {
    /// Logical name of the entity, used in logs and errors
    fn entity_name() -> &'static str;

    /// Declare the fields reachable by name
    fn describe(fields: FieldTableBuilder<Self>) -> FieldTableBuilder<Self>;
}

type Getter<T> = Box<dyn Fn(&T) -> RelationResult<Value> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> RelationResult<()> + Send + Sync>;
type Resetter<T> = Box<dyn Fn(&mut T) + Send + Sync>;

struct FieldAccessor<T> {
    kind: FieldKind,
    get: Getter<T>,
    set: Setter<T>,
    reset: Resetter<T>,
}

/// Accessor table for one entity type
pub struct FieldTable<T> {
    entity: &'static str,
    fields: HashMap<String, FieldAccessor<T>>,
    order: Vec<String>,
}

impl<T> FieldTable<T> {
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Declared field names in declaration order
    pub fn field_names(&self) -> &[String] {
        &self.order
    }

    fn accessor(&self, name: &str) -> RelationResult<&FieldAccessor<T>> {
        self.fields
            .get(name)
            .ok_or_else(|| RelationError::field_not_found(name))
    }
}

impl<T> Debug for FieldTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTable")
            .field("entity", &self.entity)
            .field("fields", &self.order)
            .finish()
    }
}

/// Builder collecting the field declarations of an entity
pub struct FieldTableBuilder<T> {
    entity: &'static str,
    fields: Vec<(String, FieldAccessor<T>)>,
}

impl<T: 'static> FieldTableBuilder<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            fields: Vec::new(),
        }
    }

    /// Declare a plain field; its zero value is `F::default()`
    pub fn scalar<F, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        F: Serialize + DeserializeOwned + Default + 'static,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Scalar, get, set)
    }

    /// Declare an optional field; its zero value is `None`
    pub fn nullable<F, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        F: Serialize + DeserializeOwned + 'static,
        G: Fn(&T) -> Option<F> + Send + Sync + 'static,
        S: Fn(&mut T, Option<F>) + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Nullable, get, set)
    }

    /// Declare a sequence field; its zero value is an empty vector
    pub fn sequence<F, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        F: Serialize + DeserializeOwned + 'static,
        G: Fn(&T) -> Vec<F> + Send + Sync + 'static,
        S: Fn(&mut T, Vec<F>) + Send + Sync + 'static,
    {
        self.field(name, FieldKind::Sequence, get, set)
    }

    fn field<F, G, S>(mut self, name: &str, kind: FieldKind, get: G, set: S) -> Self
    where
        F: Serialize + DeserializeOwned + Default + 'static,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let set = Arc::new(set);
        let reset_set = Arc::clone(&set);
        let field_name = name.to_string();

        let accessor = FieldAccessor {
            kind,
            get: Box::new(move |record: &T| -> RelationResult<Value> {
                Ok(serde_json::to_value(get(record))?)
            }),
            set: Box::new(move |record: &mut T, value: Value| -> RelationResult<()> {
                let typed = serde_json::from_value::<F>(value)
                    .map_err(|e| RelationError::unsettable(field_name.as_str(), e.to_string()))?;
                set(record, typed);
                Ok(())
            }),
            reset: Box::new(move |record: &mut T| reset_set(record, F::default())),
        };

        self.fields.push((name.to_string(), accessor));
        self
    }

    /// Finish the table, rejecting duplicate or empty field names
    pub fn build(self) -> RelationResult<FieldTable<T>> {
        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(self.fields.len());
        let mut fields = HashMap::with_capacity(self.fields.len());

        for (name, accessor) in self.fields {
            if name.is_empty() {
                return Err(RelationError::configuration(format!(
                    "entity '{}' declares a field with an empty name",
                    self.entity
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(RelationError::configuration(format!(
                    "entity '{}' declares field '{}' more than once",
                    self.entity, name
                )));
            }
            order.push(name.clone());
            fields.insert(name, accessor);
        }

        Ok(FieldTable {
            entity: self.entity,
            fields,
            order,
        })
    }
}

/// Object-safe view of a native record
pub trait NativeAccess: FieldAccess + Debug + Send + Sync {
    fn entity_name(&self) -> &'static str;

    fn to_value(&self) -> RelationResult<Value>;

    fn clone_box(&self) -> Box<dyn NativeAccess>;

    fn as_any(&self) -> &dyn Any;
}

/// A native value paired with its accessor table
pub struct NativeRecord<T> {
    value: T,
    table: Arc<FieldTable<T>>,
}

impl<T: Entity> NativeRecord<T> {
    pub fn new(value: T, table: Arc<FieldTable<T>>) -> Self {
        Self { value, table }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Entity> Debug for NativeRecord<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRecord")
            .field("entity", &self.table.entity())
            .field("value", &self.value)
            .finish()
    }
}

impl<T: Entity> FieldAccess for NativeRecord<T> {
    fn get_field(&self, name: &str) -> RelationResult<Value> {
        (self.table.accessor(name)?.get)(&self.value)
    }

    fn set_field(&mut self, name: &str, value: Value) -> RelationResult<()> {
        (self.table.accessor(name)?.set)(&mut self.value, value)
    }

    fn reset_field(&mut self, name: &str) -> RelationResult<()> {
        (self.table.accessor(name)?.reset)(&mut self.value);
        Ok(())
    }

    fn field_kind(&self, name: &str) -> RelationResult<FieldKind> {
        Ok(self.table.accessor(name)?.kind)
    }
}

impl<T: Entity> NativeAccess for NativeRecord<T> {
    fn entity_name(&self) -> &'static str {
        self.table.entity()
    }

    fn to_value(&self) -> RelationResult<Value> {
        Ok(serde_json::to_value(&self.value)?)
    }

    fn clone_box(&self) -> Box<dyn NativeAccess> {
        Box::new(NativeRecord {
            value: self.value.clone(),
            table: Arc::clone(&self.table),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Comment {
        #[serde(rename = "ID")]
        id: u64,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Article {
        id: u64,
        owner_id: u64,
        cover: Option<Comment>,
        comments: Vec<Comment>,
    }

    impl Entity for Article {
        fn entity_name() -> &'static str {
            "articles"
        }

        fn describe(fields: FieldTableBuilder<Self>) -> FieldTableBuilder<Self> {
            fields
                .scalar("ID", |a: &Article| a.id, |a, v| a.id = v)
                .scalar("OwnerID", |a: &Article| a.owner_id, |a, v| a.owner_id = v)
                .nullable("Cover", |a: &Article| a.cover.clone(), |a, v| a.cover = v)
                .sequence("Comments", |a: &Article| a.comments.clone(), |a, v| a.comments = v)
        }
    }

    fn record() -> NativeRecord<Article> {
        let table = Article::describe(FieldTableBuilder::new(Article::entity_name()))
            .build()
            .unwrap();
        NativeRecord::new(
            Article {
                id: 1,
                owner_id: 7,
                cover: None,
                comments: vec![Comment { id: 10 }],
            },
            Arc::new(table),
        )
    }

    #[test]
    fn test_get_and_set_through_table() {
        let mut article = record();

        assert_eq!(article.get_field("OwnerID").unwrap(), json!(7));
        article.set_field("OwnerID", json!(9)).unwrap();
        assert_eq!(article.value().owner_id, 9);

        assert_eq!(article.get_slice_field("Comments").unwrap(), vec![json!({"ID": 10})]);
    }

    #[test]
    fn test_type_mismatch_is_unsettable() {
        let mut article = record();

        let err = article.set_field("OwnerID", json!("not-a-number")).unwrap_err();
        assert!(matches!(err, RelationError::Unsettable { ref field, .. } if field == "OwnerID"));
        assert_eq!(article.value().owner_id, 7);
    }

    #[test]
    fn test_unknown_field_and_wrong_kind() {
        let article = record();

        assert!(matches!(
            article.get_field("Missing"),
            Err(RelationError::FieldNotFound { .. })
        ));
        assert!(matches!(
            article.get_slice_field("OwnerID"),
            Err(RelationError::NotASequence { .. })
        ));
    }

    #[test]
    fn test_reset_uses_type_zero() {
        let mut article = record();
        article.set_field("Cover", json!({"ID": 3})).unwrap();

        article.reset_field("Cover").unwrap();
        article.reset_field("OwnerID").unwrap();
        article.reset_field("Comments").unwrap();

        assert!(article.value().cover.is_none());
        assert_eq!(article.value().owner_id, 0);
        assert!(article.value().comments.is_empty());
        assert_eq!(article.field_kind("Cover").unwrap(), FieldKind::Nullable);
    }

    #[test]
    fn test_duplicate_fields_rejected_at_build() {
        let result = FieldTableBuilder::<Article>::new("articles")
            .scalar("ID", |a: &Article| a.id, |a, v| a.id = v)
            .scalar("ID", |a: &Article| a.owner_id, |a, v| a.owner_id = v)
            .build();

        assert!(matches!(result, Err(RelationError::Configuration { .. })));
    }
}
