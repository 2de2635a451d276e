//! Relation Resolver - cross-entity fetches and read-only relation listing

use serde_json::Value;

use crate::error::{RelationError, RelationResult};
use crate::identity::{canonical_id, is_zero_id};
use crate::metadata::{RelationDescriptor, RelationKind};
use crate::record::{FieldAccess, Record};
use crate::repository::{Repository, RequestContext};

/// Fetch a single related record
pub async fn fetch_one(
    repository: &dyn Repository,
    ctx: &RequestContext,
    id: &Value,
) -> RelationResult<Record> {
    let id = canonical_id(id);
    repository.get(ctx, &id).await
}

/// Fetch related records in input order; the first failure aborts the call
pub async fn fetch_many(
    repository: &dyn Repository,
    ctx: &RequestContext,
    ids: &[Value],
) -> RelationResult<Vec<Record>> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        records.push(fetch_one(repository, ctx, id).await?);
    }
    Ok(records)
}

/// Resolve the current content of a relation for listing.
///
/// ManyToMany content is returned as the stored ids; they are not expanded
/// into records.
pub async fn resolve_for_list<P>(
    parent: &P,
    descriptor: &RelationDescriptor,
    repository: &dyn Repository,
    ctx: &RequestContext,
) -> RelationResult<Value>
where
    P: FieldAccess + ?Sized,
{
    match &descriptor.relation_type {
        RelationKind::OneToOne => parent.get_field(&descriptor.field),
        RelationKind::ManyToOne => {
            let foreign_key = parent.get_field(&descriptor.foreign_key())?;
            if is_zero_id(&foreign_key) {
                return Ok(Value::Null);
            }
            fetch_one(repository, ctx, &foreign_key).await?.to_value()
        }
        RelationKind::OneToMany | RelationKind::ManyToMany => {
            Ok(Value::Array(parent.get_slice_field(&descriptor.field)?))
        }
        RelationKind::Other(kind) => Err(RelationError::unsupported(&descriptor.name, kind.as_str())),
    }
}
