//! Mutation Engine - attach and detach relation members on a parent record
//!
//! Both operations mutate the parent in place and never persist. A failure in
//! the middle of a multi-id attach leaves the members appended so far in the
//! in-memory parent; the caller decides whether to commit.

use serde_json::Value;
use std::collections::HashSet;

use crate::error::{RelationError, RelationResult};
use crate::identity::{canonical_id, element_identity};
use crate::metadata::{RelationDescriptor, RelationKind};
use crate::record::{FieldAccess, FieldKind};
use crate::repository::{Repository, RequestContext};
use crate::resolver::fetch_one;

/// Add members to a relation, or point it at a new target
pub async fn attach<P>(
    parent: &mut P,
    descriptor: &RelationDescriptor,
    ids: &[Value],
    repository: &dyn Repository,
    ctx: &RequestContext,
) -> RelationResult<()>
where
    P: FieldAccess + ?Sized,
{
    let first = ids
        .first()
        .ok_or_else(|| RelationError::empty_operand("attach"))?;

    tracing::debug!(
        target: "admin::relations",
        request_id = %ctx.request_id,
        relation = %descriptor.name,
        relation_type = %descriptor.relation_type,
        ids = ids.len(),
        "attach"
    );

    match &descriptor.relation_type {
        RelationKind::OneToOne => {
            let related = fetch_one(repository, ctx, first).await?;
            parent.set_field(&descriptor.field, related.to_value()?)
        }
        RelationKind::OneToMany => {
            // Append one at a time so a failed fetch keeps earlier members.
            for id in ids {
                let related = fetch_one(repository, ctx, id).await?;
                let mut members = parent.get_slice_field(&descriptor.field)?;
                members.push(related.to_value()?);
                parent.set_field(&descriptor.field, Value::Array(members))?;
            }
            Ok(())
        }
        RelationKind::ManyToOne => {
            // Existence check only; the raw id is what gets stored.
            fetch_one(repository, ctx, first).await?;
            parent.set_field(&descriptor.foreign_key(), first.clone())
        }
        RelationKind::ManyToMany => {
            let mut members = parent.get_slice_field(&descriptor.field)?;
            for id in ids {
                if !members.contains(id) {
                    members.push(id.clone());
                }
            }
            parent.set_field(&descriptor.field, Value::Array(members))
        }
        RelationKind::Other(kind) => Err(RelationError::unsupported(&descriptor.name, kind.as_str())),
    }
}

/// Remove members from a relation, or clear its target
pub fn detach<P>(parent: &mut P, descriptor: &RelationDescriptor, ids: &[Value]) -> RelationResult<()>
where
    P: FieldAccess + ?Sized,
{
    if ids.is_empty() {
        return Err(RelationError::empty_operand("detach"));
    }

    tracing::debug!(
        target: "admin::relations",
        relation = %descriptor.name,
        relation_type = %descriptor.relation_type,
        ids = ids.len(),
        "detach"
    );

    match &descriptor.relation_type {
        RelationKind::OneToOne => match parent.field_kind(&descriptor.field)? {
            FieldKind::Nullable => parent.set_field(&descriptor.field, Value::Null),
            FieldKind::Scalar | FieldKind::Sequence => Err(RelationError::unsettable(
                &descriptor.field,
                "field cannot hold an empty value",
            )),
        },
        RelationKind::OneToMany => {
            let removed: HashSet<String> = ids.iter().map(canonical_id).collect();
            let members: Vec<Value> = parent
                .get_slice_field(&descriptor.field)?
                .into_iter()
                .filter(|member| {
                    element_identity(member)
                        .map(|identity| !removed.contains(&identity))
                        .unwrap_or(true)
                })
                .collect();
            parent.set_field(&descriptor.field, Value::Array(members))
        }
        // The supplied ids are not consulted: the foreign key is always cleared.
        RelationKind::ManyToOne => parent.reset_field(&descriptor.foreign_key()),
        RelationKind::ManyToMany => {
            let members: Vec<Value> = parent
                .get_slice_field(&descriptor.field)?
                .into_iter()
                .filter(|member| !ids.contains(member))
                .collect();
            parent.set_field(&descriptor.field, Value::Array(members))
        }
        RelationKind::Other(kind) => Err(RelationError::unsupported(&descriptor.name, kind.as_str())),
    }
}
