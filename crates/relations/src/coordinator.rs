//! Persistence Coordinator - load, mutate and commit a parent record
//!
//! Each call loads the parent fresh from its repository, applies one
//! relation operation in memory and writes the parent back. Any failure
//! short-circuits and is returned unchanged; nothing is committed in that case.

use serde_json::Value;
use std::sync::Arc;

use crate::error::{RelationError, RelationResult};
use crate::metadata::RelationDescriptor;
use crate::mutation::{attach, detach};
use crate::record::Record;
use crate::repository::{Repository, RepositoryProvider, RequestContext};
use crate::resolver::resolve_for_list;
use crate::resource::Resource;
use crate::wire::OperationOutcome;

/// Relation operations for the records of one resource
pub struct RelationCoordinator {
    resource: String,
    relations: Vec<RelationDescriptor>,
    repository: Arc<dyn Repository>,
    repositories: Arc<dyn RepositoryProvider>,
}

impl RelationCoordinator {
    /// Create a coordinator from the owning resource's descriptors.
    ///
    /// `repository` serves the parent records; `repositories` resolves the
    /// targets named by each descriptor's `resource_name`.
    pub fn new(
        resource: &dyn Resource,
        repository: Arc<dyn Repository>,
        repositories: Arc<dyn RepositoryProvider>,
    ) -> Self {
        Self {
            resource: resource.name().to_string(),
            relations: resource.relations().to_vec(),
            repository,
            repositories,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Look up a relation descriptor by name
    pub fn descriptor(&self, relation: &str) -> RelationResult<&RelationDescriptor> {
        self.relations
            .iter()
            .find(|descriptor| descriptor.name == relation)
            .ok_or_else(|| RelationError::relation_not_found(relation))
    }

    /// Repository holding the targets of a relation.
    ///
    /// An empty `resource_name` points back at the parent's own repository.
    pub fn related_repository(&self, descriptor: &RelationDescriptor) -> RelationResult<Arc<dyn Repository>> {
        if descriptor.resource_name.is_empty() {
            return Ok(Arc::clone(&self.repository));
        }
        self.repositories
            .repository(&descriptor.resource_name)
            .ok_or_else(|| RelationError::unknown_resource(&descriptor.resource_name))
    }

    /// Repository handed to the engine for one operation.
    ///
    /// Kinds that never read targets get the parent repository, so their
    /// `resource_name` need not be registered.
    fn target_repository(&self, descriptor: &RelationDescriptor, fetches: bool) -> RelationResult<Arc<dyn Repository>> {
        if fetches {
            self.related_repository(descriptor)
        } else {
            Ok(Arc::clone(&self.repository))
        }
    }

    /// Attach ids to a relation of the parent and persist the parent
    pub async fn attach(
        &self,
        ctx: &RequestContext,
        parent_id: &str,
        relation: &str,
        ids: &[Value],
    ) -> RelationResult<OperationOutcome> {
        let mut parent = self.repository.get(ctx, parent_id).await?;
        let descriptor = self.descriptor(relation)?;
        let related = self.target_repository(descriptor, descriptor.relation_type.fetches_on_attach())?;

        attach(&mut parent, descriptor, ids, related.as_ref(), ctx).await?;
        self.commit(ctx, parent_id, parent, descriptor).await?;

        Ok(OperationOutcome::success(format!(
            "Attached {} item(s) to {} '{}' of {} {}",
            ids.len(),
            descriptor.relation_type,
            descriptor.name,
            self.resource,
            parent_id
        )))
    }

    /// Detach ids from a relation of the parent and persist the parent
    pub async fn detach(
        &self,
        ctx: &RequestContext,
        parent_id: &str,
        relation: &str,
        ids: &[Value],
    ) -> RelationResult<OperationOutcome> {
        let mut parent = self.repository.get(ctx, parent_id).await?;
        let descriptor = self.descriptor(relation)?;

        detach(&mut parent, descriptor, ids)?;
        self.commit(ctx, parent_id, parent, descriptor).await?;

        Ok(OperationOutcome::success(format!(
            "Detached {} item(s) from {} '{}' of {} {}",
            ids.len(),
            descriptor.relation_type,
            descriptor.name,
            self.resource,
            parent_id
        )))
    }

    /// Resolve the current content of a relation without mutating anything
    pub async fn list(&self, ctx: &RequestContext, parent_id: &str, relation: &str) -> RelationResult<Value> {
        let parent = self.repository.get(ctx, parent_id).await?;
        let descriptor = self.descriptor(relation)?;
        let related = self.target_repository(descriptor, descriptor.relation_type.fetches_on_list())?;

        resolve_for_list(&parent, descriptor, related.as_ref(), ctx).await
    }

    async fn commit(
        &self,
        ctx: &RequestContext,
        parent_id: &str,
        parent: Record,
        descriptor: &RelationDescriptor,
    ) -> RelationResult<()> {
        self.repository.update(ctx, parent_id, parent).await?;

        tracing::info!(
            target: "admin::relations",
            request_id = %ctx.request_id,
            resource = %self.resource,
            parent_id,
            relation = %descriptor.name,
            "relation change committed"
        );

        Ok(())
    }
}

impl std::fmt::Debug for RelationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationCoordinator")
            .field("resource", &self.resource)
            .field("relations", &self.relations)
            .finish()
    }
}
