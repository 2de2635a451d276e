//! Shared router state - catalog, repositories and the actions bound to them

use admin_relations::{
    canonical_id, is_zero_id, relation_actions, Action, InMemoryRepository, MapRecord, RelationError,
    RelationResult, Repository, RepositoryProvider, RepositoryRegistry, ResourceCatalog, ResourceDefinition,
    IDENTITY_FIELD,
};
use std::sync::Arc;

use crate::errors::{HttpError, HttpResult};

/// State handed to every route handler
#[derive(Clone, Debug)]
pub struct AdminState {
    catalog: Arc<ResourceCatalog>,
    repositories: Arc<RepositoryRegistry>,
    actions: Arc<Vec<Action>>,
}

impl AdminState {
    /// Bind the relation actions to the given repositories
    pub fn new(catalog: ResourceCatalog, repositories: RepositoryRegistry) -> Self {
        let repositories = Arc::new(repositories);
        let actions = relation_actions(repositories.clone());

        Self {
            catalog: Arc::new(catalog),
            repositories,
            actions: Arc::new(actions),
        }
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Look up a catalogued resource
    pub fn resource(&self, name: &str) -> HttpResult<&ResourceDefinition> {
        self.catalog
            .get(name)
            .ok_or_else(|| HttpError::unknown_resource(name))
    }

    /// Repository serving a catalogued resource
    pub fn repository(&self, name: &str) -> HttpResult<Arc<dyn Repository>> {
        self.repositories
            .repository(name)
            .ok_or_else(|| HttpError::from(RelationError::unknown_resource(name)))
    }

    /// Look up an action by name
    pub fn action(&self, resource: &str, name: &str) -> HttpResult<&Action> {
        self.actions
            .iter()
            .find(|action| action.name == name)
            .ok_or_else(|| HttpError::unknown_action(resource, name))
    }
}

/// Build one in-memory repository per catalogued resource, seeded from its fixtures.
///
/// Fixtures are keyed by the canonical form of their `ID` field.
pub fn seed_repositories(catalog: &ResourceCatalog) -> RelationResult<RepositoryRegistry> {
    let mut registry = RepositoryRegistry::new();

    for resource in catalog.resources() {
        let repository = InMemoryRepository::new(resource.name.as_str());

        for fixture in &resource.fixtures {
            let record = MapRecord::try_from(fixture.clone())?;
            let id = match record.get(IDENTITY_FIELD) {
                Some(id) if !is_zero_id(id) => canonical_id(id),
                _ => {
                    return Err(RelationError::configuration(format!(
                        "fixture of '{}' has no '{}' field",
                        resource.name, IDENTITY_FIELD
                    )))
                }
            };
            repository.insert(id, record);
        }

        tracing::debug!(
            target: "admin::catalog",
            resource = %resource.name,
            records = repository.len(),
            "seeded in-memory repository"
        );
        registry.register(Arc::new(repository));
    }

    Ok(registry)
}
