//! Repository contracts consumed by the engine
//!
//! The engine only ever reads a record by id and writes it back. Creating,
//! deleting and listing records belong to other layers.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{RelationError, RelationResult};
use crate::record::Record;

/// Per-request context handed to every repository call
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Create a context with a fresh request id
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a context carrying an existing request id
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistence abstraction for one resource
#[async_trait]
pub trait Repository: Send + Sync {
    /// Name of the resource this repository serves
    fn resource_name(&self) -> &str;

    /// Fetch a record by id, failing with `NotFound` if absent
    async fn get(&self, ctx: &RequestContext, id: &str) -> RelationResult<Record>;

    /// Persist a record under the given id
    async fn update(&self, ctx: &RequestContext, id: &str, record: Record) -> RelationResult<Record>;
}

/// Looks up repositories of related resources by name
pub trait RepositoryProvider: Send + Sync {
    fn repository(&self, resource: &str) -> Option<Arc<dyn Repository>>;
}

/// Explicitly populated set of repositories keyed by resource name
#[derive(Clone, Default)]
pub struct RepositoryRegistry {
    repositories: HashMap<String, Arc<dyn Repository>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository under its own resource name
    pub fn register(&mut self, repository: Arc<dyn Repository>) -> &mut Self {
        self.repositories
            .insert(repository.resource_name().to_string(), repository);
        self
    }

    /// Register a repository, builder style
    pub fn with(mut self, repository: Arc<dyn Repository>) -> Self {
        self.register(repository);
        self
    }

    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.repositories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryRegistry")
            .field("resources", &self.resource_names())
            .finish()
    }
}

impl RepositoryProvider for RepositoryRegistry {
    fn repository(&self, resource: &str) -> Option<Arc<dyn Repository>> {
        self.repositories.get(resource).cloned()
    }
}

/// In-process repository with last-write-wins updates
#[derive(Debug)]
pub struct InMemoryRepository {
    resource: String,
    records: DashMap<String, Record>,
}

impl InMemoryRepository {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            records: DashMap::new(),
        }
    }

    /// Store a record, replacing any previous one with the same id
    pub fn insert(&self, id: impl Into<String>, record: impl Into<Record>) {
        self.records.insert(id.into(), record.into());
    }

    /// Store a record, builder style
    pub fn with_record(self, id: impl Into<String>, record: impl Into<Record>) -> Self {
        self.insert(id, record);
        self
    }

    /// Read a stored record without going through the async contract
    pub fn snapshot(&self, id: &str) -> Option<Record> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    fn resource_name(&self) -> &str {
        &self.resource
    }

    async fn get(&self, _ctx: &RequestContext, id: &str) -> RelationResult<Record> {
        self.snapshot(id)
            .ok_or_else(|| RelationError::not_found(self.resource.as_str(), id))
    }

    async fn update(&self, ctx: &RequestContext, id: &str, record: Record) -> RelationResult<Record> {
        match self.records.get_mut(id) {
            Some(mut entry) => {
                *entry = record.clone();
                tracing::trace!(
                    target: "admin::repository",
                    request_id = %ctx.request_id,
                    resource = %self.resource,
                    id,
                    "record replaced"
                );
                Ok(record)
            }
            None => Err(RelationError::not_found(self.resource.as_str(), id)),
        }
    }
}
