//! # admin-relations: Relation engine for admin resource APIs
//!
//! Attaches, detaches and lists related records across the four relation
//! cardinalities (one-to-one, one-to-many, many-to-one, many-to-many) on
//! records whose shape is only known at runtime.
//!
//! The pieces, leaves first:
//! - [`record`]: uniform field access over map and native records
//! - [`resolver`]: cross-entity fetches and read-only listing
//! - [`mutation`]: attach/detach semantics per relation kind
//! - [`coordinator`]: load, mutate and commit a parent through its repository
//! - [`action`]: the named operations exposed to the HTTP boundary

pub mod action;
pub mod coordinator;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod mutation;
pub mod record;
pub mod repository;
pub mod resolver;
pub mod resource;
pub mod wire;

pub use action::{relation_actions, Action, ActionContext, ActionHandler, ActionMethod, ActionOutput};
pub use coordinator::RelationCoordinator;
pub use error::{RelationError, RelationResult};
pub use identity::{canonical_id, is_zero_id, FOREIGN_KEY_SUFFIX, IDENTITY_FIELD};
pub use metadata::{RelationDescriptor, RelationKind};
pub use mutation::{attach, detach};
pub use record::{
    AccessorRegistry, Entity, FieldAccess, FieldKind, FieldTable, FieldTableBuilder, MapRecord, NativeRecord,
    Record,
};
pub use repository::{InMemoryRepository, Repository, RepositoryProvider, RepositoryRegistry, RequestContext};
pub use resolver::{fetch_many, fetch_one, resolve_for_list};
pub use resource::{Resource, ResourceCatalog, ResourceDefinition};
pub use wire::{ListResponse, OperationOutcome, RelationIdsRequest};
