//! Action contract - named operations the boundary layer binds to HTTP verbs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::coordinator::RelationCoordinator;
use crate::error::{RelationError, RelationResult};
use crate::repository::{Repository, RepositoryProvider, RequestContext};
use crate::resource::ResourceDefinition;
use crate::wire::{OperationOutcome, RelationIdsRequest};

/// HTTP verb an action is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ActionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionMethod::Get => "GET",
            ActionMethod::Post => "POST",
            ActionMethod::Put => "PUT",
            ActionMethod::Patch => "PATCH",
            ActionMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ActionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the boundary layer extracted from the request
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub request: RequestContext,
    pub parent_id: Option<String>,
    pub relation: Option<String>,
    pub payload: Value,
}

impl ActionContext {
    pub fn new(request: RequestContext) -> Self {
        Self {
            request,
            parent_id: None,
            relation: None,
            payload: Value::Null,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    fn require_parent(&self, action: &str) -> RelationResult<&str> {
        self.parent_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RelationError::MissingParentId {
                action: action.to_string(),
            })
    }

    fn require_relation(&self) -> RelationResult<&str> {
        self.relation
            .as_deref()
            .ok_or_else(|| RelationError::relation_not_found(""))
    }
}

/// What an action produced
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    /// Result of a mutation
    Outcome(OperationOutcome),
    /// Read-only content, framed as `{"data": ...}` by the boundary
    Data(Value),
}

/// Handler invoked for an action
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &ActionContext,
        resource: &ResourceDefinition,
        repository: Arc<dyn Repository>,
    ) -> RelationResult<ActionOutput>;
}

/// A named operation bound to an HTTP verb
#[derive(Clone)]
pub struct Action {
    pub name: String,
    pub method: ActionMethod,
    pub requires_parent_id: bool,
    pub handler: Arc<dyn ActionHandler>,
}

impl Action {
    pub fn new(name: impl Into<String>, method: ActionMethod, handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            name: name.into(),
            method,
            requires_parent_id: false,
            handler,
        }
    }

    pub fn requires_parent_id(mut self, required: bool) -> Self {
        self.requires_parent_id = required;
        self
    }

    /// Run the handler after checking the parent id requirement
    pub async fn invoke(
        &self,
        ctx: &ActionContext,
        resource: &ResourceDefinition,
        repository: Arc<dyn Repository>,
    ) -> RelationResult<ActionOutput> {
        if self.requires_parent_id {
            ctx.require_parent(&self.name)?;
        }
        self.handler.handle(ctx, resource, repository).await
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("requires_parent_id", &self.requires_parent_id)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum RelationOperation {
    Attach,
    Detach,
    List,
}

impl RelationOperation {
    fn name(self) -> &'static str {
        match self {
            RelationOperation::Attach => "attach",
            RelationOperation::Detach => "detach",
            RelationOperation::List => "list",
        }
    }
}

struct RelationActionHandler {
    operation: RelationOperation,
    repositories: Arc<dyn RepositoryProvider>,
}

#[async_trait]
impl ActionHandler for RelationActionHandler {
    async fn handle(
        &self,
        ctx: &ActionContext,
        resource: &ResourceDefinition,
        repository: Arc<dyn Repository>,
    ) -> RelationResult<ActionOutput> {
        let parent_id = ctx.require_parent(self.operation.name())?;
        let relation = ctx.require_relation()?;
        let coordinator = RelationCoordinator::new(resource, repository, Arc::clone(&self.repositories));

        match self.operation {
            RelationOperation::Attach => {
                let request = RelationIdsRequest::from_payload(&ctx.payload)?;
                coordinator
                    .attach(&ctx.request, parent_id, relation, &request.ids)
                    .await
                    .map(ActionOutput::Outcome)
            }
            RelationOperation::Detach => {
                let request = RelationIdsRequest::from_payload(&ctx.payload)?;
                coordinator
                    .detach(&ctx.request, parent_id, relation, &request.ids)
                    .await
                    .map(ActionOutput::Outcome)
            }
            RelationOperation::List => coordinator
                .list(&ctx.request, parent_id, relation)
                .await
                .map(ActionOutput::Data),
        }
    }
}

/// The relation actions: `attach` and `detach` (POST), `list` (GET)
pub fn relation_actions(repositories: Arc<dyn RepositoryProvider>) -> Vec<Action> {
    [
        (RelationOperation::Attach, ActionMethod::Post),
        (RelationOperation::Detach, ActionMethod::Post),
        (RelationOperation::List, ActionMethod::Get),
    ]
    .into_iter()
    .map(|(operation, method)| {
        let handler = Arc::new(RelationActionHandler {
            operation,
            repositories: Arc::clone(&repositories),
        });
        Action::new(operation.name(), method, handler).requires_parent_id(true)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{RelationDescriptor, RelationKind};
    use crate::record::MapRecord;
    use crate::repository::{InMemoryRepository, RepositoryRegistry};
    use serde_json::json;

    fn fixture() -> (ResourceDefinition, Arc<InMemoryRepository>, Vec<Action>) {
        let resource = ResourceDefinition::new("posts")
            .with_relation(RelationDescriptor::new("tags", RelationKind::ManyToMany).with_field("Tags"));
        let posts = Arc::new(
            InMemoryRepository::new("posts")
                .with_record("1", MapRecord::new().with("ID", json!(1)).with("Tags", json!([]))),
        );
        let repositories = Arc::new(RepositoryRegistry::new().with(posts.clone()));
        (resource, posts, relation_actions(repositories))
    }

    fn action<'a>(actions: &'a [Action], name: &str) -> &'a Action {
        actions.iter().find(|a| a.name == name).unwrap()
    }

    #[test]
    fn test_relation_actions_contract() {
        let (_, _, actions) = fixture();

        let summary: Vec<(&str, ActionMethod, bool)> = actions
            .iter()
            .map(|a| (a.name.as_str(), a.method, a.requires_parent_id))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("attach", ActionMethod::Post, true),
                ("detach", ActionMethod::Post, true),
                ("list", ActionMethod::Get, true),
            ]
        );
    }

    #[tokio::test]
    async fn test_attach_then_list() {
        let (resource, posts, actions) = fixture();
        let ctx = ActionContext::new(RequestContext::new())
            .with_parent("1")
            .with_relation("tags")
            .with_payload(json!({"ids": [3, 4]}));

        let output = action(&actions, "attach")
            .invoke(&ctx, &resource, posts.clone())
            .await
            .unwrap();
        assert!(matches!(output, ActionOutput::Outcome(ref outcome) if outcome.success));

        let listed = action(&actions, "list")
            .invoke(&ctx, &resource, posts.clone())
            .await
            .unwrap();
        assert_eq!(listed, ActionOutput::Data(json!([3, 4])));
    }

    #[tokio::test]
    async fn test_missing_parent_id_is_rejected() {
        let (resource, posts, actions) = fixture();
        let ctx = ActionContext::new(RequestContext::new()).with_relation("tags");

        let err = action(&actions, "detach")
            .invoke(&ctx, &resource, posts)
            .await
            .unwrap_err();

        assert!(matches!(err, RelationError::MissingParentId { ref action } if action == "detach"));
    }

    #[tokio::test]
    async fn test_missing_body_is_an_empty_operand() {
        let (resource, posts, actions) = fixture();
        let ctx = ActionContext::new(RequestContext::new())
            .with_parent("1")
            .with_relation("tags");

        let err = action(&actions, "attach")
            .invoke(&ctx, &resource, posts)
            .await
            .unwrap_err();

        assert!(matches!(err, RelationError::EmptyOperand { .. }));
    }
}
