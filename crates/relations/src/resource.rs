//! Resource configuration - static relation descriptors per resource
//!
//! Descriptors are loaded once, from a YAML catalog, when the application
//! starts. Nothing in here is mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{RelationError, RelationResult};
use crate::metadata::RelationDescriptor;

/// Anything that owns a set of relation descriptors
pub trait Resource: Send + Sync {
    fn name(&self) -> &str;

    fn relations(&self) -> &[RelationDescriptor];

    /// Find a relation by its exact name
    fn relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations().iter().find(|r| r.name == name)
    }
}

/// A resource as declared in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub name: String,
    #[serde(default)]
    pub relations: Vec<RelationDescriptor>,
    /// Records used to seed in-memory repositories
    #[serde(default)]
    pub fixtures: Vec<serde_json::Value>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relations: Vec::new(),
            fixtures: Vec::new(),
        }
    }

    /// Add a relation descriptor
    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.push(relation);
        self
    }

    /// Check the descriptors for consistency
    pub fn validate(&self) -> RelationResult<()> {
        if self.name.trim().is_empty() {
            return Err(RelationError::configuration("resource name must not be empty"));
        }

        let mut seen = HashSet::new();
        for relation in &self.relations {
            if relation.name.trim().is_empty() {
                return Err(RelationError::configuration(format!(
                    "resource '{}' declares a relation without a name",
                    self.name
                )));
            }
            if !seen.insert(relation.name.as_str()) {
                return Err(RelationError::configuration(format!(
                    "resource '{}' declares relation '{}' more than once",
                    self.name, relation.name
                )));
            }
            if relation.relation_type.uses_field() && relation.field.trim().is_empty() {
                return Err(RelationError::configuration(format!(
                    "relation '{}.{}' of type {} requires a field",
                    self.name, relation.name, relation.relation_type
                )));
            }
            if !relation.relation_type.is_supported() {
                tracing::warn!(
                    target: "admin::catalog",
                    resource = %self.name,
                    relation = %relation.name,
                    relation_type = %relation.relation_type,
                    "relation type is not supported; operations on it will fail"
                );
            }
        }

        Ok(())
    }
}

impl Resource for ResourceDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }
}

/// All resources known to the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCatalog {
    #[serde(default)]
    resources: Vec<ResourceDefinition>,
}

impl ResourceCatalog {
    /// Build a catalog from resource definitions, validating each one
    pub fn new(resources: Vec<ResourceDefinition>) -> RelationResult<Self> {
        let catalog = Self { resources };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a YAML catalog
    pub fn from_yaml(yaml: &str) -> RelationResult<Self> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a YAML catalog from disk
    pub fn load(path: impl AsRef<Path>) -> RelationResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&yaml)?;

        tracing::info!(
            target: "admin::catalog",
            path = %path.display(),
            resources = catalog.resources.len(),
            "resource catalog loaded"
        );

        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn validate(&self) -> RelationResult<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(RelationError::configuration(format!(
                    "resource '{}' is declared more than once",
                    resource.name
                )));
            }
            resource.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RelationKind;
    use tracing_test::traced_test;

    const CATALOG: &str = r#"
resources:
  - name: posts
    relations:
      - { name: items, type: OneToMany, field: Items, resource_name: items }
      - { name: tags, type: ManyToMany, field: Tags, resource_name: tags }
      - { name: Owner, type: ManyToOne, resource_name: users, required: true }
    fixtures:
      - { ID: 1, Items: [], Tags: [], OwnerID: 0 }
  - name: items
"#;

    #[test]
    fn test_catalog_from_yaml() {
        let catalog = ResourceCatalog::from_yaml(CATALOG).unwrap();

        assert_eq!(catalog.len(), 2);
        let posts = catalog.get("posts").unwrap();
        assert_eq!(posts.relations().len(), 3);
        assert_eq!(posts.fixtures.len(), 1);

        let owner = posts.relation("Owner").unwrap();
        assert_eq!(owner.relation_type, RelationKind::ManyToOne);
        assert!(owner.required);
        assert!(posts.relation("owner").is_none());
    }

    #[test]
    fn test_duplicate_relation_is_rejected() {
        let resource = ResourceDefinition::new("posts")
            .with_relation(RelationDescriptor::new("tags", RelationKind::ManyToMany).with_field("Tags"))
            .with_relation(RelationDescriptor::new("tags", RelationKind::ManyToMany).with_field("Labels"));

        assert!(matches!(
            resource.validate(),
            Err(RelationError::Configuration { .. })
        ));
    }

    #[test]
    fn test_duplicate_resource_is_rejected() {
        let result = ResourceCatalog::new(vec![
            ResourceDefinition::new("posts"),
            ResourceDefinition::new("posts"),
        ]);

        assert!(matches!(result, Err(RelationError::Configuration { .. })));
    }

    #[test]
    fn test_collection_relation_requires_field() {
        let yaml = "resources:\n  - name: posts\n    relations:\n      - { name: items, type: OneToMany }\n";
        let err = ResourceCatalog::from_yaml(yaml).unwrap_err();

        assert!(err.to_string().contains("requires a field"));
    }

    #[test]
    #[traced_test]
    fn test_unknown_relation_type_is_kept_with_warning() {
        let yaml = "resources:\n  - name: posts\n    relations:\n      - { name: parent, type: MorphTo, field: Parent }\n";
        let catalog = ResourceCatalog::from_yaml(yaml).unwrap();

        let parent = catalog.get("posts").unwrap().relation("parent").unwrap();
        assert_eq!(parent.relation_type, RelationKind::Other("MorphTo".to_string()));
        assert!(logs_contain("relation type is not supported"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.yaml");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = ResourceCatalog::load(&path).unwrap();
        assert!(catalog.get("items").is_some());

        let missing = ResourceCatalog::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, RelationError::Io(_)));
    }
}
