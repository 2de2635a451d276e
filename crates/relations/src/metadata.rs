//! Relation metadata - descriptors binding a relation name to a storage field

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::FOREIGN_KEY_SUFFIX;

/// Cardinality of a relation between a parent resource and its targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    /// Parent holds a single materialized related record
    OneToOne,
    /// Parent holds an ordered list of related records
    OneToMany,
    /// Parent holds the raw foreign key of its owner
    ManyToOne,
    /// Parent holds an ordered list of raw related ids
    ManyToMany,
    /// A kind read from configuration that the engine does not understand
    Other(String),
}

impl RelationKind {
    /// Returns true if attaching reads targets from the related repository
    pub fn fetches_on_attach(&self) -> bool {
        matches!(self, Self::OneToOne | Self::OneToMany | Self::ManyToOne)
    }

    /// Returns true if listing reads the target from the related repository
    pub fn fetches_on_list(&self) -> bool {
        matches!(self, Self::ManyToOne)
    }

    /// Returns true if the relation content lives in `Descriptor.field`
    pub fn uses_field(&self) -> bool {
        matches!(self, Self::OneToOne | Self::OneToMany | Self::ManyToMany)
    }

    /// Returns true if this is one of the four supported cardinalities
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::OneToOne => "OneToOne",
            Self::OneToMany => "OneToMany",
            Self::ManyToOne => "ManyToOne",
            Self::ManyToMany => "ManyToMany",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for RelationKind {
    fn from(value: String) -> Self {
        let normalized: String = value
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "onetoone" => Self::OneToOne,
            "onetomany" => Self::OneToMany,
            "manytoone" => Self::ManyToOne,
            "manytomany" => Self::ManyToMany,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for RelationKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata describing one relation of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Relation identifier used in API paths and request payloads
    pub name: String,

    /// Cardinality of the relation
    #[serde(rename = "type")]
    pub relation_type: RelationKind,

    /// Name of the field holding the relation content on the parent
    #[serde(default)]
    pub field: String,

    /// Logical target resource, used for cross-entity loads
    #[serde(default)]
    pub resource_name: String,

    #[serde(default)]
    pub required: bool,
}

impl RelationDescriptor {
    /// Create a new descriptor with an empty field and target resource
    pub fn new(name: impl Into<String>, relation_type: impl Into<RelationKind>) -> Self {
        Self {
            name: name.into(),
            relation_type: relation_type.into(),
            field: String::new(),
            resource_name: String::new(),
            required: false,
        }
    }

    /// Set the parent field holding the relation content
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Set the target resource name
    pub fn with_resource(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = resource_name.into();
        self
    }

    /// Mark the relation as required
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Name of the parent field storing the foreign key of a ManyToOne relation.
    ///
    /// Derived from the relation name, not from `field`.
    pub fn foreign_key(&self) -> String {
        format!("{}{}", self.name, FOREIGN_KEY_SUFFIX)
    }
}
