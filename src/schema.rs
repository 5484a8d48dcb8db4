//! Canonical in-memory model of entities, attributes and relationships.
//!
//! Entities are nodes of a stable directed graph, relationship edges
//! carry the foreign-key/primary-key binding. The editing session owns
//! one graph; generators only ever read a snapshot of it.

use petgraph::Directed;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{
    self, AttributeType, DEFAULT_NUMERIC_PRECISION, DEFAULT_NUMERIC_SCALE, DEFAULT_STRING_LENGTH,
    MAX_NUMERIC_PRECISION,
};
use crate::compat::is_compatible;
use crate::validation;

/// Errors surfaced by model mutations. Messages are user-facing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{0}")]
    InvalidName(String),
    #[error("Entity '{0}' already exists")]
    DuplicateEntity(String),
    #[error("Entity is no longer part of the diagram")]
    MissingEntity,
    #[error("Attribute index {0} is out of bounds")]
    AttributeIndex(usize),
    #[error("Relationship endpoint '{entity}.{attribute}' does not exist")]
    MissingEndpoint { entity: String, attribute: String },
    #[error("'{foreign}' cannot reference '{primary}': the types are not compatible")]
    IncompatibleEndpoints { foreign: String, primary: String },
    #[error("An identical relationship already exists")]
    DuplicateRelationship,
    #[error("Relationship is no longer part of the diagram")]
    MissingRelationship,
}

/// Default for an attribute, as a tagged variant so a literal value and
/// the "now" marker can never coexist on one attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    #[default]
    None,
    Null,
    Literal(Value),
    CurrentTimestamp,
}

impl DefaultValue {
    pub fn is_none(&self) -> bool {
        matches!(self, DefaultValue::None)
    }
}

/// A typed column-like field on an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Uuid,
    pub name: String,
    pub data_type: AttributeType,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub is_unique: bool,
    pub is_unicode: bool,
    #[serde(default)]
    pub default: DefaultValue,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: AttributeType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data_type,
            is_nullable: true,
            is_primary_key: false,
            is_auto_increment: false,
            is_unique: false,
            is_unicode: false,
            default: DefaultValue::None,
            description: None,
            length: None,
            precision: None,
            scale: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn unicode(mut self) -> Self {
        self.is_unicode = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Literal(value.into());
        self
    }

    pub fn default_null(mut self) -> Self {
        self.default = DefaultValue::Null;
        self
    }

    /// Default to the current value of the temporal type instead of a
    /// literal.
    pub fn default_now(mut self) -> Self {
        self.default = DefaultValue::CurrentTimestamp;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A primary key is never nullable, whatever the stored flag says.
    pub fn effective_nullable(&self) -> bool {
        self.is_nullable && !self.is_primary_key
    }

    pub fn effective_length(&self) -> u32 {
        self.length.unwrap_or(DEFAULT_STRING_LENGTH)
    }

    pub fn effective_precision(&self) -> u32 {
        self.precision
            .unwrap_or(DEFAULT_NUMERIC_PRECISION)
            .min(MAX_NUMERIC_PRECISION)
    }

    /// Scale is bounded by precision.
    pub fn effective_scale(&self) -> u32 {
        self.scale
            .unwrap_or(DEFAULT_NUMERIC_SCALE)
            .min(self.effective_precision())
    }

    /// Auto-increment only means something on the numeric family.
    pub fn effective_auto_increment(&self) -> bool {
        self.is_auto_increment && self.data_type.is_numeric_family()
    }

    /// Human-readable type string, e.g. `numeric(10,2)`.
    pub fn describe_type(&self) -> String {
        catalog::describe(self)
    }
}

/// A table-like object: a name and an ordered list of attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl EntityNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style append without validation, for constructing fixtures
    /// and demo models.
    pub fn add_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append an attribute, validating its name against the existing ones.
    pub fn create_attribute(&mut self, attribute: Attribute) -> Result<(), SchemaError> {
        self.validate_attribute_name(&attribute.name, None)?;
        self.attributes.push(attribute);
        Ok(())
    }

    pub fn get_attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn get_attribute_mut(&mut self, index: usize) -> Option<&mut Attribute> {
        self.attributes.get_mut(index)
    }

    pub fn find_attribute(&self, name: &str) -> Option<(usize, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(_, attr)| attr.name == name)
    }

    pub fn find_attribute_by_id(&self, id: Uuid) -> Option<(usize, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(_, attr)| attr.id == id)
    }

    /// Replace the attribute at `index`. The stored id is kept so
    /// relationship bookkeeping survives edits. Renames that must keep
    /// relationship endpoints bound go through `engine::rename_attribute`
    /// instead; a rename through here leaves bound endpoints stale and
    /// the next reconcile resets them.
    pub fn update_attribute(
        &mut self,
        index: usize,
        mut attribute: Attribute,
    ) -> Result<(), SchemaError> {
        let Some(existing) = self.attributes.get(index) else {
            return Err(SchemaError::AttributeIndex(index));
        };
        attribute.id = existing.id;
        if attribute.name != existing.name {
            self.validate_attribute_name(&attribute.name, Some(index))?;
        }
        self.attributes[index] = attribute;
        Ok(())
    }

    pub fn delete_attribute(&mut self, index: usize) -> Result<Attribute, SchemaError> {
        if index >= self.attributes.len() {
            return Err(SchemaError::AttributeIndex(index));
        }
        Ok(self.attributes.remove(index))
    }

    pub fn move_attribute(&mut self, from: usize, to: usize) -> Result<(), SchemaError> {
        if from >= self.attributes.len() {
            return Err(SchemaError::AttributeIndex(from));
        }
        if to >= self.attributes.len() {
            return Err(SchemaError::AttributeIndex(to));
        }
        let attribute = self.attributes.remove(from);
        self.attributes.insert(to, attribute);
        Ok(())
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|attr| attr.is_primary_key)
    }

    fn validate_attribute_name(
        &self,
        name: &str,
        skip_index: Option<usize>,
    ) -> Result<(), SchemaError> {
        let existing: Vec<&str> = self
            .attributes
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip_index)
            .map(|(_, attr)| attr.name.as_str())
            .collect();
        let result = validation::validate_identifier(name, existing);
        match result.errors.first() {
            Some(error) => Err(SchemaError::InvalidName(error.to_string())),
            None => Ok(()),
        }
    }
}

/// Referential action on the foreign-key side of a relationship.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    #[default]
    #[display("RESTRICT")]
    Restrict,
    #[display("CASCADE")]
    Cascade,
    #[display("SET NULL")]
    SetNull,
}

impl ReferentialAction {
    /// RESTRICT is the implicit default and is not emitted in DDL.
    pub fn is_default(self) -> bool {
        self == ReferentialAction::Restrict
    }
}

/// Names one side of a resolved relationship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub entity: String,
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(entity: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            attribute: attribute.into(),
        }
    }
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.entity, self.attribute)
    }
}

/// A potential or resolved foreign-key link between two attributes.
///
/// Both endpoints are `None` while the connection is only a visual edge;
/// such a dangling relationship is a valid state and produces no DDL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    /// Referencing side (the foreign-key column).
    pub foreign_key: Option<AttributeRef>,
    /// Referenced side (the primary-key column).
    pub primary_key: Option<AttributeRef>,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
}

impl Relationship {
    /// A visual connection with no endpoints assigned yet.
    pub fn dangling() -> Self {
        Self {
            id: Uuid::new_v4(),
            foreign_key: None,
            primary_key: None,
            on_delete: ReferentialAction::Restrict,
            on_update: ReferentialAction::Restrict,
        }
    }

    pub fn resolved(foreign_key: AttributeRef, primary_key: AttributeRef) -> Self {
        Self {
            foreign_key: Some(foreign_key),
            primary_key: Some(primary_key),
            ..Self::dangling()
        }
    }

    pub fn with_on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn with_on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.foreign_key.is_some() && self.primary_key.is_some()
    }

    /// Clear both endpoints, returning the edge to the dangling state.
    pub fn reset(&mut self) {
        self.foreign_key = None;
        self.primary_key = None;
    }
}

impl Default for Relationship {
    fn default() -> Self {
        Self::dangling()
    }
}

/// The whole diagram: entity nodes, relationship edges.
pub type SchemaGraph = StableGraph<EntityNode, Relationship, Directed>;

/// Resolve an endpoint reference against the entities an edge touches.
pub(crate) fn resolve_endpoint<'a>(
    graph: &'a SchemaGraph,
    nodes: &[NodeIndex],
    endpoint: &AttributeRef,
) -> Option<&'a Attribute> {
    for &node in nodes {
        if let Some(entity) = graph.node_weight(node)
            && entity.name == endpoint.entity
        {
            return entity.find_attribute(&endpoint.attribute).map(|(_, a)| a);
        }
    }
    None
}

/// The nodes an edge touches: one for a self-loop, two otherwise.
pub(crate) fn touched_nodes(source: NodeIndex, target: NodeIndex) -> Vec<NodeIndex> {
    if source == target {
        vec![source]
    } else {
        vec![source, target]
    }
}

/// Entity-level operations on the schema graph.
pub trait EntityOps {
    fn create_entity(&mut self, name: impl Into<String>) -> Result<NodeIndex, SchemaError>;
    fn delete_entity(&mut self, node: NodeIndex) -> Result<EntityNode, SchemaError>;
    fn entity_exists(&self, name: &str) -> bool;
    fn find_entity_by_name(&self, name: &str) -> Option<NodeIndex>;
    fn entity_names(&self) -> Vec<String>;
    /// `base`, then `base_2`, `base_3`, ... until the name is free.
    fn generate_unique_entity_name(&self, base: &str) -> String;
}

impl EntityOps for SchemaGraph {
    fn create_entity(&mut self, name: impl Into<String>) -> Result<NodeIndex, SchemaError> {
        let name = name.into();
        let existing = self.entity_names();
        let result =
            validation::validate_identifier(&name, existing.iter().map(String::as_str));
        if let Some(error) = result.errors.first() {
            if matches!(error, validation::ValidationError::Duplicate { .. }) {
                return Err(SchemaError::DuplicateEntity(name));
            }
            return Err(SchemaError::InvalidName(error.to_string()));
        }
        Ok(self.add_node(EntityNode::new(name)))
    }

    fn delete_entity(&mut self, node: NodeIndex) -> Result<EntityNode, SchemaError> {
        self.remove_node(node).ok_or(SchemaError::MissingEntity)
    }

    fn entity_exists(&self, name: &str) -> bool {
        self.find_entity_by_name(name).is_some()
    }

    fn find_entity_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.node_indices()
            .find(|&idx| self.node_weight(idx).is_some_and(|e| e.name == name))
    }

    fn entity_names(&self) -> Vec<String> {
        self.node_weights().map(|e| e.name.clone()).collect()
    }

    fn generate_unique_entity_name(&self, base: &str) -> String {
        if !self.entity_exists(base) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.entity_exists(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Relationship-level operations on the schema graph.
pub trait RelationshipOps {
    /// Start a dangling connection between two entities.
    fn connect_entities(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex;
    /// Add a relationship. A resolved one must have endpoints that exist,
    /// are mutually compatible, and do not duplicate an existing link.
    fn create_relationship(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        relationship: Relationship,
    ) -> Result<EdgeIndex, SchemaError>;
    fn delete_relationship(&mut self, edge: EdgeIndex) -> Result<Relationship, SchemaError>;
    fn resolved_relationships(&self) -> Vec<(EdgeIndex, Relationship)>;
}

impl RelationshipOps for SchemaGraph {
    fn connect_entities(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        self.add_edge(source, target, Relationship::dangling())
    }

    fn create_relationship(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        relationship: Relationship,
    ) -> Result<EdgeIndex, SchemaError> {
        if let (Some(fk), Some(pk)) = (&relationship.foreign_key, &relationship.primary_key) {
            let nodes = touched_nodes(source, target);
            let fk_attr =
                resolve_endpoint(self, &nodes, fk).ok_or_else(|| SchemaError::MissingEndpoint {
                    entity: fk.entity.clone(),
                    attribute: fk.attribute.clone(),
                })?;
            let pk_attr =
                resolve_endpoint(self, &nodes, pk).ok_or_else(|| SchemaError::MissingEndpoint {
                    entity: pk.entity.clone(),
                    attribute: pk.attribute.clone(),
                })?;
            if !is_compatible(pk_attr, fk_attr) {
                return Err(SchemaError::IncompatibleEndpoints {
                    foreign: format!("{}.{}", fk.entity, fk.attribute),
                    primary: format!("{}.{}", pk.entity, pk.attribute),
                });
            }
            let duplicate = self.edge_indices().any(|edge| {
                self.edge_weight(edge).is_some_and(|existing| {
                    existing.foreign_key.as_ref() == Some(fk)
                        && existing.primary_key.as_ref() == Some(pk)
                })
            });
            if duplicate {
                return Err(SchemaError::DuplicateRelationship);
            }
        }
        Ok(self.add_edge(source, target, relationship))
    }

    fn delete_relationship(&mut self, edge: EdgeIndex) -> Result<Relationship, SchemaError> {
        self.remove_edge(edge).ok_or(SchemaError::MissingRelationship)
    }

    fn resolved_relationships(&self) -> Vec<(EdgeIndex, Relationship)> {
        self.edge_indices()
            .filter_map(|edge| {
                self.edge_weight(edge)
                    .filter(|r| r.is_resolved())
                    .map(|r| (edge, r.clone()))
            })
            .collect()
    }
}
