//! Keeps relationship endpoints consistent while the model is edited and
//! derives the candidate pools the editor offers for either endpoint.
//!
//! The engine is the only code that rewrites relationship endpoints. It
//! never throws for inconsistent state: a relationship whose endpoints
//! stop making sense is reset to dangling, which is a valid state.

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use serde::Serialize;
use uuid::Uuid;

use crate::compat::is_compatible;
use crate::schema::{
    resolve_endpoint, touched_nodes, Attribute, SchemaError, SchemaGraph,
};
use crate::validation;

/// One attribute offered for an endpoint, tagged with its owning entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateAttribute {
    pub entity: String,
    pub attribute: Attribute,
}

/// Candidate pools for a prospective or existing relationship.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RelationshipCandidates {
    pub primary_key_candidates: Vec<CandidateAttribute>,
    pub foreign_key_candidates: Vec<CandidateAttribute>,
    /// Distinct entity names the relationship touches; a single entry
    /// means a self-referencing relationship.
    pub touched_entities: Vec<String>,
}

/// Derive the primary-key and foreign-key candidate pools for the given
/// edge, honoring an endpoint the user has already picked.
///
/// Returns `None` only when the edge or one of its entities is gone.
pub fn derive_relationship_candidates(
    graph: &SchemaGraph,
    edge: EdgeIndex,
) -> Option<RelationshipCandidates> {
    let (source, target) = graph.edge_endpoints(edge)?;
    let relationship = graph.edge_weight(edge)?;
    let nodes = touched_nodes(source, target);

    let mut touched_entities: Vec<String> = Vec::new();
    let mut primary_key_candidates: Vec<CandidateAttribute> = Vec::new();
    for &node in &nodes {
        let entity = graph.node_weight(node)?;
        if !touched_entities.contains(&entity.name) {
            touched_entities.push(entity.name.clone());
        }
        for attribute in entity.primary_keys() {
            primary_key_candidates.push(CandidateAttribute {
                entity: entity.name.clone(),
                attribute: attribute.clone(),
            });
        }
    }

    // Non-key attributes join the pool when they can reference at least
    // one primary key. The pool holds non-key attributes only, so an
    // attribute is never offered as a foreign key for itself.
    let mut foreign_key_candidates: Vec<CandidateAttribute> = Vec::new();
    for &node in &nodes {
        let entity = graph.node_weight(node)?;
        for attribute in entity.attributes.iter().filter(|a| !a.is_primary_key) {
            let references_some_key = primary_key_candidates
                .iter()
                .any(|pk| is_compatible(&pk.attribute, attribute));
            if references_some_key {
                foreign_key_candidates.push(CandidateAttribute {
                    entity: entity.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }
    }

    // An endpoint the user already picked narrows the other side: only
    // compatible attributes, and never from the picked side's entity when
    // the relationship spans two distinct entities.
    let two_entities = touched_entities.len() == 2;
    if let Some(fk) = relationship.foreign_key.as_ref()
        && let Some(fk_attr) = resolve_endpoint(graph, &nodes, fk)
    {
        primary_key_candidates.retain(|pk| {
            is_compatible(&pk.attribute, fk_attr) && (!two_entities || pk.entity != fk.entity)
        });
    }
    if let Some(pk) = relationship.primary_key.as_ref()
        && let Some(pk_attr) = resolve_endpoint(graph, &nodes, pk)
    {
        foreign_key_candidates.retain(|candidate| {
            is_compatible(pk_attr, &candidate.attribute)
                && (!two_entities || candidate.entity != pk.entity)
        });
    }

    Some(RelationshipCandidates {
        primary_key_candidates,
        foreign_key_candidates,
        touched_entities,
    })
}

/// Re-validate every resolved relationship after an attribute edit.
///
/// A relationship is reset to dangling when either endpoint no longer
/// resolves, or when the edit touched one of its endpoints and the pair
/// is no longer a primary key referencing a compatible attribute.
/// Returns the edges that were reset. Idempotent: with no further edits
/// a second call is a no-op.
pub fn reconcile_relationships(graph: &mut SchemaGraph, changed: Uuid) -> Vec<EdgeIndex> {
    let mut reset = Vec::new();
    let edges: Vec<EdgeIndex> = graph.edge_indices().collect();
    for edge in edges {
        let Some((source, target)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let Some(weight) = graph.edge_weight(edge) else {
            continue;
        };
        let (Some(fk), Some(pk)) = (weight.foreign_key.clone(), weight.primary_key.clone())
        else {
            continue;
        };
        let nodes = touched_nodes(source, target);
        let fk_attr = resolve_endpoint(graph, &nodes, &fk);
        let pk_attr = resolve_endpoint(graph, &nodes, &pk);

        let keep = match (pk_attr, fk_attr) {
            (Some(pk_attr), Some(fk_attr)) => {
                if pk_attr.id == changed || fk_attr.id == changed {
                    pk_attr.is_primary_key
                        && !fk_attr.is_primary_key
                        && is_compatible(pk_attr, fk_attr)
                } else {
                    true
                }
            }
            // An endpoint that no longer resolves is inconsistent state
            // regardless of which attribute the edit touched.
            _ => false,
        };

        if !keep
            && let Some(weight) = graph.edge_weight_mut(edge)
        {
            tracing::debug!("Resetting relationship {} to dangling", weight.id);
            weight.reset();
            reset.push(edge);
        }
    }
    reset
}

/// Rename an attribute and follow the rename on every relationship
/// endpoint bound to it, so the relationship survives instead of being
/// invalidated by the next reconcile.
pub fn rename_attribute(
    graph: &mut SchemaGraph,
    node: NodeIndex,
    index: usize,
    new_name: impl Into<String>,
) -> Result<(), SchemaError> {
    let new_name = new_name.into();
    let entity = graph.node_weight(node).ok_or(SchemaError::MissingEntity)?;
    let attribute = entity
        .get_attribute(index)
        .ok_or(SchemaError::AttributeIndex(index))?;
    let old_name = attribute.name.clone();
    let entity_name = entity.name.clone();
    if old_name == new_name {
        return Ok(());
    }

    let siblings: Vec<String> = entity
        .attributes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, a)| a.name.clone())
        .collect();
    let result = validation::validate_identifier(&new_name, siblings.iter().map(String::as_str));
    if let Some(error) = result.errors.first() {
        return Err(SchemaError::InvalidName(error.to_string()));
    }

    if let Some(entity) = graph.node_weight_mut(node)
        && let Some(attribute) = entity.get_attribute_mut(index)
    {
        attribute.name = new_name.clone();
    }

    let edges: Vec<EdgeIndex> = graph.edge_indices().collect();
    for edge in edges {
        if let Some(weight) = graph.edge_weight_mut(edge) {
            for endpoint in [weight.foreign_key.as_mut(), weight.primary_key.as_mut()]
                .into_iter()
                .flatten()
            {
                if endpoint.entity == entity_name && endpoint.attribute == old_name {
                    endpoint.attribute = new_name.clone();
                }
            }
        }
    }
    Ok(())
}

/// Rename an entity and follow the rename on every relationship endpoint
/// referencing it.
pub fn rename_entity(
    graph: &mut SchemaGraph,
    node: NodeIndex,
    new_name: impl Into<String>,
) -> Result<(), SchemaError> {
    let new_name = new_name.into();
    let entity = graph.node_weight(node).ok_or(SchemaError::MissingEntity)?;
    let old_name = entity.name.clone();
    if old_name == new_name {
        return Ok(());
    }

    let others: Vec<String> = graph
        .node_indices()
        .filter(|&idx| idx != node)
        .filter_map(|idx| graph.node_weight(idx).map(|e| e.name.clone()))
        .collect();
    let result = validation::validate_identifier(&new_name, others.iter().map(String::as_str));
    if let Some(error) = result.errors.first() {
        if matches!(error, validation::ValidationError::Duplicate { .. }) {
            return Err(SchemaError::DuplicateEntity(new_name));
        }
        return Err(SchemaError::InvalidName(error.to_string()));
    }

    if let Some(entity) = graph.node_weight_mut(node) {
        entity.name = new_name.clone();
    }

    let edges: Vec<EdgeIndex> = graph.edge_indices().collect();
    for edge in edges {
        if let Some(weight) = graph.edge_weight_mut(edge) {
            for endpoint in [weight.foreign_key.as_mut(), weight.primary_key.as_mut()]
                .into_iter()
                .flatten()
            {
                if endpoint.entity == old_name {
                    endpoint.entity = new_name.clone();
                }
            }
        }
    }
    Ok(())
}
