//! Erdkit - relational schema compiler and constraint engine.
//!
//! The core behind an entity-relationship diagram editor: an in-memory
//! model of entities, attributes and relationships, the rules deciding
//! which attribute pairs may form a foreign key, a constraint engine
//! that keeps relationships consistent while the model is edited, and
//! generators that translate the model into dialect DDL, typed
//! interfaces, runtime row schemas and INSERT statements.
//!
//! The editor UI, persistence and AI transport are external
//! collaborators: they pass in-memory structures in and get strings or
//! structured results back.

pub mod catalog;
pub mod check;
pub mod compat;
pub mod engine;
pub mod export;
pub mod schema;
pub mod validation;


pub use catalog::{describe, parameters_for, AttributeType, TypeParam};
pub use check::{check_schema_sql, validate_sql, CheckResult, Diagnostic, SqlChecker};
pub use compat::is_compatible;
pub use engine::{
    derive_relationship_candidates, reconcile_relationships, rename_attribute, rename_entity,
    CandidateAttribute, RelationshipCandidates,
};
pub use export::{
    generate_ddl, generate_insert_statements, generate_interface_types, generate_runtime_schema,
    RuntimeSchema, SqlDialect,
};
pub use schema::{
    Attribute, AttributeRef, DefaultValue, EntityNode, EntityOps, ReferentialAction, Relationship,
    RelationshipOps, SchemaError, SchemaGraph,
};
pub use validation::{validate_identifier, ValidationResult};
