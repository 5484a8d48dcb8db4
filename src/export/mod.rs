//! Output generators: dialect DDL, typed interfaces, runtime row schemas
//! and INSERT statements.
//!
//! Every generator is a pure function over a snapshot of the graph; none
//! of them mutates the model or fails partially. Unresolved
//! relationships are silently skipped, never reported.

mod ddl;
mod dialect;
mod insert;
mod interface;
mod runtime;

pub use ddl::generate_ddl;
pub use dialect::SqlDialect;
pub use insert::generate_insert_statements;
pub use interface::generate_interface_types;
pub use runtime::{
    generate_runtime_schema, EntitySchema, FieldKind, FieldSchema, RowProblem, RuntimeSchema,
    TextSemantic,
};
