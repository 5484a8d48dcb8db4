//! Dialect DDL generation.
//!
//! One walker for all dialects: entities in declaration order, columns in
//! declaration order, column clauses in a fixed order (type,
//! auto-increment, PRIMARY KEY/UNIQUE, NOT NULL, DEFAULT, dialect
//! extras), then one ALTER TABLE foreign-key constraint per resolved
//! relationship. Unresolved relationships produce nothing.

use serde_json::Value;

use crate::schema::{
    resolve_endpoint, touched_nodes, Attribute, DefaultValue, SchemaGraph,
};

use super::dialect::{escape_single_quotes, SqlDialect};

/// Render the whole model as DDL for one dialect.
pub fn generate_ddl(graph: &SchemaGraph, dialect: SqlDialect) -> String {
    let mut out = String::new();
    let mut post_table: Vec<String> = Vec::new();

    for node in graph.node_indices() {
        let Some(entity) = graph.node_weight(node) else {
            continue;
        };
        out.push_str(dialect.create_table_prefix());
        out.push(' ');
        out.push_str(&entity.name);
        out.push_str(" (\n");
        let count = entity.attributes.len();
        for (i, attribute) in entity.attributes.iter().enumerate() {
            out.push_str("    ");
            out.push_str(&column_definition(dialect, attribute));
            if i + 1 < count {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str(");\n\n");
        post_table.extend(dialect.post_table_statements(entity));
    }

    if !post_table.is_empty() {
        for statement in &post_table {
            out.push_str(statement);
            out.push('\n');
        }
        out.push('\n');
    }

    let mut constraint_count = 0;
    for edge in graph.edge_indices() {
        if let Some(statement) = foreign_key_statement(graph, edge) {
            out.push_str(&statement);
            out.push('\n');
            constraint_count += 1;
        }
    }

    tracing::debug!(
        "Generated {} DDL: {} tables, {} foreign key constraints",
        dialect,
        graph.node_count(),
        constraint_count
    );
    out
}

fn column_definition(dialect: SqlDialect, attribute: &Attribute) -> String {
    let mut parts: Vec<String> = vec![attribute.name.clone(), dialect.column_type(attribute)];

    let auto_increment = attribute.effective_auto_increment();
    if auto_increment {
        parts.push(dialect.auto_increment_clause().into());
    }
    if attribute.is_primary_key {
        parts.push("PRIMARY KEY".into());
    } else if attribute.is_unique {
        parts.push("UNIQUE".into());
    }
    if !attribute.effective_nullable() {
        parts.push("NOT NULL".into());
    }
    // An auto-increment column supplies its own values; any default
    // clause is dropped.
    if !auto_increment
        && let Some(clause) = default_clause(dialect, attribute)
    {
        parts.push(clause);
    }
    if let Some(extras) = dialect.column_extras(attribute) {
        parts.push(extras);
    }

    parts.join(" ")
}

fn default_clause(dialect: SqlDialect, attribute: &Attribute) -> Option<String> {
    match &attribute.default {
        DefaultValue::None => None,
        DefaultValue::Null => Some("DEFAULT NULL".into()),
        DefaultValue::CurrentTimestamp => attribute
            .data_type
            .is_temporal()
            .then(|| format!("DEFAULT {}", dialect.now_default(attribute.data_type))),
        DefaultValue::Literal(value) => {
            Some(format!("DEFAULT {}", default_literal(dialect, value)))
        }
    }
}

fn default_literal(dialect: SqlDialect, value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Bool(b) => dialect.bool_literal(*b).into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", escape_single_quotes(s)),
        other => format!("'{}'", escape_single_quotes(&other.to_string())),
    }
}

/// One ALTER TABLE constraint for a resolved relationship, or `None` for
/// a dangling or no-longer-resolvable one. The constraint syntax is the
/// same in all three dialects.
fn foreign_key_statement(
    graph: &SchemaGraph,
    edge: petgraph::stable_graph::EdgeIndex,
) -> Option<String> {
    let (source, target) = graph.edge_endpoints(edge)?;
    let relationship = graph.edge_weight(edge)?;
    let fk = relationship.foreign_key.as_ref()?;
    let pk = relationship.primary_key.as_ref()?;

    // Skip silently when an endpoint went missing under the edge.
    let nodes = touched_nodes(source, target);
    resolve_endpoint(graph, &nodes, fk)?;
    resolve_endpoint(graph, &nodes, pk)?;

    let mut statement = format!(
        "ALTER TABLE {} ADD CONSTRAINT fk_{}_{} FOREIGN KEY ({}) REFERENCES {} ({})",
        fk.entity, fk.entity, pk.entity, fk.attribute, pk.entity, pk.attribute
    );
    if !relationship.on_delete.is_default() {
        statement.push_str(&format!(" ON DELETE {}", relationship.on_delete));
    }
    if !relationship.on_update.is_default() {
        statement.push_str(&format!(" ON UPDATE {}", relationship.on_update));
    }
    statement.push(';');
    Some(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttributeType;
    use crate::schema::{AttributeRef, EntityNode, Relationship, RelationshipOps};

    fn users() -> EntityNode {
        EntityNode::new("users")
            .add_attribute(
                Attribute::new("id", AttributeType::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .add_attribute(
                Attribute::new("email", AttributeType::String)
                    .with_length(100)
                    .not_null()
                    .unique(),
            )
    }

    #[test]
    fn test_postgres_create_table() {
        let mut graph = SchemaGraph::new();
        graph.add_node(users());

        let sql = generate_ddl(&graph, SqlDialect::PostgreSQL);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS users ("));
        assert!(sql.contains("id INT GENERATED ALWAYS AS IDENTITY PRIMARY KEY NOT NULL"));
        assert!(sql.contains("email VARCHAR(100) UNIQUE NOT NULL"));
    }

    #[test]
    fn test_mysql_auto_increment() {
        let mut graph = SchemaGraph::new();
        graph.add_node(users());

        let sql = generate_ddl(&graph, SqlDialect::MySQL);
        assert!(sql.contains("id INT AUTO_INCREMENT PRIMARY KEY NOT NULL"));
    }

    #[test]
    fn test_sql_server_identity_without_if_not_exists() {
        let mut graph = SchemaGraph::new();
        graph.add_node(users());

        let sql = generate_ddl(&graph, SqlDialect::SqlServer);
        assert!(sql.contains("CREATE TABLE users ("));
        assert!(!sql.contains("IF NOT EXISTS"));
        assert!(sql.contains("id INT IDENTITY(1,1) PRIMARY KEY NOT NULL"));
    }

    #[test]
    fn test_default_clauses() {
        let entity = EntityNode::new("articles")
            .add_attribute(
                Attribute::new("status", AttributeType::String)
                    .with_length(20)
                    .with_default("draft"),
            )
            .add_attribute(Attribute::new("subtitle", AttributeType::Text).default_null())
            .add_attribute(
                Attribute::new("created_at", AttributeType::Timestamp)
                    .not_null()
                    .default_now(),
            );
        let mut graph = SchemaGraph::new();
        graph.add_node(entity);

        let sql = generate_ddl(&graph, SqlDialect::PostgreSQL);
        assert!(sql.contains("status VARCHAR(20) DEFAULT 'draft'"));
        assert!(sql.contains("subtitle TEXT DEFAULT NULL"));
        assert!(sql.contains("created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"));

        let sql = generate_ddl(&graph, SqlDialect::SqlServer);
        assert!(sql.contains("created_at DATETIME2 NOT NULL DEFAULT GETDATE()"));
    }

    #[test]
    fn test_auto_increment_suppresses_default() {
        let entity = EntityNode::new("counters").add_attribute(
            Attribute::new("id", AttributeType::Integer)
                .primary_key()
                .auto_increment()
                .with_default(1),
        );
        let mut graph = SchemaGraph::new();
        graph.add_node(entity);

        let sql = generate_ddl(&graph, SqlDialect::MySQL);
        assert!(!sql.contains("DEFAULT"));
    }

    #[test]
    fn test_default_literal_escaping() {
        let entity = EntityNode::new("people").add_attribute(
            Attribute::new("surname", AttributeType::String).with_default("O'Brien"),
        );
        let mut graph = SchemaGraph::new();
        graph.add_node(entity);

        let sql = generate_ddl(&graph, SqlDialect::PostgreSQL);
        assert!(sql.contains("DEFAULT 'O\\'Brien'"));
    }

    #[test]
    fn test_resolved_relationship_emits_constraint() {
        let mut graph = SchemaGraph::new();
        let users_idx = graph.add_node(users());
        let posts_idx = graph.add_node(
            EntityNode::new("posts")
                .add_attribute(Attribute::new("id", AttributeType::Integer).primary_key())
                .add_attribute(Attribute::new("user_id", AttributeType::Integer).not_null()),
        );
        graph
            .create_relationship(
                posts_idx,
                users_idx,
                Relationship::resolved(
                    AttributeRef::new("posts", "user_id"),
                    AttributeRef::new("users", "id"),
                )
                .with_on_delete(crate::schema::ReferentialAction::Cascade),
            )
            .unwrap();

        let sql = generate_ddl(&graph, SqlDialect::PostgreSQL);
        assert!(sql.contains(
            "ALTER TABLE posts ADD CONSTRAINT fk_posts_users FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE;"
        ));
        assert!(!sql.contains("ON UPDATE"));
    }

    #[test]
    fn test_dangling_relationship_is_skipped() {
        let mut graph = SchemaGraph::new();
        let users_idx = graph.add_node(users());
        let posts_idx = graph.add_node(
            EntityNode::new("posts")
                .add_attribute(Attribute::new("id", AttributeType::Integer).primary_key()),
        );
        graph.connect_entities(posts_idx, users_idx);

        for dialect in SqlDialect::ALL {
            let sql = generate_ddl(&graph, dialect);
            assert!(!sql.contains("FOREIGN KEY"), "{dialect}");
        }
    }

    #[test]
    fn test_descriptions_per_dialect() {
        let entity = EntityNode::new("users").add_attribute(
            Attribute::new("email", AttributeType::String)
                .with_description("primary contact address"),
        );
        let mut graph = SchemaGraph::new();
        graph.add_node(entity);

        let pg = generate_ddl(&graph, SqlDialect::PostgreSQL);
        assert!(pg.contains("COMMENT ON COLUMN users.email IS 'primary contact address';"));

        let mysql = generate_ddl(&graph, SqlDialect::MySQL);
        assert!(mysql.contains("COMMENT 'primary contact address'"));
        assert!(!mysql.contains("COMMENT ON COLUMN"));

        let mssql = generate_ddl(&graph, SqlDialect::SqlServer);
        assert!(mssql.contains(
            "EXEC sp_addextendedproperty 'MS_Description', 'primary contact address', 'SCHEMA', 'dbo', 'TABLE', 'users', 'COLUMN', 'email';"
        ));
    }
}
