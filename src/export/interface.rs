//! Statically typed data-shape projection of the model.
//!
//! Emits one TypeScript interface per entity for client code. This is a
//! shape projection only; relationships are not represented.

use crate::catalog::AttributeType;
use crate::schema::SchemaGraph;

/// Render one interface per entity, in declaration order.
pub fn generate_interface_types(graph: &SchemaGraph) -> String {
    let mut out = String::new();
    for node in graph.node_indices() {
        let Some(entity) = graph.node_weight(node) else {
            continue;
        };
        out.push_str(&format!("export interface {} {{\n", pascal_case(&entity.name)));
        for attribute in &entity.attributes {
            let marker = if attribute.effective_nullable() { "?" } else { "" };
            out.push_str(&format!(
                "    {}{}: {};",
                attribute.name,
                marker,
                field_type(attribute.data_type)
            ));
            if let Some(description) = &attribute.description {
                out.push_str(&format!(" // {}", description));
            }
            out.push('\n');
        }
        out.push_str("}\n\n");
    }
    out
}

/// The fixed mapping: numeric family to `number`, `json` to a generic
/// key/value map, everything else to `string`.
fn field_type(ty: AttributeType) -> &'static str {
    if ty.is_numeric_family() {
        "number"
    } else if ty == AttributeType::Json {
        "Record<string, unknown>"
    } else {
        "string"
    }
}

fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, EntityNode};

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("users"), "Users");
        assert_eq!(pascal_case("order_items"), "OrderItems");
        assert_eq!(pascal_case("a"), "A");
    }

    #[test]
    fn test_interface_output() {
        let entity = EntityNode::new("order_items")
            .add_attribute(Attribute::new("id", AttributeType::Integer).primary_key())
            .add_attribute(
                Attribute::new("sku", AttributeType::String)
                    .not_null()
                    .with_description("vendor stock keeping unit"),
            )
            .add_attribute(Attribute::new("meta", AttributeType::Json))
            .add_attribute(Attribute::new("shipped", AttributeType::Boolean).not_null());
        let mut graph = SchemaGraph::new();
        graph.add_node(entity);

        let ts = generate_interface_types(&graph);
        assert!(ts.contains("export interface OrderItems {"));
        assert!(ts.contains("    id: number;"));
        assert!(ts.contains("    sku: string; // vendor stock keeping unit"));
        assert!(ts.contains("    meta?: Record<string, unknown>;"));
        // The fixed mapping has three targets; booleans read as strings.
        assert!(ts.contains("    shipped: string;"));
    }

    #[test]
    fn test_nullable_fields_are_optional() {
        let entity = EntityNode::new("users")
            .add_attribute(Attribute::new("id", AttributeType::Integer).primary_key())
            .add_attribute(Attribute::new("nickname", AttributeType::String));
        let mut graph = SchemaGraph::new();
        graph.add_node(entity);

        let ts = generate_interface_types(&graph);
        assert!(ts.contains("    id: number;"));
        assert!(ts.contains("    nickname?: string;"));
    }
}
