//! Runtime validation schema for synthetic rows.
//!
//! The AI data generator is asked for rows per entity; before those rows
//! are turned into INSERT statements they are validated against this
//! schema, which mirrors the model's types, nullability and defaults.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::AttributeType;
use crate::schema::{Attribute, DefaultValue, SchemaGraph};

/// Extra meaning carried by a text field beyond "some string".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSemantic {
    Uuid,
    Date,
    Time,
    DateTime,
    Timestamp,
    /// Accepts a JSON string as well as an object or array value.
    Json,
}

/// Field validator category.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Boolean,
    Integer,
    Decimal {
        #[serde(skip_serializing_if = "Option::is_none")]
        precision: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scale: Option<u32>,
    },
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        semantic: Option<TextSemantic>,
    },
}

/// One field of one entity's row shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Row shape of one entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntitySchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

/// The whole model's row shapes; validates one array of rows per entity
/// name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RuntimeSchema {
    pub entities: Vec<EntitySchema>,
}

/// One problem found while validating generated rows. `row` is the index
/// within the entity's array; entity-level problems carry no field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowProblem {
    pub entity: String,
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

/// Build the runtime schema for the current model snapshot.
pub fn generate_runtime_schema(graph: &SchemaGraph) -> RuntimeSchema {
    let mut entities = Vec::new();
    for node in graph.node_indices() {
        let Some(entity) = graph.node_weight(node) else {
            continue;
        };
        entities.push(EntitySchema {
            name: entity.name.clone(),
            fields: entity.attributes.iter().map(field_schema).collect(),
        });
    }
    RuntimeSchema { entities }
}

fn field_schema(attribute: &Attribute) -> FieldSchema {
    let kind = match attribute.data_type {
        AttributeType::Boolean => FieldKind::Boolean,
        AttributeType::SmallInt | AttributeType::Integer | AttributeType::LargeInt => {
            FieldKind::Integer
        }
        AttributeType::Float | AttributeType::Double => FieldKind::Decimal {
            precision: None,
            scale: None,
        },
        AttributeType::Numeric => FieldKind::Decimal {
            precision: Some(attribute.effective_precision()),
            scale: Some(attribute.effective_scale()),
        },
        AttributeType::String => FieldKind::Text {
            length: Some(attribute.effective_length()),
            semantic: None,
        },
        AttributeType::Text | AttributeType::Geometry | AttributeType::Geography => {
            FieldKind::Text {
                length: None,
                semantic: None,
            }
        }
        AttributeType::Uuid => FieldKind::Text {
            length: None,
            semantic: Some(TextSemantic::Uuid),
        },
        AttributeType::Date => FieldKind::Text {
            length: None,
            semantic: Some(TextSemantic::Date),
        },
        AttributeType::Time => FieldKind::Text {
            length: None,
            semantic: Some(TextSemantic::Time),
        },
        AttributeType::DateTime => FieldKind::Text {
            length: None,
            semantic: Some(TextSemantic::DateTime),
        },
        AttributeType::Timestamp => FieldKind::Text {
            length: None,
            semantic: Some(TextSemantic::Timestamp),
        },
        AttributeType::Json => FieldKind::Text {
            length: None,
            semantic: Some(TextSemantic::Json),
        },
    };

    let default = match &attribute.default {
        DefaultValue::Literal(value) => Some(value.clone()),
        DefaultValue::Null => Some(Value::Null),
        // The "now" marker has no materializable value here.
        DefaultValue::None | DefaultValue::CurrentTimestamp => None,
    };

    FieldSchema {
        name: attribute.name.clone(),
        kind,
        nullable: attribute.effective_nullable(),
        default,
    }
}

impl RuntimeSchema {
    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Validate generated rows: one array of row objects per entity name.
    /// Returns every problem found; an empty list means the rows conform.
    pub fn validate(&self, rows_by_entity: &Map<String, Value>) -> Vec<RowProblem> {
        let mut problems = Vec::new();
        for (entity_name, rows) in rows_by_entity {
            let Some(schema) = self.entity(entity_name) else {
                problems.push(RowProblem {
                    entity: entity_name.clone(),
                    row: 0,
                    field: None,
                    message: format!("Unknown entity '{}'", entity_name),
                });
                continue;
            };
            let Some(rows) = rows.as_array() else {
                problems.push(RowProblem {
                    entity: entity_name.clone(),
                    row: 0,
                    field: None,
                    message: "Expected an array of rows".into(),
                });
                continue;
            };
            for (row_index, row) in rows.iter().enumerate() {
                let Some(object) = row.as_object() else {
                    problems.push(RowProblem {
                        entity: entity_name.clone(),
                        row: row_index,
                        field: None,
                        message: "Expected a row object".into(),
                    });
                    continue;
                };
                for field in &schema.fields {
                    if let Err(message) = field.check(object.get(&field.name)) {
                        problems.push(RowProblem {
                            entity: entity_name.clone(),
                            row: row_index,
                            field: Some(field.name.clone()),
                            message,
                        });
                    }
                }
            }
        }
        problems
    }
}

impl FieldSchema {
    /// Check one field slot of a row. Absence is fine for nullable
    /// fields and for fields that carry a default.
    fn check(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None => {
                if self.nullable || self.default.is_some() {
                    Ok(())
                } else {
                    Err("Missing required field".into())
                }
            }
            Some(Value::Null) => {
                if self.nullable {
                    Ok(())
                } else {
                    Err("Field is not nullable".into())
                }
            }
            Some(value) => self.kind.check(value),
        }
    }
}

impl FieldKind {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldKind::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err("Expected a boolean".into())
                }
            }
            FieldKind::Integer => {
                if value.as_i64().is_some() || value.as_u64().is_some() {
                    Ok(())
                } else {
                    Err("Expected an integer".into())
                }
            }
            FieldKind::Decimal { .. } => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err("Expected a number".into())
                }
            }
            FieldKind::Text { length, semantic } => {
                if matches!(semantic, Some(TextSemantic::Json))
                    && (value.is_object() || value.is_array())
                {
                    return Ok(());
                }
                let Some(text) = value.as_str() else {
                    return Err("Expected a string".into());
                };
                if let Some(max) = length
                    && text.chars().count() > *max as usize
                {
                    return Err(format!("String exceeds maximum length {}", max));
                }
                Ok(())
            }
        }
    }
}
