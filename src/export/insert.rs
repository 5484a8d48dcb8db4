//! Converts generated rows back into dialect-specific INSERT statements.

use serde_json::{Map, Value};

use super::dialect::{escape_single_quotes, SqlDialect};

/// Render one INSERT per row. Statement order follows the entity key
/// order of `rows_by_entity`, then row order; a blank line separates
/// entities. Rows that are not objects are skipped.
pub fn generate_insert_statements(
    dialect: SqlDialect,
    rows_by_entity: &Map<String, Value>,
) -> String {
    let mut out = String::new();
    let mut first_entity = true;
    for (entity, rows) in rows_by_entity {
        let Some(rows) = rows.as_array() else {
            continue;
        };
        if !first_entity {
            out.push('\n');
        }
        first_entity = false;
        for row in rows {
            let Some(fields) = row.as_object() else {
                continue;
            };
            let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
            let values: Vec<String> = fields
                .values()
                .map(|value| render_value(dialect, value))
                .collect();
            out.push_str(&format!(
                "INSERT INTO {} ({}) VALUES ({});\n",
                entity,
                columns.join(", "),
                values.join(", ")
            ));
        }
    }
    out
}

fn render_value(dialect: SqlDialect, value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Bool(b) => dialect.bool_literal(*b).into(),
        Value::String(s) => format!("'{}'", escape_single_quotes(s)),
        Value::Number(n) => n.to_string(),
        // Objects and arrays travel as escaped JSON text.
        Value::Object(_) | Value::Array(_) => {
            format!("'{}'", escape_single_quotes(&value.to_string()))
        }
    }
}
