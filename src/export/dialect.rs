//! SQL output targets and their syntax differences.
//!
//! All three dialects share one DDL walker (`ddl`); everything that may
//! differ between targets lives here so a new dialect cannot drift from
//! the shared column-clause ordering.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::catalog::AttributeType;
use crate::schema::{Attribute, EntityNode};

/// A SQL output target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[display("PostgreSQL")]
    #[serde(rename = "postgres")]
    PostgreSQL,
    #[display("MySQL")]
    MySQL,
    #[display("SQL Server")]
    #[serde(rename = "sqlserver")]
    SqlServer,
}

impl SqlDialect {
    pub const ALL: [SqlDialect; 3] = [
        SqlDialect::PostgreSQL,
        SqlDialect::MySQL,
        SqlDialect::SqlServer,
    ];

    /// Parse a dialect name as the editor's export menu spells them.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(SqlDialect::PostgreSQL),
            "mysql" => Some(SqlDialect::MySQL),
            "sqlserver" | "sql server" | "mssql" => Some(SqlDialect::SqlServer),
            _ => None,
        }
    }

    /// SQL Server has no `IF NOT EXISTS` on CREATE TABLE.
    pub(crate) fn create_table_prefix(self) -> &'static str {
        match self {
            SqlDialect::PostgreSQL | SqlDialect::MySQL => "CREATE TABLE IF NOT EXISTS",
            SqlDialect::SqlServer => "CREATE TABLE",
        }
    }

    /// The dialect's column type for an attribute.
    pub(crate) fn column_type(self, attribute: &Attribute) -> String {
        match self {
            SqlDialect::PostgreSQL => match attribute.data_type {
                AttributeType::Boolean => "BOOLEAN".into(),
                AttributeType::SmallInt => "SMALLINT".into(),
                AttributeType::Integer => "INT".into(),
                AttributeType::LargeInt => "BIGINT".into(),
                AttributeType::Float => "REAL".into(),
                AttributeType::Double => "DOUBLE PRECISION".into(),
                AttributeType::Numeric => format!(
                    "NUMERIC({},{})",
                    attribute.effective_precision(),
                    attribute.effective_scale()
                ),
                AttributeType::String => format!("VARCHAR({})", attribute.effective_length()),
                AttributeType::Text => "TEXT".into(),
                AttributeType::Uuid => "UUID".into(),
                AttributeType::Date => "DATE".into(),
                AttributeType::Time => "TIME".into(),
                AttributeType::DateTime | AttributeType::Timestamp => "TIMESTAMP".into(),
                AttributeType::Json => "JSONB".into(),
                AttributeType::Geometry => "GEOMETRY".into(),
                AttributeType::Geography => "GEOGRAPHY".into(),
            },
            SqlDialect::MySQL => match attribute.data_type {
                AttributeType::Boolean => "BOOLEAN".into(),
                AttributeType::SmallInt => "SMALLINT".into(),
                AttributeType::Integer => "INT".into(),
                AttributeType::LargeInt => "BIGINT".into(),
                AttributeType::Float => "FLOAT".into(),
                AttributeType::Double => "DOUBLE".into(),
                AttributeType::Numeric => format!(
                    "DECIMAL({},{})",
                    attribute.effective_precision(),
                    attribute.effective_scale()
                ),
                AttributeType::String => format!("VARCHAR({})", attribute.effective_length()),
                AttributeType::Text => "TEXT".into(),
                AttributeType::Uuid => "CHAR(36)".into(),
                AttributeType::Date => "DATE".into(),
                AttributeType::Time => "TIME".into(),
                AttributeType::DateTime => "DATETIME".into(),
                AttributeType::Timestamp => "TIMESTAMP".into(),
                AttributeType::Json => "JSON".into(),
                // MySQL has no separate geography type.
                AttributeType::Geometry | AttributeType::Geography => "GEOMETRY".into(),
            },
            SqlDialect::SqlServer => match attribute.data_type {
                AttributeType::Boolean => "BIT".into(),
                AttributeType::SmallInt => "SMALLINT".into(),
                AttributeType::Integer => "INT".into(),
                AttributeType::LargeInt => "BIGINT".into(),
                AttributeType::Float => "REAL".into(),
                AttributeType::Double => "FLOAT".into(),
                AttributeType::Numeric => format!(
                    "DECIMAL({},{})",
                    attribute.effective_precision(),
                    attribute.effective_scale()
                ),
                AttributeType::String => {
                    if attribute.is_unicode {
                        format!("NVARCHAR({})", attribute.effective_length())
                    } else {
                        format!("VARCHAR({})", attribute.effective_length())
                    }
                }
                AttributeType::Text => {
                    if attribute.is_unicode {
                        "NVARCHAR(MAX)".into()
                    } else {
                        "VARCHAR(MAX)".into()
                    }
                }
                AttributeType::Uuid => "UNIQUEIDENTIFIER".into(),
                AttributeType::Date => "DATE".into(),
                AttributeType::Time => "TIME".into(),
                AttributeType::DateTime | AttributeType::Timestamp => "DATETIME2".into(),
                AttributeType::Json => "NVARCHAR(MAX)".into(),
                AttributeType::Geometry => "GEOMETRY".into(),
                AttributeType::Geography => "GEOGRAPHY".into(),
            },
        }
    }

    pub(crate) fn auto_increment_clause(self) -> &'static str {
        match self {
            SqlDialect::PostgreSQL => "GENERATED ALWAYS AS IDENTITY",
            SqlDialect::MySQL => "AUTO_INCREMENT",
            SqlDialect::SqlServer => "IDENTITY(1,1)",
        }
    }

    /// The "current value of this temporal type" default expression.
    pub(crate) fn now_default(self, ty: AttributeType) -> &'static str {
        match (self, ty) {
            (SqlDialect::PostgreSQL, AttributeType::Date) => "CURRENT_DATE",
            (SqlDialect::PostgreSQL, AttributeType::Time) => "CURRENT_TIME",
            (SqlDialect::PostgreSQL, _) => "CURRENT_TIMESTAMP",
            (SqlDialect::MySQL, _) => "CURRENT_TIMESTAMP",
            (SqlDialect::SqlServer, _) => "GETDATE()",
        }
    }

    pub(crate) fn bool_literal(self, value: bool) -> &'static str {
        match self {
            SqlDialect::PostgreSQL => {
                if value {
                    "TRUE"
                } else {
                    "FALSE"
                }
            }
            SqlDialect::MySQL | SqlDialect::SqlServer => {
                if value {
                    "1"
                } else {
                    "0"
                }
            }
        }
    }

    /// Trailing per-column clauses: MySQL charset/collation for unicode
    /// strings and inline column comments.
    pub(crate) fn column_extras(self, attribute: &Attribute) -> Option<String> {
        match self {
            SqlDialect::MySQL => {
                let mut extras: Vec<String> = Vec::new();
                if attribute.is_unicode && attribute.data_type.is_textual() {
                    extras.push("CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci".into());
                }
                if let Some(description) = &attribute.description {
                    extras.push(format!("COMMENT '{}'", escape_single_quotes(description)));
                }
                if extras.is_empty() {
                    None
                } else {
                    Some(extras.join(" "))
                }
            }
            SqlDialect::PostgreSQL | SqlDialect::SqlServer => None,
        }
    }

    /// Statements emitted after an entity's CREATE TABLE: column
    /// descriptions where the dialect has no inline comment syntax.
    pub(crate) fn post_table_statements(self, entity: &EntityNode) -> Vec<String> {
        match self {
            SqlDialect::PostgreSQL => entity
                .attributes
                .iter()
                .filter_map(|attribute| {
                    attribute.description.as_ref().map(|description| {
                        format!(
                            "COMMENT ON COLUMN {}.{} IS '{}';",
                            entity.name,
                            attribute.name,
                            escape_single_quotes(description)
                        )
                    })
                })
                .collect(),
            SqlDialect::SqlServer => entity
                .attributes
                .iter()
                .filter_map(|attribute| {
                    attribute.description.as_ref().map(|description| {
                        format!(
                            "EXEC sp_addextendedproperty 'MS_Description', '{}', 'SCHEMA', 'dbo', 'TABLE', '{}', 'COLUMN', '{}';",
                            escape_single_quotes(description),
                            entity.name,
                            attribute.name
                        )
                    })
                })
                .collect(),
            SqlDialect::MySQL => Vec::new(),
        }
    }
}

/// Escape `'` inside a literal. Used for INSERT values, default literals
/// and comment text alike.
pub(crate) fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "\\'")
}
