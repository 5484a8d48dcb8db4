//! Validation of generated SQL.
//!
//! The editor re-parses what the exporters emit before handing the
//! script to the user ("check on save"), so a dialect bug surfaces as a
//! diagnostic instead of a broken script. Syntax goes through sqlparser
//! with the matching dialect; a light semantic pass catches duplicate
//! tables/columns and foreign keys against unknown tables.

use serde::{Deserialize, Serialize};
use sqlparser::ast::{Statement, TableConstraint};
use sqlparser::dialect::{Dialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::{Parser, ParserError};
use std::collections::HashSet;

use crate::export::{generate_ddl, SqlDialect};
use crate::schema::SchemaGraph;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// 1-based position in the SQL source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One finding against the SQL text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub position: Option<SourcePosition>,
    pub code: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            position: None,
            code: code.into(),
            suggestion: None,
        }
    }

    pub fn warning(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            position: None,
            code: code.into(),
            suggestion: None,
        }
    }

    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(position) = &self.position {
            write!(f, " at line {}, column {}", position.line, position.column)?;
        }
        Ok(())
    }
}

/// Outcome of checking one SQL script.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub is_valid: bool,
    pub table_count: usize,
}

impl CheckResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// One line per finding plus a summary, for the save dialog.
    pub fn format_for_display(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            if let Some(suggestion) = &diagnostic.suggestion {
                out.push_str(&format!(" (suggestion: {})", suggestion));
            }
            out.push('\n');
        }
        if self.diagnostics.is_empty() {
            out.push_str("No issues found\n");
        }
        out.push_str(&format!(
            "Summary: {} tables, {} errors",
            self.table_count,
            self.error_count()
        ));
        out
    }
}

/// Parses SQL with the parser matching one export dialect.
pub struct SqlChecker {
    dialect: SqlDialect,
}

impl SqlChecker {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self.dialect {
            SqlDialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
            SqlDialect::MySQL => Box::new(MySqlDialect {}),
            SqlDialect::SqlServer => Box::new(MsSqlDialect {}),
        }
    }

    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, ParserError> {
        let dialect = self.parser_dialect();
        Parser::parse_sql(dialect.as_ref(), sql)
    }

    /// Full check: syntax first, then the semantic pass.
    pub fn check(&self, sql: &str) -> CheckResult {
        let mut result = CheckResult::default();
        match self.parse(sql) {
            Ok(statements) => {
                semantic_pass(&statements, &mut result);
                result.is_valid = !result.has_errors();
            }
            Err(error) => {
                result.diagnostics.push(self.syntax_diagnostic(&error));
                result.is_valid = false;
            }
        }
        result
    }

    fn syntax_diagnostic(&self, error: &ParserError) -> Diagnostic {
        let message = error.to_string();
        let mut diagnostic = Diagnostic::error(message.clone(), "E001_SYNTAX");
        if let Some(position) = extract_position(&message) {
            diagnostic = diagnostic.with_position(position);
        }
        if let Some(suggestion) = suggestion_for(&message) {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
        diagnostic
    }
}

/// sqlparser reports positions as "... at Line: X, Column: Y" inside the
/// message text; pull them out.
fn extract_position(message: &str) -> Option<SourcePosition> {
    let line_start = message.find("Line: ")? + 6;
    let line_end = message[line_start..]
        .find(',')
        .map(|p| line_start + p)
        .unwrap_or(message.len());
    let line = message[line_start..line_end].trim().parse::<usize>().ok()?;

    let column_start = message.find("Column: ")? + 8;
    let column_end = message[column_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|p| column_start + p)
        .unwrap_or(message.len());
    let column = message[column_start..column_end].parse::<usize>().ok()?;

    Some(SourcePosition::new(line, column))
}

fn suggestion_for(message: &str) -> Option<String> {
    if message.contains("Expected identifier") {
        Some("Make sure you have a valid table or column name.".into())
    } else if message.contains("Expected )") {
        Some("Check for matching parentheses.".into())
    } else if message.contains("Expected ;") {
        Some("Add a semicolon at the end of the statement.".into())
    } else if message.contains("Expected ,") {
        Some("Separate column definitions with commas.".into())
    } else if message.contains("Expected keyword") {
        Some("Check for typos in SQL keywords.".into())
    } else {
        None
    }
}

/// Duplicate tables, duplicate columns within a table, and references to
/// tables that were never created.
fn semantic_pass(statements: &[Statement], result: &mut CheckResult) {
    let mut tables: HashSet<String> = HashSet::new();

    for statement in statements {
        if let Statement::CreateTable(create_table) = statement {
            let table_name = create_table.name.to_string().to_lowercase();
            if !tables.insert(table_name.clone()) {
                result.diagnostics.push(Diagnostic::error(
                    format!("Table '{}' is defined more than once", create_table.name),
                    "E101_DUPLICATE_TABLE",
                ));
            } else {
                result.table_count += 1;
            }

            let mut columns: HashSet<String> = HashSet::new();
            for column in &create_table.columns {
                if !columns.insert(column.name.value.to_lowercase()) {
                    result.diagnostics.push(Diagnostic::error(
                        format!(
                            "Column '{}' appears more than once in table '{}'",
                            column.name.value, create_table.name
                        ),
                        "E102_DUPLICATE_COLUMN",
                    ));
                }
            }
        }
    }

    for statement in statements {
        match statement {
            Statement::CreateTable(create_table) => {
                for constraint in &create_table.constraints {
                    if let TableConstraint::ForeignKey(fk_constraint) = constraint {
                        check_known_table(&tables, &fk_constraint.foreign_table.to_string(), result);
                    }
                }
            }
            Statement::AlterTable(alter_table) => {
                check_known_table(&tables, &alter_table.name.to_string(), result);
            }
            _ => {}
        }
    }
}

fn check_known_table(tables: &HashSet<String>, name: &str, result: &mut CheckResult) {
    if !tables.contains(&name.to_lowercase()) {
        result.diagnostics.push(Diagnostic::error(
            format!("Referenced table '{}' does not exist", name),
            "E103_UNKNOWN_TABLE",
        ));
    }
}

/// Validate a SQL script against one dialect's parser.
pub fn validate_sql(sql: &str, dialect: SqlDialect) -> CheckResult {
    SqlChecker::new(dialect).check(sql)
}

/// The save-time round-trip: export the model as DDL, then re-parse it.
pub fn check_schema_sql(graph: &SchemaGraph, dialect: SqlDialect) -> CheckResult {
    validate_sql(&generate_ddl(graph, dialect), dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sql() {
        let sql = "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(255));";
        let result = validate_sql(sql, SqlDialect::MySQL);
        assert!(result.is_valid, "{:?}", result.diagnostics);
        assert_eq!(result.table_count, 1);
    }

    #[test]
    fn test_syntax_error_carries_position() {
        let sql = "CREATE TABL users (id INT);";
        let result = validate_sql(sql, SqlDialect::MySQL);
        assert!(!result.is_valid);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_duplicate_table() {
        let sql = "CREATE TABLE users (id INT); CREATE TABLE users (id INT);";
        let result = validate_sql(sql, SqlDialect::MySQL);
        assert!(!result.is_valid);
        assert!(result.diagnostics[0].message.contains("more than once"));
    }

    #[test]
    fn test_duplicate_column() {
        let sql = "CREATE TABLE users (id INT, id VARCHAR(255));";
        let result = validate_sql(sql, SqlDialect::MySQL);
        assert!(!result.is_valid);
        assert!(result.diagnostics[0].message.contains("Column 'id'"));
    }

    #[test]
    fn test_alter_unknown_table() {
        let sql = "CREATE TABLE users (id INT PRIMARY KEY);\n\
                   ALTER TABLE orders ADD CONSTRAINT fk_orders_users FOREIGN KEY (user_id) REFERENCES users (id);";
        let result = validate_sql(sql, SqlDialect::MySQL);
        assert!(!result.is_valid);
        assert!(result.diagnostics[0].message.contains("'orders'"));
    }

    #[test]
    fn test_extract_position() {
        let position =
            extract_position("Expected: something, found: X at Line: 3, Column: 14").unwrap();
        assert_eq!(position, SourcePosition::new(3, 14));
        assert!(extract_position("no position here").is_none());
    }

    #[test]
    fn test_format_for_display() {
        let sql = "CREATE TABLE users (id INT PRIMARY KEY);";
        let result = validate_sql(sql, SqlDialect::PostgreSQL);
        let display = result.format_for_display();
        assert!(display.contains("No issues found"));
        assert!(display.contains("1 tables"));
    }
}
