//! Validation for entity and attribute names.
//!
//! Names must work unquoted in every target dialect, so the rules are the
//! strictest intersection: start with a letter, letters/digits/underscore
//! only, at most 63 characters, not a reserved keyword, unique among
//! their siblings.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum identifier length (PostgreSQL is the tightest target).
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Reserved keywords that cannot be used as identifiers without quoting,
/// combined from the SQL standard and the three target dialects.
static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // SQL Standard
        "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK",
        "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
        "CURRENT_TIMESTAMP", "CURRENT_USER", "DATABASE", "DEFAULT", "DELETE", "DESC", "DISTINCT",
        "DROP", "ELSE", "END", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL",
        "GRANT", "GROUP", "HAVING", "IF", "IN", "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN",
        "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER",
        "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "TRUE", "UNION",
        "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WITH",
        // MySQL
        "AUTO_INCREMENT", "BIGINT", "BINARY", "BLOB", "BOOL", "BOOLEAN", "CHANGE", "CHAR",
        "CHARACTER", "COLLATE", "DATE", "DATETIME", "DECIMAL", "DOUBLE", "ENUM", "EXPLAIN",
        "FLOAT", "FORCE", "IGNORE", "INT", "INTEGER", "INTERVAL", "LONGBLOB", "LONGTEXT",
        "MEDIUMBLOB", "MEDIUMINT", "MEDIUMTEXT", "MODIFY", "NUMERIC", "PROCEDURE", "REAL",
        "RENAME", "REPLACE", "SCHEMA", "SHOW", "SMALLINT", "TEXT", "TIME", "TIMESTAMP",
        "TINYBLOB", "TINYINT", "TINYTEXT", "TRIGGER", "TRUNCATE", "UNSIGNED", "VARBINARY",
        "VARCHAR", "VIEW", "YEAR", "ZEROFILL",
        // PostgreSQL
        "ANALYSE", "ANALYZE", "ARRAY", "ASYMMETRIC", "AUTHORIZATION", "BOTH", "CAST",
        "CONCURRENTLY", "DEFERRABLE", "DO", "EXCEPT", "FREEZE", "ILIKE", "INITIALLY",
        "INTERSECT", "ISNULL", "LATERAL", "LEADING", "LOCALTIME", "LOCALTIMESTAMP", "NATURAL",
        "NOTNULL", "ONLY", "OVERLAPS", "PLACING", "RETURNING", "SESSION_USER", "SIMILAR",
        "SOME", "SYMMETRIC", "TABLESAMPLE", "TRAILING", "VARIADIC", "VERBOSE", "WINDOW",
        // SQL Server
        "BACKUP", "BREAK", "BROWSE", "BULK", "CLUSTERED", "COMPUTE", "CONTAINS", "DBCC",
        "DISK", "DISTRIBUTED", "EXEC", "EXECUTE", "FILE", "HOLDLOCK", "IDENTITY", "KILL",
        "LINENO", "MERGE", "NOCHECK", "NONCLUSTERED", "OVER", "PERCENT", "PIVOT", "PLAN",
        "PRINT", "RAISERROR", "READTEXT", "RECONFIGURE", "ROWCOUNT", "ROWGUIDCOL", "RULE",
        "SAVE", "SETUSER", "SHUTDOWN", "STATISTICS", "TOP", "TRAN", "TRANSACTION", "TSEQUAL",
        "UNPIVOT", "UPDATETEXT", "WAITFOR", "WHILE", "WRITETEXT",
    ]
    .into_iter()
    .collect()
});

/// A single validation finding.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Empty,
    TooLong { max: usize, actual: usize },
    InvalidCharacters { invalid: Vec<char> },
    MustStartWithLetter,
    ReservedKeyword { keyword: String },
    Duplicate { name: String },
    EndsWithUnderscore,
    ConsecutiveUnderscores,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "Name cannot be empty"),
            ValidationError::TooLong { max, actual } => {
                write!(f, "Name is too long ({} chars, max {})", actual, max)
            }
            ValidationError::InvalidCharacters { invalid } => {
                let chars: String = invalid.iter().collect();
                write!(
                    f,
                    "Name contains invalid characters: '{}'. Only letters, numbers, and underscores are allowed",
                    chars
                )
            }
            ValidationError::MustStartWithLetter => {
                write!(f, "Name must start with a letter")
            }
            ValidationError::ReservedKeyword { keyword } => {
                write!(f, "'{}' is a reserved SQL keyword", keyword)
            }
            ValidationError::Duplicate { name } => {
                write!(f, "'{}' is already in use", name)
            }
            ValidationError::EndsWithUnderscore => {
                write!(f, "Name should not end with an underscore")
            }
            ValidationError::ConsecutiveUnderscores => {
                write!(f, "Name cannot contain consecutive underscores")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating one identifier. Errors block the edit; warnings
/// are style findings the editor surfaces without blocking.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// All findings as display strings, errors first.
    pub fn all_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("Error: {}", e))
            .chain(self.warnings.iter().map(|w| format!("Warning: {}", w)))
            .collect()
    }
}

/// Validate an entity or attribute name against the naming rules and the
/// sibling names it must not collide with. Collisions are checked
/// case-insensitively since none of the target dialects distinguishes
/// unquoted identifiers by case.
pub fn validate_identifier<'a, I>(name: &str, existing: I) -> ValidationResult
where
    I: IntoIterator<Item = &'a str>,
{
    let mut result = ValidationResult::new();

    let trimmed = name.trim();
    if trimmed.is_empty() {
        result.add_error(ValidationError::Empty);
        return result;
    }

    if trimmed.len() > MAX_IDENTIFIER_LENGTH {
        result.add_error(ValidationError::TooLong {
            max: MAX_IDENTIFIER_LENGTH,
            actual: trimmed.len(),
        });
    }

    let invalid_chars: Vec<char> = trimmed
        .chars()
        .filter(|c| !c.is_ascii_alphanumeric() && *c != '_')
        .collect();
    if !invalid_chars.is_empty() {
        result.add_error(ValidationError::InvalidCharacters {
            invalid: invalid_chars,
        });
    }

    if let Some(first) = trimmed.chars().next()
        && !first.is_ascii_alphabetic()
    {
        result.add_error(ValidationError::MustStartWithLetter);
    }

    let upper = trimmed.to_uppercase();
    if RESERVED_KEYWORDS.contains(upper.as_str()) {
        result.add_error(ValidationError::ReservedKeyword {
            keyword: trimmed.to_string(),
        });
    }

    if existing
        .into_iter()
        .any(|other| other.eq_ignore_ascii_case(trimmed))
    {
        result.add_error(ValidationError::Duplicate {
            name: trimmed.to_string(),
        });
    }

    if trimmed.ends_with('_') {
        result.add_warning(ValidationError::EndsWithUnderscore);
    }
    if trimmed.contains("__") {
        result.add_warning(ValidationError::ConsecutiveUnderscores);
    }

    result
}

/// Shorthand when no sibling names apply, returning the first error.
pub fn validate_name(name: &str) -> Result<(), String> {
    let result = validate_identifier(name, []);
    match result.errors.first() {
        Some(error) => Err(error.to_string()),
        None => Ok(()),
    }
}

/// Check if a string is a reserved keyword in any target dialect.
pub fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(name.to_uppercase().as_str())
}

/// Sanitize an identifier by removing/replacing invalid characters.
/// Returns None if nothing usable is left.
pub fn sanitize_identifier(name: &str) -> Option<String> {
    let sanitized: String = name
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                Some(c)
            } else if c == ' ' || c == '-' {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    // Leading digits and underscores can never start an identifier.
    let sanitized = sanitized.trim_start_matches(|c: char| c.is_ascii_digit() || c == '_');

    let mut collapsed = String::new();
    let mut last_was_underscore = false;
    for c in sanitized.chars() {
        if c == '_' {
            if !last_was_underscore {
                collapsed.push(c);
                last_was_underscore = true;
            }
        } else {
            collapsed.push(c);
            last_was_underscore = false;
        }
    }

    let result = collapsed.trim_matches('_').to_string();

    if result.is_empty() || !result.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        None
    } else if result.len() > MAX_IDENTIFIER_LENGTH {
        Some(result[..MAX_IDENTIFIER_LENGTH].to_string())
    } else {
        Some(result)
    }
}

/// Suggest a valid identifier based on the input, prefixing when the
/// sanitized name is still a reserved keyword or nothing usable is left.
pub fn suggest_valid_name(name: &str, prefix: &str) -> String {
    if let Some(sanitized) = sanitize_identifier(name) {
        if is_reserved_keyword(&sanitized) {
            format!("{}_{}", prefix, sanitized.to_lowercase())
        } else {
            sanitized
        }
    } else {
        format!("{}_1", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_name("users").is_ok());
        assert!(validate_name("user_id").is_ok());
        assert!(validate_name("User123").is_ok());
        assert!(validate_name("a").is_ok());
        assert!(validate_name("table_name_here").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_too_long_name() {
        let long_name = "a".repeat(64);
        assert!(validate_name(&long_name).is_err());

        let ok_name = "a".repeat(63);
        assert!(validate_name(&ok_name).is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        assert!(validate_name("user-name").is_err());
        assert!(validate_name("user name").is_err());
        assert!(validate_name("user@name").is_err());
        assert!(validate_name("user.name").is_err());
        assert!(validate_name("имя").is_err());
        assert!(validate_name("tëst").is_err());
    }

    #[test]
    fn test_must_start_with_letter() {
        assert!(validate_name("1user").is_err());
        assert!(validate_name("123").is_err());
        assert!(validate_name("0_table").is_err());
        assert!(validate_name("_internal").is_err());
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(validate_name("SELECT").is_err());
        assert!(validate_name("select").is_err());
        assert!(validate_name("Table").is_err());
        assert!(validate_name("FROM").is_err());
        assert!(validate_name("identity").is_err());
        assert!(validate_name("user").is_ok());
    }

    #[test]
    fn test_duplicates() {
        let result = validate_identifier("email", ["id", "email"]);
        assert!(!result.is_valid());
        assert!(matches!(
            result.errors[0],
            ValidationError::Duplicate { .. }
        ));

        // Case-insensitive collision
        let result = validate_identifier("Email", ["email"]);
        assert!(!result.is_valid());

        let result = validate_identifier("email", ["id", "name"]);
        assert!(result.is_valid());
    }

    #[test]
    fn test_warnings() {
        let result = validate_identifier("name_", []);
        assert!(result.is_valid());
        assert!(result.has_warnings());

        let result = validate_identifier("some__name", []);
        assert!(result.is_valid());
        assert!(result.has_warnings());
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("user name"), Some("user_name".to_string()));
        assert_eq!(sanitize_identifier("user-name"), Some("user_name".to_string()));
        assert_eq!(sanitize_identifier("123user"), Some("user".to_string()));
        assert_eq!(sanitize_identifier("__name__"), Some("name".to_string()));
        assert_eq!(sanitize_identifier("a  b  c"), Some("a_b_c".to_string()));
        assert_eq!(sanitize_identifier("123"), None);
        assert_eq!(sanitize_identifier("@#$"), None);
    }

    #[test]
    fn test_suggest_valid_name() {
        assert_eq!(suggest_valid_name("user name", "col"), "user_name");
        assert_eq!(suggest_valid_name("SELECT", "col"), "col_select");
        assert_eq!(suggest_valid_name("123", "col"), "col_1");
        assert_eq!(suggest_valid_name("valid_name", "col"), "valid_name");
    }

    #[test]
    fn test_is_reserved_keyword() {
        assert!(is_reserved_keyword("SELECT"));
        assert!(is_reserved_keyword("select"));
        assert!(is_reserved_keyword("Merge"));
        assert!(!is_reserved_keyword("users"));
        assert!(!is_reserved_keyword("my_table"));
    }

    #[test]
    fn test_all_messages() {
        let result = validate_identifier("select", []);
        let messages = result.all_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Error:"));
    }
}
