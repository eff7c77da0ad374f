//! Transpiler traits and utilities.

use crate::ast::SetOp;
use crate::transpiler::collections::{CollectionPath, CollectionPathPattern};

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "order", "group", "user", "table", "select", "from", "where", "join", "left", "right",
    "inner", "outer", "on", "and", "or", "not", "null", "true", "false", "limit", "offset",
    "as", "in", "is", "like", "between", "having", "union", "all", "distinct", "case", "when",
    "then", "else", "end", "intersect", "except", "index", "key", "primary", "default", "check",
];

/// Escape an identifier if it's a reserved word or contains special chars.
pub fn escape_identifier(name: &str) -> String {
    escape_with(name, '"', '"')
}

pub(crate) fn escape_with(name: &str, open: char, close: char) -> String {
    let lower = name.to_lowercase();
    let needs_escaping = RESERVED_WORDS.contains(&lower.as_str())
        || name.is_empty()
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().map(|c| c.is_numeric()).unwrap_or(false);

    if needs_escaping {
        let doubled = format!("{}{}", close, close);
        format!("{}{}{}", open, name.replace(close, &doubled), close)
    } else {
        name.to_string()
    }
}

/// Escape a string literal (single quotes doubled).
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Trait for dialect-specific SQL generation.
pub trait SqlGenerator: Send + Sync {
    /// Dialect name used in diagnostics.
    fn name(&self) -> &'static str;
    /// Quote an identifier (table or column name) when required.
    fn quote_identifier(&self, name: &str) -> String;
    /// Generate the parameter placeholder (e.g., $1, ?) for a 1-based index.
    fn placeholder(&self, index: usize) -> String;
    /// Get the boolean literal (true/false vs 1/0).
    fn bool_literal(&self, val: bool) -> String;
    fn limit_offset(&self, limit: Option<usize>, offset: Option<usize>) -> String;

    /// Whether [`SqlGenerator::regex_match`] produces a usable expression.
    fn supports_regex(&self) -> bool {
        true
    }

    /// Regular expression match of `col` against the bound `pattern`.
    fn regex_match(&self, col: &str, pattern: &str) -> String {
        format!("{} REGEXP {}", col, pattern)
    }

    /// Collection path column lies strictly below the pattern prefix.
    /// Default: `col LIKE 'TOP.%'`.
    fn collection_path_matches(&self, col: &str, pattern: &CollectionPathPattern) -> String {
        format!("{} LIKE {}", col, string_literal(&pattern.like_pattern()))
    }

    /// Collection path column equals an exact path.
    fn collection_path_equals(&self, col: &str, path: &CollectionPath) -> String {
        format!("{} = {}", col, string_literal(&path.to_string()))
    }

    fn set_operator(&self, op: SetOp) -> &'static str {
        op.sql_keyword()
    }
}
