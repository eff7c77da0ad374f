use crate::transpiler::collections::CollectionPathPattern;
use crate::transpiler::traits::{SqlGenerator, escape_identifier, string_literal};

/// PostgreSQL Generator.
///
/// Collection path columns are expected to be `ltree`, matched with `lquery`
/// patterns such as `TOP.*{1,}`.
pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn bool_literal(&self, val: bool) -> String {
        val.to_string()
    }

    fn limit_offset(&self, limit: Option<usize>, offset: Option<usize>) -> String {
        let mut sql = String::new();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
        sql
    }

    fn regex_match(&self, col: &str, pattern: &str) -> String {
        format!("{} ~ {}", col, pattern)
    }

    fn collection_path_matches(&self, col: &str, pattern: &CollectionPathPattern) -> String {
        format!("{} ~ {}", col, string_literal(&pattern.lquery()))
    }
}
