use crate::ast::{ComparisonOp, SqlType, Value};
use crate::transpiler::collections::{CollectionPath, CollectionPathPattern};
use crate::transpiler::query::{ColumnRef, FilterQuery, RenderContext};
use crate::transpiler::traits::SqlGenerator;

/// Context for parameterized query building.
#[derive(Debug, Default)]
pub struct ParamContext {
    /// Current parameter index (1-based for Postgres $1, $2, etc.)
    pub index: usize,
    /// Collected parameter values in placeholder order
    pub params: Vec<Value>,
    /// SQL type of each collected value
    pub types: Vec<SqlType>,
}

impl ParamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value and return the placeholder for it.
    pub fn add_param(&mut self, value: Value, generator: &dyn SqlGenerator) -> String {
        self.index += 1;
        // Only scalars reach a placeholder; the compiler rejects the rest earlier.
        self.types.push(value.sql_type().unwrap_or(SqlType::Varchar));
        self.params.push(value);
        generator.placeholder(self.index)
    }
}

/// A boolean SQL condition over aliased columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> ?` with the value bound.
    Compare {
        column: ColumnRef,
        op: ComparisonOp,
        value: Value,
    },
    /// `left = right`, used for join predicates.
    ColumnEq(ColumnRef, ColumnRef),
    IsNull(ColumnRef),
    IsNotNull(ColumnRef),
    /// Regular expression match against a bound pattern.
    Regex { column: ColumnRef, pattern: String },
    /// Collection path lies below a prefix.
    PathMatches {
        column: ColumnRef,
        pattern: CollectionPathPattern,
    },
    /// Collection path equals an exact path.
    PathEquals {
        column: ColumnRef,
        path: CollectionPath,
    },
    /// `column IN (1, 2, 3)` with inline integer literals.
    InList { column: ColumnRef, ids: Vec<i64> },
    /// `column IN (<filter query>)`
    InQuery {
        column: ColumnRef,
        query: Box<FilterQuery>,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    /// Never holds.
    False,
}

impl Condition {
    pub fn and(mut conditions: Vec<Condition>) -> Condition {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::And(conditions)
        }
    }

    pub fn or(mut conditions: Vec<Condition>) -> Condition {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::Or(conditions)
        }
    }

    /// Render to SQL, appending bound values in text order.
    pub fn to_sql(&self, ctx: &RenderContext<'_>, params: &mut ParamContext) -> String {
        let generator = ctx.generator;
        match self {
            Condition::Compare { column, op, value } => {
                let col = column.to_sql(generator);
                let placeholder = params.add_param(value.clone(), generator);
                format!("{} {} {}", col, op.sql_symbol(), placeholder)
            }
            Condition::ColumnEq(left, right) => {
                format!("{} = {}", left.to_sql(generator), right.to_sql(generator))
            }
            Condition::IsNull(column) => format!("{} IS NULL", column.to_sql(generator)),
            Condition::IsNotNull(column) => format!("{} IS NOT NULL", column.to_sql(generator)),
            Condition::Regex { column, pattern } => {
                let col = column.to_sql(generator);
                let placeholder = params.add_param(Value::String(pattern.clone()), generator);
                generator.regex_match(&col, &placeholder)
            }
            Condition::PathMatches { column, pattern } => {
                generator.collection_path_matches(&column.to_sql(generator), pattern)
            }
            Condition::PathEquals { column, path } => {
                generator.collection_path_equals(&column.to_sql(generator), path)
            }
            Condition::InList { column, ids } => {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                format!("{} IN ({})", column.to_sql(generator), ids.join(", "))
            }
            Condition::InQuery { column, query } => {
                let col = column.to_sql(generator);
                format!("{} IN ({})", col, query.to_sql(ctx, params))
            }
            Condition::And(items) => {
                if items.is_empty() {
                    return generator.bool_literal(true);
                }
                let parts: Vec<String> = items
                    .iter()
                    .map(|c| match c {
                        Condition::And(_) => format!("({})", c.to_sql(ctx, params)),
                        _ => c.to_sql(ctx, params),
                    })
                    .collect();
                parts.join(" AND ")
            }
            Condition::Or(items) => {
                if items.is_empty() {
                    return generator.bool_literal(false);
                }
                let parts: Vec<String> = items
                    .iter()
                    .map(|c| match c {
                        Condition::And(inner) if inner.len() > 1 => {
                            format!("({})", c.to_sql(ctx, params))
                        }
                        _ => c.to_sql(ctx, params),
                    })
                    .collect();
                format!("({})", parts.join(" OR "))
            }
            Condition::Not(inner) => format!("NOT ({})", inner.to_sql(ctx, params)),
            Condition::False => generator.bool_literal(false),
        }
    }
}
