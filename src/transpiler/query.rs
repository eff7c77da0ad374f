//! Query builder values and their SQL rendering.

use std::collections::HashMap;

use crate::ast::{JoinKind, QualifiedName, SetOp, SortOrder};
use crate::config::LayoutConfig;
use crate::transpiler::conditions::{Condition, ParamContext};
use crate::transpiler::traits::SqlGenerator;

/// Qualifier of the type membership table in every SELECT.
pub const TYPE_ALIAS: &str = "ty";
/// Qualifier of a wrapped compound operand.
pub const SUBQUERY_ALIAS: &str = "sq";

/// Index of a table occurrence within one SELECT. `t0` is the root entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableAlias(pub usize);

impl TableAlias {
    pub const ROOT: TableAlias = TableAlias(0);
}

impl std::fmt::Display for TableAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// `qualifier.column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub qualifier: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(alias: TableAlias, column: &str) -> Self {
        Self { qualifier: alias.to_string(), column: column.to_string() }
    }

    pub fn qualified(qualifier: &str, column: &str) -> Self {
        Self { qualifier: qualifier.to_string(), column: column.to_string() }
    }

    pub fn to_sql(&self, generator: &dyn SqlGenerator) -> String {
        format!("{}.{}", self.qualifier, generator.quote_identifier(&self.column))
    }
}

/// One joined table occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinEdge {
    pub source: TableAlias,
    pub target: TableAlias,
    pub table: String,
    pub kind: JoinKind,
    pub on: Vec<Condition>,
}

/// Memo key for joins already present in a SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    /// Slot table reached from a source row.
    Slot { source: TableAlias, name: QualifiedName },
    /// Entity table reached through an association slot row.
    Target { slot: TableAlias },
}

/// What a SELECT returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `t0.entity_pk`, the shape of every filter operand.
    EntityPk,
    /// `DISTINCT t0.entity_pk, t0.entity_identity` plus sort columns.
    Entities { extra: Vec<ColumnRef> },
    /// `COUNT(DISTINCT t0.entity_pk)`
    Count,
}

/// `GROUP BY t0.entity_pk HAVING COUNT(DISTINCT column) >= min`
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    pub column: ColumnRef,
    pub min: usize,
}

/// Borrowed rendering inputs.
pub struct RenderContext<'a> {
    pub generator: &'a dyn SqlGenerator,
    pub layout: &'a LayoutConfig,
}

/// A single SELECT rooted at the entity table and filtered by entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub projection: Projection,
    pub joins: Vec<JoinEdge>,
    /// ANDed; the type filter is always first.
    pub conditions: Vec<Condition>,
    pub having: Option<Having>,
    pub order_by: Vec<(ColumnRef, SortOrder)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    next_alias: usize,
    memo: HashMap<JoinKey, TableAlias>,
}

impl SelectQuery {
    pub fn new(projection: Projection, layout: &LayoutConfig, type_ids: &[i64]) -> Self {
        Self {
            projection,
            joins: Vec::new(),
            conditions: vec![Condition::InList {
                column: ColumnRef::qualified(TYPE_ALIAS, &layout.type_id_column),
                ids: type_ids.to_vec(),
            }],
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            next_alias: 1,
            memo: HashMap::new(),
        }
    }

    /// Mint the next table alias.
    pub fn next_alias(&mut self) -> TableAlias {
        let alias = TableAlias(self.next_alias);
        self.next_alias += 1;
        alias
    }

    pub fn memoized(&self, key: &JoinKey) -> Option<TableAlias> {
        self.memo.get(key).copied()
    }

    pub fn push_join(&mut self, key: JoinKey, edge: JoinEdge) -> TableAlias {
        let target = edge.target;
        tracing::trace!(
            source = %edge.source,
            target = %edge.target,
            table = %edge.table,
            kind = ?edge.kind,
            "join edge"
        );
        self.memo.insert(key, target);
        self.joins.push(edge);
        target
    }

    pub fn filter(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn to_sql(&self, ctx: &RenderContext<'_>, params: &mut ParamContext) -> String {
        let generator = ctx.generator;
        let layout = ctx.layout;
        let pk = ColumnRef::new(TableAlias::ROOT, &layout.entity_pk_column);

        let mut sql = match &self.projection {
            Projection::EntityPk => format!("SELECT {}", pk.to_sql(generator)),
            Projection::Entities { extra } => {
                let identity = ColumnRef::new(TableAlias::ROOT, &layout.entity_identity_column);
                let mut cols = vec![pk.to_sql(generator), identity.to_sql(generator)];
                cols.extend(extra.iter().map(|c| c.to_sql(generator)));
                format!("SELECT DISTINCT {}", cols.join(", "))
            }
            Projection::Count => format!("SELECT COUNT(DISTINCT {})", pk.to_sql(generator)),
        };

        sql.push_str(&format!(
            " FROM {} {} JOIN {} {} ON {} = {}",
            generator.quote_identifier(&layout.entity_table),
            TableAlias::ROOT,
            generator.quote_identifier(&layout.type_table),
            TYPE_ALIAS,
            ColumnRef::qualified(TYPE_ALIAS, &layout.entity_pk_column).to_sql(generator),
            pk.to_sql(generator),
        ));

        for join in &self.joins {
            let on: Vec<String> = join.on.iter().map(|c| c.to_sql(ctx, params)).collect();
            sql.push_str(&format!(
                " {} {} {} ON {}",
                join.kind.sql_keyword(),
                generator.quote_identifier(&join.table),
                join.target,
                on.join(" AND ")
            ));
        }

        if !self.conditions.is_empty() {
            let parts: Vec<String> = self
                .conditions
                .iter()
                .map(|c| match c {
                    Condition::And(_) => format!("({})", c.to_sql(ctx, params)),
                    _ => c.to_sql(ctx, params),
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }

        if let Some(having) = &self.having {
            sql.push_str(&format!(
                " GROUP BY {} HAVING COUNT(DISTINCT {}) >= {}",
                pk.to_sql(generator),
                having.column.to_sql(generator),
                having.min
            ));
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|(col, order)| format!("{} {}", col.to_sql(generator), order.sql_keyword()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        sql.push_str(&generator.limit_offset(self.limit, self.offset));
        sql
    }
}

/// Set of entity PKs produced by a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterQuery {
    Select(Box<SelectQuery>),
    Compound { op: SetOp, operands: Vec<FilterQuery> },
}

impl FilterQuery {
    pub fn select(query: SelectQuery) -> Self {
        FilterQuery::Select(Box::new(query))
    }

    /// Combine operands, flattening nested compounds of the same associative op.
    pub fn compound(op: SetOp, operands: Vec<FilterQuery>) -> Self {
        let mut flat = Vec::with_capacity(operands.len());
        for operand in operands {
            match operand {
                FilterQuery::Compound { op: inner, operands: nested }
                    if inner == op && op != SetOp::Except =>
                {
                    flat.extend(nested)
                }
                other => flat.push(other),
            }
        }
        FilterQuery::Compound { op, operands: flat }
    }

    pub fn to_sql(&self, ctx: &RenderContext<'_>, params: &mut ParamContext) -> String {
        match self {
            FilterQuery::Select(query) => query.to_sql(ctx, params),
            FilterQuery::Compound { op, operands } => {
                let generator = ctx.generator;
                let parts: Vec<String> = operands
                    .iter()
                    .map(|operand| match operand {
                        FilterQuery::Select(query) => query.to_sql(ctx, params),
                        FilterQuery::Compound { .. } => format!(
                            "SELECT {} FROM ({}) AS {}",
                            ColumnRef::qualified(SUBQUERY_ALIAS, &ctx.layout.entity_pk_column)
                                .to_sql(generator),
                            operand.to_sql(ctx, params),
                            SUBQUERY_ALIAS
                        ),
                    })
                    .collect();
                parts.join(&format!(" {} ", generator.set_operator(*op)))
            }
        }
    }
}
